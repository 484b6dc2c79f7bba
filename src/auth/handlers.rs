/**
 * Signup and Login Handlers
 *
 * # Registration Process
 *
 * 1. Validate username format, email format, and password length
 * 2. Check if username or email already exists
 * 3. Hash password using bcrypt
 * 4. Create user in database
 * 5. Generate JWT token and return it with the user info
 *
 * # Security
 *
 * - Passwords are hashed using bcrypt with DEFAULT_COST
 * - Passwords are never returned in responses
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::sessions::create_token;
use crate::auth::users::{create_user, get_user_by_email, get_user_by_username, User};
use crate::error::ApiError;
use crate::server::config::AppConfig;
use crate::server::state::AppState;

/// Signup request payload
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User payload returned by auth endpoints (no credential material)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

/// Auth endpoint response: token plus user info
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            is_active: user.is_active,
        }
    }
}

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Sign up handler for POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    tracing::info!("signup request for username: {}", request.username);

    if !is_valid_username(&request.username) {
        return Err(ApiError::validation(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if !request.email.contains('@') {
        return Err(ApiError::validation("Invalid email format"));
    }
    if request.password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }

    if get_user_by_username(&state.db_pool, &request.username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username already taken"));
    }
    if get_user_by_email(&state.db_pool, &request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("failed to hash password: {:?}", e);
        ApiError::internal("password hashing failed")
    })?;

    let user = create_user(
        &state.db_pool,
        request.username.clone(),
        request.email.clone(),
        password_hash,
    )
    .await?;

    let token = issue_token(&state.config, &user)?;
    tracing::info!("user created: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Login handler for POST /api/auth/login
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = get_user_by_email(&pool, &request.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let password_ok = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("failed to verify password: {:?}", e);
        ApiError::internal("password verification failed")
    })?;
    if !password_ok {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = create_token(&config.jwt_secret, user.id, user.email.clone()).map_err(|e| {
        tracing::error!("failed to create token: {:?}", e);
        ApiError::internal("token signing failed")
    })?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

fn issue_token(config: &AppConfig, user: &User) -> Result<String, ApiError> {
    create_token(&config.jwt_secret, user.id, user.email.clone()).map_err(|e| {
        tracing::error!("failed to create token: {:?}", e);
        ApiError::internal("token signing failed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_42"));
        assert!(is_valid_username("Abc"));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("1starts_with_digit"));
        assert!(!is_valid_username("_underscore_first"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(31)));
    }
}
