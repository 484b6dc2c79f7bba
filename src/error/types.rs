/**
 * API Error Taxonomy
 *
 * Every failure surfaced by a handler falls into one of four request-level
 * categories, plus two ambient categories for infrastructure faults:
 *
 * - `Provider` - an external AI or billing call errored or timed out.
 *   Surfaced as a generic server error; the caller is never shown
 *   provider internals and no retry is attempted.
 * - `Validation` - a missing/invalid request field or unsupported enum
 *   value, with a descriptive message.
 * - `NotFound` - a referenced user, subscription, or file is absent.
 * - `Conflict` - a duplicate active subscription. Surfaced as 400 to
 *   match the public interface, kept as its own variant so the
 *   distinction stays explicit in code.
 * - `Unauthorized` - missing or invalid bearer credentials.
 * - `Internal` - a fault in our own machinery (password hashing, token
 *   signing); distinct from `Provider` so 500s can be attributed.
 * - `Database` / `Serialization` - wrapped infrastructure errors.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Error type returned by all API handlers
///
/// Each variant maps to an HTTP status code via [`ApiError::status_code`]
/// and a response body message via [`ApiError::message`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// External provider (AI or billing) call failed
    #[error("Provider error: {message}")]
    Provider {
        /// Human-readable error message
        message: String,
    },

    /// Request validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message
        message: String,
    },

    /// Referenced entity does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Conflicting state, e.g. a duplicate active subscription
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message
        message: String,
    },

    /// Internal fault in our own machinery (hashing, token signing)
    #[error("Internal error: {message}")]
    Internal {
        /// Detail for the log; never shown to callers
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Create a new provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Provider` - 500 Internal Server Error
    /// - `Validation` - 400 Bad Request
    /// - `NotFound` - 404 Not Found
    /// - `Conflict` - 400 Bad Request (public interface contract)
    /// - `Unauthorized` - 401 Unauthorized
    /// - `Internal` / `Database` / `Serialization` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message for the response body
    ///
    /// Infrastructure errors are logged at the call site and collapsed to a
    /// generic message here so internals never leak to callers.
    pub fn message(&self) -> String {
        match self {
            Self::Provider { message } => message.clone(),
            Self::Validation { message } => message.clone(),
            Self::NotFound { message } => message.clone(),
            Self::Conflict { message } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::Internal { .. } => "Internal server error".to_string(),
            Self::Database(_) => "Internal server error".to_string(),
            Self::Serialization(_) => "Internal server error".to_string(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self::provider(err.to_string())
    }
}
