/**
 * Generated Content Records
 *
 * Every successful generation is recorded against the owning user.
 * Rows store the content type tag, the artifact path (or remote URL),
 * and the originating prompt.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single generated-content record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserContent {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Content type tag: "text", "image", "code", "document", "presentation", "speech"
    pub content_type: String,
    /// Artifact path or remote URL for the generated output
    pub file_path: String,
    /// The prompt that produced this content
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

/// Record a generated content row for a user
pub async fn record_content(
    pool: &PgPool,
    user_id: Uuid,
    content_type: &str,
    file_path: &str,
    prompt: &str,
) -> Result<UserContent, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, UserContent>(
        r#"
        INSERT INTO user_contents (id, user_id, content_type, file_path, prompt, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, content_type, file_path, prompt, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(content_type)
    .bind(file_path)
    .bind(prompt)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
