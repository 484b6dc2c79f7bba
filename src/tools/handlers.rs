/**
 * Generation Tool Handlers
 *
 * HTTP handlers for the /api/tools routes. Each generation handler
 * follows the same shape: call the provider gateway, hand the result to
 * the matching builder, record a content row for the authenticated
 * user, and return the artifact id alongside the legacy path fields.
 *
 * Downloads are served only for ids the artifact store can resolve, so
 * nothing outside the generation directory is ever reachable.
 */

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStore;
use crate::builders;
use crate::builders::speech::SpeechOutcome;
use crate::content::record_content;
use crate::error::ApiError;
use crate::gateway::{DEFAULT_IMAGE_SIZE, DEFAULT_TEXT_TOKENS};
use crate::middleware::AuthUser;
use crate::server::state::AppState;

fn default_style() -> String {
    "realistic".to_string()
}

fn default_format() -> String {
    "docx".to_string()
}

fn default_slides() -> u32 {
    5
}

fn default_template() -> String {
    "default".to_string()
}

fn default_voice() -> String {
    "alloy".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default = "default_style")]
    pub style: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub prompt: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub prompt: String,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct PresentationRequest {
    pub prompt: String,
    #[serde(default = "default_slides")]
    pub slides: u32,
    #[serde(default = "default_template")]
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_path: String,
    pub artifact_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub code: String,
    pub file_path: String,
    pub artifact_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub file_path: String,
    pub artifact_id: String,
    pub success: bool,
    /// Present exactly when the result is a degraded placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Image generation for POST /api/tools/generate-image
///
/// The style is folded into the prompt before it reaches the provider.
pub async fn generate_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::validation("Prompt must not be empty"));
    }

    let full_prompt = format!("{} in {} style", request.prompt, request.style);
    let image_url = state
        .gateway
        .generate_image(&full_prompt, DEFAULT_IMAGE_SIZE)
        .await?;

    let (artifact_id, path) =
        builders::image::build_image_file(&state.http, &state.artifacts, &image_url).await?;

    record_content(
        &state.db_pool,
        user.user_id,
        "image",
        &path.display().to_string(),
        &request.prompt,
    )
    .await?;

    Ok(Json(ImageResponse {
        image_path: path.display().to_string(),
        artifact_id,
        success: true,
    }))
}

/// Code generation for POST /api/tools/generate-code
pub async fn generate_code(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CodeRequest>,
) -> Result<Json<CodeResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::validation("Prompt must not be empty"));
    }

    let code = state
        .gateway
        .generate_code(&request.prompt, &request.language)
        .await?;

    let (artifact_id, path) =
        builders::code::build_code_file(&state.artifacts, &code, &request.language).await?;

    record_content(
        &state.db_pool,
        user.user_id,
        "code",
        &path.display().to_string(),
        &request.prompt,
    )
    .await?;

    Ok(Json(CodeResponse {
        code,
        file_path: path.display().to_string(),
        artifact_id,
        success: true,
    }))
}

/// Document generation for POST /api/tools/generate-document
///
/// `docx` produces a real package; `pdf` writes the raw text to a
/// `.txt` artifact (no PDF rendering backend). Anything else is a 400.
pub async fn generate_document(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<FileResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::validation("Prompt must not be empty"));
    }

    let format = request.format.to_lowercase();
    if format != "docx" && format != "pdf" {
        return Err(ApiError::validation(format!(
            "Unsupported format: {}",
            request.format
        )));
    }

    let content = state
        .gateway
        .generate_text(&request.prompt, DEFAULT_TEXT_TOKENS)
        .await?;

    let (artifact_id, path) = if format == "docx" {
        builders::document::build_docx(&state.artifacts, &content)?
    } else {
        builders::document::build_plain_text(&state.artifacts, &content).await?
    };

    record_content(
        &state.db_pool,
        user.user_id,
        "document",
        &path.display().to_string(),
        &request.prompt,
    )
    .await?;

    Ok(Json(FileResponse {
        file_path: path.display().to_string(),
        artifact_id,
        success: true,
        message: None,
    }))
}

/// Presentation generation for POST /api/tools/generate-presentation
pub async fn generate_presentation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<PresentationRequest>,
) -> Result<Json<FileResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::validation("Prompt must not be empty"));
    }
    if request.slides < 1 {
        return Err(ApiError::validation("Slide count must be at least 1"));
    }

    let structure_prompt = format!(
        "Create a {}-slide presentation structure on the topic: {}. \
         For each slide, provide a title and bullet points. \
         Format as 'Slide 1: Title\\n- Bullet 1\\n- Bullet 2'",
        request.slides, request.prompt
    );
    let structure = state
        .gateway
        .generate_text(&structure_prompt, DEFAULT_TEXT_TOKENS)
        .await?;

    let slides = builders::slides::parse_outline(&structure);
    let colors = builders::slides::template_colors(&request.template);
    let (artifact_id, path) = builders::slides::build_pptx(&state.artifacts, &slides, colors)?;

    record_content(
        &state.db_pool,
        user.user_id,
        "presentation",
        &path.display().to_string(),
        &request.prompt,
    )
    .await?;

    Ok(Json(FileResponse {
        file_path: path.display().to_string(),
        artifact_id,
        success: true,
        message: None,
    }))
}

/// Speech synthesis for POST /api/tools/text-to-speech
///
/// Provider failure degrades to a placeholder transcript; only a disk
/// failure surfaces as an error.
pub async fn text_to_speech(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<FileResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::validation("Text must not be empty"));
    }

    let synthesis = state
        .gateway
        .synthesize_speech(&request.text, &request.voice)
        .await;

    let outcome = builders::speech::build_speech_file(&state.artifacts, &request.text, synthesis).await;

    let (artifact_id, path, message) = match outcome {
        SpeechOutcome::Succeeded { artifact_id, path } => (artifact_id, path, None),
        SpeechOutcome::DegradedPlaceholder {
            artifact_id,
            path,
            reason,
        } => {
            tracing::warn!("speech degraded to placeholder: {}", reason);
            (
                artifact_id,
                path,
                Some("Speech synthesis unavailable; a transcript placeholder was generated.".to_string()),
            )
        }
        SpeechOutcome::Failed { reason } => {
            return Err(ApiError::provider(format!(
                "Failed to generate speech: {}",
                reason
            )));
        }
    };

    record_content(
        &state.db_pool,
        user.user_id,
        "speech",
        &path.display().to_string(),
        &request.text,
    )
    .await?;

    Ok(Json(FileResponse {
        file_path: path.display().to_string(),
        artifact_id,
        success: true,
        message,
    }))
}

/// Artifact download for GET /api/tools/download/{artifact_id}
///
/// Public by design; artifact ids are unguessable and resolution is
/// confined to the generation directory.
pub async fn download_artifact(
    State(store): State<ArtifactStore>,
    Path(artifact_id): Path<String>,
) -> Result<Response, ApiError> {
    let path = store
        .resolve(&artifact_id)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => {
            tracing::error!("failed to read artifact {}: {}", artifact_id, e);
            return Err(ApiError::provider("Failed to read file"));
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", artifact_id);
    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(bytes),
    )
        .into_response();

    Ok(response)
}
