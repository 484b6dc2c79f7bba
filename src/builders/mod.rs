/**
 * Artifact Builders
 *
 * Four independent, stateless file assemblers plus the speech fallback.
 * Each takes already-generated content (the handler talks to the gateway)
 * and produces exactly one file inside the artifact store:
 *
 * - `image` - fetches a provider-hosted URL and writes the bytes as PNG
 * - `code` - maps language to extension and writes the text verbatim
 * - `document` - markdown-ish heading parsing into a DOCX package
 * - `slides` - `Slide N:` outline parsing into a PPTX package
 * - `speech` - audio bytes, degrading to a placeholder transcript
 */

pub mod code;
pub mod document;
pub mod image;
pub mod ooxml;
pub mod slides;
pub mod speech;

use thiserror::Error;

use crate::error::ApiError;

/// Errors raised while assembling an artifact file
#[derive(Debug, Error)]
pub enum BuildError {
    /// Filesystem error while writing the artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error while writing an OOXML package
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Fetching provider-hosted content failed
    #[error("download failed: {message}")]
    Download {
        /// Human-readable error message
        message: String,
    },
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        ApiError::provider(err.to_string())
    }
}
