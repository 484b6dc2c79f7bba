/**
 * Speech Builder
 *
 * Speech synthesis degrades instead of failing: when the provider call
 * errors, a placeholder transcript is written so the caller still gets a
 * file. The outcome is a tagged type, so a placeholder can never be
 * mistaken for real audio without an explicit check.
 */

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::gateway::GatewayError;

/// Result of a speech generation attempt
#[derive(Debug)]
pub enum SpeechOutcome {
    /// Real audio was synthesized and written
    Succeeded { artifact_id: String, path: PathBuf },
    /// The provider failed; a placeholder transcript was written instead
    DegradedPlaceholder {
        artifact_id: String,
        path: PathBuf,
        reason: String,
    },
    /// Nothing could be written at all
    Failed { reason: String },
}

/// Write the synthesis result, degrading to a placeholder on provider failure
pub async fn build_speech_file(
    store: &ArtifactStore,
    text: &str,
    synthesis: Result<Vec<u8>, GatewayError>,
) -> SpeechOutcome {
    match synthesis {
        Ok(audio) => {
            let (artifact_id, path) = store.create("audio", "mp3");
            match tokio::fs::write(&path, &audio).await {
                Ok(()) => SpeechOutcome::Succeeded { artifact_id, path },
                Err(e) => SpeechOutcome::Failed {
                    reason: format!("failed to write audio file: {}", e),
                },
            }
        }
        Err(provider_err) => {
            tracing::warn!("speech synthesis unavailable: {}", provider_err);
            let (artifact_id, path) = store.create("audio", "txt");
            let placeholder = format!("Audio would be generated for: {}", text);
            match tokio::fs::write(&path, placeholder).await {
                Ok(()) => SpeechOutcome::DegradedPlaceholder {
                    artifact_id,
                    path,
                    reason: provider_err.to_string(),
                },
                Err(e) => SpeechOutcome::Failed {
                    reason: format!("failed to write placeholder file: {}", e),
                },
            }
        }
    }
}
