/**
 * Image Builder
 *
 * The provider hosts generated images at a short-lived URL; this builder
 * fetches the URL with the shared timeout-bearing client and writes the
 * bytes to a fresh `.png` artifact.
 */

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::builders::BuildError;

/// Download a provider-hosted image and write it as a PNG artifact
pub async fn build_image_file(
    client: &reqwest::Client,
    store: &ArtifactStore,
    url: &str,
) -> Result<(String, PathBuf), BuildError> {
    let response = client.get(url).send().await.map_err(|e| {
        tracing::warn!("image download failed: {}", e);
        BuildError::Download {
            message: format!("image download failed: {}", e),
        }
    })?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::warn!("image host returned {}", status);
        return Err(BuildError::Download {
            message: format!("image host returned {}", status),
        });
    }

    let bytes = response.bytes().await.map_err(|e| BuildError::Download {
        message: format!("failed to read image body: {}", e),
    })?;

    let (artifact_id, path) = store.create("image", "png");
    tokio::fs::write(&path, &bytes).await?;
    Ok((artifact_id, path))
}
