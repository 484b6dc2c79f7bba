/**
 * Artifact Store
 *
 * Generated files live in a single fixed directory and are addressed by
 * opaque artifact ids of the form `{kind}-{uuid}.{ext}`. The uuid makes
 * every generation collision-free (two identical prompts never overwrite
 * each other), and the download endpoint only ever resolves a validated
 * id inside the store root, so no caller-supplied path can escape it.
 */

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Store of generated artifacts confined to one root directory
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create the store, ensuring the root directory exists
    pub fn new(root: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh artifact id and its on-disk path
    ///
    /// The id doubles as the file name; nothing is written here.
    pub fn create(&self, kind: &str, ext: &str) -> (String, PathBuf) {
        let id = format!("{}-{}.{}", kind, Uuid::new_v4(), ext);
        let path = self.root.join(&id);
        (id, path)
    }

    /// Resolve an artifact id to a path inside the store root
    ///
    /// Returns `None` for anything that is not a well-formed id. The id
    /// character set excludes path separators and dot-dot sequences, so
    /// the joined path cannot leave the root.
    pub fn resolve(&self, artifact_id: &str) -> Option<PathBuf> {
        if !is_valid_artifact_id(artifact_id) {
            return None;
        }
        Some(self.root.join(artifact_id))
    }
}

/// Validate an artifact id: `{kind}-{uuid}.{ext}` as a single file name
fn is_valid_artifact_id(id: &str) -> bool {
    if id.is_empty() || id.len() > 128 {
        return false;
    }
    if id.starts_with('.') || id.contains("..") {
        return false;
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return false;
    }
    // exactly one extension separator
    if id.matches('.').count() != 1 {
        return false;
    }
    let stem = &id[..id.find('.').unwrap_or(id.len())];
    // the stem must be "{kind}-{uuid}" with a parseable uuid
    if stem.len() < 38 {
        return false;
    }
    let (prefix, candidate) = stem.split_at(stem.len() - 36);
    prefix.ends_with('-') && Uuid::parse_str(candidate).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ArtifactStore) {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_create_returns_path_under_root() {
        let (_dir, store) = store();
        let (id, path) = store.create("image", "png");
        assert!(path.starts_with(store.root()));
        assert!(id.starts_with("image-"));
        assert!(id.ends_with(".png"));
    }

    #[test]
    fn test_created_ids_resolve() {
        let (_dir, store) = store();
        let (id, path) = store.create("code", "py");
        assert_eq!(store.resolve(&id), Some(path));
    }

    #[test]
    fn test_ids_are_unique_per_call() {
        let (_dir, store) = store();
        let (a, _) = store.create("document", "docx");
        let (b, _) = store.create("document", "docx");
        assert_ne!(a, b);
    }

    #[test]
    fn test_traversal_ids_rejected() {
        let (_dir, store) = store();
        assert_eq!(store.resolve("../etc/passwd"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve("..\\secrets.txt"), None);
        assert_eq!(store.resolve(".hidden"), None);
        assert_eq!(store.resolve("image-..-x.png"), None);
    }

    #[test]
    fn test_malformed_ids_rejected() {
        let (_dir, store) = store();
        assert_eq!(store.resolve(""), None);
        assert_eq!(store.resolve("no-extension"), None);
        assert_eq!(store.resolve("image-not-a-uuid.png"), None);
        assert_eq!(store.resolve("two.dots.png"), None);
        assert_eq!(store.resolve(&"x".repeat(200)), None);
    }
}
