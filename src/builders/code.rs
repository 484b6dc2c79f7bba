/**
 * Code File Builder
 *
 * Writes generated source text verbatim to a file whose extension comes
 * from a fixed language table. Unknown languages fall back to `.txt`.
 */

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::builders::BuildError;

/// Fixed language-to-extension table
const EXTENSIONS: [(&str, &str); 15] = [
    ("python", "py"),
    ("javascript", "js"),
    ("typescript", "ts"),
    ("java", "java"),
    ("c++", "cpp"),
    ("c#", "cs"),
    ("go", "go"),
    ("ruby", "rb"),
    ("php", "php"),
    ("swift", "swift"),
    ("kotlin", "kt"),
    ("rust", "rs"),
    ("sql", "sql"),
    ("html", "html"),
    ("css", "css"),
];

/// File extension for a language name; unknown languages get `txt`
pub fn extension_for(language: &str) -> &'static str {
    let language = language.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, ext)| *ext)
        .unwrap_or("txt")
}

/// Write generated code to a fresh artifact and return (id, path)
pub async fn build_code_file(
    store: &ArtifactStore,
    code: &str,
    language: &str,
) -> Result<(String, PathBuf), BuildError> {
    let (artifact_id, path) = store.create("code", extension_for(language));
    tokio::fs::write(&path, code).await?;
    Ok((artifact_id, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_maps_to_its_extension() {
        for (language, ext) in EXTENSIONS {
            assert_eq!(extension_for(language), ext, "language {}", language);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(extension_for("Python"), "py");
        assert_eq!(extension_for("RUST"), "rs");
    }

    #[test]
    fn test_unknown_language_falls_back_to_txt() {
        assert_eq!(extension_for("cobol"), "txt");
        assert_eq!(extension_for(""), "txt");
    }

    #[tokio::test]
    async fn test_code_written_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let code = "def hello():\n    return \"world\"\n";
        let (artifact_id, path) = build_code_file(&store, code, "python").await.unwrap();

        assert!(artifact_id.ends_with(".py"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), code);
    }
}
