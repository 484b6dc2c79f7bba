/**
 * OOXML Container Assembly
 *
 * DOCX and PPTX files are zip archives of XML parts. This module holds the
 * shared plumbing: an in-memory part list written out as a deflated zip,
 * and text escaping for XML content.
 */

use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::builders::BuildError;

/// An OOXML package under construction: ordered (part name, XML) pairs
pub struct OoxmlPackage {
    parts: Vec<(String, String)>,
}

impl OoxmlPackage {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Append a part; names use forward slashes ("word/document.xml")
    pub fn add_part(&mut self, name: impl Into<String>, xml: impl Into<String>) {
        self.parts.push((name.into(), xml.into()));
    }

    /// Write the package as a zip archive at `path`
    pub fn write_to(&self, path: &Path) -> Result<(), BuildError> {
        let file = std::fs::File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, xml) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(xml.as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }
}

impl Default for OoxmlPackage {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text for embedding in XML content or attribute values
pub fn xml_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(xml_escape("plain text"), "plain text");
        assert_eq!(xml_escape("it's"), "it&apos;s");
    }

    #[test]
    fn test_package_writes_zip_with_parts() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("test.docx");

        let mut package = OoxmlPackage::new();
        package.add_part("[Content_Types].xml", "<Types/>");
        package.add_part("word/document.xml", "<w:document/>");
        package.write_to(&path).unwrap();

        let mut magic = [0u8; 2];
        std::fs::File::open(&path)
            .unwrap()
            .read_exact(&mut magic)
            .unwrap();
        assert_eq!(&magic, b"PK");

        let archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"word/document.xml"));
    }
}
