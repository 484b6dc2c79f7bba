/**
 * Document Builder
 *
 * Turns generated text into a word-processing document. Content is split
 * on blank lines; blocks starting with `# `, `## `, or `### ` become
 * headings of level 1-3, everything else becomes a body paragraph, and a
 * fixed "Generated Document" title leads the file.
 *
 * A requested `pdf` format is not honored: the raw text is written to a
 * `.txt` file instead. That gap is documented current behavior and the
 * tests assert it stays visible.
 */

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::builders::ooxml::{xml_escape, OoxmlPackage};
use crate::builders::BuildError;

/// One parsed content block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBlock {
    /// Heading with level 1-3
    Heading { level: u8, text: String },
    /// Plain body paragraph
    Paragraph(String),
}

/// Split content on blank lines and classify each block
///
/// Blocks that are entirely whitespace are dropped; the block count of the
/// output therefore matches the non-empty paragraph count of the input.
pub fn parse_blocks(content: &str) -> Vec<DocBlock> {
    content
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            if let Some(text) = block.strip_prefix("# ") {
                DocBlock::Heading {
                    level: 1,
                    text: text.to_string(),
                }
            } else if let Some(text) = block.strip_prefix("## ") {
                DocBlock::Heading {
                    level: 2,
                    text: text.to_string(),
                }
            } else if let Some(text) = block.strip_prefix("### ") {
                DocBlock::Heading {
                    level: 3,
                    text: text.to_string(),
                }
            } else {
                DocBlock::Paragraph(block.to_string())
            }
        })
        .collect()
}

/// Build a DOCX artifact from generated content and return (id, path)
pub fn build_docx(
    store: &ArtifactStore,
    content: &str,
) -> Result<(String, PathBuf), BuildError> {
    let (artifact_id, path) = store.create("document", "docx");
    let blocks = parse_blocks(content);

    let mut package = OoxmlPackage::new();
    package.add_part("[Content_Types].xml", CONTENT_TYPES);
    package.add_part("_rels/.rels", ROOT_RELS);
    package.add_part("word/_rels/document.xml.rels", DOCUMENT_RELS);
    package.add_part("word/styles.xml", STYLES);
    package.add_part("word/document.xml", document_xml(&blocks));
    package.write_to(&path)?;

    Ok((artifact_id, path))
}

/// Write the raw text to a `.txt` artifact (the pdf-format path)
pub async fn build_plain_text(
    store: &ArtifactStore,
    content: &str,
) -> Result<(String, PathBuf), BuildError> {
    let (artifact_id, path) = store.create("document", "txt");
    tokio::fs::write(&path, content).await?;
    Ok((artifact_id, path))
}

fn document_xml(blocks: &[DocBlock]) -> String {
    let mut body = String::new();
    body.push_str(&styled_paragraph("Title", "Generated Document"));
    for block in blocks {
        match block {
            DocBlock::Heading { level, text } => {
                body.push_str(&styled_paragraph(&format!("Heading{}", level), text));
            }
            DocBlock::Paragraph(text) => {
                body.push_str(&plain_paragraph(text));
            }
        }
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    )
}

fn styled_paragraph(style: &str, text: &str) -> String {
    format!(
        concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr>"#,
            r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#
        ),
        style,
        xml_escape(text)
    )
}

fn plain_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        xml_escape(text)
    )
}

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    "</Types>"
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    "</Relationships>"
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    "</Relationships>"
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style>"#,
    r#"<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style>"#,
    "</w:styles>"
);
