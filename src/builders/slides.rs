/**
 * Slide Deck Builder
 *
 * Parses the gateway's structured outline and assembles a PPTX package.
 *
 * # Outline grammar
 *
 * ```text
 * Slide 1: Title of the slide
 * - first bullet
 * - second bullet
 * ```
 *
 * A line matching `Slide <digits>:` starts a new slide; a line starting
 * with `- ` appends a bullet to the current slide. Anything else is
 * silently ignored, and bullets arriving before the first slide header
 * are dropped.
 *
 * # Templates
 *
 * A template name selects a background/foreground color pair from a fixed
 * four-entry table. The first slide is rendered in the title variant
 * (large centered title), subsequent slides in the content variant (title
 * plus bullet body). An unknown template name applies no color override.
 */

use std::path::PathBuf;

use crate::artifacts::ArtifactStore;
use crate::builders::ooxml::{xml_escape, OoxmlPackage};
use crate::builders::BuildError;

/// One parsed slide: a title and its bullets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideOutline {
    pub title: String,
    pub bullets: Vec<String>,
}

/// Background/foreground color pair for a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateColors {
    /// Slide background, hex RGB without '#'
    pub background: &'static str,
    /// Text color, hex RGB without '#'
    pub foreground: &'static str,
}

/// Look up the color pair for a template name
///
/// Unknown names return `None`, which means "no color override".
pub fn template_colors(name: &str) -> Option<TemplateColors> {
    match name.to_ascii_lowercase().as_str() {
        "professional" => Some(TemplateColors {
            background: "00416C",
            foreground: "FFFFFF",
        }),
        "creative" => Some(TemplateColors {
            background: "6E2B62",
            foreground: "FFFFFF",
        }),
        "minimal" => Some(TemplateColors {
            background: "FFFFFF",
            foreground: "505050",
        }),
        "default" => Some(TemplateColors {
            background: "E0E0E0",
            foreground: "303030",
        }),
        _ => None,
    }
}

/// Parse outline text into slides, line by line
pub fn parse_outline(text: &str) -> Vec<SlideOutline> {
    let mut slides: Vec<SlideOutline> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = slide_header_title(line) {
            slides.push(SlideOutline {
                title: title.to_string(),
                bullets: Vec::new(),
            });
        } else if let Some(bullet) = line.strip_prefix("- ") {
            // a bullet before any header has no slide to attach to
            if let Some(current) = slides.last_mut() {
                current.bullets.push(bullet.trim().to_string());
            }
        }
        // any other line shape is ignored
    }

    slides
}

/// Match `Slide <digits>: <title>` and return the title
fn slide_header_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Slide ")?;
    let colon = rest.find(':')?;
    let number = &rest[..colon];
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(rest[colon + 1..].trim())
}

/// Build a PPTX artifact from parsed slides and return (id, path)
pub fn build_pptx(
    store: &ArtifactStore,
    slides: &[SlideOutline],
    colors: Option<TemplateColors>,
) -> Result<(String, PathBuf), BuildError> {
    let (artifact_id, path) = store.create("presentation", "pptx");

    let mut package = OoxmlPackage::new();
    package.add_part("[Content_Types].xml", content_types(slides.len()));
    package.add_part("_rels/.rels", ROOT_RELS);
    package.add_part("ppt/presentation.xml", presentation_xml(slides.len()));
    package.add_part(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels(slides.len()),
    );
    package.add_part("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER);
    package.add_part("ppt/slideMasters/_rels/slideMaster1.xml.rels", MASTER_RELS);
    package.add_part("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT);
    package.add_part("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS);
    package.add_part("ppt/theme/theme1.xml", THEME);

    for (index, slide) in slides.iter().enumerate() {
        let name = format!("ppt/slides/slide{}.xml", index + 1);
        // first slide gets the title variant
        package.add_part(&name, slide_xml(slide, index == 0, colors));
        package.add_part(
            format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
            SLIDE_RELS,
        );
    }

    package.write_to(&path)?;
    Ok((artifact_id, path))
}

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=slide_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            "{}</Types>"
        ),
        overrides
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for i in 0..slide_count {
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + i,
            i + 2
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"<p:sldIdLst>{}</p:sldIdLst>"#,
            r#"<p:sldSz cx="9144000" cy="6858000"/>"#,
            r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        slide_ids
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    );
    for i in 0..slide_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            i + 2,
            i + 1
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#
        ),
        rels
    )
}

fn slide_xml(slide: &SlideOutline, title_variant: bool, colors: Option<TemplateColors>) -> String {
    let background = colors
        .map(|c| {
            format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                c.background
            )
        })
        .unwrap_or_default();
    let fill = colors
        .map(|c| format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, c.foreground))
        .unwrap_or_default();

    let (title_size, title_align) = if title_variant {
        (4400, r#" algn="ctr""#)
    } else {
        (3200, "")
    };

    let title_shape = format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:pPr{}/>"#,
            r#"<a:r><a:rPr lang="en-US" sz="{}" b="1">{}</a:rPr><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#
        ),
        title_align,
        title_size,
        fill,
        xml_escape(&slide.title)
    );

    let mut bullet_paragraphs = String::new();
    for bullet in &slide.bullets {
        bullet_paragraphs.push_str(&format!(
            r#"<a:p><a:pPr lvl="0"/><a:r><a:rPr lang="en-US" sz="1800">{}</a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            fill,
            xml_escape(bullet)
        ));
    }
    let body_shape = if bullet_paragraphs.is_empty() {
        String::new()
    } else {
        format!(
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="457200" y="1600200"/><a:ext cx="8229600" cy="4525963"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
                r#"<p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#
            ),
            bullet_paragraphs
        )
    };

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
            r#"<p:cSld>{}<p:spTree>"#,
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
            "{}{}",
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
        ),
        background, title_shape, body_shape
    )
}

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
    "</Relationships>"
);

const MASTER_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>"#,
    "</Relationships>"
);

const LAYOUT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#,
    "</Relationships>"
);

const SLIDE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
    "</Relationships>"
);

const SLIDE_MASTER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
    r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
    "</p:sldMaster>"
);

const SLIDE_LAYOUT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="titleAndBody">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#,
    "</p:sldLayout>"
);

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">"#,
    r#"<a:themeElements><a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme><a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme><a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements></a:theme>"#
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_slide_per_header_line() {
        let outline = "Slide 1: Introduction\n- point one\nSlide 2: Details\n- point two\n- point three";
        let slides = parse_outline(outline);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "Introduction");
        assert_eq!(slides[0].bullets, vec!["point one"]);
        assert_eq!(slides[1].bullets, vec!["point two", "point three"]);
    }

    #[test]
    fn test_bullet_before_any_header_is_dropped() {
        let slides = parse_outline("- orphan bullet\nSlide 1: Title\n- kept");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].bullets, vec!["kept"]);
    }

    #[test]
    fn test_malformed_lines_ignored_without_crash() {
        let outline = "Here is your outline:\nSlide 1: Only Slide\n- bullet\nSlide two: not a header\n* wrong marker\nSlide : missing number";
        let slides = parse_outline(outline);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title, "Only Slide");
        assert_eq!(slides[0].bullets, vec!["bullet"]);
    }

    #[test]
    fn test_empty_outline_yields_no_slides() {
        assert!(parse_outline("").is_empty());
        assert!(parse_outline("no structure at all").is_empty());
    }

    #[test]
    fn test_template_table() {
        assert_eq!(
            template_colors("professional").unwrap().background,
            "00416C"
        );
        assert_eq!(template_colors("creative").unwrap().background, "6E2B62");
        assert_eq!(template_colors("minimal").unwrap().foreground, "505050");
        assert_eq!(template_colors("default").unwrap().background, "E0E0E0");
        assert_eq!(template_colors("Professional").unwrap().background, "00416C");
    }

    #[test]
    fn test_unknown_template_has_no_override() {
        assert_eq!(template_colors("corporate"), None);
        assert_eq!(template_colors(""), None);
    }

    #[test]
    fn test_pptx_contains_one_part_per_slide() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let slides = parse_outline("Slide 1: One\n- a\nSlide 2: Two\n- b");
        let (artifact_id, path) =
            build_pptx(&store, &slides, template_colors("professional")).unwrap();
        assert!(artifact_id.ends_with(".pptx"));

        let archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"ppt/slides/slide1.xml"));
        assert!(names.contains(&"ppt/slides/slide2.xml"));
        assert!(!names.contains(&"ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_template_colors_applied_to_slide_xml() {
        let slide = SlideOutline {
            title: "Colors".to_string(),
            bullets: vec!["bullet".to_string()],
        };
        let xml = slide_xml(&slide, true, template_colors("creative"));
        assert!(xml.contains(r#"<a:srgbClr val="6E2B62"/>"#));
        assert!(xml.contains(r#"<a:srgbClr val="FFFFFF"/>"#));

        let plain = slide_xml(&slide, false, None);
        assert!(!plain.contains("srgbClr"));
    }
}
