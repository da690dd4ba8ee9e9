//! Word templates (.dotx/.docx) that output documents start from
//!
//! A template contributes its styles, numbering definitions, relationships
//! and page setup. Its body content is discarded; only the final section
//! properties are carried into the output.
//!
//! # Example
//!
//! ```
//! use treedocx_ooxml::Template;
//!
//! let template = Template::builtin().unwrap();
//! assert!(template.styles().find("Normal", treedocx_ooxml::StyleType::Paragraph).is_some());
//! assert!(template.block_width() > 0);
//! ```

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::archive::{
    OoxmlArchive, CONTENT_TYPES_PART, CORE_PROPS_PART, DOCUMENT_PART, DOCUMENT_RELS_PART,
    NUMBERING_PART, STYLES_PART,
};
use crate::error::{OoxmlError, Result};
use crate::image::EMU_PER_TWIP;
use crate::numbering::NumberingPart;
use crate::relationships::Relationships;
use crate::styles::StyleSheet;
use crate::xml::get_attr;

/// A4 with one-inch margins, used when a template has no page setup
pub const DEFAULT_BLOCK_WIDTH: i64 = (11906 - 2 * 1440) * EMU_PER_TWIP;

const BUILTIN_PARTS: &[(&str, &str)] = &[
    (CONTENT_TYPES_PART, include_str!("../templates/content_types.xml")),
    ("_rels/.rels", include_str!("../templates/rels.xml")),
    (DOCUMENT_PART, include_str!("../templates/document.xml")),
    (DOCUMENT_RELS_PART, include_str!("../templates/document.xml.rels")),
    (STYLES_PART, include_str!("../templates/styles.xml")),
    (CORE_PROPS_PART, include_str!("../templates/core.xml")),
];

/// A loaded Word template
#[derive(Debug, Clone)]
pub struct Template {
    archive: OoxmlArchive,
    stylesheet: StyleSheet,
}

impl Template {
    /// Load a template from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading template");
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_reader(std::io::Cursor::new(bytes))?)
    }

    /// Wrap an unpacked package; it must have a main document and styles
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        archive.require(DOCUMENT_PART)?;
        let stylesheet = StyleSheet::parse(archive.require(STYLES_PART)?)?;
        Ok(Self {
            archive,
            stylesheet,
        })
    }

    /// The template shipped with treedocx
    pub fn builtin() -> Result<Self> {
        let mut archive = OoxmlArchive::new();
        for (path, contents) in BUILTIN_PARTS {
            archive.set_string(*path, *contents);
        }
        Self::from_archive(archive)
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.stylesheet
    }

    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    pub fn into_archive(self) -> OoxmlArchive {
        self.archive
    }

    /// Relationships of the main document part
    pub fn relationships(&self) -> Result<Relationships> {
        match self.archive.get(DOCUMENT_RELS_PART) {
            Some(xml) => Relationships::parse(xml),
            None => Ok(Relationships::new()),
        }
    }

    /// Numbering definitions, empty if the template has none
    pub fn numbering(&self) -> Result<NumberingPart> {
        match self.archive.get(NUMBERING_PART) {
            Some(xml) => NumberingPart::parse(xml),
            None => Ok(NumberingPart::new()),
        }
    }

    /// The body's final `<w:sectPr>` element, verbatim
    pub fn section_properties(&self) -> Option<String> {
        let xml = self.archive.get_string(DOCUMENT_PART)?;
        let start = xml.rfind("<w:sectPr")?;
        let rest = &xml[start..];
        let head_end = rest.find('>')?;
        if rest[..head_end].ends_with('/') {
            return Some(rest[..=head_end].to_string());
        }
        let end = rest.find("</w:sectPr>")? + "</w:sectPr>".len();
        Some(rest[..end].to_string())
    }

    /// Usable text width in EMUs: page width minus left and right margins
    pub fn block_width(&self) -> i64 {
        match self.archive.get(DOCUMENT_PART).map(page_geometry) {
            Some(Ok(Some((page, left, right)))) if page > left + right => {
                (page - left - right) * EMU_PER_TWIP
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "unreadable page setup, using default width");
                DEFAULT_BLOCK_WIDTH
            }
            _ => DEFAULT_BLOCK_WIDTH,
        }
    }
}

/// Page width and horizontal margins (twips) of the last section
fn page_geometry(xml: &[u8]) -> Result<Option<(i64, i64, i64)>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut width = None;
    let mut margins = (0, 0);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let twips = |name: &[u8]| -> i64 {
                    get_attr(e, name)
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0)
                };
                match e.local_name().as_ref() {
                    b"pgSz" => width = Some(twips(b"w:w")),
                    b"pgMar" => margins = (twips(b"w:left"), twips(b"w:right")),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(width.map(|w| (w, margins.0, margins.1)))
}
