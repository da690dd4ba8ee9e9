//! Relationships of the main document part (`word/_rels/document.xml.rels`)
//!
//! Pictures are referenced from `document.xml` through relationship ids; the
//! template's own relationships (styles, numbering, headers, ...) are kept
//! and new ids continue after the highest existing one.
//!
//! # Example
//!
//! ```
//! use treedocx_ooxml::relationships::Relationships;
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("media/image1.png", Relationships::TYPE_IMAGE);
//! assert_eq!(id, "rId1");
//! assert!(rels.to_xml().contains(r#"Target="media/image1.png""#));
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, get_attr};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A single relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// "External" for URLs, None for package parts
    pub target_mode: Option<String>,
}

/// Parsed relationships, in insertion order
#[derive(Debug, Clone)]
pub struct Relationships {
    entries: Vec<Relationship>,
    /// Counter for generating unique ids (starts at 1)
    next_id: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl Relationships {
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Numbering relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Relationships::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let id = get_attr(e, b"Id");
                        let target = get_attr(e, b"Target");
                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            rels.entries.push(Relationship {
                                id,
                                rel_type: get_attr(e, b"Type").unwrap_or_default(),
                                target,
                                target_mode: get_attr(e, b"TargetMode"),
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id = max_id + 1;
        Ok(rels)
    }

    /// Add a package-internal relationship and return its id
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode: None,
        });
        id
    }

    /// Id of the first relationship of the given type
    pub fn find_by_type(&self, rel_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.rel_type == rel_type)
            .map(|r| r.id.as_str())
    }

    /// Target of a relationship id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.target.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a .rels part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');

        for rel in &self.entries {
            xml.push_str("  <Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(&rel.id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
            }
            xml.push_str("/>\n");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric portion of a relationship id ("rId5" -> 5)
fn id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num| num.parse().ok())
}
