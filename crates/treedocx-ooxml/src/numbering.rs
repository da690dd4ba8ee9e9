//! Numbering definitions (word/numbering.xml)
//!
//! Word numbering has two layers: abstract definitions describe how each
//! level looks, and numbering instances (`w:num`) point at an abstract
//! definition and carry their own counters. Every list and every numbered
//! section scope gets a fresh instance that restarts at 1, so sibling lists
//! never continue each other's numbers.
//!
//! The four abstract definitions the translator relies on are identified by
//! fixed ids. A template may define them itself; missing ones are generated.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use crate::error::{OoxmlError, Result};
use crate::xml::get_attr;

const NUMBERING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const LEVELS: u32 = 9;

/// Numbering instance id (`w:numId`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NumId(pub u32);

/// Abstract numbering definitions used by the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberingTemplate {
    /// Bullet lists
    Bullet,
    /// Numbered section headings ("1.", "1.1.", ...)
    Section,
    /// Enumerated lists
    Enumerated,
    /// Indentation without a marker, for follow-up paragraphs in lists
    Continuation,
}

impl NumberingTemplate {
    pub const ALL: [NumberingTemplate; 4] = [
        NumberingTemplate::Bullet,
        NumberingTemplate::Section,
        NumberingTemplate::Enumerated,
        NumberingTemplate::Continuation,
    ];

    /// Fixed `w:abstractNumId`
    pub fn abstract_id(&self) -> u32 {
        match self {
            NumberingTemplate::Bullet => 11,
            NumberingTemplate::Section => 12,
            NumberingTemplate::Enumerated => 15,
            NumberingTemplate::Continuation => 16,
        }
    }

    /// `w:abstractNum` element for this template
    pub fn abstract_xml(&self) -> String {
        let mut xml = format!(
            r#"<w:abstractNum w:abstractNumId="{}"><w:multiLevelType w:val="{}"/>"#,
            self.abstract_id(),
            match self {
                NumberingTemplate::Section => "multilevel",
                _ => "hybridMultilevel",
            }
        );
        for level in 0..LEVELS {
            let (format, text) = self.level_format(level);
            let (left, hanging) = match self {
                NumberingTemplate::Section => (432 + 144 * level, 432 + 144 * level),
                _ => (720 * (level + 1), 360),
            };
            xml.push_str(&format!(
                r#"<w:lvl w:ilvl="{}"><w:start w:val="1"/><w:numFmt w:val="{}"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{}" w:hanging="{}"/></w:pPr></w:lvl>"#,
                level, format, text, left, hanging
            ));
        }
        xml.push_str("</w:abstractNum>");
        xml
    }

    fn level_format(&self, level: u32) -> (&'static str, String) {
        match self {
            NumberingTemplate::Bullet => {
                let bullet = ["\u{2022}", "\u{25E6}", "\u{25AA}"][(level % 3) as usize];
                ("bullet", bullet.to_string())
            }
            NumberingTemplate::Enumerated => {
                let format = ["decimal", "lowerLetter", "lowerRoman"][(level % 3) as usize];
                (format, format!("%{}.", level + 1))
            }
            NumberingTemplate::Section => {
                let text: String = (1..=level + 1).map(|l| format!("%{}.", l)).collect();
                ("decimal", text)
            }
            NumberingTemplate::Continuation => ("none", String::new()),
        }
    }
}

/// A numbering instance added by this document
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumInstance {
    num_id: u32,
    abstract_id: u32,
    restart: bool,
}

/// Numbering part of a document under construction
#[derive(Debug, Clone)]
pub struct NumberingPart {
    /// Template's numbering.xml, if any
    source: Option<String>,
    abstract_ids: BTreeSet<u32>,
    /// Existing instances: numId -> abstractNumId
    existing: BTreeMap<u32, u32>,
    added: Vec<NumInstance>,
    next_num_id: u32,
}

impl NumberingPart {
    /// Empty numbering part
    pub fn new() -> Self {
        Self {
            source: None,
            abstract_ids: BTreeSet::new(),
            existing: BTreeMap::new(),
            added: Vec::new(),
            next_num_id: 1,
        }
    }

    /// Parse a template's numbering.xml
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut part = NumberingPart::new();
        let mut current_num: Option<u32> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"abstractNum" => {
                            if let Some(id) = get_attr(e, b"w:abstractNumId")
                                .and_then(|v| v.parse().ok())
                            {
                                part.abstract_ids.insert(id);
                            }
                        }
                        b"num" => {
                            current_num =
                                get_attr(e, b"w:numId").and_then(|v| v.parse().ok());
                        }
                        b"abstractNumId" => {
                            let abstract_id = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                            if let (Some(num), Some(abstract_id)) = (current_num, abstract_id) {
                                part.existing.insert(num, abstract_id);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"num" => {
                    current_num = None;
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        part.next_num_id = part.existing.keys().max().map_or(1, |max| max + 1);
        part.source = Some(String::from_utf8_lossy(xml).into_owned());
        Ok(part)
    }

    /// Add a fresh instance of `template` whose first level restarts at 1
    pub fn allocate(&mut self, template: NumberingTemplate) -> NumId {
        self.push_instance(template, true)
    }

    /// An instance of `template` shared by all callers (no restart)
    pub fn shared(&mut self, template: NumberingTemplate) -> NumId {
        let abstract_id = template.abstract_id();
        let existing = self
            .existing
            .iter()
            .find(|(_, a)| **a == abstract_id)
            .map(|(num, _)| *num);
        let added = self
            .added
            .iter()
            .find(|n| n.abstract_id == abstract_id && !n.restart)
            .map(|n| n.num_id);
        match existing.or(added) {
            Some(num) => NumId(num),
            None => self.push_instance(template, false),
        }
    }

    fn push_instance(&mut self, template: NumberingTemplate, restart: bool) -> NumId {
        let num_id = self.next_num_id;
        self.next_num_id += 1;
        self.added.push(NumInstance {
            num_id,
            abstract_id: template.abstract_id(),
            restart,
        });
        NumId(num_id)
    }

    /// Abstract definition ids present in the template
    pub fn has_abstract(&self, abstract_id: u32) -> bool {
        self.abstract_ids.contains(&abstract_id)
    }

    /// Number of instances added since load
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Serialize the part, template content first
    pub fn to_xml(&self) -> String {
        let mut xml = match &self.source {
            Some(source) => open_root(source),
            None => format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:numbering xmlns:w=\"{}\"></w:numbering>",
                NUMBERING_NS
            ),
        };

        let missing: String = NumberingTemplate::ALL
            .iter()
            .filter(|t| !self.has_abstract(t.abstract_id()))
            .map(NumberingTemplate::abstract_xml)
            .collect();
        // Abstract definitions must precede every w:num
        let abstract_at = find_first_num(&xml)
            .or_else(|| xml.rfind("</w:numbering>"))
            .unwrap_or(xml.len());
        xml.insert_str(abstract_at, &missing);

        let mut instances = String::new();
        for num in &self.added {
            instances.push_str(&format!(
                r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/>"#,
                num.num_id, num.abstract_id
            ));
            if num.restart {
                instances.push_str(
                    r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride>"#,
                );
            }
            instances.push_str("</w:num>");
        }
        let num_at = xml.rfind("</w:numbering>").unwrap_or(xml.len());
        xml.insert_str(num_at, &instances);
        xml
    }
}

impl Default for NumberingPart {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a self-closing `<w:numbering .../>` root into an open/close pair
fn open_root(source: &str) -> String {
    if source.contains("</w:numbering>") {
        return source.to_string();
    }
    match source.find("<w:numbering") {
        Some(start) => match source[start..].find("/>") {
            Some(offset) => {
                let end = start + offset;
                format!(
                    "{}></w:numbering>{}",
                    &source[..end],
                    &source[end + 2..]
                )
            }
            None => source.to_string(),
        },
        None => source.to_string(),
    }
}

/// Offset of the first `w:num` element (not `w:numPicBullet` etc.)
fn find_first_num(xml: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = xml[from..].find("<w:num") {
        let at = from + offset;
        let rest = &xml[at + "<w:num".len()..];
        if rest.starts_with(' ') || rest.starts_with('>') {
            return Some(at);
        }
        from = at + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:numPicBullet w:numPicBulletId="0"/><w:abstractNum w:abstractNumId="11"><w:lvl w:ilvl="0"/></w:abstractNum><w:num w:numId="3"><w:abstractNumId w:val="11"/></w:num></w:numbering>"#;

    #[test]
    fn test_parse_existing_instances() {
        let part = NumberingPart::parse(TEMPLATE).unwrap();
        assert!(part.has_abstract(11));
        assert!(!part.has_abstract(12));
        assert_eq!(part.existing.get(&3), Some(&11));
    }

    #[test]
    fn test_allocate_continues_after_existing_ids() {
        let mut part = NumberingPart::parse(TEMPLATE).unwrap();
        assert_eq!(part.allocate(NumberingTemplate::Enumerated), NumId(4));
        assert_eq!(part.allocate(NumberingTemplate::Enumerated), NumId(5));
        assert_eq!(part.added_count(), 2);
    }

    #[test]
    fn test_shared_reuses_existing_instance() {
        let mut part = NumberingPart::parse(TEMPLATE).unwrap();
        assert_eq!(part.shared(NumberingTemplate::Bullet), NumId(3));
        let continuation = part.shared(NumberingTemplate::Continuation);
        assert_eq!(part.shared(NumberingTemplate::Continuation), continuation);
        assert_eq!(part.added_count(), 1);
    }

    #[test]
    fn test_to_xml_inserts_missing_abstracts_before_nums() {
        let mut part = NumberingPart::parse(TEMPLATE).unwrap();
        part.allocate(NumberingTemplate::Section);
        let xml = part.to_xml();

        let abstract12 = xml.find(r#"w:abstractNumId="12""#).unwrap();
        let first_num = xml.find(r#"<w:num w:numId="3">"#).unwrap();
        assert!(abstract12 < first_num);
        // the template's own definition is not duplicated
        assert_eq!(xml.matches(r#"<w:abstractNum w:abstractNumId="11""#).count(), 1);
        assert!(xml.contains(
            r#"<w:num w:numId="4"><w:abstractNumId w:val="12"/><w:lvlOverride w:ilvl="0"><w:startOverride w:val="1"/></w:lvlOverride></w:num></w:numbering>"#
        ));
    }

    #[test]
    fn test_self_closing_root() {
        let mut part = NumberingPart::parse(
            br#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        )
        .unwrap();
        part.allocate(NumberingTemplate::Bullet);
        let xml = part.to_xml();
        assert!(xml.ends_with("</w:num></w:numbering>"));
        assert!(xml.contains(r#"<w:abstractNum w:abstractNumId="16">"#));
    }

    #[test]
    fn test_section_level_text() {
        let xml = NumberingTemplate::Section.abstract_xml();
        assert!(xml.contains(r#"<w:lvlText w:val="%1.%2.%3."/>"#));
        let bullets = NumberingTemplate::Bullet.abstract_xml();
        assert!(bullets.contains(r#"<w:numFmt w:val="bullet"/>"#));
    }
}
