//! Style definitions (word/styles.xml) and style roles
//!
//! The translator never names template styles directly. It asks for a
//! [`StyleRole`] (literal block, caption, strong, ...) and the
//! [`ResolvedStyles`] table maps each role to a style id of the loaded
//! template. Resolution happens once, when the document is created:
//!
//! - roles the output cannot do without (Normal, Title, Heading 1-6) must
//!   exist, otherwise document creation fails;
//! - any other missing paragraph role falls back to Normal, character roles
//!   to Default Paragraph Font, table roles to no table style, with one
//!   warning per role.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::get_attr;

/// Collection of styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// All styles, keyed by style ID
    styles: HashMap<String, Style>,
    /// Default paragraph style ID
    pub default_paragraph: Option<String>,
    /// Default character style ID
    pub default_character: Option<String>,
}

/// A Word style definition
#[derive(Debug, Clone)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleType {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleSheet {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut stylesheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut current: Option<StyleBuilder> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"style" => {
                            current = Some(StyleBuilder {
                                id: get_attr(e, b"w:styleId"),
                                style_type: match get_attr(e, b"w:type").as_deref() {
                                    Some("character") => StyleType::Character,
                                    Some("table") => StyleType::Table,
                                    Some("numbering") => StyleType::Numbering,
                                    _ => StyleType::Paragraph,
                                },
                                is_default: get_attr(e, b"w:default").as_deref() == Some("1"),
                                ..Default::default()
                            });
                        }
                        b"name" => {
                            if let Some(builder) = current.as_mut() {
                                builder.name = get_attr(e, b"w:val");
                            }
                        }
                        b"basedOn" => {
                            if let Some(builder) = current.as_mut() {
                                builder.based_on = get_attr(e, b"w:val");
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => {
                    if let Some(builder) = current.take() {
                        let is_default = builder.is_default;
                        if let Some(style) = builder.build() {
                            if is_default {
                                match style.style_type {
                                    StyleType::Paragraph => {
                                        stylesheet.default_paragraph = Some(style.id.clone());
                                    }
                                    StyleType::Character => {
                                        stylesheet.default_character = Some(style.id.clone());
                                    }
                                    _ => {}
                                }
                            }
                            stylesheet.styles.insert(style.id.clone(), style);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(stylesheet)
    }

    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Find a style of the given type by id or display name
    ///
    /// Display names compare case-insensitively ("heading 1" matches
    /// "Heading 1"); an id equal to the name without spaces also matches.
    pub fn find(&self, name: &str, style_type: StyleType) -> Option<&Style> {
        if let Some(style) = self.get(name).filter(|s| s.style_type == style_type) {
            return Some(style);
        }
        let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        self.styles.values().find(|s| {
            s.style_type == style_type
                && (s.name.eq_ignore_ascii_case(name) || s.id.eq_ignore_ascii_case(&compact))
        })
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[derive(Default)]
struct StyleBuilder {
    id: Option<String>,
    name: Option<String>,
    style_type: StyleType,
    based_on: Option<String>,
    is_default: bool,
}

impl StyleBuilder {
    fn build(self) -> Option<Style> {
        let id = self.id?;
        Some(Style {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            style_type: self.style_type,
            based_on: self.based_on,
        })
    }
}

// ============================================================================
// Style roles
// ============================================================================

/// What a paragraph, run or table is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum StyleRole {
    // Paragraph roles
    Normal,
    Title,
    Subtitle,
    /// Heading level 1-9
    Heading(u8),
    DefinitionTerm,
    LiteralBlock,
    DoctestBlock,
    LineBlock,
    BlockQuote,
    Transition,
    Caption,
    CodeBlockCaption,

    // Character roles
    DefaultFont,
    Strong,
    Emphasis,
    Literal,
    LiteralEmphasis,
    Subscript,
    Superscript,
    TitleReference,
    Hyperlink,
    FootnoteReference,

    // Table roles
    Table,
    TableWithHeader,
}

impl StyleRole {
    /// Every role, headings 1-9 included
    pub fn all() -> Vec<StyleRole> {
        let mut roles = vec![StyleRole::Normal, StyleRole::Title, StyleRole::Subtitle];
        roles.extend((1..=9).map(StyleRole::Heading));
        roles.extend([
            StyleRole::DefinitionTerm,
            StyleRole::LiteralBlock,
            StyleRole::DoctestBlock,
            StyleRole::LineBlock,
            StyleRole::BlockQuote,
            StyleRole::Transition,
            StyleRole::Caption,
            StyleRole::CodeBlockCaption,
            StyleRole::DefaultFont,
            StyleRole::Strong,
            StyleRole::Emphasis,
            StyleRole::Literal,
            StyleRole::LiteralEmphasis,
            StyleRole::Subscript,
            StyleRole::Superscript,
            StyleRole::TitleReference,
            StyleRole::Hyperlink,
            StyleRole::FootnoteReference,
            StyleRole::Table,
            StyleRole::TableWithHeader,
        ]);
        roles
    }

    pub fn style_type(&self) -> StyleType {
        match self {
            StyleRole::DefaultFont
            | StyleRole::Strong
            | StyleRole::Emphasis
            | StyleRole::Literal
            | StyleRole::LiteralEmphasis
            | StyleRole::Subscript
            | StyleRole::Superscript
            | StyleRole::TitleReference
            | StyleRole::Hyperlink
            | StyleRole::FootnoteReference => StyleType::Character,
            StyleRole::Table | StyleRole::TableWithHeader => StyleType::Table,
            _ => StyleType::Paragraph,
        }
    }

    /// Style name looked up in the template
    pub fn style_name(&self) -> Cow<'static, str> {
        let name = match self {
            StyleRole::Normal => "Normal",
            StyleRole::Title => "Title",
            StyleRole::Subtitle => "Subtitle",
            StyleRole::Heading(level) => return Cow::Owned(format!("heading {}", level)),
            StyleRole::DefinitionTerm => "Definition Term",
            StyleRole::LiteralBlock => "Literal Block",
            StyleRole::DoctestBlock => "Doctest Block",
            StyleRole::LineBlock => "Line Block",
            StyleRole::BlockQuote => "Quote",
            StyleRole::Transition => "Horizontal Line",
            StyleRole::Caption => "Caption",
            StyleRole::CodeBlockCaption => "Code Block Caption",
            StyleRole::DefaultFont => "Default Paragraph Font",
            StyleRole::Strong => "Strong",
            StyleRole::Emphasis => "Emphasis",
            StyleRole::Literal => "Literal",
            StyleRole::LiteralEmphasis => "Literal Emphasis",
            StyleRole::Subscript => "Subscript",
            StyleRole::Superscript => "Superscript",
            StyleRole::TitleReference => "Book Title",
            StyleRole::Hyperlink => "Hyperlink",
            StyleRole::FootnoteReference => "footnote reference",
            StyleRole::Table => "Table Grid",
            StyleRole::TableWithHeader => "Table Grid Header",
        };
        Cow::Borrowed(name)
    }

    /// Roles whose absence makes a template unusable
    pub fn is_required(&self) -> bool {
        match self {
            StyleRole::Normal | StyleRole::Title => true,
            StyleRole::Heading(level) => (1..=6).contains(level),
            _ => false,
        }
    }

    /// Heading role for a level; 0 is the document title
    pub fn heading(level: u8) -> StyleRole {
        match level {
            0 => StyleRole::Title,
            l => StyleRole::Heading(l.min(9)),
        }
    }
}

/// Style ids for every role, resolved against one template
#[derive(Debug, Clone, Default)]
pub struct ResolvedStyles {
    ids: HashMap<StyleRole, Option<String>>,
    fallbacks: Vec<StyleRole>,
}

impl ResolvedStyles {
    /// Resolve every role against a stylesheet
    pub fn resolve(sheet: &StyleSheet) -> Result<Self> {
        let missing: Vec<String> = StyleRole::all()
            .into_iter()
            .filter(|role| role.is_required())
            .filter(|role| sheet.find(&role.style_name(), role.style_type()).is_none())
            .map(|role| role.style_name().into_owned())
            .collect();
        if !missing.is_empty() {
            return Err(OoxmlError::MissingStyles(missing));
        }

        let normal = sheet
            .find("Normal", StyleType::Paragraph)
            .map(|s| s.id.clone());
        let default_font = sheet
            .find("Default Paragraph Font", StyleType::Character)
            .map(|s| s.id.clone())
            .or_else(|| sheet.default_character.clone());

        let mut resolved = ResolvedStyles::default();
        for role in StyleRole::all() {
            let name = role.style_name();
            let id = match sheet.find(&name, role.style_type()) {
                Some(style) => Some(style.id.clone()),
                None => {
                    let fallback = match role.style_type() {
                        StyleType::Character => default_font.clone(),
                        StyleType::Table | StyleType::Numbering => None,
                        StyleType::Paragraph => normal.clone(),
                    };
                    tracing::warn!(
                        style = %name,
                        fallback = fallback.as_deref().unwrap_or("none"),
                        "style not found in template, using fallback"
                    );
                    resolved.fallbacks.push(role);
                    fallback
                }
            };
            resolved.ids.insert(role, id);
        }
        Ok(resolved)
    }

    /// Style id for a role, if the template has one
    pub fn id(&self, role: StyleRole) -> Option<&str> {
        let role = match role {
            StyleRole::Heading(level) => StyleRole::heading(level),
            other => other,
        };
        self.ids.get(&role).and_then(|id| id.as_deref())
    }

    /// Roles that had to fall back
    pub fn fallbacks(&self) -> &[StyleRole] {
        &self.fallbacks
    }
}
