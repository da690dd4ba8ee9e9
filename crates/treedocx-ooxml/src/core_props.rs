//! Core document properties (docProps/core.xml)
//!
//! The template's part is scanned with quick-xml to locate each element; its
//! content is replaced in place, keeping the element's own attributes. A
//! missing element is inserted before the closing root tag.

use std::collections::BTreeMap;
use std::ops::Range;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::escape_xml;

const ROOT: &str = "cp:coreProperties";

const EMPTY_CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"></cp:coreProperties>"#;

/// Configuration key to qualified element name
pub fn element_for(key: &str) -> Option<&'static str> {
    Some(match key {
        "title" => "dc:title",
        "author" | "creator" => "dc:creator",
        "subject" => "dc:subject",
        "keywords" => "cp:keywords",
        "description" | "comments" => "dc:description",
        "category" => "cp:category",
        "language" => "dc:language",
        "revision" => "cp:revision",
        "last_modified_by" => "cp:lastModifiedBy",
        "content_status" => "cp:contentStatus",
        _ => return None,
    })
}

/// Apply `properties` to a core properties part (or a fresh one)
///
/// Unknown keys are skipped with a warning.
pub fn apply(core_xml: Option<&str>, properties: &BTreeMap<String, String>) -> Result<String> {
    let mut xml = core_xml.unwrap_or(EMPTY_CORE).to_string();
    for (key, value) in properties {
        match element_for(key) {
            Some(element) => xml = set_element(&xml, element, value)?,
            None => tracing::warn!(property = %key, "unknown core property ignored"),
        }
    }
    Ok(xml)
}

/// Where an element sits in the part
enum Found {
    /// `<name ...>content</name>`: byte range of the content
    Content(Range<usize>),
    /// `<name .../>`: byte range of the whole tag
    Empty(Range<usize>),
}

/// First occurrence of `element` and the start of the root's closing tag
/// (or the range of a self-closing root)
struct Located {
    element: Option<Found>,
    root_close: Option<usize>,
    root_empty: Option<Range<usize>>,
}

fn locate(xml: &str, element: &str) -> Result<Located> {
    let mut reader = Reader::from_str(xml);
    let mut located = Located {
        element: None,
        root_close: None,
        root_empty: None,
    };

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e))
                if located.element.is_none() && e.name().as_ref() == element.as_bytes() =>
            {
                let end = e.to_end().into_owned();
                let span = reader.read_to_end(end.name())?;
                located.element = Some(Found::Content(span.start as usize..span.end as usize));
            }
            Ok(Event::Empty(e)) => {
                let after = reader.buffer_position() as usize;
                if e.name().as_ref() == ROOT.as_bytes() {
                    located.root_empty = Some(before..after);
                } else if located.element.is_none() && e.name().as_ref() == element.as_bytes() {
                    located.element = Some(Found::Empty(before..after));
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == ROOT.as_bytes() => {
                located.root_close = Some(before);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
    }
    Ok(located)
}

/// Replace the content of `element` or insert it
fn set_element(xml: &str, element: &str, value: &str) -> Result<String> {
    let value = escape_xml(value);
    let located = locate(xml, element)?;

    let patched = match (located.element, located.root_close, located.root_empty) {
        (Some(Found::Content(content)), _, _) => {
            format!("{}{}{}", &xml[..content.start], value, &xml[content.end..])
        }
        (Some(Found::Empty(tag)), _, _) => {
            let open = open_tag(&xml[tag.clone()]);
            format!(
                "{}{}>{}</{}>{}",
                &xml[..tag.start],
                open,
                value,
                element,
                &xml[tag.end..]
            )
        }
        (None, Some(close), _) => format!(
            "{}<{}>{}</{}>{}",
            &xml[..close],
            element,
            value,
            element,
            &xml[close..]
        ),
        (None, None, Some(root)) => {
            let open = open_tag(&xml[root.clone()]);
            format!(
                "{}{}><{}>{}</{}></{}>{}",
                &xml[..root.start],
                open,
                element,
                value,
                element,
                ROOT,
                &xml[root.end..]
            )
        }
        (None, None, None) => {
            return Err(OoxmlError::InvalidStructure(format!(
                "core properties part has no {} root",
                ROOT
            )))
        }
    };
    Ok(patched)
}

/// `<name attrs/>` without its `/>`
fn open_tag(empty_tag: &str) -> &str {
    empty_tag
        .strip_suffix("/>")
        .unwrap_or(empty_tag)
        .trim_end()
}
