//! Document tree nodes
//!
//! A [`Node`] is a kind tag, a map of kind-specific attributes, an ordered
//! list of owned children and, for text nodes, the literal text. Trees are
//! finite and acyclic by construction (parents own their children).
//!
//! # Example
//!
//! ```
//! use treedocx_ast::{Node, NodeKind};
//!
//! let para = Node::new(NodeKind::Paragraph)
//!     .with_child(Node::text("Hello "))
//!     .with_child(Node::new(NodeKind::Strong).with_child(Node::text("world")));
//!
//! assert_eq!(para.astext(), "Hello world");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;

/// Attribute value attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl AttrValue {
    /// Integer view; booleans count as 0/1 and numeric strings are parsed
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Bool(b) => Some(i64::from(*b)),
            AttrValue::Int(i) => Some(*i),
            AttrValue::Float(f) => Some(*f as i64),
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// A node in a document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Kind tag
    pub kind: NodeKind,
    /// Kind-specific attributes (ids, classes, uri, morerows, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
    /// Children in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Literal text (text nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create an empty node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(AttrValue::as_str)
    }

    pub fn attr_int(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(AttrValue::as_int)
    }

    /// List attribute; a plain string is treated as a one-element list
    pub fn attr_list(&self, key: &str) -> Vec<&str> {
        match self.attr(key) {
            Some(AttrValue::List(items)) => items.iter().map(String::as_str).collect(),
            Some(AttrValue::Str(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.attr_list("ids")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_list("classes").contains(&class)
    }

    pub fn is(&self, kind: &NodeKind) -> bool {
        &self.kind == kind
    }

    /// First child of the given kind
    pub fn child(&self, kind: &NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.is(kind))
    }

    /// Concatenated text of this subtree
    pub fn astext(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Pre-order traversal of this subtree (including `self`)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Apply `f` to every node of this subtree in pre-order
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

/// Iterator returned by [`Node::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse a doctree `align` attribute value
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" | "centre" | "middle" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    /// OOXML `w:jc` value
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}
