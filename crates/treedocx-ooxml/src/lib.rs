//! # treedocx-ooxml
//!
//! Word (DOCX) output for treedocx.
//!
//! This crate provides:
//! - A handle-based document model ([`DocumentModel`]) with a template-backed
//!   DOCX implementation and an in-memory one
//! - The doctree translator that drives the model
//! - The batch builder that assembles, translates and writes every
//!   configured output document
//!
//! ## Example: Translating a Tree
//!
//! ```
//! use std::path::Path;
//!
//! use treedocx_ast::{Node, NodeKind};
//! use treedocx_core::{Config, FigureNumbers};
//! use treedocx_ooxml::{translate, DocumentModel, DocxDocument};
//!
//! let tree = Node::new(NodeKind::Document).with_child(
//!     Node::new(NodeKind::Paragraph).with_child(Node::text("Hello, world")),
//! );
//!
//! let mut doc = DocxDocument::builtin()?;
//! translate(&tree, &mut doc, &FigureNumbers::new(), &Config::default(), Path::new("."))?;
//! assert!(!doc.journal().is_empty());
//!
//! let bytes = doc.to_bytes()?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), treedocx_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod builder;
pub mod core_props;
pub mod error;
pub mod image;
pub mod model;
pub mod numbering;
pub mod relationships;
pub mod styles;
pub mod template;
pub mod translator;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::OoxmlArchive;
pub use builder::{BuildReport, DocxBuilder, DryRun};
pub use error::{OoxmlError, Result};
pub use model::{
    BodyArena, Container, DocumentModel, DocxDocument, MemoryDocument, Mutation, ParagraphId,
    RunId, TableId,
};
pub use numbering::{NumId, NumberingTemplate};
pub use relationships::Relationships;
pub use styles::{ResolvedStyles, StyleRole, StyleSheet, StyleType};
pub use template::Template;
pub use translator::{translate, TranslationContext, Translator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
