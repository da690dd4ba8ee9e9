//! treedocx-core - doctree assembly for treedocx
//!
//! Loads document trees, inlines sub-documents into one tree per output
//! document, and carries the configuration and figure numbers the
//! translator needs.
//!
//! # Example
//!
//! ```
//! use treedocx_ast::{Node, NodeKind};
//! use treedocx_core::{Assembler, Config, MemoryStore};
//!
//! let store = MemoryStore::new().with_tree(
//!     "index",
//!     Node::new(NodeKind::Document).with_child(Node::new(NodeKind::Section)),
//! );
//! let config = Config::default();
//!
//! let assembly = Assembler::new(&store).assemble(&config.master_doc)?;
//! assert_eq!(assembly.docnames, vec!["index"]);
//! # Ok::<(), treedocx_core::CoreError>(())
//! ```

pub mod assemble;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fignum;
pub mod source;

pub use assemble::{fix_refuris, Assembler, Assembly, DOCNAME_ATTR};
pub use config::{Config, OutputDocument, SectionNumbering, CONFIG_FILE_NAME};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, Result};
pub use fignum::{format_prefix, FigureNumbers, TocFigureNumbers};
pub use source::{DoctreeSource, JsonDoctreeStore, MemoryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
