//! treedocx-ast - Document tree definitions
//!
//! This crate provides the node tree consumed by treedocx: the output of a
//! documentation toolchain's parser, serialized as JSON doctrees.

pub mod kind;
pub mod node;

pub use kind::NodeKind;
pub use node::{Alignment, AttrValue, Descendants, Node};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
