//! Doctree sources
//!
//! A [`DoctreeSource`] hands out the parsed tree of a document by name. The
//! assembler only needs this one capability; where the trees come from (a
//! directory of JSON doctrees, memory, a toolchain environment) is up to the
//! implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use treedocx_ast::{Node, NodeKind};

use crate::error::{CoreError, Result};
use crate::fignum::FigureNumbers;

/// File holding the per-document figure numbers in a doctree directory
pub const FIGURE_NUMBERS_FILE: &str = "fignumbers.json";

/// Provider of document trees
pub trait DoctreeSource {
    /// Parsed tree of a document
    fn fetch_tree(&self, docname: &str) -> Result<Node>;

    /// Documents included by `docname`, in document order
    ///
    /// The default collects the `includefiles` of every `toctree` node.
    fn fetch_includes(&self, docname: &str) -> Result<Vec<String>> {
        let tree = self.fetch_tree(docname)?;
        Ok(toctree_includes(&tree))
    }

    /// Figure numbers of all documents
    fn figure_numbers(&self) -> Result<FigureNumbers> {
        Ok(FigureNumbers::new())
    }
}

/// `includefiles` of every `toctree` node in `tree`, in document order
pub fn toctree_includes(tree: &Node) -> Vec<String> {
    tree.descendants()
        .filter(|node| node.is(&NodeKind::Toctree))
        .flat_map(|node| node.attr_list("includefiles"))
        .map(str::to_string)
        .collect()
}

/// Directory of `<docname>.json` doctrees
///
/// Document names may contain `/` and map onto subdirectories.
#[derive(Debug, Clone)]
pub struct JsonDoctreeStore {
    root: PathBuf,
}

impl JsonDoctreeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the doctree file for a document
    pub fn doctree_path(&self, docname: &str) -> PathBuf {
        self.root.join(format!("{}.json", docname))
    }
}

impl DoctreeSource for JsonDoctreeStore {
    fn fetch_tree(&self, docname: &str) -> Result<Node> {
        let path = self.doctree_path(docname);
        if !path.is_file() {
            return Err(CoreError::DocumentNotFound(docname.to_string()));
        }
        let content = fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
        tracing::debug!(docname, path = %path.display(), "loaded doctree");
        serde_json::from_str(&content).map_err(|e| CoreError::json(&path, e))
    }

    fn figure_numbers(&self) -> Result<FigureNumbers> {
        let path = self.root.join(FIGURE_NUMBERS_FILE);
        if path.is_file() {
            FigureNumbers::load(path)
        } else {
            Ok(FigureNumbers::new())
        }
    }
}

/// In-memory doctree source
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trees: BTreeMap<String, Node>,
    figures: FigureNumbers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, docname: impl Into<String>, tree: Node) {
        self.trees.insert(docname.into(), tree);
    }

    pub fn with_tree(mut self, docname: impl Into<String>, tree: Node) -> Self {
        self.insert(docname, tree);
        self
    }

    pub fn with_figure_numbers(mut self, figures: FigureNumbers) -> Self {
        self.figures = figures;
        self
    }
}

impl DoctreeSource for MemoryStore {
    fn fetch_tree(&self, docname: &str) -> Result<Node> {
        self.trees
            .get(docname)
            .cloned()
            .ok_or_else(|| CoreError::DocumentNotFound(docname.to_string()))
    }

    fn figure_numbers(&self) -> Result<FigureNumbers> {
        Ok(self.figures.clone())
    }
}
