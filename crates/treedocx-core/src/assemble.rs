//! Tree assembly
//!
//! Inlines every document reachable through `toctree` markers into a single
//! tree. Each inlined document is wrapped in a `start_of_file` node carrying
//! its `docname`, so per-document lookups (figure numbers) still work after
//! the merge. A document is inlined at most once per assembly; repeated or
//! unloadable references are reported as warnings and dropped.
//!
//! # Example
//!
//! ```
//! use treedocx_ast::{Node, NodeKind};
//! use treedocx_core::assemble::Assembler;
//! use treedocx_core::source::MemoryStore;
//!
//! let store = MemoryStore::new()
//!     .with_tree("index", Node::new(NodeKind::Document).with_child(
//!         Node::new(NodeKind::Toctree).with_attr("includefiles", vec!["intro"]),
//!     ))
//!     .with_tree("intro", Node::new(NodeKind::Document).with_child(
//!         Node::new(NodeKind::Paragraph).with_child(Node::text("Hi")),
//!     ));
//!
//! let assembly = Assembler::new(&store).assemble("index")?;
//! assert_eq!(assembly.tree.children[0].kind, NodeKind::SubDocument);
//! assert!(assembly.diagnostics.is_empty());
//! # Ok::<(), treedocx_core::CoreError>(())
//! ```

use treedocx_ast::{Node, NodeKind};

use crate::diagnostics::{
    Diagnostic, Diagnostics, CODE_ALREADY_INCLUDED, CODE_MISSING_INCLUSION,
};
use crate::error::Result;
use crate::source::DoctreeSource;

/// Attribute naming the document a subtree came from
pub const DOCNAME_ATTR: &str = "docname";

/// Result of assembling one output document
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Merged tree, rooted at the start document
    pub tree: Node,
    /// Skipped inclusions
    pub diagnostics: Diagnostics,
    /// Documents inlined, in visit order (start document first)
    pub docnames: Vec<String>,
}

/// Inlines sub-documents into one tree
pub struct Assembler<'a, S: DoctreeSource + ?Sized> {
    source: &'a S,
    merged_target: String,
    visited: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'a, S: DoctreeSource + ?Sized> Assembler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            merged_target: "index.docx".to_string(),
            visited: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// File name cross-document references are rewritten to
    pub fn with_merged_target(mut self, target: impl Into<String>) -> Self {
        self.merged_target = target.into();
        self
    }

    /// Assemble the tree rooted at `root`
    ///
    /// Failing to load the root itself is an error; everything below it is
    /// recoverable.
    pub fn assemble(mut self, root: &str) -> Result<Assembly> {
        tracing::info!(root, "assembling single document");
        let mut tree = self.source.fetch_tree(root)?;
        self.visited.push(root.to_string());
        tree.set_attr(DOCNAME_ATTR, root);

        self.inline_includes(root, &mut tree);
        fix_refuris(&mut tree, &self.merged_target);

        Ok(Assembly {
            tree,
            diagnostics: self.diagnostics,
            docnames: self.visited,
        })
    }

    /// Inclusion order reachable from `root`, without building the tree
    pub fn plan(&self, root: &str) -> Result<Vec<String>> {
        let mut order = vec![root.to_string()];
        self.plan_into(root, &mut order)?;
        Ok(order)
    }

    fn plan_into(&self, docname: &str, order: &mut Vec<String>) -> Result<()> {
        for include in self.source.fetch_includes(docname)? {
            if order.contains(&include) {
                continue;
            }
            order.push(include.clone());
            // Unloadable documents are left out of the recursion only
            if self.source.fetch_tree(&include).is_ok() {
                self.plan_into(&include, order)?;
            }
        }
        Ok(())
    }

    fn inline_includes(&mut self, docname: &str, node: &mut Node) {
        let children = std::mem::take(&mut node.children);
        let mut numbered = None;

        for mut child in children {
            if child.is(&NodeKind::Toctree) {
                for include in child.attr_list("includefiles") {
                    if let Some(sub) = self.inline_document(docname, include) {
                        node.children.push(sub);
                    }
                }
                numbered = Some(child.attr_int("numbered").unwrap_or(0));
            } else {
                self.inline_includes(docname, &mut child);
                node.children.push(child);
            }
        }

        // The wrapper around a toctree decides whether sections get numbers
        if let Some(numbered) = numbered {
            node.set_attr("numbered", numbered);
        }
    }

    fn inline_document(&mut self, parent: &str, include: &str) -> Option<Node> {
        if self.visited.iter().any(|v| v == include) {
            self.diagnostics.push(
                Diagnostic::warning(format!(
                    "toctree references an already included document: {}",
                    include
                ))
                .with_code(CODE_ALREADY_INCLUDED)
                .with_file(parent),
            );
            return None;
        }
        self.visited.push(include.to_string());

        let mut tree = match self.source.fetch_tree(include) {
            Ok(tree) => tree,
            Err(e) => {
                self.diagnostics.push(
                    Diagnostic::warning(format!(
                        "toctree references a document that cannot be loaded: {}",
                        include
                    ))
                    .with_code(CODE_MISSING_INCLUSION)
                    .with_file(parent)
                    .with_note(e.to_string()),
                );
                return None;
            }
        };

        tracing::debug!(parent, include, "inlining document");
        self.inline_includes(include, &mut tree);

        let mut boundary = Node::new(NodeKind::SubDocument).with_attr(DOCNAME_ATTR, include);
        boundary.children = tree.children;
        for child in &mut boundary.children {
            child.for_each_mut(&mut |node| {
                if node.is(&NodeKind::Section) && !node.has_attr(DOCNAME_ATTR) {
                    node.set_attr(DOCNAME_ATTR, include);
                }
            });
        }
        Some(boundary)
    }
}

/// Point `doc#fragment#subfragment` references at the merged output
pub fn fix_refuris(tree: &mut Node, merged_target: &str) {
    tree.for_each_mut(&mut |node| {
        if !node.is(&NodeKind::Reference) {
            return;
        }
        let rewritten = node
            .attr_str("refuri")
            .and_then(|uri| rewrite_refuri(uri, merged_target));
        if let Some(uri) = rewritten {
            node.set_attr("refuri", uri);
        }
    });
}

fn rewrite_refuri(uri: &str, merged_target: &str) -> Option<String> {
    let first = uri.find('#')?;
    let second = first + 1 + uri[first + 1..].find('#')?;
    Some(format!("{}{}", merged_target, &uri[second..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryStore;

    fn doc(children: Vec<Node>) -> Node {
        Node::new(NodeKind::Document).with_children(children)
    }

    fn toctree(includes: &[&str]) -> Node {
        Node::new(NodeKind::Toctree).with_attr("includefiles", includes.to_vec())
    }

    fn para(text: &str) -> Node {
        Node::new(NodeKind::Paragraph).with_child(Node::text(text))
    }

    #[test]
    fn test_rewrite_refuri() {
        assert_eq!(
            rewrite_refuri("guide#guide#install", "index.docx").as_deref(),
            Some("index.docx#install")
        );
        assert_eq!(rewrite_refuri("guide#install", "index.docx"), None);
        assert_eq!(rewrite_refuri("https://example.com", "index.docx"), None);
    }

    #[test]
    fn test_fix_refuris_only_touches_references() {
        let mut tree = doc(vec![
            Node::new(NodeKind::Reference).with_attr("refuri", "a#a#x"),
            Node::new(NodeKind::Target).with_attr("refuri", "a#a#x"),
        ]);
        fix_refuris(&mut tree, "out.docx");
        assert_eq!(tree.children[0].attr_str("refuri"), Some("out.docx#x"));
        assert_eq!(tree.children[1].attr_str("refuri"), Some("a#a#x"));
    }

    #[test]
    fn test_sections_tagged_with_origin() {
        let store = MemoryStore::new()
            .with_tree("index", doc(vec![toctree(&["ch1"])]))
            .with_tree(
                "ch1",
                doc(vec![Node::new(NodeKind::Section)
                    .with_child(Node::new(NodeKind::Section))]),
            );

        let assembly = Assembler::new(&store).assemble("index").unwrap();
        let boundary = &assembly.tree.children[0];
        assert_eq!(boundary.attr_str(DOCNAME_ATTR), Some("ch1"));
        let outer = &boundary.children[0];
        assert_eq!(outer.attr_str(DOCNAME_ATTR), Some("ch1"));
        assert_eq!(outer.children[0].attr_str(DOCNAME_ATTR), Some("ch1"));
    }

    #[test]
    fn test_nested_inclusion_keeps_inner_origin() {
        let store = MemoryStore::new()
            .with_tree("index", doc(vec![toctree(&["a"])]))
            .with_tree(
                "a",
                doc(vec![Node::new(NodeKind::Section).with_child(toctree(&["b"]))]),
            )
            .with_tree("b", doc(vec![Node::new(NodeKind::Section)]));

        let assembly = Assembler::new(&store).assemble("index").unwrap();
        let section_a = &assembly.tree.children[0].children[0];
        let boundary_b = &section_a.children[0];
        assert_eq!(boundary_b.kind, NodeKind::SubDocument);
        assert_eq!(boundary_b.children[0].attr_str(DOCNAME_ATTR), Some("b"));
        assert_eq!(section_a.attr_str(DOCNAME_ATTR), Some("a"));
        assert_eq!(assembly.docnames, vec!["index", "a", "b"]);
    }

    #[test]
    fn test_toctree_parent_gets_numbered() {
        let store = MemoryStore::new()
            .with_tree(
                "index",
                doc(vec![Node::new(NodeKind::Compound)
                    .with_attr("classes", vec!["toctree-wrapper"])
                    .with_child(toctree(&["a"]).with_attr("numbered", 3_i64))]),
            )
            .with_tree("a", doc(vec![para("A")]));

        let assembly = Assembler::new(&store).assemble("index").unwrap();
        let compound = &assembly.tree.children[0];
        assert_eq!(compound.attr_int("numbered"), Some(3));
        assert_eq!(compound.children.len(), 1);
        assert_eq!(compound.children[0].kind, NodeKind::SubDocument);
    }

    #[test]
    fn test_missing_inclusion_is_skipped() {
        let store = MemoryStore::new().with_tree("index", doc(vec![toctree(&["ghost"]), para("x")]));

        let assembly = Assembler::new(&store).assemble("index").unwrap();
        assert_eq!(assembly.tree.children.len(), 1);
        assert_eq!(assembly.diagnostics.count_code(CODE_MISSING_INCLUSION), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let store = MemoryStore::new();
        assert!(Assembler::new(&store).assemble("index").is_err());
    }

    #[test]
    fn test_plan_follows_includes_once() {
        let store = MemoryStore::new()
            .with_tree("index", doc(vec![toctree(&["a", "b"])]))
            .with_tree("a", doc(vec![toctree(&["b"])]))
            .with_tree("b", doc(vec![toctree(&["index"])]));

        let assembler = Assembler::new(&store);
        assert_eq!(assembler.plan("index").unwrap(), vec!["index", "a", "b"]);
    }
}
