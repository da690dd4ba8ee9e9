//! Doctree to document-model translation
//!
//! A single depth-first walk over the assembled tree. Every node kind has an
//! enter and an exit action; terminal kinds do all their work on enter and
//! their children are never visited. Kinds without a translation stop the
//! walk with [`OoxmlError::UnimplementedNode`].
//!
//! After each subtree the walker compares the context's stack depths with
//! the depths it recorded on entry; a mismatch is reported as
//! [`OoxmlError::UnbalancedState`]. On any error the stacks are unwound to
//! their entry depth before the error propagates.

mod blocks;
pub mod context;
mod inline;
mod tables;

use std::path::{Path, PathBuf};

use treedocx_ast::{Node, NodeKind};
use treedocx_core::{Config, FigureNumbers, DOCNAME_ATTR};

use crate::error::{OoxmlError, Result};
use crate::model::{DocumentModel, ParagraphId};
use crate::numbering::NumberingTemplate;
use crate::styles::StyleRole;

pub use context::{ContextMark, TableFrame, TranslationContext};

/// Whether a node's children are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Descend,
    Skip,
}

/// Translate `tree` into `model`
///
/// Picture paths are resolved against `source_root`.
pub fn translate<M: DocumentModel + ?Sized>(
    tree: &Node,
    model: &mut M,
    figures: &FigureNumbers,
    config: &Config,
    source_root: &Path,
) -> Result<()> {
    Translator::new(model, figures, config, source_root, tree).translate(tree)
}

/// Visitor state for one output document
pub struct Translator<'a, M: DocumentModel + ?Sized> {
    model: &'a mut M,
    figures: &'a FigureNumbers,
    config: &'a Config,
    source_root: PathBuf,
    ctx: TranslationContext,
}

impl<'a, M: DocumentModel + ?Sized> Translator<'a, M> {
    pub fn new(
        model: &'a mut M,
        figures: &'a FigureNumbers,
        config: &'a Config,
        source_root: impl Into<PathBuf>,
        tree: &Node,
    ) -> Self {
        let docname = tree
            .attr_str(DOCNAME_ATTR)
            .unwrap_or(&config.master_doc)
            .to_string();
        let base = model.allocate_numbering(NumberingTemplate::Section);
        let mut ctx = TranslationContext::new(docname, base);
        if let Some(numbering) = &config.section_numbering {
            ctx = ctx.with_section_numbering(numbering);
        }
        Self {
            model,
            figures,
            config,
            source_root: source_root.into(),
            ctx,
        }
    }

    /// Walk the whole tree
    pub fn translate(mut self, tree: &Node) -> Result<()> {
        tracing::debug!(docname = self.ctx.docname(), "translating");
        self.walk(tree, None, 0)
    }

    /// Current state, for inspection
    pub fn context(&self) -> &TranslationContext {
        &self.ctx
    }

    fn walk(&mut self, node: &Node, parent: Option<&Node>, index: usize) -> Result<()> {
        let mark = self.ctx.mark();
        if let Err(e) = self.visit(node, parent, index) {
            self.ctx.unwind(&mark);
            return Err(e);
        }
        let after = self.ctx.mark();
        if after != mark {
            let detail = mark.diff(&after);
            self.ctx.unwind(&mark);
            return Err(OoxmlError::UnbalancedState {
                kind: node.kind.to_string(),
                detail,
            });
        }
        Ok(())
    }

    fn visit(&mut self, node: &Node, parent: Option<&Node>, index: usize) -> Result<()> {
        tracing::trace!(kind = %node.kind, "enter");
        if self.enter(node, parent, index)? == Flow::Skip {
            return Ok(());
        }
        for (i, child) in node.children.iter().enumerate() {
            self.walk(child, Some(node), i)?;
        }
        self.exit(node)
    }

    fn enter(&mut self, node: &Node, parent: Option<&Node>, index: usize) -> Result<Flow> {
        use NodeKind as K;

        match &node.kind {
            // Structure
            K::Document => Ok(Flow::Descend),
            K::SubDocument => {
                let docname = node.attr_str(DOCNAME_ATTR).unwrap_or_default();
                self.ctx.push_docname(docname);
                Ok(Flow::Descend)
            }
            K::Section => self.enter_section(),
            K::Title => self.enter_title(node, parent),
            K::Compound => self.enter_compound(node),
            K::Subtitle
            | K::Attribution
            | K::Topic
            | K::Sidebar
            | K::Rubric
            | K::Glossary
            | K::Centered
            | K::Hlist
            | K::Hlistcol
            | K::VersionModified
            | K::Container
            | K::Legend => Ok(Flow::Descend),
            kind if kind.is_admonition() => Ok(Flow::Descend),
            K::Transition => self.enter_transition(),

            // API descriptions
            K::Desc
            | K::DescSignatureLine
            | K::DescAddname
            | K::DescType
            | K::DescReturns
            | K::DescOptional
            | K::DescAnnotation => Ok(Flow::Descend),
            K::DescSignature => {
                self.ctx.paragraph = Some(self.new_paragraph("", None)?);
                Ok(Flow::Descend)
            }
            K::DescName => {
                if let Some(p) = self.ctx.paragraph {
                    self.ctx.run = Some(self.model.add_run(p, "", None)?);
                }
                self.ctx.push_run_style(StyleRole::Strong);
                Ok(Flow::Descend)
            }
            K::DescParameterlist => self.enter_parameter_list(node),
            K::DescContent => {
                self.ctx.indent += 1;
                self.ctx.paragraph = Some(self.new_paragraph("", None)?);
                Ok(Flow::Descend)
            }

            // Paragraph-level blocks
            K::Paragraph => self.enter_paragraph(parent),
            K::CompactParagraph => Ok(Flow::Descend),
            K::LiteralBlock => self.enter_styled_block(StyleRole::LiteralBlock),
            K::DoctestBlock => self.enter_styled_block(StyleRole::DoctestBlock),
            K::LineBlock => {
                self.ctx.push_paragraph_style(StyleRole::LineBlock);
                Ok(Flow::Descend)
            }
            K::Line => {
                let style = self.ctx.paragraph_style();
                self.ctx.paragraph = Some(self.new_paragraph("", style)?);
                Ok(Flow::Descend)
            }
            K::BlockQuote => {
                self.ctx.push_paragraph_style(StyleRole::BlockQuote);
                self.ctx.indent += 1;
                Ok(Flow::Descend)
            }

            // Lists
            K::BulletList => self.enter_list(NumberingTemplate::Bullet),
            K::EnumeratedList => self.enter_list(NumberingTemplate::Enumerated),
            K::ListItem => {
                self.ctx.first_in_list_item = true;
                Ok(Flow::Descend)
            }
            K::DefinitionList | K::DefinitionListItem | K::Classifier => Ok(Flow::Descend),
            K::Term => {
                self.ctx.push_paragraph_style(StyleRole::DefinitionTerm);
                self.ctx.paragraph = Some(self.new_paragraph("", Some(StyleRole::DefinitionTerm))?);
                Ok(Flow::Descend)
            }
            K::Definition => {
                self.ctx.indent += 1;
                Ok(Flow::Descend)
            }

            // Tables, field lists, option lists
            K::Table => {
                self.separate_tables(parent, index)?;
                Ok(Flow::Descend)
            }
            K::Tgroup => self.enter_tgroup(node, parent),
            K::Thead | K::Tbody | K::Row | K::Field | K::OptionListItem => Ok(Flow::Descend),
            K::FieldList | K::OptionList => self.enter_item_table(node, parent, index),
            K::Entry | K::FieldName | K::FieldBody | K::OptionGroup | K::Description => {
                self.enter_cell(node)
            }
            K::Option | K::OptionString | K::OptionArgument => Ok(Flow::Descend),

            // Figures and notes
            K::Figure => self.enter_figure(),
            K::Caption => self.enter_caption(parent),
            K::Image => self.enter_image(node, parent),
            K::Footnote | K::Citation => self.enter_note(node),

            // Inline markup
            K::Text => self.enter_text(node, parent),
            K::Emphasis => self.enter_inline_style(StyleRole::Emphasis),
            K::Strong => self.enter_inline_style(StyleRole::Strong),
            K::Literal => self.enter_inline_style(StyleRole::Literal),
            K::LiteralEmphasis | K::Manpage => self.enter_inline_style(StyleRole::LiteralEmphasis),
            K::Subscript => self.enter_inline_style(StyleRole::Subscript),
            K::Superscript => self.enter_inline_style(StyleRole::Superscript),
            K::TitleReference => self.enter_inline_style(StyleRole::TitleReference),
            K::Reference => self.enter_inline_style(StyleRole::Hyperlink),
            K::LiteralStrong
            | K::Abbreviation
            | K::Inline
            | K::Generated
            | K::Problematic
            | K::PendingXref
            | K::DownloadReference => Ok(Flow::Descend),
            K::FootnoteReference | K::CitationReference | K::NumberReference => {
                self.enter_bracketed_reference(node)
            }

            // Math
            K::Math => self.enter_math(node),
            K::MathBlock | K::DisplayMath => self.enter_math_block(node, parent, index),

            // Terminal markers
            K::Highlightlang
            | K::Productionlist
            | K::Label
            | K::TabularColSpec
            | K::Colspec
            | K::Acks
            | K::Target
            | K::Index
            | K::Toctree
            | K::SubstitutionDefinition
            | K::SystemMessage
            | K::Comment
            | K::Meta
            | K::Raw
            | K::DescParameter => Ok(Flow::Skip),

            K::Unrecognized(name) => Err(OoxmlError::UnimplementedNode(name.clone())),
            // every other known kind is an admonition, matched above
            other => Err(OoxmlError::UnimplementedNode(other.to_string())),
        }
    }

    fn exit(&mut self, node: &Node) -> Result<()> {
        use NodeKind as K;

        match &node.kind {
            K::SubDocument => {
                self.ctx.pop_docname()?;
            }
            K::Section => {
                self.ctx.pop_section()?;
            }
            K::Title | K::DescSignature | K::Caption | K::Line | K::Footnote | K::Citation => {
                self.ctx.run = None;
                self.ctx.paragraph = None;
            }
            K::Compound => {
                if node.has_class("toctree-wrapper") {
                    self.ctx.pop_scope()?;
                }
            }
            K::DescName => {
                self.ctx.run = None;
                self.ctx.pop_run_style()?;
            }
            K::DescContent => {
                self.ctx.indent = self.ctx.indent.saturating_sub(1);
                self.ctx.paragraph = None;
            }
            K::Paragraph | K::Figure => {
                self.ctx.run = None;
                self.ctx.paragraph = None;
            }
            K::LiteralBlock | K::DoctestBlock | K::Term => {
                self.ctx.paragraph = None;
                self.ctx.pop_paragraph_style()?;
            }
            K::LineBlock => {
                self.ctx.pop_paragraph_style()?;
            }
            K::BlockQuote => {
                self.ctx.pop_paragraph_style()?;
                self.ctx.indent = self.ctx.indent.saturating_sub(1);
            }
            K::Definition => self.ctx.indent = self.ctx.indent.saturating_sub(1),
            K::BulletList | K::EnumeratedList => {
                self.ctx.pop_list()?;
            }
            K::Tgroup | K::FieldList | K::OptionList => {
                self.ctx.pop_table()?;
            }
            K::Row | K::Field | K::OptionListItem => self.end_row(node)?,
            K::Entry | K::FieldName | K::FieldBody | K::OptionGroup | K::Description => {
                self.exit_cell()?
            }
            K::Emphasis
            | K::Strong
            | K::Literal
            | K::LiteralEmphasis
            | K::Manpage
            | K::Subscript
            | K::Superscript
            | K::TitleReference
            | K::Reference => {
                self.ctx.pop_run_style()?;
            }
            _ => {}
        }
        Ok(())
    }

    // ===== Shared helpers =====

    /// New paragraph in the active container.
    ///
    /// Inside lists and other indented constructs the paragraph is indented
    /// through the marker-less continuation numbering.
    fn new_paragraph(&mut self, text: &str, style: Option<StyleRole>) -> Result<ParagraphId> {
        let p = self.model.add_paragraph(self.ctx.container(), text, style)?;
        if self.ctx.indent > 0 {
            let num = self.model.continuation_numbering();
            self.model.set_numbering(p, self.ctx.level(), num)?;
        }
        Ok(p)
    }

    /// One empty paragraph between two adjacent table-like constructs
    fn separate_tables(&mut self, parent: Option<&Node>, index: usize) -> Result<()> {
        let previous = match (parent, index.checked_sub(1)) {
            (Some(parent), Some(i)) => parent.children.get(i),
            _ => None,
        };
        if previous.map_or(false, |prev| prev.kind.is_table_like()) {
            self.model.add_paragraph(self.ctx.container(), "", None)?;
        }
        Ok(())
    }

    /// Caption number prefix ("Fig. 2.3") for a numbered figure, table or
    /// code block; empty when numbering is off or the node has no number
    fn figure_prefix(&self, node: &Node) -> String {
        if !self.config.numfig {
            return String::new();
        }
        let figtype = match node.kind {
            NodeKind::Figure => "figure",
            NodeKind::Table => "table",
            NodeKind::Container => "code-block",
            _ => return String::new(),
        };
        let Some(pattern) = self.config.numfig_format(figtype) else {
            return String::new();
        };
        let Some(id) = node.ids().first().copied() else {
            return String::new();
        };
        match self.figures.lookup(self.ctx.docname(), figtype, id) {
            Some(numbers) => treedocx_core::format_prefix(pattern, numbers),
            None => {
                tracing::warn!(
                    docname = self.ctx.docname(),
                    figtype,
                    id,
                    "no figure number found"
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryDocument;

    fn run(tree: &Node) -> Result<MemoryDocument> {
        let mut doc = MemoryDocument::new();
        translate(
            tree,
            &mut doc,
            &FigureNumbers::new(),
            &Config::default(),
            Path::new("."),
        )?;
        Ok(doc)
    }

    #[test]
    fn test_unrecognized_kind_is_fatal() {
        let tree = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::Section)
                .with_child(Node::new(NodeKind::Unrecognized("graphviz".into()))),
        );
        match run(&tree) {
            Err(OoxmlError::UnimplementedNode(name)) => assert_eq!(name, "graphviz"),
            other => panic!("expected unimplemented node, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_terminal_children_not_visited() {
        // an unknown kind under a terminal node is never reached
        let tree = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::Comment)
                .with_child(Node::new(NodeKind::Unrecognized("whatever".into()))),
        );
        assert!(run(&tree).is_ok());
    }

    fn nested_lists() -> Node {
        let item = |text: &str| {
            Node::new(NodeKind::ListItem)
                .with_child(Node::new(NodeKind::Paragraph).with_child(Node::text(text)))
        };
        let inner = Node::new(NodeKind::EnumeratedList)
            .with_child(item("inner one"))
            .with_child(item("inner two"));
        Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::BulletList)
                .with_child(item("outer").with_child(inner))
                .with_child(item("last")),
        )
    }

    #[test]
    fn test_nested_lists_leave_context_balanced() {
        let tree = nested_lists();
        let mut doc = MemoryDocument::new();
        let figures = FigureNumbers::new();
        let config = Config::default();
        let mut translator = Translator::new(&mut doc, &figures, &config, ".", &tree);
        let before = translator.context().mark();
        translator.walk(&tree, None, 0).unwrap();
        assert_eq!(translator.context().mark(), before);
        assert_eq!(translator.context().indent, 0);
    }

    #[test]
    fn test_nested_quote_blocks_leave_context_balanced() {
        use crate::model::BodyItem;

        let line = |text: &str| Node::new(NodeKind::Line).with_child(Node::text(text));
        let definitions = Node::new(NodeKind::DefinitionList).with_child(
            Node::new(NodeKind::DefinitionListItem)
                .with_child(Node::new(NodeKind::Term).with_child(Node::text("word")))
                .with_child(
                    Node::new(NodeKind::Definition).with_child(
                        Node::new(NodeKind::LineBlock)
                            .with_child(line("first"))
                            .with_child(line("second")),
                    ),
                ),
        );
        let tree = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::BlockQuote)
                .with_child(Node::new(NodeKind::Paragraph).with_child(Node::text("quoted")))
                .with_child(definitions),
        );

        let mut doc = MemoryDocument::new();
        let figures = FigureNumbers::new();
        let config = Config::default();
        {
            let mut translator = Translator::new(&mut doc, &figures, &config, ".", &tree);
            let before = translator.context().mark();
            translator.walk(&tree, None, 0).unwrap();
            assert_eq!(translator.context().mark(), before);
            assert_eq!(translator.context().paragraph_style(), None);
            assert_eq!(translator.context().indent, 0);
        }

        let arena = doc.arena();
        let paragraphs: Vec<(String, Option<StyleRole>)> = arena
            .body()
            .iter()
            .filter_map(|item| match item {
                BodyItem::Paragraph(p) => Some(*p),
                _ => None,
            })
            .map(|p| {
                (
                    arena.paragraph_text(p).unwrap(),
                    arena.paragraph(p).unwrap().style,
                )
            })
            .collect();
        assert_eq!(
            paragraphs,
            vec![
                ("quoted".to_string(), Some(StyleRole::BlockQuote)),
                ("word".to_string(), Some(StyleRole::DefinitionTerm)),
                ("first".to_string(), Some(StyleRole::LineBlock)),
                ("second".to_string(), Some(StyleRole::LineBlock)),
            ]
        );
    }

    #[test]
    fn test_inner_list_items_use_second_level() {
        let doc = run(&nested_lists()).unwrap();
        let levels: Vec<u8> = doc
            .journal()
            .iter()
            .filter_map(|m| match m {
                crate::model::Mutation::SetNumbering { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        // outer, inner one, inner two, last; each with its continuation indent first
        assert_eq!(levels, vec![0, 0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_translation_is_deterministic() {
        let tree = nested_lists();
        let first = run(&tree).unwrap();
        let second = run(&tree).unwrap();
        assert_eq!(first.journal(), second.journal());
    }

    #[test]
    fn test_sub_document_sets_figure_origin() {
        let figure = Node::new(NodeKind::Figure)
            .with_attr("ids", vec!["arch"])
            .with_child(Node::new(NodeKind::Caption).with_child(Node::text("Overview")));
        let tree = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::SubDocument)
                .with_attr(DOCNAME_ATTR, "design")
                .with_child(figure),
        );
        let mut figures = FigureNumbers::new();
        figures.insert("design", "figure", "arch", vec![4]);
        let mut doc = MemoryDocument::new();
        translate(&tree, &mut doc, &figures, &Config::default(), Path::new(".")).unwrap();
        let p = doc.last_body_paragraph().unwrap();
        assert_eq!(doc.arena().paragraph_text(p).unwrap(), "Fig. 4 Overview");
    }

    #[test]
    fn test_text_outside_paragraph_ignored() {
        let tree = Node::new(NodeKind::Document).with_child(
            Node::new(NodeKind::Topic).with_child(
                Node::new(NodeKind::Title).with_child(Node::text("Contents")),
            ),
        );
        let doc = run(&tree).unwrap();
        assert!(doc
            .journal()
            .iter()
            .all(|m| !matches!(m, crate::model::Mutation::AddRun { .. })));
    }
}
