//! Sections, headings, paragraphs, lists, figures and notes

use treedocx_ast::{Alignment, Node, NodeKind};

use super::{Flow, Translator};
use crate::error::Result;
use crate::image::fit_to_width;
use crate::model::{BreakKind, DocumentModel};
use crate::numbering::NumberingTemplate;
use crate::styles::StyleRole;

impl<M: DocumentModel + ?Sized> Translator<'_, M> {
    // ===== Sections =====

    pub(super) fn enter_section(&mut self) -> Result<Flow> {
        let num = if self.ctx.numbered > 0 {
            Some(self.model.allocate_numbering(NumberingTemplate::Section))
        } else {
            None
        };
        self.ctx.push_section(num);
        Ok(Flow::Descend)
    }

    pub(super) fn enter_title(&mut self, node: &Node, parent: Option<&Node>) -> Result<Flow> {
        let Some(parent) = parent else {
            return Ok(Flow::Descend);
        };
        match &parent.kind {
            NodeKind::Table => {
                let prefix = self.figure_prefix(parent);
                let p = self.new_paragraph(&format!("{} ", prefix), Some(StyleRole::Caption))?;
                self.model.set_keep_with_next(p)?;
                self.ctx.paragraph = Some(p);
                Ok(Flow::Descend)
            }
            NodeKind::Document => {
                self.model.add_heading(&heading_text(node), 0);
                Ok(Flow::Skip)
            }
            NodeKind::Section => {
                self.add_section_heading(node)?;
                Ok(Flow::Skip)
            }
            // topics, sidebars and admonitions keep their title inline
            _ => Ok(Flow::Descend),
        }
    }

    fn add_section_heading(&mut self, node: &Node) -> Result<()> {
        let level = (self.ctx.section_depth + usize::from(self.config.initial_header_level))
            .saturating_sub(1)
            .min(9) as u8;

        if let Some(threshold) = self.config.pagebreak_level {
            if level <= threshold {
                if let Some(last) = self.model.last_body_paragraph() {
                    let run = self.model.add_run(last, "", None)?;
                    self.model.add_break(run, BreakKind::Page)?;
                }
            }
        }

        let heading = self.model.add_heading(&heading_text(node), level);

        let depth = self.ctx.section_depth;
        if self.ctx.numbered > 0 && depth > self.ctx.numbered_depth {
            let secnum = depth - self.ctx.numbered_depth;
            if secnum <= self.ctx.numbered {
                let num = self.ctx.heading_numbering();
                self.model
                    .set_numbering(heading, (secnum - 1).min(8) as u8, num)?;
            }
        }
        Ok(())
    }

    /// Toctree wrappers may switch section numbering on for the sections
    /// they pull in; the previous state comes back on exit
    pub(super) fn enter_compound(&mut self, node: &Node) -> Result<Flow> {
        if node.has_class("toctree-wrapper") {
            self.ctx.push_scope();
            let numbered = node.attr_int("numbered").unwrap_or(0).max(0) as usize;
            if numbered > 0 && self.ctx.numbered_depth <= self.ctx.section_depth {
                self.ctx.numbered = numbered;
                self.ctx.numbered_depth = self.ctx.section_depth;
            }
        }
        Ok(Flow::Descend)
    }

    pub(super) fn enter_transition(&mut self) -> Result<Flow> {
        self.model
            .add_paragraph(self.ctx.container(), "", Some(StyleRole::Transition))?;
        self.ctx.paragraph = None;
        Ok(Flow::Skip)
    }

    // ===== Paragraphs =====

    pub(super) fn enter_paragraph(&mut self, parent: Option<&Node>) -> Result<Flow> {
        let p = match self.ctx.paragraph {
            Some(p) => p,
            None => {
                let style = self.ctx.paragraph_style();
                let p = self.new_paragraph("", style)?;
                self.ctx.paragraph = Some(p);
                p
            }
        };

        if parent.map_or(false, |parent| parent.is(&NodeKind::ListItem)) {
            let num = match (self.ctx.first_in_list_item, self.ctx.list()) {
                (true, Some(list)) => list,
                _ => self.model.continuation_numbering(),
            };
            self.model.set_numbering(p, self.ctx.level(), num)?;
            self.ctx.first_in_list_item = false;
        }

        self.ctx.run = Some(self.model.add_run(p, "", None)?);
        Ok(Flow::Descend)
    }

    /// Literal and doctest blocks: one paragraph in the block's style
    pub(super) fn enter_styled_block(&mut self, style: StyleRole) -> Result<Flow> {
        self.ctx.push_paragraph_style(style);
        self.ctx.paragraph = Some(self.new_paragraph("", Some(style))?);
        Ok(Flow::Descend)
    }

    pub(super) fn enter_list(&mut self, template: NumberingTemplate) -> Result<Flow> {
        let num = self.model.allocate_numbering(template);
        self.ctx.push_list(num);
        Ok(Flow::Descend)
    }

    // ===== API descriptions =====

    pub(super) fn enter_parameter_list(&mut self, node: &Node) -> Result<Flow> {
        let params: Vec<String> = node.children.iter().map(Node::astext).collect();
        if let Some(p) = self.ctx.paragraph {
            self.model
                .add_run(p, &format!("({})", params.join(", ")), None)?;
        }
        Ok(Flow::Skip)
    }

    // ===== Figures, captions, images =====

    pub(super) fn enter_figure(&mut self) -> Result<Flow> {
        let p = self.new_paragraph("", None)?;
        self.model.set_alignment(p, Alignment::Center)?;
        self.model.set_keep_with_next(p)?;
        self.ctx.paragraph = Some(p);
        self.ctx.run = Some(self.model.add_run(p, "", None)?);
        Ok(Flow::Descend)
    }

    pub(super) fn enter_caption(&mut self, parent: Option<&Node>) -> Result<Flow> {
        let Some(parent) = parent else {
            return Ok(Flow::Descend);
        };
        match parent.kind {
            NodeKind::Figure => {
                let prefix = self.figure_prefix(parent);
                let p = self.new_paragraph(&format!("{} ", prefix), Some(StyleRole::Caption))?;
                self.model.set_alignment(p, Alignment::Center)?;
                self.ctx.paragraph = Some(p);
            }
            NodeKind::Container => {
                let prefix = self.figure_prefix(parent);
                let p = self.new_paragraph(
                    &format!("{} ", prefix),
                    Some(StyleRole::CodeBlockCaption),
                )?;
                self.model.set_keep_with_next(p)?;
                self.ctx.paragraph = Some(p);
            }
            _ => {}
        }
        Ok(Flow::Descend)
    }

    pub(super) fn enter_image(&mut self, node: &Node, parent: Option<&Node>) -> Result<Flow> {
        let uri = node.attr_str("uri").unwrap_or_default();
        let path = self.source_root.join(uri);

        let inline_run = match parent.map(|p| &p.kind) {
            Some(NodeKind::Paragraph) | Some(NodeKind::Figure) => self.ctx.run,
            _ => None,
        };

        let picture = match inline_run {
            Some(run) => self.model.add_picture(run, &path)?,
            None => {
                let p = self.new_paragraph("", None)?;
                let run = self.model.add_run(p, "", None)?;
                let picture = self.model.add_picture(run, &path)?;
                let align = node
                    .attr_str("align")
                    .and_then(Alignment::from_attr)
                    .or(self.config.imagetable_align);
                if let Some(align) = align {
                    self.model.set_alignment(p, align)?;
                }
                picture
            }
        };

        let size = self.model.picture_size(picture)?;
        let fitted = fit_to_width(size, self.model.block_width());
        if fitted != size {
            tracing::debug!(uri, ?size, ?fitted, "scaling picture to text width");
            self.model.set_picture_size(picture, fitted.0, fitted.1)?;
        }
        Ok(Flow::Skip)
    }

    // ===== Notes =====

    /// Footnote or citation body, opened by its bracketed label
    pub(super) fn enter_note(&mut self, node: &Node) -> Result<Flow> {
        let label = node
            .children
            .first()
            .map(|label| label.astext().trim().to_string())
            .unwrap_or_default();
        self.ctx.paragraph = Some(self.new_paragraph(&format!("[{}] ", label), None)?);
        Ok(Flow::Descend)
    }
}

/// Heading text on one line
fn heading_text(node: &Node) -> String {
    node.astext().replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use treedocx_ast::{Node, NodeKind};
    use treedocx_core::{Config, FigureNumbers, SectionNumbering};

    use crate::model::{DocumentModel, MemoryDocument, Mutation};
    use crate::numbering::{NumId, NumberingTemplate};
    use crate::translator::translate;

    fn section(title: &str) -> Node {
        Node::new(NodeKind::Section).with_child(Node::new(NodeKind::Title).with_child(Node::text(title)))
    }

    fn paragraph(text: &str) -> Node {
        Node::new(NodeKind::Paragraph).with_child(Node::text(text))
    }

    fn translate_with(tree: &Node, config: &Config, doc: &mut MemoryDocument) {
        translate(tree, doc, &FigureNumbers::new(), config, Path::new("/src")).unwrap();
    }

    fn headings(doc: &MemoryDocument) -> Vec<(String, u8)> {
        doc.journal()
            .iter()
            .filter_map(|m| match m {
                Mutation::AddHeading { text, level, .. } => Some((text.clone(), *level)),
                _ => None,
            })
            .collect()
    }

    fn numbering_of(doc: &MemoryDocument) -> Vec<(usize, u8, NumId)> {
        doc.journal()
            .iter()
            .filter_map(|m| match m {
                Mutation::SetNumbering {
                    paragraph,
                    level,
                    num,
                } => Some((paragraph.0, *level, *num)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_levels_follow_depth() {
        let tree = Node::new(NodeKind::Document).with_child(
            section("Intro\nduction").with_child(section("Details").with_child(paragraph("x"))),
        );
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &Config::default(), &mut doc);
        assert_eq!(
            headings(&doc),
            vec![("Intro duction".to_string(), 0), ("Details".to_string(), 1)]
        );
    }

    #[test]
    fn test_document_title_is_level_zero() {
        let tree = Node::new(NodeKind::Document)
            .with_child(Node::new(NodeKind::Title).with_child(Node::text("Manual")))
            .with_child(section("Usage"));
        let config = Config {
            initial_header_level: 2,
            ..Config::default()
        };
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &config, &mut doc);
        assert_eq!(
            headings(&doc),
            vec![("Manual".to_string(), 0), ("Usage".to_string(), 2)]
        );
    }

    #[test]
    fn test_section_numbering_uses_enclosing_counter() {
        let config = Config {
            section_numbering: Some(SectionNumbering {
                start_depth: 1,
                max_depth: 3,
            }),
            ..Config::default()
        };
        let tree = Node::new(NodeKind::Document)
            .with_child(section("Intro").with_child(section("Scope")));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &config, &mut doc);

        let allocations: Vec<NumId> = doc
            .journal()
            .iter()
            .filter_map(|m| match m {
                Mutation::AllocateNumbering {
                    num,
                    template: NumberingTemplate::Section,
                } => Some(*num),
                _ => None,
            })
            .collect();
        // base, Intro, Scope
        assert_eq!(allocations.len(), 3);
        let numbering = numbering_of(&doc);
        assert_eq!(numbering.len(), 2);
        assert_eq!((numbering[0].1, numbering[0].2), (0, allocations[0]));
        assert_eq!((numbering[1].1, numbering[1].2), (1, allocations[1]));
    }

    #[test]
    fn test_numbering_stops_past_max_depth() {
        let config = Config {
            section_numbering: Some(SectionNumbering {
                start_depth: 1,
                max_depth: 1,
            }),
            ..Config::default()
        };
        let tree = Node::new(NodeKind::Document)
            .with_child(section("Intro").with_child(section("Scope")));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &config, &mut doc);
        assert_eq!(numbering_of(&doc).len(), 1);
    }

    #[test]
    fn test_toctree_wrapper_scopes_numbering() {
        let wrapper = Node::new(NodeKind::Compound)
            .with_attr("classes", vec!["toctree-wrapper"])
            .with_attr("numbered", 2i64)
            .with_child(section("Inner"));
        let tree = Node::new(NodeKind::Document)
            .with_child(wrapper)
            .with_child(section("After"));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &Config::default(), &mut doc);
        // only the section inside the wrapper is numbered
        assert_eq!(numbering_of(&doc).len(), 1);
    }

    #[test]
    fn test_page_break_before_heading() {
        let config = Config {
            pagebreak_level: Some(1),
            ..Config::default()
        };
        let tree = Node::new(NodeKind::Document)
            .with_child(section("First").with_child(paragraph("body")))
            .with_child(section("Second"));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &config, &mut doc);
        let breaks = doc
            .journal()
            .iter()
            .filter(|m| matches!(m, Mutation::AddBreak { .. }))
            .count();
        // nothing precedes the first heading
        assert_eq!(breaks, 1);
    }

    #[test]
    fn test_list_item_paragraphs() {
        let item = Node::new(NodeKind::ListItem)
            .with_child(paragraph("first"))
            .with_child(paragraph("second"));
        let tree = Node::new(NodeKind::Document)
            .with_child(Node::new(NodeKind::BulletList).with_child(item));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &Config::default(), &mut doc);

        let bullet = doc.journal().iter().find_map(|m| match m {
            Mutation::AllocateNumbering {
                num,
                template: NumberingTemplate::Bullet,
            } => Some(*num),
            _ => None,
        });
        let nums: Vec<NumId> = numbering_of(&doc).into_iter().map(|(_, _, n)| n).collect();
        // each paragraph gets the continuation indent, then its list marker
        assert_eq!(nums.len(), 4);
        assert_eq!(Some(nums[1]), bullet);
        assert_eq!(nums[3], nums[0]);
        assert_ne!(nums[3], nums[1]);
    }

    #[test]
    fn test_image_scaled_to_block_width() {
        let tree = Node::new(NodeKind::Document)
            .with_child(Node::new(NodeKind::Image).with_attr("uri", "img/wide.png"));
        let mut doc = MemoryDocument::new()
            .with_block_width(6000)
            .with_picture_size("/src/img/wide.png", 8000, 4000);
        translate_with(&tree, &Config::default(), &mut doc);
        assert!(doc.journal().iter().any(|m| matches!(
            m,
            Mutation::SetPictureSize {
                width: 6000,
                height: 3000,
                ..
            }
        )));
    }

    #[test]
    fn test_figure_picture_shares_paragraph() {
        let figure = Node::new(NodeKind::Figure)
            .with_child(Node::new(NodeKind::Image).with_attr("uri", "a.png"));
        let tree = Node::new(NodeKind::Document).with_child(figure);
        let mut doc = MemoryDocument::new().with_picture_size("/src/a.png", 100, 100);
        translate_with(&tree, &Config::default(), &mut doc);
        let paragraphs = doc
            .journal()
            .iter()
            .filter(|m| matches!(m, Mutation::AddParagraph { .. }))
            .count();
        assert_eq!(paragraphs, 1);
        assert!(!doc
            .journal()
            .iter()
            .any(|m| matches!(m, Mutation::SetPictureSize { .. })));
    }

    #[test]
    fn test_inline_picture_follows_preceding_text() {
        use crate::model::RunContent;

        let para = Node::new(NodeKind::Paragraph)
            .with_child(Node::text("before "))
            .with_child(Node::new(NodeKind::Image).with_attr("uri", "icon.png"))
            .with_child(Node::text(" after"));
        let tree = Node::new(NodeKind::Document).with_child(para);
        let mut doc = MemoryDocument::new().with_picture_size("/src/icon.png", 100, 100);
        translate_with(&tree, &Config::default(), &mut doc);

        let arena = doc.arena();
        let p = doc.last_body_paragraph().unwrap();
        let contents: Vec<String> = arena
            .paragraph(p)
            .unwrap()
            .runs
            .iter()
            .flat_map(|r| arena.run(*r).unwrap().content.clone())
            .map(|content| match content {
                RunContent::Text(text) => text,
                RunContent::Picture(_) => "<picture>".to_string(),
                RunContent::Break(_) => "<break>".to_string(),
            })
            .filter(|text| !text.is_empty())
            .collect();
        assert_eq!(contents, vec!["before ", "<picture>", " after"]);
    }

    #[test]
    fn test_footnote_label_paragraph() {
        let footnote = Node::new(NodeKind::Footnote)
            .with_child(Node::new(NodeKind::Label).with_child(Node::text(" 1 ")))
            .with_child(Node::text("note body"));
        let tree = Node::new(NodeKind::Document).with_child(footnote);
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &Config::default(), &mut doc);
        let p = doc.last_body_paragraph().unwrap();
        assert_eq!(doc.arena().paragraph_text(p).unwrap(), "[1] note body");
    }

    #[test]
    fn test_parameter_list_run() {
        let params = Node::new(NodeKind::DescParameterlist)
            .with_child(Node::new(NodeKind::DescParameter).with_child(Node::text("a")))
            .with_child(Node::new(NodeKind::DescParameter).with_child(Node::text("b=1")));
        let signature = Node::new(NodeKind::DescSignature)
            .with_child(Node::new(NodeKind::DescName).with_child(Node::text("connect")))
            .with_child(params);
        let tree = Node::new(NodeKind::Document)
            .with_child(Node::new(NodeKind::Desc).with_child(signature));
        let mut doc = MemoryDocument::new();
        translate_with(&tree, &Config::default(), &mut doc);
        let p = doc.last_body_paragraph().unwrap();
        assert_eq!(doc.arena().paragraph_text(p).unwrap(), "connect(a, b=1)");
    }
}
