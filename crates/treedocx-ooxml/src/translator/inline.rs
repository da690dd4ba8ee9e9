//! Text runs, character styles, references and math

use treedocx_ast::{Alignment, AttrValue, Node, NodeKind};

use super::{Flow, Translator};
use crate::error::Result;
use crate::model::DocumentModel;
use crate::styles::StyleRole;

/// Column shares of a display-math row: margin, equation, number
const MATH_COLUMNS: [(f64, Alignment); 3] = [
    (0.1, Alignment::Left),
    (0.8, Alignment::Center),
    (0.1, Alignment::Right),
];

impl<M: DocumentModel + ?Sized> Translator<'_, M> {
    /// Text lands in the current paragraph only; outside one it is dropped
    pub(super) fn enter_text(&mut self, node: &Node, parent: Option<&Node>) -> Result<Flow> {
        let Some(p) = self.ctx.paragraph else {
            return Ok(Flow::Skip);
        };
        let raw = node.text.as_deref().unwrap_or_default();
        let text = match parent.map(|parent| &parent.kind) {
            Some(NodeKind::FieldName) => format!("{}:", raw),
            Some(NodeKind::LiteralBlock) | Some(NodeKind::DoctestBlock) => {
                raw.replace("\n\n", "\n")
            }
            _ => raw.replace('\n', " "),
        };
        self.ctx.run = Some(self.model.add_run(p, &text, self.ctx.run_style())?);
        Ok(Flow::Skip)
    }

    pub(super) fn enter_inline_style(&mut self, style: StyleRole) -> Result<Flow> {
        self.ctx.push_run_style(style);
        Ok(Flow::Descend)
    }

    /// Footnote, citation and number references render as "[label]"
    pub(super) fn enter_bracketed_reference(&mut self, node: &Node) -> Result<Flow> {
        if let Some(p) = self.ctx.paragraph {
            let text = format!("[{}]", node.astext());
            let run = self
                .model
                .add_run(p, &text, Some(StyleRole::FootnoteReference))?;
            self.ctx.run = Some(run);
        }
        Ok(Flow::Skip)
    }

    /// Inline math is kept as its source text
    pub(super) fn enter_math(&mut self, node: &Node) -> Result<Flow> {
        if let Some(p) = self.ctx.paragraph {
            let text = node
                .attr_str("latex")
                .map(str::to_string)
                .unwrap_or_else(|| node.astext());
            self.ctx.run = Some(self.model.add_run(p, &text, self.ctx.run_style())?);
        }
        Ok(Flow::Skip)
    }

    /// Display math becomes a one-row table: empty margin, the equation
    /// centered, and its number on the right
    pub(super) fn enter_math_block(
        &mut self,
        node: &Node,
        parent: Option<&Node>,
        index: usize,
    ) -> Result<Flow> {
        self.separate_tables(parent, index)?;

        let equation = node
            .attr_str("latex")
            .map(str::to_string)
            .unwrap_or_else(|| node.astext());
        let number = match node.attr("number") {
            Some(AttrValue::Int(n)) => format!("({})", n),
            Some(AttrValue::Str(s)) if !s.is_empty() => format!("({})", s),
            _ => String::new(),
        };
        let texts = [String::new(), equation, number];

        let table = self.model.add_table(self.ctx.container(), 1, 3)?;
        let block = self.model.block_width() as f64;
        for (col, ((share, align), text)) in MATH_COLUMNS.iter().zip(&texts).enumerate() {
            let cell = self.model.cell(table, 0, col)?;
            self.model.set_cell_width(cell, (block * share).round() as i64)?;
            self.model.set_cell_text(cell, text)?;
            let p = self.model.cell_paragraph(cell)?;
            self.model.set_alignment(p, *align)?;
        }
        self.ctx.paragraph = None;
        Ok(Flow::Skip)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use treedocx_ast::{Node, NodeKind};
    use treedocx_core::{Config, FigureNumbers};

    use crate::model::{DocumentModel, MemoryDocument, Mutation};
    use crate::styles::StyleRole;
    use crate::translator::translate;

    fn translate_default(tree: &Node) -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        translate(
            tree,
            &mut doc,
            &FigureNumbers::new(),
            &Config::default(),
            Path::new("."),
        )
        .unwrap();
        doc
    }

    fn runs(doc: &MemoryDocument) -> Vec<(String, Option<StyleRole>)> {
        doc.journal()
            .iter()
            .filter_map(|m| match m {
                Mutation::AddRun { text, style, .. } if !text.is_empty() => {
                    Some((text.clone(), *style))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_nested_inline_styles() {
        let para = Node::new(NodeKind::Paragraph)
            .with_child(Node::text("plain\ntext "))
            .with_child(
                Node::new(NodeKind::Strong)
                    .with_child(Node::text("bold "))
                    .with_child(Node::new(NodeKind::Literal).with_child(Node::text("code"))),
            )
            .with_child(Node::text(" after"));
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(para));
        assert_eq!(
            runs(&doc),
            vec![
                ("plain text ".to_string(), None),
                ("bold ".to_string(), Some(StyleRole::Strong)),
                ("code".to_string(), Some(StyleRole::Literal)),
                (" after".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_literal_block_keeps_lines() {
        let block = Node::new(NodeKind::LiteralBlock).with_child(Node::text("a\n\nb\nc"));
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(block));
        let p = doc.last_body_paragraph().unwrap();
        assert_eq!(doc.arena().paragraph_text(p).unwrap(), "a\nb\nc");
        assert_eq!(
            doc.arena().paragraph(p).unwrap().style,
            Some(StyleRole::LiteralBlock)
        );
    }

    #[test]
    fn test_footnote_reference_bracketed() {
        let para = Node::new(NodeKind::Paragraph)
            .with_child(Node::text("see"))
            .with_child(Node::new(NodeKind::FootnoteReference).with_child(Node::text("2")));
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(para));
        assert_eq!(
            runs(&doc).last().cloned(),
            Some(("[2]".to_string(), Some(StyleRole::FootnoteReference)))
        );
    }

    #[test]
    fn test_manpage_uses_literal_emphasis() {
        let para = Node::new(NodeKind::Paragraph)
            .with_child(Node::new(NodeKind::Manpage).with_child(Node::text("ls(1)")));
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(para));
        assert_eq!(
            runs(&doc),
            vec![("ls(1)".to_string(), Some(StyleRole::LiteralEmphasis))]
        );
    }

    #[test]
    fn test_inline_math_prefers_latex() {
        let para = Node::new(NodeKind::Paragraph).with_child(
            Node::new(NodeKind::Math)
                .with_attr("latex", "x^2")
                .with_child(Node::text("ignored")),
        );
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(para));
        assert_eq!(runs(&doc), vec![("x^2".to_string(), None)]);
    }

    #[test]
    fn test_math_block_table() {
        let block = Node::new(NodeKind::MathBlock)
            .with_attr("latex", "E = mc^2")
            .with_attr("number", 3i64);
        let doc = translate_default(&Node::new(NodeKind::Document).with_child(block));
        let texts: Vec<String> = doc
            .journal()
            .iter()
            .filter_map(|m| match m {
                Mutation::SetCellText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["", "E = mc^2", "(3)"]);
        assert!(doc
            .journal()
            .iter()
            .any(|m| matches!(m, Mutation::AddTable { rows: 1, cols: 3, .. })));
    }
}
