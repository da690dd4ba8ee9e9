//! Tables, field lists and option lists
//!
//! All three open a table frame whose cursor walks the cells as
//! cell-producing children are visited. Merged cells are visited once: after
//! each cell the cursor moves past every position that a merge has folded
//! into its left or upper neighbour.

use treedocx_ast::{Alignment, Node, NodeKind};

use super::{Flow, Translator};
use crate::error::{OoxmlError, Result};
use crate::model::{Container, DocumentModel};
use crate::styles::StyleRole;

impl<M: DocumentModel + ?Sized> Translator<'_, M> {
    pub(super) fn enter_tgroup(&mut self, node: &Node, parent: Option<&Node>) -> Result<Flow> {
        let count_rows = |kind: NodeKind| node.child(&kind).map_or(0, |n| n.children.len());
        let head_rows = count_rows(NodeKind::Thead);
        let body_rows = count_rows(NodeKind::Tbody);
        let rows = head_rows + body_rows;
        let cols = match node.attr_int("cols") {
            Some(cols) if cols > 0 => cols as usize,
            _ => node
                .children
                .iter()
                .filter(|c| c.is(&NodeKind::Colspec))
                .count(),
        };
        if rows == 0 || cols == 0 {
            tracing::warn!(
                docname = self.ctx.docname(),
                rows,
                cols,
                "skipping empty table"
            );
            return Ok(Flow::Skip);
        }

        let table = self.model.add_table(self.ctx.container(), rows, cols)?;
        let align = parent
            .and_then(|table| table.attr_str("align"))
            .and_then(Alignment::from_attr)
            .or(self.config.imagetable_align);
        if let Some(align) = align {
            self.model.set_table_alignment(table, align)?;
        }
        self.model.autofit_cells(table)?;
        if head_rows == 0 {
            self.model.set_table_style(table, StyleRole::Table)?;
        } else {
            self.model
                .set_table_style(table, StyleRole::TableWithHeader)?;
            self.model.mark_header_rows(table, head_rows)?;
        }
        self.ctx.push_table(table);
        Ok(Flow::Descend)
    }

    /// Field and option lists: two columns, one row per item
    pub(super) fn enter_item_table(
        &mut self,
        node: &Node,
        parent: Option<&Node>,
        index: usize,
    ) -> Result<Flow> {
        self.separate_tables(parent, index)?;
        let rows = node.children.len();
        if rows == 0 {
            return Ok(Flow::Skip);
        }

        let table = self.model.add_table(self.ctx.container(), rows, 2)?;
        let block = self.model.block_width() as f64;
        let rate = self.config.item_width_rate;
        for row in 0..rows {
            let name = self.model.cell(table, row, 0)?;
            self.model
                .set_cell_width(name, (block * (1.0 - rate)).round() as i64)?;
            let body = self.model.cell(table, row, 1)?;
            self.model.set_cell_width(body, (block * rate).round() as i64)?;
        }
        self.ctx.push_table(table);
        Ok(Flow::Descend)
    }

    pub(super) fn enter_cell(&mut self, node: &Node) -> Result<Flow> {
        let Some(frame) = self.ctx.table() else {
            return Err(OoxmlError::MissingTable(node.kind.to_string()));
        };

        let cell = if node.is(&NodeKind::Entry) {
            self.skip_consumed()?;
            let (row, col) = self.position()?;
            let more_rows = node.attr_int("morerows").unwrap_or(0).max(0) as usize;
            let more_cols = node.attr_int("morecols").unwrap_or(0).max(0) as usize;
            if more_rows > 0 || more_cols > 0 {
                self.model
                    .merge_cells(frame.table, (row, col), (row + more_rows, col + more_cols))?
            } else {
                self.model.cell(frame.table, row, col)?
            }
        } else {
            self.model.cell(frame.table, frame.row, frame.col)?
        };

        self.ctx.push_container(Container::Cell(cell));
        self.ctx.paragraph = Some(self.model.cell_paragraph(cell)?);
        Ok(Flow::Descend)
    }

    pub(super) fn exit_cell(&mut self) -> Result<()> {
        self.ctx.pop_container()?;
        self.ctx.paragraph = None;
        self.ctx.run = None;
        if let Some(frame) = self.ctx.table_mut() {
            frame.col += 1;
        }
        self.skip_consumed()
    }

    pub(super) fn end_row(&mut self, node: &Node) -> Result<()> {
        let frame = self
            .ctx
            .table_mut()
            .ok_or_else(|| OoxmlError::MissingTable(node.kind.to_string()))?;
        frame.row += 1;
        frame.col = 0;
        Ok(())
    }

    fn position(&self) -> Result<(usize, usize)> {
        self.ctx
            .table()
            .map(|frame| (frame.row, frame.col))
            .ok_or_else(|| OoxmlError::MissingTable(NodeKind::Entry.to_string()))
    }

    /// Move the cursor right past positions already covered by a merge
    fn skip_consumed(&mut self) -> Result<()> {
        let Some(frame) = self.ctx.table() else {
            return Ok(());
        };
        let grid = &self.model.arena().table(frame.table)?.grid;
        let (row, mut col) = (frame.row, frame.col);
        while let Some(cell) = grid.get(row, col) {
            let left = col.checked_sub(1).and_then(|c| grid.get(row, c));
            let above = row.checked_sub(1).and_then(|r| grid.get(r, col));
            if left != Some(cell) && above != Some(cell) {
                break;
            }
            col += 1;
        }
        if let Some(frame) = self.ctx.table_mut() {
            frame.col = col;
        }
        Ok(())
    }
}
