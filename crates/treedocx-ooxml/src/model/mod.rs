//! Destination document model
//!
//! The translator talks to a [`DocumentModel`]: a handle-based API for
//! creating headings, paragraphs, runs, tables and pictures. Structure lives
//! in a shared [`BodyArena`] that also journals every mutation in order.
//! Implementations supply what depends on the output format: numbering
//! definitions, picture embedding and the usable text width.
//!
//! - [`DocxDocument`] writes a Word package based on a template.
//! - [`MemoryDocument`] keeps everything in memory (dry runs, tests).

mod arena;
mod docx;
mod grid;
mod memory;

use std::path::Path;

use serde::Serialize;
use treedocx_ast::Alignment;

use crate::error::Result;
use crate::numbering::{NumId, NumberingTemplate};
use crate::styles::StyleRole;

pub use arena::{BodyArena, BodyItem, Cell, Paragraph, Picture, Run, RunContent, Table};
pub use docx::DocxDocument;
pub use grid::{Span, TableGrid};
pub use memory::MemoryDocument;

/// Paragraph handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParagraphId(pub usize);

/// Run handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(pub usize);

/// Table handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TableId(pub usize);

/// Cell handle; merged positions share one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellId(pub usize);

/// Picture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PictureId(pub usize);

/// Where new paragraphs and tables go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Container {
    Body,
    Cell(CellId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Line,
    Page,
}

/// One structural change to the document, in issue order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    AddHeading {
        paragraph: ParagraphId,
        text: String,
        level: u8,
    },
    AddParagraph {
        paragraph: ParagraphId,
        container: Container,
        text: String,
        style: Option<StyleRole>,
    },
    AddRun {
        run: RunId,
        paragraph: ParagraphId,
        text: String,
        style: Option<StyleRole>,
    },
    AddBreak {
        run: RunId,
        kind: BreakKind,
    },
    SetAlignment {
        paragraph: ParagraphId,
        alignment: Alignment,
    },
    KeepWithNext {
        paragraph: ParagraphId,
    },
    AllocateNumbering {
        num: NumId,
        template: NumberingTemplate,
    },
    SetNumbering {
        paragraph: ParagraphId,
        level: u8,
        num: NumId,
    },
    AddTable {
        table: TableId,
        container: Container,
        rows: usize,
        cols: usize,
    },
    MergeCells {
        table: TableId,
        from: (usize, usize),
        to: (usize, usize),
    },
    SetCellWidth {
        cell: CellId,
        width: i64,
    },
    SetCellText {
        cell: CellId,
        text: String,
    },
    SetTableStyle {
        table: TableId,
        style: StyleRole,
    },
    SetTableAlignment {
        table: TableId,
        alignment: Alignment,
    },
    AutofitCells {
        table: TableId,
    },
    MarkHeaderRows {
        table: TableId,
        rows: usize,
    },
    AddPicture {
        picture: PictureId,
        run: RunId,
        path: String,
        width: i64,
        height: i64,
    },
    SetPictureSize {
        picture: PictureId,
        width: i64,
        height: i64,
    },
}

/// Capability surface the translator writes through
pub trait DocumentModel {
    fn arena(&self) -> &BodyArena;

    fn arena_mut(&mut self) -> &mut BodyArena;

    /// Fresh numbering instance of `template`, restarting at 1
    fn allocate_numbering(&mut self, template: NumberingTemplate) -> NumId;

    /// Shared marker-less instance for follow-up paragraphs in lists
    fn continuation_numbering(&mut self) -> NumId;

    /// Embed a picture file into a run at its natural size
    fn add_picture(&mut self, run: RunId, path: &Path) -> Result<PictureId>;

    /// Usable text width in EMUs
    fn block_width(&self) -> i64;

    fn add_heading(&mut self, text: &str, level: u8) -> ParagraphId {
        self.arena_mut().add_heading(text, level)
    }

    fn add_paragraph(
        &mut self,
        container: Container,
        text: &str,
        style: Option<StyleRole>,
    ) -> Result<ParagraphId> {
        self.arena_mut().add_paragraph(container, text, style)
    }

    fn add_run(&mut self, paragraph: ParagraphId, text: &str, style: Option<StyleRole>) -> Result<RunId> {
        self.arena_mut().add_run(paragraph, text, style)
    }

    fn add_break(&mut self, run: RunId, kind: BreakKind) -> Result<()> {
        self.arena_mut().add_break(run, kind)
    }

    fn set_alignment(&mut self, paragraph: ParagraphId, alignment: Alignment) -> Result<()> {
        self.arena_mut().set_alignment(paragraph, alignment)
    }

    fn set_keep_with_next(&mut self, paragraph: ParagraphId) -> Result<()> {
        self.arena_mut().set_keep_with_next(paragraph)
    }

    fn set_numbering(&mut self, paragraph: ParagraphId, level: u8, num: NumId) -> Result<()> {
        self.arena_mut().set_numbering(paragraph, level, num)
    }

    fn add_table(&mut self, container: Container, rows: usize, cols: usize) -> Result<TableId> {
        self.arena_mut().add_table(container, rows, cols)
    }

    fn cell(&self, table: TableId, row: usize, col: usize) -> Result<CellId> {
        self.arena().cell(table, row, col)
    }

    fn merge_cells(
        &mut self,
        table: TableId,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<CellId> {
        self.arena_mut().merge_cells(table, from, to)
    }

    fn cell_paragraph(&self, cell: CellId) -> Result<ParagraphId> {
        self.arena().cell_paragraph(cell)
    }

    fn set_cell_width(&mut self, cell: CellId, width: i64) -> Result<()> {
        self.arena_mut().set_cell_width(cell, width)
    }

    fn set_cell_text(&mut self, cell: CellId, text: &str) -> Result<()> {
        self.arena_mut().set_cell_text(cell, text)
    }

    fn set_table_style(&mut self, table: TableId, style: StyleRole) -> Result<()> {
        self.arena_mut().set_table_style(table, style)
    }

    fn set_table_alignment(&mut self, table: TableId, alignment: Alignment) -> Result<()> {
        self.arena_mut().set_table_alignment(table, alignment)
    }

    fn autofit_cells(&mut self, table: TableId) -> Result<()> {
        self.arena_mut().autofit_cells(table)
    }

    fn mark_header_rows(&mut self, table: TableId, rows: usize) -> Result<()> {
        self.arena_mut().mark_header_rows(table, rows)
    }

    fn picture_size(&self, picture: PictureId) -> Result<(i64, i64)> {
        self.arena().picture(picture).map(|p| (p.width, p.height))
    }

    fn set_picture_size(&mut self, picture: PictureId, width: i64, height: i64) -> Result<()> {
        self.arena_mut().set_picture_size(picture, width, height)
    }

    /// Last paragraph placed directly in the body
    fn last_body_paragraph(&self) -> Option<ParagraphId> {
        self.arena().last_body_paragraph()
    }

    /// Every mutation so far
    fn journal(&self) -> &[Mutation] {
        self.arena().journal()
    }
}
