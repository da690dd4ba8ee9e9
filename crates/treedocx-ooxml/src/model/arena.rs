//! Handle-addressed storage for document structure

use std::path::PathBuf;

use treedocx_ast::Alignment;

use super::grid::TableGrid;
use super::{
    BreakKind, CellId, Container, Mutation, ParagraphId, PictureId, RunId, TableId,
};
use crate::error::{OoxmlError, Result};
use crate::numbering::NumId;
use crate::styles::StyleRole;

/// Block-level item of the body or of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyItem {
    Paragraph(ParagraphId),
    Table(TableId),
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Paragraph style; None is the template's default
    pub style: Option<StyleRole>,
    pub alignment: Option<Alignment>,
    pub keep_with_next: bool,
    /// (level, instance)
    pub numbering: Option<(u8, NumId)>,
    pub runs: Vec<RunId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Break(BreakKind),
    Picture(PictureId),
}

#[derive(Debug, Clone)]
pub struct Run {
    pub paragraph: ParagraphId,
    pub style: Option<StyleRole>,
    pub content: Vec<RunContent>,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub grid: TableGrid,
    pub style: Option<StyleRole>,
    pub alignment: Option<Alignment>,
    pub autofit: bool,
    pub header_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub table: TableId,
    pub items: Vec<BodyItem>,
    /// Preferred width in EMUs
    pub width: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Picture {
    pub run: RunId,
    pub path: PathBuf,
    /// Displayed size in EMUs
    pub width: i64,
    pub height: i64,
}

/// Document structure shared by every model implementation
#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    body: Vec<BodyItem>,
    paragraphs: Vec<Paragraph>,
    runs: Vec<Run>,
    tables: Vec<Table>,
    cells: Vec<Cell>,
    pictures: Vec<Picture>,
    journal: Vec<Mutation>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a journal entry for a change made outside the arena
    pub fn record(&mut self, mutation: Mutation) {
        tracing::trace!(?mutation, "mutation");
        self.journal.push(mutation);
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn body(&self) -> &[BodyItem] {
        &self.body
    }

    // ===== Lookup =====

    pub fn paragraph(&self, id: ParagraphId) -> Result<&Paragraph> {
        self.paragraphs.get(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "paragraph",
            index: id.0,
        })
    }

    fn paragraph_mut(&mut self, id: ParagraphId) -> Result<&mut Paragraph> {
        self.paragraphs.get_mut(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "paragraph",
            index: id.0,
        })
    }

    pub fn run(&self, id: RunId) -> Result<&Run> {
        self.runs.get(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "run",
            index: id.0,
        })
    }

    fn run_mut(&mut self, id: RunId) -> Result<&mut Run> {
        self.runs.get_mut(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "run",
            index: id.0,
        })
    }

    pub fn table(&self, id: TableId) -> Result<&Table> {
        self.tables.get(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "table",
            index: id.0,
        })
    }

    fn table_mut(&mut self, id: TableId) -> Result<&mut Table> {
        self.tables.get_mut(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "table",
            index: id.0,
        })
    }

    pub fn cell_data(&self, id: CellId) -> Result<&Cell> {
        self.cells.get(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "cell",
            index: id.0,
        })
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.cells.get_mut(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "cell",
            index: id.0,
        })
    }

    pub fn picture(&self, id: PictureId) -> Result<&Picture> {
        self.pictures.get(id.0).ok_or(OoxmlError::InvalidHandle {
            kind: "picture",
            index: id.0,
        })
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    /// Items of a container
    pub fn items(&self, container: Container) -> Result<&[BodyItem]> {
        match container {
            Container::Body => Ok(&self.body),
            Container::Cell(cell) => Ok(&self.cell_data(cell)?.items),
        }
    }

    fn items_mut(&mut self, container: Container) -> Result<&mut Vec<BodyItem>> {
        match container {
            Container::Body => Ok(&mut self.body),
            Container::Cell(cell) => Ok(&mut self.cell_mut(cell)?.items),
        }
    }

    /// Plain text of a paragraph
    pub fn paragraph_text(&self, id: ParagraphId) -> Result<String> {
        let mut text = String::new();
        for run in &self.paragraph(id)?.runs {
            for content in &self.run(*run)?.content {
                match content {
                    RunContent::Text(t) => text.push_str(t),
                    RunContent::Break(BreakKind::Line) => text.push('\n'),
                    _ => {}
                }
            }
        }
        Ok(text)
    }

    pub fn last_body_paragraph(&self) -> Option<ParagraphId> {
        self.body.iter().rev().find_map(|item| match item {
            BodyItem::Paragraph(p) => Some(*p),
            BodyItem::Table(_) => None,
        })
    }

    // ===== Paragraphs and runs =====

    pub fn add_heading(&mut self, text: &str, level: u8) -> ParagraphId {
        let id = self.push_paragraph(Some(StyleRole::heading(level)));
        self.body.push(BodyItem::Paragraph(id));
        if !text.is_empty() {
            self.push_run(id, text, None);
        }
        self.record(Mutation::AddHeading {
            paragraph: id,
            text: text.to_string(),
            level,
        });
        id
    }

    pub fn add_paragraph(
        &mut self,
        container: Container,
        text: &str,
        style: Option<StyleRole>,
    ) -> Result<ParagraphId> {
        self.items(container)?;
        let id = self.push_paragraph(style);
        self.items_mut(container)?.push(BodyItem::Paragraph(id));
        if !text.is_empty() {
            self.push_run(id, text, None);
        }
        self.record(Mutation::AddParagraph {
            paragraph: id,
            container,
            text: text.to_string(),
            style,
        });
        Ok(id)
    }

    pub fn add_run(
        &mut self,
        paragraph: ParagraphId,
        text: &str,
        style: Option<StyleRole>,
    ) -> Result<RunId> {
        self.paragraph(paragraph)?;
        let id = self.push_run(paragraph, text, style);
        self.record(Mutation::AddRun {
            run: id,
            paragraph,
            text: text.to_string(),
            style,
        });
        Ok(id)
    }

    pub fn add_break(&mut self, run: RunId, kind: BreakKind) -> Result<()> {
        self.run_mut(run)?.content.push(RunContent::Break(kind));
        self.record(Mutation::AddBreak { run, kind });
        Ok(())
    }

    pub fn set_alignment(&mut self, paragraph: ParagraphId, alignment: Alignment) -> Result<()> {
        self.paragraph_mut(paragraph)?.alignment = Some(alignment);
        self.record(Mutation::SetAlignment {
            paragraph,
            alignment,
        });
        Ok(())
    }

    pub fn set_keep_with_next(&mut self, paragraph: ParagraphId) -> Result<()> {
        self.paragraph_mut(paragraph)?.keep_with_next = true;
        self.record(Mutation::KeepWithNext { paragraph });
        Ok(())
    }

    pub fn set_numbering(&mut self, paragraph: ParagraphId, level: u8, num: NumId) -> Result<()> {
        self.paragraph_mut(paragraph)?.numbering = Some((level, num));
        self.record(Mutation::SetNumbering {
            paragraph,
            level,
            num,
        });
        Ok(())
    }

    fn push_paragraph(&mut self, style: Option<StyleRole>) -> ParagraphId {
        self.paragraphs.push(Paragraph {
            style,
            ..Paragraph::default()
        });
        ParagraphId(self.paragraphs.len() - 1)
    }

    fn push_run(&mut self, paragraph: ParagraphId, text: &str, style: Option<StyleRole>) -> RunId {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![RunContent::Text(text.to_string())]
        };
        self.runs.push(Run {
            paragraph,
            style,
            content,
        });
        let id = RunId(self.runs.len() - 1);
        if let Some(p) = self.paragraphs.get_mut(paragraph.0) {
            p.runs.push(id);
        }
        id
    }

    // ===== Tables =====

    /// Table of single cells, each holding one empty paragraph
    pub fn add_table(&mut self, container: Container, rows: usize, cols: usize) -> Result<TableId> {
        if rows == 0 || cols == 0 {
            return Err(OoxmlError::InvalidStructure(format!(
                "table needs at least one row and column, got {}x{}",
                rows, cols
            )));
        }
        self.items(container)?;
        let id = TableId(self.tables.len());
        let grid = TableGrid::new(rows, cols, self.cells.len());
        for _ in 0..rows * cols {
            let paragraph = self.push_paragraph(None);
            self.cells.push(Cell {
                table: id,
                items: vec![BodyItem::Paragraph(paragraph)],
                width: None,
            });
        }
        self.tables.push(Table {
            grid,
            style: None,
            alignment: None,
            autofit: false,
            header_rows: 0,
        });
        self.items_mut(container)?.push(BodyItem::Table(id));
        self.record(Mutation::AddTable {
            table: id,
            container,
            rows,
            cols,
        });
        Ok(id)
    }

    pub fn cell(&self, table: TableId, row: usize, col: usize) -> Result<CellId> {
        self.table(table)?
            .grid
            .get(row, col)
            .ok_or(OoxmlError::InvalidHandle {
                kind: "cell position",
                index: row,
            })
    }

    /// Merge a rectangle; content of absorbed cells moves into the survivor
    pub fn merge_cells(
        &mut self,
        table: TableId,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<CellId> {
        let merge = self.table_mut(table)?.grid.merge(from, to)?;
        for absorbed in &merge.absorbed {
            let items = std::mem::take(&mut self.cell_mut(*absorbed)?.items);
            let moved: Vec<BodyItem> = items
                .into_iter()
                .filter(|item| !self.is_empty_paragraph(item))
                .collect();
            self.cell_mut(merge.cell)?.items.extend(moved);
        }
        self.record(Mutation::MergeCells { table, from, to });
        Ok(merge.cell)
    }

    fn is_empty_paragraph(&self, item: &BodyItem) -> bool {
        match item {
            BodyItem::Paragraph(p) => self
                .paragraphs
                .get(p.0)
                .map_or(true, |p| p.runs.is_empty()),
            BodyItem::Table(_) => false,
        }
    }

    /// First paragraph of a cell
    pub fn cell_paragraph(&self, cell: CellId) -> Result<ParagraphId> {
        self.cell_data(cell)?
            .items
            .iter()
            .find_map(|item| match item {
                BodyItem::Paragraph(p) => Some(*p),
                BodyItem::Table(_) => None,
            })
            .ok_or_else(|| OoxmlError::InvalidStructure(format!("cell {} has no paragraph", cell.0)))
    }

    pub fn set_cell_width(&mut self, cell: CellId, width: i64) -> Result<()> {
        self.cell_mut(cell)?.width = Some(width);
        self.record(Mutation::SetCellWidth { cell, width });
        Ok(())
    }

    /// Replace a cell's content with one paragraph holding `text`
    pub fn set_cell_text(&mut self, cell: CellId, text: &str) -> Result<()> {
        let first = self.cell_paragraph(cell)?;
        self.paragraph_mut(first)?.runs.clear();
        if !text.is_empty() {
            self.push_run(first, text, None);
        }
        self.cell_mut(cell)?.items = vec![BodyItem::Paragraph(first)];
        self.record(Mutation::SetCellText {
            cell,
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn set_table_style(&mut self, table: TableId, style: StyleRole) -> Result<()> {
        self.table_mut(table)?.style = Some(style);
        self.record(Mutation::SetTableStyle { table, style });
        Ok(())
    }

    pub fn set_table_alignment(&mut self, table: TableId, alignment: Alignment) -> Result<()> {
        self.table_mut(table)?.alignment = Some(alignment);
        self.record(Mutation::SetTableAlignment { table, alignment });
        Ok(())
    }

    /// Let every cell size to its content
    pub fn autofit_cells(&mut self, table: TableId) -> Result<()> {
        self.table_mut(table)?.autofit = true;
        self.record(Mutation::AutofitCells { table });
        Ok(())
    }

    pub fn mark_header_rows(&mut self, table: TableId, rows: usize) -> Result<()> {
        let t = self.table_mut(table)?;
        t.header_rows = rows.min(t.grid.rows());
        self.record(Mutation::MarkHeaderRows { table, rows });
        Ok(())
    }

    // ===== Pictures =====

    /// Register a picture that an implementation has embedded
    pub fn add_picture(
        &mut self,
        run: RunId,
        path: PathBuf,
        width: i64,
        height: i64,
    ) -> Result<PictureId> {
        let id = PictureId(self.pictures.len());
        self.run_mut(run)?.content.push(RunContent::Picture(id));
        self.record(Mutation::AddPicture {
            picture: id,
            run,
            path: path.display().to_string(),
            width,
            height,
        });
        self.pictures.push(Picture {
            run,
            path,
            width,
            height,
        });
        Ok(id)
    }

    pub fn set_picture_size(&mut self, picture: PictureId, width: i64, height: i64) -> Result<()> {
        let p = self
            .pictures
            .get_mut(picture.0)
            .ok_or(OoxmlError::InvalidHandle {
                kind: "picture",
                index: picture.0,
            })?;
        p.width = width;
        p.height = height;
        self.record(Mutation::SetPictureSize {
            picture,
            width,
            height,
        });
        Ok(())
    }
}
