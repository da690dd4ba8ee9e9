//! Cell layout of one table
//!
//! Every grid position maps to a cell handle. Merging a region points all of
//! its positions at the region's top-left cell, so two positions belong to
//! the same merged cell exactly when their handles compare equal.

use std::collections::HashMap;

use serde::Serialize;

use super::CellId;
use crate::error::{OoxmlError, Result};

/// Rectangle covered by a cell, in grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Span {
    fn single(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            rows: 1,
            cols: 1,
        }
    }

    fn within(&self, outer: &Span) -> bool {
        self.row >= outer.row
            && self.col >= outer.col
            && self.row + self.rows <= outer.row + outer.rows
            && self.col + self.cols <= outer.col + outer.cols
    }
}

/// Result of a merge: the surviving cell and the cells it absorbed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub cell: CellId,
    pub absorbed: Vec<CellId>,
}

#[derive(Debug, Clone)]
pub struct TableGrid {
    rows: usize,
    cols: usize,
    positions: Vec<CellId>,
    spans: HashMap<CellId, Span>,
}

impl TableGrid {
    /// Grid of `rows` x `cols` single cells numbered from `first_cell`
    pub fn new(rows: usize, cols: usize, first_cell: usize) -> Self {
        let mut positions = Vec::with_capacity(rows * cols);
        let mut spans = HashMap::new();
        for row in 0..rows {
            for col in 0..cols {
                let cell = CellId(first_cell + row * cols + col);
                positions.push(cell);
                spans.insert(cell, Span::single(row, col));
            }
        }
        Self {
            rows,
            cols,
            positions,
            spans,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at a position
    pub fn get(&self, row: usize, col: usize) -> Option<CellId> {
        if row < self.rows && col < self.cols {
            self.positions.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Area covered by a cell
    pub fn span(&self, cell: CellId) -> Option<Span> {
        self.spans.get(&cell).copied()
    }

    /// Number of distinct cells left after merges
    pub fn distinct_cells(&self) -> usize {
        self.spans.len()
    }

    /// Merge the rectangle spanned by two corner positions.
    ///
    /// Fails when a corner lies outside the grid or when a cell that is
    /// already merged reaches outside the rectangle.
    pub fn merge(&mut self, a: (usize, usize), b: (usize, usize)) -> Result<Merge> {
        let region = Span {
            row: a.0.min(b.0),
            col: a.1.min(b.1),
            rows: a.0.max(b.0) - a.0.min(b.0) + 1,
            cols: a.1.max(b.1) - a.1.min(b.1) + 1,
        };
        if region.row + region.rows > self.rows || region.col + region.cols > self.cols {
            return Err(OoxmlError::InvalidSpan(format!(
                "({}, {})-({}, {}) outside {}x{} table",
                a.0, a.1, b.0, b.1, self.rows, self.cols
            )));
        }

        let mut absorbed = Vec::new();
        let survivor = self.positions[region.row * self.cols + region.col];
        for row in region.row..region.row + region.rows {
            for col in region.col..region.col + region.cols {
                let cell = self.positions[row * self.cols + col];
                let span = self.spans[&cell];
                if !span.within(&region) {
                    return Err(OoxmlError::InvalidSpan(format!(
                        "cell at ({}, {}) already spans beyond the requested region",
                        row, col
                    )));
                }
                if cell != survivor && !absorbed.contains(&cell) {
                    absorbed.push(cell);
                }
            }
        }

        for row in region.row..region.row + region.rows {
            for col in region.col..region.col + region.cols {
                self.positions[row * self.cols + col] = survivor;
            }
        }
        for cell in &absorbed {
            self.spans.remove(cell);
        }
        self.spans.insert(survivor, region);

        Ok(Merge {
            cell: survivor,
            absorbed,
        })
    }
}
