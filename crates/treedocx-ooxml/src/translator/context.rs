//! Mutable state of one translation
//!
//! Everything the walk needs between visits lives here: the paragraph and
//! run cursors plus one stack per kind of nesting. [`ContextMark`] captures
//! the depth of every stack so the walker can check that a subtree left them
//! as it found them, and restore them when a visit fails.

use treedocx_core::SectionNumbering;

use crate::error::{OoxmlError, Result};
use crate::model::{Container, ParagraphId, RunId, TableId};
use crate::numbering::NumId;
use crate::styles::StyleRole;

/// Cell cursor of an open table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFrame {
    pub table: TableId,
    pub row: usize,
    pub col: usize,
}

impl TableFrame {
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            row: 0,
            col: 0,
        }
    }
}

/// Section numbering state saved by a numbering scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingScope {
    pub numbered: usize,
    pub numbered_depth: usize,
}

/// Depth of every stack and counter at one point of the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMark {
    containers: usize,
    paragraph_styles: usize,
    run_styles: usize,
    indent: usize,
    lists: usize,
    sections: usize,
    section_depth: usize,
    scopes: usize,
    tables: usize,
    docnames: usize,
}

impl ContextMark {
    /// Human-readable list of the stacks that differ
    pub fn diff(&self, other: &ContextMark) -> String {
        let pairs = [
            ("containers", self.containers, other.containers),
            ("paragraph styles", self.paragraph_styles, other.paragraph_styles),
            ("run styles", self.run_styles, other.run_styles),
            ("indent", self.indent, other.indent),
            ("list numbering", self.lists, other.lists),
            ("section numbering", self.sections, other.sections),
            ("section depth", self.section_depth, other.section_depth),
            ("numbering scopes", self.scopes, other.scopes),
            ("tables", self.tables, other.tables),
            ("documents", self.docnames, other.docnames),
        ];
        pairs
            .iter()
            .filter(|(_, before, after)| before != after)
            .map(|(name, before, after)| format!("{} {} -> {}", name, before, after))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// State of one translation
#[derive(Debug, Clone)]
pub struct TranslationContext {
    /// Paragraph receiving runs, if any
    pub paragraph: Option<ParagraphId>,
    /// Run receiving inline pictures, if any
    pub run: Option<RunId>,
    /// The next paragraph of a list item carries the list marker
    pub first_in_list_item: bool,
    /// Levels of section numbering; 0 when inactive
    pub numbered: usize,
    /// Section depth at which numbering was switched on
    pub numbered_depth: usize,
    pub section_depth: usize,
    pub indent: usize,
    containers: Vec<Container>,
    paragraph_styles: Vec<StyleRole>,
    run_styles: Vec<StyleRole>,
    lists: Vec<NumId>,
    base_section: NumId,
    sections: Vec<Option<NumId>>,
    scopes: Vec<NumberingScope>,
    tables: Vec<TableFrame>,
    docnames: Vec<String>,
}

impl TranslationContext {
    /// Fresh state for a document; `base_section` numbers top-level headings
    pub fn new(docname: impl Into<String>, base_section: NumId) -> Self {
        Self {
            paragraph: None,
            run: None,
            first_in_list_item: false,
            numbered: 0,
            numbered_depth: 0,
            section_depth: 0,
            indent: 0,
            containers: vec![Container::Body],
            paragraph_styles: Vec::new(),
            run_styles: Vec::new(),
            lists: Vec::new(),
            base_section,
            sections: Vec::new(),
            scopes: Vec::new(),
            tables: Vec::new(),
            docnames: vec![docname.into()],
        }
    }

    /// Switch numbering on for the whole document
    pub fn with_section_numbering(mut self, numbering: &SectionNumbering) -> Self {
        self.numbered = numbering.max_depth;
        self.numbered_depth = numbering.start_depth.saturating_sub(1);
        self
    }

    pub fn mark(&self) -> ContextMark {
        ContextMark {
            containers: self.containers.len(),
            paragraph_styles: self.paragraph_styles.len(),
            run_styles: self.run_styles.len(),
            indent: self.indent,
            lists: self.lists.len(),
            sections: self.sections.len(),
            section_depth: self.section_depth,
            scopes: self.scopes.len(),
            tables: self.tables.len(),
            docnames: self.docnames.len(),
        }
    }

    /// Restore every stack to `mark` and drop the cursors
    pub fn unwind(&mut self, mark: &ContextMark) {
        self.containers.truncate(mark.containers.max(1));
        self.paragraph_styles.truncate(mark.paragraph_styles);
        self.run_styles.truncate(mark.run_styles);
        self.indent = mark.indent;
        self.lists.truncate(mark.lists);
        self.sections.truncate(mark.sections);
        self.section_depth = mark.section_depth;
        while self.scopes.len() > mark.scopes {
            if let Some(scope) = self.scopes.pop() {
                self.numbered = scope.numbered;
                self.numbered_depth = scope.numbered_depth;
            }
        }
        self.tables.truncate(mark.tables);
        self.docnames.truncate(mark.docnames.max(1));
        self.paragraph = None;
        self.run = None;
    }

    // ===== Containers =====

    /// Active destination for new paragraphs and tables
    pub fn container(&self) -> Container {
        self.containers.last().copied().unwrap_or(Container::Body)
    }

    pub fn push_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn pop_container(&mut self) -> Result<Container> {
        if self.containers.len() <= 1 {
            return Err(underflow("container"));
        }
        self.containers.pop().ok_or_else(|| underflow("container"))
    }

    // ===== Styles =====

    /// Style for the next block paragraph
    pub fn paragraph_style(&self) -> Option<StyleRole> {
        self.paragraph_styles.last().copied()
    }

    pub fn push_paragraph_style(&mut self, style: StyleRole) {
        self.paragraph_styles.push(style);
    }

    pub fn pop_paragraph_style(&mut self) -> Result<StyleRole> {
        self.paragraph_styles
            .pop()
            .ok_or_else(|| underflow("paragraph style"))
    }

    /// Pending character style for the next run
    pub fn run_style(&self) -> Option<StyleRole> {
        self.run_styles.last().copied()
    }

    pub fn push_run_style(&mut self, style: StyleRole) {
        self.run_styles.push(style);
    }

    pub fn pop_run_style(&mut self) -> Result<StyleRole> {
        self.run_styles.pop().ok_or_else(|| underflow("run style"))
    }

    // ===== Lists =====

    pub fn push_list(&mut self, num: NumId) {
        self.indent += 1;
        self.lists.push(num);
    }

    pub fn pop_list(&mut self) -> Result<NumId> {
        let num = self.lists.pop().ok_or_else(|| underflow("list numbering"))?;
        self.indent = self.indent.saturating_sub(1);
        Ok(num)
    }

    /// Numbering of the innermost open list
    pub fn list(&self) -> Option<NumId> {
        self.lists.last().copied()
    }

    /// List level for the current indentation
    pub fn level(&self) -> u8 {
        self.indent.saturating_sub(1).min(8) as u8
    }

    // ===== Sections =====

    /// Enter a section; `num` is its numbering instance when numbering is on
    pub fn push_section(&mut self, num: Option<NumId>) {
        self.section_depth += 1;
        self.sections.push(num);
    }

    pub fn pop_section(&mut self) -> Result<Option<NumId>> {
        let num = self.sections.pop().ok_or_else(|| underflow("section"))?;
        self.section_depth = self.section_depth.saturating_sub(1);
        Ok(num)
    }

    /// Instance that numbers the current section's heading: the one opened
    /// by the enclosing numbered section, or the document's base instance
    pub fn heading_numbering(&self) -> NumId {
        std::iter::once(self.base_section)
            .chain(self.sections.iter().flatten().copied())
            .rev()
            .nth(1)
            .unwrap_or(self.base_section)
    }

    /// Save the numbering state before a scope may change it
    pub fn push_scope(&mut self) {
        self.scopes.push(NumberingScope {
            numbered: self.numbered,
            numbered_depth: self.numbered_depth,
        });
    }

    pub fn pop_scope(&mut self) -> Result<()> {
        let scope = self.scopes.pop().ok_or_else(|| underflow("numbering scope"))?;
        self.numbered = scope.numbered;
        self.numbered_depth = scope.numbered_depth;
        Ok(())
    }

    // ===== Tables =====

    pub fn push_table(&mut self, table: TableId) {
        self.tables.push(TableFrame::new(table));
    }

    pub fn pop_table(&mut self) -> Result<TableFrame> {
        self.tables.pop().ok_or_else(|| underflow("table"))
    }

    pub fn table(&self) -> Option<TableFrame> {
        self.tables.last().copied()
    }

    pub fn table_mut(&mut self) -> Option<&mut TableFrame> {
        self.tables.last_mut()
    }

    // ===== Documents =====

    pub fn push_docname(&mut self, docname: impl Into<String>) {
        self.docnames.push(docname.into());
    }

    pub fn pop_docname(&mut self) -> Result<String> {
        if self.docnames.len() <= 1 {
            return Err(underflow("document"));
        }
        self.docnames.pop().ok_or_else(|| underflow("document"))
    }

    /// Document the current node was inlined from
    pub fn docname(&self) -> &str {
        self.docnames.last().map(String::as_str).unwrap_or_default()
    }
}

fn underflow(stack: &str) -> OoxmlError {
    OoxmlError::UnbalancedState {
        kind: stack.to_string(),
        detail: "pop from empty stack".to_string(),
    }
}
