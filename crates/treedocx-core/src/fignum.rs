//! Figure, table and listing numbers
//!
//! The documentation toolchain numbers figures per source document:
//! `docname -> figtype -> node id -> [chapter, ..., number]`. After assembly
//! the documents are merged, so lookups are keyed by the origin document of
//! the node being captioned (`"docname/figtype"`).

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Figure numbers as produced by the toolchain, per document
pub type TocFigureNumbers = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<u32>>>>;

/// Figure numbers keyed by `"origin/figtype"`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureNumbers {
    by_origin: HashMap<String, HashMap<String, Vec<u32>>>,
}

impl FigureNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a per-document table into origin-keyed aliases
    pub fn from_toc(toc: &TocFigureNumbers) -> Self {
        let mut numbers = Self::new();
        for (docname, figtypes) in toc {
            for (figtype, ids) in figtypes {
                for (id, value) in ids {
                    numbers.insert(docname, figtype, id, value.clone());
                }
            }
        }
        numbers
    }

    /// Read a `fignumbers.json` file in the per-document layout
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let toc: TocFigureNumbers =
            serde_json::from_str(&content).map_err(|e| CoreError::json(path, e))?;
        Ok(Self::from_toc(&toc))
    }

    pub fn insert(&mut self, origin: &str, figtype: &str, id: &str, numbers: Vec<u32>) {
        self.by_origin
            .entry(origin_key(origin, figtype))
            .or_default()
            .insert(id.to_string(), numbers);
    }

    pub fn lookup(&self, origin: &str, figtype: &str, id: &str) -> Option<&[u32]> {
        self.by_origin
            .get(&origin_key(origin, figtype))
            .and_then(|ids| ids.get(id))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}

fn origin_key(origin: &str, figtype: &str) -> String {
    format!("{}/{}", origin, figtype)
}

/// Substitute dotted numbers into a caption pattern
///
/// ```
/// use treedocx_core::fignum::format_prefix;
///
/// assert_eq!(format_prefix("Fig. %s", &[2, 3]), "Fig. 2.3");
/// assert_eq!(format_prefix("Table", &[4]), "Table");
/// ```
pub fn format_prefix(pattern: &str, numbers: &[u32]) -> String {
    let dotted = numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".");
    pattern.replacen("%s", &dotted, 1)
}
