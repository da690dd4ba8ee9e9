//! In-memory document model

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{BodyArena, DocumentModel, Mutation, PictureId, RunId};
use crate::error::Result;
use crate::image::probe_image;
use crate::numbering::{NumId, NumberingTemplate};
use crate::template::DEFAULT_BLOCK_WIDTH;

/// A document that is never serialized
///
/// Picture sizes can be registered up front; unregistered pictures are
/// probed from disk.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    arena: BodyArena,
    block_width: i64,
    picture_sizes: HashMap<PathBuf, (i64, i64)>,
    next_num: u32,
    continuation: Option<NumId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            arena: BodyArena::new(),
            block_width: DEFAULT_BLOCK_WIDTH,
            picture_sizes: HashMap::new(),
            next_num: 1,
            continuation: None,
        }
    }

    pub fn with_block_width(mut self, width: i64) -> Self {
        self.block_width = width;
        self
    }

    /// Natural size in EMUs to report for a picture path
    pub fn with_picture_size(mut self, path: impl Into<PathBuf>, width: i64, height: i64) -> Self {
        self.picture_sizes.insert(path.into(), (width, height));
        self
    }

    fn next_num(&mut self, template: NumberingTemplate) -> NumId {
        let num = NumId(self.next_num);
        self.next_num += 1;
        self.arena
            .record(Mutation::AllocateNumbering { num, template });
        num
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel for MemoryDocument {
    fn arena(&self) -> &BodyArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut BodyArena {
        &mut self.arena
    }

    fn allocate_numbering(&mut self, template: NumberingTemplate) -> NumId {
        self.next_num(template)
    }

    fn continuation_numbering(&mut self) -> NumId {
        match self.continuation {
            Some(num) => num,
            None => {
                let num = self.next_num(NumberingTemplate::Continuation);
                self.continuation = Some(num);
                num
            }
        }
    }

    fn add_picture(&mut self, run: RunId, path: &Path) -> Result<PictureId> {
        let (width, height) = match self.picture_sizes.get(path) {
            Some(size) => *size,
            None => probe_image(path)?.size_emu(),
        };
        self.arena.add_picture(run, path.to_path_buf(), width, height)
    }

    fn block_width(&self) -> i64 {
        self.block_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Container;

    #[test]
    fn test_registered_picture_size() {
        let mut doc = MemoryDocument::new().with_picture_size("a.png", 8000, 4000);
        let p = doc.add_paragraph(Container::Body, "", None).unwrap();
        let r = doc.add_run(p, "", None).unwrap();
        let pic = doc.add_picture(r, Path::new("a.png")).unwrap();
        assert_eq!(doc.picture_size(pic).unwrap(), (8000, 4000));
    }

    #[test]
    fn test_unregistered_missing_picture_fails() {
        let mut doc = MemoryDocument::new();
        let p = doc.add_paragraph(Container::Body, "", None).unwrap();
        let r = doc.add_run(p, "", None).unwrap();
        assert!(doc.add_picture(r, Path::new("/nonexistent/x.png")).is_err());
    }

    #[test]
    fn test_numbering_ids() {
        let mut doc = MemoryDocument::new();
        let a = doc.allocate_numbering(NumberingTemplate::Bullet);
        let b = doc.allocate_numbering(NumberingTemplate::Bullet);
        assert_ne!(a, b);
        let c = doc.continuation_numbering();
        assert_eq!(doc.continuation_numbering(), c);
        assert_eq!(doc.journal().len(), 3);
    }
}
