//! Source file registry
//!
//! Slot 0 is a placeholder file with no path; every type and function points
//! at it until the producer tells us the real file.

use crate::node::{SourceFile, SourceFileId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct SourceFileRegistry {
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, SourceFileId>,
}

impl SourceFileRegistry {
    pub fn new() -> Self {
        Self {
            files: vec![SourceFile::new(None)],
            by_path: HashMap::new(),
        }
    }

    /// Get or create the file entry for a path
    pub fn get_or_create(&mut self, path: impl AsRef<Path>) -> SourceFileId {
        let path = path.as_ref();
        if let Some(id) = self.by_path.get(path) {
            return *id;
        }
        let id = SourceFileId::from_index(self.files.len());
        self.files.push(SourceFile::new(Some(path.to_path_buf())));
        self.by_path.insert(path.to_path_buf(), id);
        id
    }

    pub fn get(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Number of real files (the placeholder is not counted)
    pub fn len(&self) -> usize {
        self.files.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SourceFileRegistry {
    fn default() -> Self {
        Self::new()
    }
}
