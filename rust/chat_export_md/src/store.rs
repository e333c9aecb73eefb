// Narrow read/write seam between the exporter and wherever documents live.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::error::ExportError;

pub trait DocumentStore {
    /// Reads the whole document as UTF-8 text.
    fn read(&self, path: &Path) -> Result<String, ExportError>;

    /// Replaces the document at `path` with `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<(), ExportError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn read(&self, path: &Path) -> Result<String, ExportError> {
        std::fs::read_to_string(path).map_err(|source| ExportError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), ExportError> {
        std::fs::write(path, contents).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory store keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), contents.into());
        self
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String, ExportError> {
        self.get(path).ok_or_else(|| ExportError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(ErrorKind::NotFound, "no such document"),
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), ExportError> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
