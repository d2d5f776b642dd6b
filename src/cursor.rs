use crate::error::{Error, Result};
use crate::target::ArchiveTarget;
use std::fs;
use std::path::PathBuf;

/// Persists the id of the last archived message per target.
pub trait CursorStore {
    /// Returns `None` when nothing was stored or the stored value can't be read.
    fn load(&self, target: &ArchiveTarget) -> Option<String>;
    /// Replaces any previously stored value.
    fn save(&self, target: &ArchiveTarget, id: &str) -> Result<()>;
}

/// Keeps the cursor in `<target dir>/.cursor`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCursorStore;

impl FileCursorStore {
    pub const FILE_NAME: &'static str = ".cursor";

    pub fn cursor_path(target: &ArchiveTarget) -> PathBuf {
        target.dir.join(Self::FILE_NAME)
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self, target: &ArchiveTarget) -> Option<String> {
        let value = fs::read_to_string(Self::cursor_path(target)).ok()?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn save(&self, target: &ArchiveTarget, id: &str) -> Result<()> {
        let path = Self::cursor_path(target);
        fs::write(&path, id).map_err(|e| Error::persistence(&path, e))
    }
}
