use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// An archivable source (one channel) together with the directory that holds
/// its buckets and cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    pub id: String,
    pub dir: PathBuf,
}

impl ArchiveTarget {
    pub fn new(archive_dir: &Path, id: &str) -> Self {
        ArchiveTarget {
            id: id.to_string(),
            dir: archive_dir.join(id),
        }
    }

    /// Creates the target directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(&self.dir, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = ArchiveTarget::new(&tmp.path().join("messages"), "1234");
        assert_eq!(target.dir, tmp.path().join("messages").join("1234"));
        target.ensure_dir().unwrap();
        target.ensure_dir().unwrap();
        assert!(target.dir.is_dir());
    }
}
