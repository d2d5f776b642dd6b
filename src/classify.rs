use crate::error::{Error, Result};
use crate::message::Message;
use crate::target::ArchiveTarget;
use chrono::DateTime;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub const BUCKET_SUFFIX: &str = ".jsonl";

/// Bucket used for messages whose timestamp cannot be parsed.
pub const UNKNOWN_PERIOD: &str = "unknown";

/// Returns the `YYYY-MM` label of the calendar month the timestamp falls in,
/// using the offset the timestamp itself carries.
pub fn period_key(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_else(|_| UNKNOWN_PERIOD.to_string())
}

/// Append-only line storage addressed by (target, bucket).
pub trait BucketStore {
    fn append_line(&self, target: &ArchiveTarget, bucket: &str, line: &str) -> Result<()>;
}

/// Stores each bucket as `<target dir>/<bucket>.jsonl`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileBucketStore;

impl FileBucketStore {
    pub fn bucket_path(target: &ArchiveTarget, bucket: &str) -> PathBuf {
        target.dir.join(format!("{}{}", bucket, BUCKET_SUFFIX))
    }
}

impl BucketStore for FileBucketStore {
    fn append_line(&self, target: &ArchiveTarget, bucket: &str, line: &str) -> Result<()> {
        let path = Self::bucket_path(target, bucket);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::persistence(&path, e))?;
        // One write per line so a line is never split across two appends.
        file.write_all(format!("{}\n", line).as_bytes())
            .map_err(|e| Error::persistence(&path, e))
    }
}

/// Appends `msg` to the bucket of its month and returns that bucket's key.
pub fn partition(
    store: &impl BucketStore,
    target: &ArchiveTarget,
    msg: &Message,
) -> Result<String> {
    let key = period_key(&msg.timestamp);
    store.append_line(target, &key, &msg.to_line()?)?;
    Ok(key)
}
