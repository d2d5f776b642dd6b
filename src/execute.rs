use crate::classify::{partition, BucketStore};
use crate::cursor::CursorStore;
use crate::error::Result;
use crate::fetch::{is_exhausted, PageSource, PAGE_SIZE, START_TOKEN};
use crate::target::ArchiveTarget;
use std::collections::BTreeSet;
use std::time::Duration;

/// Pause between two full pages, to stay under the API's request cadence.
pub const PAGE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    /// Resume after the stored cursor, or from the start if there is none.
    #[default]
    Incremental,
    /// Ignore the stored cursor and walk the whole history again. Messages
    /// already in the buckets are appended a second time.
    FullBackfill,
}

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub page_size: usize,
    pub page_delay: Duration,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            page_size: PAGE_SIZE,
            page_delay: PAGE_DELAY,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archived: usize,
    pub buckets: BTreeSet<String>,
    pub previous_cursor: Option<String>,
    /// Set only when this run wrote a new cursor.
    pub cursor: Option<String>,
}

/// Archives everything the source has after the starting point into monthly
/// buckets, then records the newest archived id as the new cursor.
///
/// The cursor is written once, after the last page. A run that fails halfway
/// keeps what it already appended but leaves the cursor where it was, so the
/// next incremental run fetches those messages again.
pub async fn archive_target<S, B, C>(
    source: &S,
    buckets: &B,
    cursors: &C,
    target: &ArchiveTarget,
    mode: ArchiveMode,
    options: &ArchiveOptions,
) -> Result<ArchiveReport>
where
    S: PageSource,
    B: BucketStore,
    C: CursorStore,
{
    target.ensure_dir()?;

    let previous_cursor = cursors.load(target);
    let mut token = match mode {
        ArchiveMode::FullBackfill => START_TOKEN.to_string(),
        ArchiveMode::Incremental => previous_cursor
            .clone()
            .unwrap_or_else(|| START_TOKEN.to_string()),
    };
    match (&previous_cursor, mode) {
        (Some(cursor), ArchiveMode::Incremental) => {
            tracing::info!(channel = %target.id, %cursor, "resuming after previous cursor")
        }
        _ => tracing::info!(channel = %target.id, "archiving full history"),
    }

    let mut report = ArchiveReport {
        previous_cursor,
        ..ArchiveReport::default()
    };
    let mut last_seen = None;

    loop {
        let mut page = source.fetch_page(target, &token, options.page_size).await?;
        if page.is_empty() {
            break;
        }
        let fetched = page.len();

        // Pages come newest first.
        page.reverse();
        for msg in &page {
            report.buckets.insert(partition(buckets, target, msg)?);
            report.archived += 1;
        }
        if let Some(newest) = page.last() {
            token = newest.id.clone();
            last_seen = Some(newest.id.clone());
        }
        tracing::debug!(channel = %target.id, archived = report.archived, "archived so far");

        if is_exhausted(fetched, options.page_size) {
            break;
        }
        tokio::time::sleep(options.page_delay).await;
    }

    if let Some(id) = &last_seen {
        cursors.save(target, id)?;
    }
    report.cursor = last_seen;
    Ok(report)
}
