use crate::classify::BucketStore;
use crate::cursor::CursorStore;
use crate::error::Error;
use crate::execute::{archive_target, ArchiveMode, ArchiveOptions};
use crate::fetch::PageSource;
use crate::message::Channel;
use crate::target::ArchiveTarget;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Upper bound for archiving a single channel of a guild.
pub const CHANNEL_TIMEOUT: Duration = Duration::from_secs(600);

/// Pause between two channels of a guild.
pub const CHANNEL_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Keeps the text channels, sorted by channel position.
pub fn text_channels(channels: Vec<Channel>) -> Vec<Channel> {
    let mut text: Vec<Channel> = channels.into_iter().filter(Channel::is_text).collect();
    text.sort_by_key(|ch| ch.position);
    text
}

/// Archives each channel in turn. A channel that fails or times out is
/// counted and skipped; the remaining channels still run.
pub async fn archive_channels<S, B, C>(
    source: &S,
    buckets: &B,
    cursors: &C,
    archive_dir: &Path,
    channels: &[Channel],
    mode: ArchiveMode,
    options: &ArchiveOptions,
    channel_delay: Duration,
    progress: &ProgressBar,
) -> GuildSummary
where
    S: PageSource,
    B: BucketStore,
    C: CursorStore,
{
    let mut summary = GuildSummary {
        total: channels.len(),
        ..GuildSummary::default()
    };
    progress.tick();
    for (i, ch) in channels.iter().enumerate() {
        let target = ArchiveTarget::new(archive_dir, &ch.id);
        progress.set_message(format!("#{}", ch.name));
        let result = tokio::time::timeout(
            CHANNEL_TIMEOUT,
            archive_target(source, buckets, cursors, &target, mode, options),
        )
        .await
        .unwrap_or_else(|_| {
            Err(Error::Timeout {
                channel: ch.id.clone(),
                after: CHANNEL_TIMEOUT,
            })
        });
        match result {
            Ok(report) => {
                progress.suspend(|| {
                    tracing::info!(
                        channel = %ch.id,
                        name = %ch.name,
                        archived = report.archived,
                        "channel archived"
                    )
                });
                summary.succeeded += 1;
            }
            Err(e) => {
                progress.suspend(|| {
                    tracing::error!(channel = %ch.id, name = %ch.name, error = %e, "channel failed")
                });
                summary.failed += 1;
            }
        }
        progress.inc(1);
        if i + 1 < channels.len() {
            tokio::time::sleep(channel_delay).await;
        }
    }
    progress.finish_and_clear();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FileBucketStore;
    use crate::cursor::FileCursorStore;
    use crate::error::Result;
    use crate::execute::tests::FakeRemote;
    use crate::message::{test_message, Message};
    use async_trait::async_trait;

    /// A channel whose message endpoint never answers.
    struct Unresponsive;

    #[async_trait]
    impl PageSource for Unresponsive {
        async fn fetch_page(
            &self,
            _target: &ArchiveTarget,
            _after: &str,
            _limit: usize,
        ) -> Result<Vec<Message>> {
            std::future::pending().await
        }
    }

    fn channel(id: &str, kind: u8, position: i64) -> Channel {
        Channel {
            id: id.to_string(),
            name: format!("ch-{}", id),
            kind,
            position,
        }
    }

    #[test]
    fn test_text_channels() {
        let channels = vec![
            channel("1", 0, 3),
            channel("2", 4, 0),
            channel("3", 0, 1),
            channel("4", 2, 2),
            channel("5", 0, 2),
        ];
        let ids: Vec<String> = text_channels(channels).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["3", "5", "1"]);
    }

    #[tokio::test]
    async fn test_failed_channel_does_not_stop_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = FakeRemote::new(vec![
            test_message("1", "2024-03-01T00:00:00+00:00"),
            test_message("2", "2024-03-02T00:00:00+00:00"),
        ])
        .failing_on_call(1);
        let channels = vec![channel("10", 0, 0), channel("20", 0, 1)];
        let options = ArchiveOptions {
            page_delay: Duration::ZERO,
            ..ArchiveOptions::default()
        };

        let summary = archive_channels(
            &remote,
            &FileBucketStore,
            &FileCursorStore,
            tmp.path(),
            &channels,
            ArchiveMode::Incremental,
            &options,
            Duration::ZERO,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(
            summary,
            GuildSummary {
                total: 2,
                succeeded: 1,
                failed: 1,
            }
        );
        assert_eq!(remote.calls(), vec!["0", "0"]);
        let first = ArchiveTarget::new(tmp.path(), "10");
        let second = ArchiveTarget::new(tmp.path(), "20");
        assert_eq!(FileCursorStore.load(&first), None);
        assert_eq!(FileCursorStore.load(&second).as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_channel_counts_as_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let channels = vec![channel("10", 0, 0)];

        let summary = archive_channels(
            &Unresponsive,
            &FileBucketStore,
            &FileCursorStore,
            tmp.path(),
            &channels,
            ArchiveMode::Incremental,
            &ArchiveOptions::default(),
            Duration::ZERO,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(
            summary,
            GuildSummary {
                total: 1,
                succeeded: 0,
                failed: 1,
            }
        );
        let target = ArchiveTarget::new(tmp.path(), "10");
        assert_eq!(FileCursorStore.load(&target), None);
    }
}
