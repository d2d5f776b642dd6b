use crate::discord::DEFAULT_API_BASE;
use crate::execute::ArchiveMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "discord-archive")]
#[clap(author, version, about)]
pub struct Args {
    /// Bot token used to authenticate against the API.
    #[clap(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
    /// Directory holding one sub-directory per archived channel.
    #[clap(
        long,
        env = "DISCORD_ARCHIVE_DIR",
        default_value = "/data/moltbot/discord/messages",
        global = true
    )]
    pub archive_dir: PathBuf,
    /// Base URL of the REST API.
    #[clap(long, env = "DISCORD_API_BASE", default_value = DEFAULT_API_BASE, hide = true, global = true)]
    pub api_base: String,
    /// Suppress progress output and informational logs if set.
    #[clap(short, long, global = true)]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Archive new messages of one channel.
    Archive {
        channel_id: String,
        /// Ignore the stored cursor and fetch the whole history.
        #[clap(long)]
        backfill: bool,
    },
    /// Archive every text channel of a guild.
    ArchiveAll {
        guild_id: String,
        /// Ignore the stored cursors and fetch the whole history.
        #[clap(long)]
        backfill: bool,
    },
}

pub fn archive_mode(backfill: bool) -> ArchiveMode {
    if backfill {
        ArchiveMode::FullBackfill
    } else {
        ArchiveMode::Incremental
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_archive() {
        let args = Args::try_parse_from([
            "discord-archive",
            "archive",
            "1234",
            "--backfill",
            "--archive-dir",
            "/tmp/archive",
            "--token",
            "secret",
        ])
        .unwrap();
        assert_eq!(args.archive_dir, PathBuf::from("/tmp/archive"));
        assert_eq!(args.token.as_deref(), Some("secret"));
        match args.command {
            Command::Archive {
                channel_id,
                backfill,
            } => {
                assert_eq!(channel_id, "1234");
                assert_eq!(archive_mode(backfill), ArchiveMode::FullBackfill);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_archive_all_defaults_to_incremental() {
        let args = Args::try_parse_from(["discord-archive", "-q", "archive-all", "99"]).unwrap();
        assert!(args.quiet);
        match args.command {
            Command::ArchiveAll { guild_id, backfill } => {
                assert_eq!(guild_id, "99");
                assert_eq!(archive_mode(backfill), ArchiveMode::Incremental);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
