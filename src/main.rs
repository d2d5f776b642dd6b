mod args;
mod classify;
mod collect;
mod cursor;
mod discord;
mod error;
mod execute;
mod fetch;
mod message;
mod target;
mod utils;

use anyhow::Context;
use args::{archive_mode, Args, Command};
use classify::FileBucketStore;
use clap::Parser;
use cursor::FileCursorStore;
use discord::DiscordClient;
use execute::{ArchiveMode, ArchiveOptions};
use std::process::ExitCode;
use target::ArchiveTarget;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    utils::init_tracing(&args);
    match do_main(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn do_main(args: &Args) -> anyhow::Result<()> {
    let token = args.token.as_deref().ok_or(error::Error::MissingToken)?;
    let client = DiscordClient::new(token, &args.api_base)?;

    match &args.command {
        Command::Archive {
            channel_id,
            backfill,
        } => archive_channel(args, &client, channel_id, archive_mode(*backfill)).await,
        Command::ArchiveAll { guild_id, backfill } => {
            archive_guild(args, &client, guild_id, archive_mode(*backfill)).await
        }
    }
}

async fn archive_channel(
    args: &Args,
    client: &DiscordClient,
    channel_id: &str,
    mode: ArchiveMode,
) -> anyhow::Result<()> {
    let target = ArchiveTarget::new(&args.archive_dir, channel_id);
    let report = execute::archive_target(
        client,
        &FileBucketStore,
        &FileCursorStore,
        &target,
        mode,
        &ArchiveOptions::default(),
    )
    .await
    .with_context(|| format!("archiving channel {}", channel_id))?;

    println!("Archive complete:");
    println!("  channel: {}", target.id);
    println!("  archived: {}", report.archived);
    println!("  directory: {}", target.dir.display());
    if !report.buckets.is_empty() {
        let buckets: Vec<&str> = report.buckets.iter().map(String::as_str).collect();
        println!("  months: {}", buckets.join(", "));
    }
    if let Some(cursor) = &report.cursor {
        match &report.previous_cursor {
            Some(previous) if mode == ArchiveMode::Incremental => {
                println!("  cursor: {} -> {}", previous, cursor)
            }
            _ => println!("  cursor: {}", cursor),
        }
    }
    Ok(())
}

async fn archive_guild(
    args: &Args,
    client: &DiscordClient,
    guild_id: &str,
    mode: ArchiveMode,
) -> anyhow::Result<()> {
    let channels = client
        .guild_channels(guild_id)
        .await
        .with_context(|| format!("listing channels of guild {}", guild_id))?;
    let channels = collect::text_channels(channels);
    if channels.is_empty() {
        println!("No text channels in guild {}", guild_id);
        return Ok(());
    }
    tracing::info!(guild = %guild_id, count = channels.len(), "archiving text channels");

    let progress = utils::create_progress_bar(args, channels.len());
    let summary = collect::archive_channels(
        client,
        &FileBucketStore,
        &FileCursorStore,
        &args.archive_dir,
        &channels,
        mode,
        &ArchiveOptions::default(),
        collect::CHANNEL_DELAY,
        &progress,
    )
    .await;

    println!("Archive complete:");
    println!("  succeeded: {}/{}", summary.succeeded, summary.total);
    if summary.failed > 0 {
        println!("  failed: {}/{}", summary.failed, summary.total);
    }
    Ok(())
}
