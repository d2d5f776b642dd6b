use crate::args::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

pub fn create_progress_bar(args: &Args, len: usize) -> ProgressBar {
    if args.quiet {
        ProgressBar::hidden()
    } else {
        let progress = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            progress.set_style(style);
        }
        progress
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked from `--quiet`.
pub fn init_tracing(args: &Args) {
    let default_level = if args.quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
