use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Everything that can abort an archive run.
///
/// Rate limiting is absorbed by the API client's retry loop and only shows up
/// here once the retries are exhausted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DISCORD_BOT_TOKEN is not set")]
    MissingToken,

    #[error("bot token contains characters not allowed in a header")]
    InvalidToken,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("still rate limited after {attempts} attempts (retry after {retry_after:?})")]
    RateLimited { attempts: u32, retry_after: Duration },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archiving channel {channel} timed out after {after:?}")]
    Timeout { channel: String, after: Duration },
}

impl Error {
    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
