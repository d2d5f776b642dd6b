//! Minimal bot-token client for the Discord REST API.
//!
//! Only the two endpoints the archiver needs are exposed. Rate limiting is
//! handled here: a 429 response is retried after the server-provided delay,
//! so callers only ever see it once the retries are used up.

use crate::error::{Error, Result};
use crate::message::{Channel, Message};
use backoff::future::retry_notify;
use backoff::{Error as BackoffError, ExponentialBackoffBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_REPOSITORY"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// A request is sent at most this many times while rate limited.
const MAX_ATTEMPTS: u32 = 4;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

pub struct DiscordClient {
    http: Client,
    api_base: String,
}

impl DiscordClient {
    pub fn new(token: &str, api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {}", token))
            .map_err(|_| Error::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(DiscordClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Up to `limit` messages posted after `after`, newest first.
    pub async fn channel_messages(
        &self,
        channel_id: &str,
        after: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let path = format!(
            "/channels/{}/messages?limit={}&after={}",
            channel_id, limit, after
        );
        self.get_json(&path).await
    }

    pub async fn guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>> {
        self.get_json(&format!("/guilds/{}/channels", guild_id)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let url = url.as_str();
        let mut attempt = 0;

        // Only 429s are retried, after the delay the server asks for. The
        // policy itself has no time limit.
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(DEFAULT_RETRY_AFTER)
            .with_max_elapsed_time(None)
            .build();

        retry_notify(
            policy,
            move || {
                attempt += 1;
                self.try_get_json(url, attempt)
            },
            |err: Error, wait: Duration| {
                tracing::warn!(path, ?wait, error = %err, "rate limited, retrying");
            },
        )
        .await
    }

    async fn try_get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        attempt: u32,
    ) -> std::result::Result<T, BackoffError<Error>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BackoffError::permanent(e.into()))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after(response.headers());
            let err = Error::RateLimited {
                attempts: attempt,
                retry_after,
            };
            return Err(if attempt < MAX_ATTEMPTS {
                BackoffError::retry_after(err, retry_after)
            } else {
                BackoffError::permanent(err)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackoffError::permanent(e.into()))?;
        if status.is_client_error() || status.is_server_error() {
            return Err(BackoffError::permanent(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            }));
        }
        serde_json::from_str(&body).map_err(|e| BackoffError::permanent(e.into()))
    }
}

fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Prefers the `message` field of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("2.5"));
        assert_eq!(retry_after(&headers), Duration::from_millis(2500));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-1"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message": "Unknown Channel", "code": 10003}"#),
            "Unknown Channel"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(r#"{"code": 0}"#), r#"{"code": 0}"#);
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let client = DiscordClient::new("token", "http://127.0.0.1:9/api/").unwrap();
        assert_eq!(client.api_base, "http://127.0.0.1:9/api");
    }
}
