//! HTTP 429 handling shared by the source and sink clients.
//!
//! [`RateLimitedClient::execute`] keeps re-sending a request for as long as the
//! server answers `429 Too Many Requests`. The wait between attempts comes from
//! the `Retry-After` header, which the upstream services send as a number of
//! **milliseconds**. There is no retry cap and no jitter.
//!
//! Waiting goes through the [`Sleeper`] trait so tests can observe the
//! requested delays without actually sleeping.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::warn;

/// Used when `Retry-After` is missing or not an integer.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Reads `Retry-After` as milliseconds, falling back to [`DEFAULT_RETRY_DELAY`].
pub fn retry_after_delay(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_RETRY_DELAY)
}

#[derive(Clone)]
pub struct RateLimitedClient {
    http: Client,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimitedClient {
    pub fn new(http: Client) -> Self {
        Self::with_sleeper(http, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(http: Client, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { http, sleeper }
    }

    /// Sends the request produced by `build` until the response is not a 429.
    ///
    /// `build` is called once per attempt, since bodies such as multipart
    /// forms cannot be replayed. Transport errors are returned immediately.
    pub async fn execute<F>(&self, build: F) -> Result<Response, reqwest::Error>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        loop {
            let response = build(&self.http).send().await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let delay = retry_after_delay(response.headers());
            warn!(
                url = %response.url(),
                wait_ms = delay.as_millis() as u64,
                "Rate limited, waiting before retrying"
            );
            drop(response);
            self.sleeper.sleep(delay).await;
        }
    }
}
