//! Retrying registry GETs that are throttled with 429
//!
//! Each request carries its own retry count and wait, so concurrent
//! prefetches that hit the limit never stretch or reset one another.

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Request, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

use super::NetworkingError;

/// How long and how often a throttled request is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Wait before the first retry
    pub initial: Duration,
    /// Upper bound for any single wait, including server-supplied ones
    pub max: Duration,
    pub multiplier: f64,
    /// Retries after the first attempt before giving up
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2.0,
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    /// Wait after the `retry`-th 429 (1-based), capped at `max`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Server-requested wait in whole seconds, when present and readable
    fn retry_after(&self, response: &Response) -> Option<Duration> {
        let seconds = response
            .headers()
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        Some(Duration::from_secs(seconds).min(self.max))
    }
}

/// reqwest client that retries 429 responses under a [`RetryPolicy`]
#[derive(Clone)]
pub struct ThrottledClient {
    client: Client,
    policy: RetryPolicy,
}

impl ThrottledClient {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Send `request`, retrying while the registry answers 429. Any other
    /// status is handed back to the caller unchanged.
    pub async fn execute(&self, request: Request) -> Result<Response, NetworkingError> {
        let mut retry = 0;

        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| NetworkingError::RateLimitError {
                    message: format!("request to {} cannot be replayed", request.url()),
                })?;
            let response = self.client.execute(attempt).await?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            retry += 1;
            if retry > self.policy.max_retries {
                return Err(NetworkingError::RateLimitError {
                    message: format!(
                        "still throttled after {} retries: {}",
                        self.policy.max_retries,
                        request.url()
                    ),
                });
            }

            let wait = self
                .policy
                .retry_after(&response)
                .unwrap_or_else(|| self.policy.delay_for(retry));
            warn!(
                "Throttled by {}, retrying in {:?} ({}/{})",
                request.url(),
                wait,
                retry,
                self.policy.max_retries
            );
            tokio::time::sleep(wait).await;
        }
    }

    pub async fn get(&self, url: &str) -> Result<Response, NetworkingError> {
        let request = self.client.get(url).build()?;
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    include!("retry.test.rs");
}
