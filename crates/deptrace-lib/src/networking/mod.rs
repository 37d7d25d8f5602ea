//! HTTP plumbing shared by remote dependency sources
//!
//! Owns the reqwest client (timeout, user agent), the permit pool that
//! bounds concurrent fetches, and the 429-aware request executor.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

pub mod retry;

pub use retry::{RetryPolicy, ThrottledClient};

/// User agent sent with every registry request
pub const USER_AGENT: &str = concat!("deptrace/", env!("CARGO_PKG_VERSION"));

/// Networking errors for registry communication
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError { message: String },

    #[error("Semaphore acquire error: {source}")]
    SemaphoreError {
        #[from]
        source: tokio::sync::AcquireError,
    },

    #[error("Invalid job count: {count} (must be > 0)")]
    InvalidJobCount { count: usize },
}

/// Networking configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// Maximum number of concurrent requests
    pub max_jobs: usize,
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Retry schedule for 429 responses
    pub retry: RetryPolicy,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            max_jobs: 4,
            timeout_seconds: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Networking manager: one client and one permit pool per run
#[derive(Clone)]
pub struct NetworkingManager {
    client: ThrottledClient,
    semaphore: Arc<Semaphore>,
    max_jobs: usize,
}

impl NetworkingManager {
    /// Create networking manager
    pub fn new(config: NetworkingConfig) -> Result<Self, NetworkingError> {
        if config.max_jobs == 0 {
            return Err(NetworkingError::InvalidJobCount {
                count: config.max_jobs,
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        trace!(
            "Networking manager initialized with {} concurrent jobs, {}s timeout",
            config.max_jobs, config.timeout_seconds
        );

        Ok(Self {
            client: ThrottledClient::new(client, config.retry),
            semaphore: Arc::new(Semaphore::new(config.max_jobs)),
            max_jobs: config.max_jobs,
        })
    }

    /// Concurrency bound
    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// Wait for a request slot; the slot is released when the permit drops
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, NetworkingError> {
        Ok(self.semaphore.clone().acquire_owned().await?)
    }

    /// Client that retries throttled requests
    pub fn client(&self) -> &ThrottledClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
