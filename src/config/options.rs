// src/config/options.rs
use std::fmt;
use std::time::Duration;

use super::consts::*;

/// Connection settings for the remote API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiOptions {
    pub client_id: String,
    pub client_secret: String,
    pub version: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiOptions {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            version: API_VERSION.to_string(),
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for ApiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiOptions")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("version", &self.version)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Sleep between attempts.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            pause: Duration::from_millis(RETRY_PAUSE_MS),
        }
    }
}

impl RetryPolicy {
    pub fn immediate(max_retries: u32) -> Self {
        Self { max_retries, pause: Duration::ZERO }
    }
}

/// Which cells get split once a depth has been fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubdivisionPolicy {
    /// Split only the cells that came back saturated.
    #[default]
    PerCell,
    /// Re-query the whole next grid whenever any cell is saturated;
    /// only the deepest grid's results are kept.
    GlobalMax,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefineOptions {
    /// Per-query result cap; a cell returning exactly this many is saturated.
    pub limit: u32,
    /// Deepest subdivision level (grid of 2^d x 2^d).
    pub max_depth: u32,
    pub policy: SubdivisionPolicy,
    /// Cells of one depth fetched concurrently. 1 = sequential.
    pub workers: usize,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            max_depth: MAX_DEPTH,
            policy: SubdivisionPolicy::default(),
            workers: WORKERS,
        }
    }
}

impl RefineOptions {
    pub fn with_limit(limit: u32) -> Self {
        Self { limit, ..Self::default() }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.limit == 0 {
            return Err("limit must be at least 1");
        }
        if self.max_depth > DEPTH_CEILING {
            return Err("max_depth exceeds the supported ceiling");
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err("workers must be between 1 and MAX_WORKERS");
        }
        Ok(())
    }
}
