use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Per-call behaviour of [`RequestCoordinator::execute`](crate::RequestCoordinator::execute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Attach to an identical in-flight execution instead of starting another
    #[serde(default = "default_true")]
    pub deduplicate: bool,

    /// Cache successful values for this long; 0 disables caching
    #[serde(default)]
    pub cache_time_ms: u64,

    /// Extra attempts after the first failure
    #[serde(default)]
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts
    #[serde(default)]
    pub retry_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            deduplicate: true,
            cache_time_ms: 0,
            retry_attempts: 0,
            retry_delay_ms: 0,
        }
    }
}

impl RequestConfig {
    pub fn cached(mut self, cache_time: Duration) -> Self {
        self.cache_time_ms = u64::try_from(cache_time.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn without_dedup(mut self) -> Self {
        self.deduplicate = false;
        self
    }

    pub fn cache_time(&self) -> Duration {
        Duration::from_millis(self.cache_time_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn caches(&self) -> bool {
        self.cache_time_ms > 0
    }
}
