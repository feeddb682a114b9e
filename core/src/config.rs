use std::path::Path;
use std::time::Duration;

use autos_request_coordinator::RequestConfig;
use autos_url_codec::CodecConfig;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "autos-unified/search";

/// Top-level dashboard configuration, usually read from `autos.toml`.
///
/// ```toml
/// [codec]
/// default_size = 50
///
/// [fetch]
/// cache_time_ms = 10000
/// retry_attempts = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// How the orchestrator talks to the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Endpoint identifier; prefixes every request key
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_true")]
    pub deduplicate: bool,

    /// How long identical queries are served from cache (0 = never)
    #[serde(default = "default_cache_time_ms")]
    pub cache_time_ms: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay; doubled on every further retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Quiet period a burst of edits must settle for before fetching (0 = off)
    #[serde(default)]
    pub debounce_ms: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_cache_time_ms() -> u64 {
    30_000
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            deduplicate: default_true(),
            cache_time_ms: default_cache_time_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            debounce_ms: 0,
        }
    }
}

impl FetchConfig {
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            deduplicate: self.deduplicate,
            cache_time_ms: self.cache_time_ms,
            retry_attempts: self.retry_attempts,
            retry_delay_ms: self.retry_delay_ms,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl DashboardConfig {
    /// Every query hits the backend; handy for debugging stale data.
    pub fn uncached() -> Self {
        Self {
            fetch: FetchConfig {
                cache_time_ms: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.codec.validate()?;
        if self.fetch.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        Ok(())
    }
}
