use std::path::PathBuf;

use autos_url_codec::CodecError;
use thiserror::Error;

/// A filter update the orchestrator refuses before any URL or network work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("page size must be within 1..={max}, got {actual}")]
    SizeOutOfRange { max: u32, actual: u32 },

    #[error("`{0}` is not a sortable column name")]
    InvalidSort(String),

    #[error("selection path must not be empty or contain blank segments")]
    EmptySelection,

    #[error("`{0}` is not a configured column filter")]
    UnknownColumn(String),

    #[error("`{0}` is not a configured range filter")]
    UnknownRange(String),

    #[error("range filter `{0}` has a bound that is not a finite number")]
    NonFiniteBound(String),

    #[error("range filter `{key}` has min {min} above max {max}")]
    InvertedRange { key: String, min: f64, max: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid codec config: {0}")]
    Codec(#[from] CodecError),

    #[error("fetch endpoint must not be empty")]
    EmptyEndpoint,
}
