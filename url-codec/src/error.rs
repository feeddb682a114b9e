use thiserror::Error;

/// Problems with a [`CodecConfig`](crate::CodecConfig).
///
/// Parsing URL parameters never fails; only configuration can be invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("default_size {default_size} must be within 1..={max_size}")]
    DefaultSizeOutOfBounds { default_size: u32, max_size: u32 },

    #[error("default_page must be >= 1")]
    InvalidDefaultPage,

    #[error("max_size must be within 1..={limit}, got {actual}")]
    MaxSizeOutOfBounds { limit: u32, actual: u32 },

    #[error("filter key `{0}` collides with a reserved URL parameter")]
    ReservedKey(String),

    #[error("filter key `{0}` is configured more than once")]
    DuplicateKey(String),

    #[error("filter keys must not be empty")]
    EmptyKey,
}
