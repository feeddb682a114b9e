//! Keyed request coordination for the dashboard.
//!
//! [`RequestCoordinator::execute`] collapses concurrent identical requests
//! into one execution, serves fresh values from a TTL cache, retries failures
//! with exponential backoff and publishes loading state per key and globally
//! through `tokio::sync::watch` channels.
//!
//! Failures are not classified: every `produce` error is retried until
//! `retry_attempts` is exhausted, and only the final error is reported.

mod config;
mod coordinator;
mod error;
mod key;
mod record;

pub use config::RequestConfig;
pub use coordinator::DEFAULT_CACHE_CAPACITY;
pub use coordinator::RequestCoordinator;
pub use error::RequestError;
pub use key::RequestKey;
pub use key::canonical_json;
pub use key::request_key;
pub use record::RequestRecord;
