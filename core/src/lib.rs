//! Filter state and URL synchronization for the vehicle dashboard.
//!
//! [`SyncOrchestrator`] is the surface UI code talks to. It owns a
//! [`FilterStore`], writes user edits to the [`Location`], hydrates from
//! navigation and fetches through a shared
//! [`RequestCoordinator`](autos_request_coordinator::RequestCoordinator).

mod backend;
mod config;
mod error;
mod location;
mod orchestrator;
mod patch;
mod store;

pub use backend::SearchBackend;
pub use config::DEFAULT_ENDPOINT;
pub use config::DashboardConfig;
pub use config::FetchConfig;
pub use error::ConfigError;
pub use error::ValidationError;
pub use location::Location;
pub use location::LocationWrite;
pub use location::MemoryLocation;
pub use orchestrator::SyncOrchestrator;
pub use patch::FieldUpdate;
pub use patch::FilterPatch;
pub use store::FilterStore;
