//! Wire types shared between the dashboard core and its browser front-end.
//!
//! Every type derives `ts_rs::TS` so the TypeScript bindings stay in lockstep
//! with the Rust definitions.

mod filters;
mod state;
mod vehicle;

pub use filters::DEFAULT_PAGE;
pub use filters::DEFAULT_PAGE_SIZE;
pub use filters::DomainFilters;
pub use filters::HierarchicalSelection;
pub use filters::MAX_PAGE_SIZE;
pub use filters::RangeFilter;
pub use filters::SortDirection;
pub use state::AppState;
pub use vehicle::SearchPage;
pub use vehicle::VehicleResult;
