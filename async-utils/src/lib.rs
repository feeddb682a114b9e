//! Time plumbing shared by the request coordinator and the orchestrator.

mod backoff;
mod clock;

pub use backoff::backoff_delay;
pub use backoff::backoff_schedule;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::TokioClock;
