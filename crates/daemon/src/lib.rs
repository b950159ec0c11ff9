//! The moonpost daemon: a once-per-day moon phase poster.
//!
//! - [`scheduler`] decides, per tick, whether to post and advances the marker
//! - [`runner`] drives ticks on the configured interval until shutdown

pub mod runner;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod mocks;

pub use runner::Reporter;
pub use scheduler::{PostError, PostScheduler, TickOutcome};
