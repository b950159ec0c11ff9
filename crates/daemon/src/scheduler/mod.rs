//! Once-per-day posting gate around the phase calculator.
//!
//! [`PostScheduler`] owns the configuration document. Each call to
//! [`post_moon_phase`](PostScheduler::post_moon_phase) applies the hour gate
//! and the `MoonPhaseLast` marker gate, posts the phase message if there is
//! one, then advances the marker and writes the document back.

mod core;
mod outcome;


pub use self::core::PostScheduler;
pub use self::outcome::{PostError, TickOutcome};
