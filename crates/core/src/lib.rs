//! Lunar phase computation and the configuration document shared by the
//! moonpost crates.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod phase;

pub use clock::{Clock, SystemClock};
pub use config::MoonConfig;
pub use error::*;
pub use phase::{MoonPhase, PhaseCalculator};
