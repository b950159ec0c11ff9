use thiserror::Error;

/// Errors raised while validating the configuration document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Errors raised when building a [`PhaseCalculator`](crate::PhaseCalculator).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PhaseError {
    #[error("second reference must be later than the first")]
    ReferencesOutOfOrder,

    #[error("cycle count must be positive")]
    ZeroCycles,

    #[error("cycle length out of range")]
    CycleOutOfRange,
}
