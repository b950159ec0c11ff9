//! Tick results and the errors a tick can end with.

use moonpost_core::{ConfigError, MoonPhase};
use moonpost_notify::NotifyError;
use moonpost_store::StoreError;

/// What a successful tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The UTC hour is before `PostingStartHour`. Nothing was touched.
    BeforeStartHour,
    /// Today's marker is already recorded. Nothing was touched.
    AlreadyNotified,
    /// No phase event today; the marker was advanced and persisted.
    NothingToPost,
    /// The message was delivered; the marker was advanced and persisted.
    Posted(MoonPhase),
}

/// Errors a tick can end with. All of them are retried on a later tick.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// The message was not delivered; the marker is unchanged.
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] NotifyError),

    /// The marker advanced in memory but the document was not written.
    #[error("config persist failed: {0}")]
    Persist(#[source] StoreError),

    #[error("config refetch failed: {0}")]
    Refetch(#[source] StoreError),

    #[error("refetched config rejected: {0}")]
    InvalidConfig(#[from] ConfigError),
}
