//! ConfigStore trait definition and shared error types.

use moonpost_core::MoonConfig;

/// Errors that can occur while reading or writing the remote document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("config store unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("config store response status {status}")]
    BadStatus { status: reqwest::StatusCode },

    #[error("config document malformed: {0}")]
    Malformed(#[source] serde_yaml::Error),

    #[error("config document encoding failed: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("invalid store url: {0}")]
    InvalidUrl(String),
}

/// Whole-document access to the configuration.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the current document.
    async fn fetch(&self) -> Result<MoonConfig, StoreError>;

    /// Overwrite the document with `config`.
    async fn replace(&self, config: &MoonConfig) -> Result<(), StoreError>;
}
