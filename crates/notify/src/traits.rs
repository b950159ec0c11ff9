//! Notifier trait definition and shared error types.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A message ready for delivery. `text` is plain; transports escape it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub text: String,
    /// Suppress link previews.
    pub disable_link_preview: bool,
    /// Deliver without a notification sound.
    pub silent: bool,
}

impl Notification {
    /// A regular post with link previews disabled.
    pub fn post(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disable_link_preview: true,
            silent: false,
        }
    }

    /// An operational report: no preview, no sound.
    pub fn report(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disable_link_preview: true,
            silent: true,
        }
    }
}

/// Delivers messages to one fixed destination.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "telegram").
    fn channel_name(&self) -> &str;
}
