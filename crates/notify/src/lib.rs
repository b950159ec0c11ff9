//! Outbound notifications for moonpost.
//!
//! This crate provides:
//! - `Notifier` trait for the chat transport
//! - Telegram Bot API implementation with MarkdownV2 escaping

pub mod telegram;
pub mod traits;

pub use telegram::TelegramNotifier;
pub use traits::{Notification, Notifier, NotifyError};
