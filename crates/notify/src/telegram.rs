//! Telegram Bot API notifier with MarkdownV2 formatting.
//!
//! Delivers notifications via the Telegram Bot API `sendMessage` endpoint.
//! Text is escaped for MarkdownV2; rate limit responses are surfaced as
//! [`NotifyError::RateLimited`].

use std::time::Duration;

use crate::traits::{Notification, Notifier, NotifyError};

/// Escapes special characters for Telegram MarkdownV2 parse mode.
///
/// Telegram requires these characters to be escaped with a preceding backslash
/// when using MarkdownV2: `_`, `*`, `[`, `]`, `(`, `)`, `~`, `` ` ``, `>`,
/// `#`, `+`, `-`, `=`, `|`, `{`, `}`, `.`, `!`, and the backslash itself.
pub fn escape_markdown_v2(text: &str) -> String {
    let special = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];
    let mut result = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if special.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Resolves `${VAR_NAME}` to the value of the environment variable.
/// Any other value is returned unchanged.
fn resolve_env_ref(value: String) -> Result<String, NotifyError> {
    if !value.starts_with("${") {
        return Ok(value);
    }
    let var_name = value
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| NotifyError::Config(format!("Malformed env var reference: {value}")))?;
    std::env::var(var_name)
        .map_err(|_| NotifyError::Config(format!("Environment variable '{var_name}' is not set")))
}

/// Sends notifications to a single chat via the Telegram Bot API.
#[derive(Debug)]
pub struct TelegramNotifier {
    api_url_base: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier` from configuration values.
    ///
    /// If `bot_token` starts with `${`, the value between `${` and `}` is
    /// resolved as an environment variable name. Returns
    /// [`NotifyError::Config`] if the token or chat id is empty or the env
    /// var is missing. Every request is bounded by `timeout`.
    pub fn from_config(
        api_url_base: &str,
        bot_token: String,
        chat_id: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let resolved_token = resolve_env_ref(bot_token)?;

        if resolved_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }
        if chat_id.is_empty() {
            return Err(NotifyError::Config(
                "Telegram chat id must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url_base: api_url_base.trim_end_matches('/').to_string(),
            bot_token: resolved_token,
            chat_id,
            client,
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url_base, self.bot_token)
    }

    fn request_body(&self, notification: &Notification) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.chat_id,
            "text": escape_markdown_v2(&notification.text),
            "parse_mode": "MarkdownV2",
            "link_preview_options": { "is_disabled": notification.disable_link_preview },
            "disable_notification": notification.silent,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    /// Sends a notification via the Telegram `sendMessage` API.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = self.request_body(notification);

        tracing::debug!(
            chat_id = %self.chat_id,
            silent = notification.silent,
            "Sending Telegram notification"
        );

        // The request URL embeds the bot token; keep it out of errors.
        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        let resp_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        if resp_body.get("ok") == Some(&serde_json::Value::Bool(true)) {
            tracing::info!(chat_id = %self.chat_id, "Telegram notification sent");
            return Ok(());
        }

        // Handle rate limiting (HTTP 429).
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp_body
                .get("parameters")
                .and_then(|p| p.get("retry_after"))
                .and_then(|v| v.as_u64())
                .unwrap_or(30);
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let description = resp_body
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Telegram API error");

        Err(NotifyError::Api(format!("{status}: {description}")))
    }

    /// Returns the channel name for this notifier.
    fn channel_name(&self) -> &str {
        "telegram"
    }
}
