//! Telegram Bot API client and the send-or-update notifier.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of an attempt to edit an existing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Message text replaced.
    Updated,
    /// The new text is identical to the current one; nothing to do.
    Unchanged,
    /// The target message no longer exists; caller should send a new one.
    NotFound,
}

/// Notification channel seam: send a message, or update one by handle.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, text: &str) -> Result<i64>;
    async fn update(&self, message_id: i64, text: &str) -> Result<UpdateOutcome>;
}

/// Telegram Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.telegram.org".to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Override the API base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?;

        response
            .json()
            .await
            .with_context(|| format!("telegram {method} returned an unreadable body"))
    }
}

#[async_trait]
impl MessageTransport for TelegramClient {
    async fn send(&self, text: &str) -> Result<i64> {
        let response = self
            .call(
                "sendMessage",
                serde_json::json!({
                    "chat_id": self.chat_id,
                    "text": text,
                    "parse_mode": "HTML",
                    "disable_web_page_preview": true,
                }),
            )
            .await?;

        if !response.ok {
            bail!(
                "sendMessage rejected: {}",
                response.description.unwrap_or_default()
            );
        }

        response
            .result
            .map(|m| m.message_id)
            .context("sendMessage response missing message id")
    }

    async fn update(&self, message_id: i64, text: &str) -> Result<UpdateOutcome> {
        let response = self
            .call(
                "editMessageText",
                serde_json::json!({
                    "chat_id": self.chat_id,
                    "message_id": message_id,
                    "text": text,
                    "parse_mode": "HTML",
                    "disable_web_page_preview": true,
                }),
            )
            .await?;

        if response.ok {
            return Ok(UpdateOutcome::Updated);
        }

        let description = response.description.unwrap_or_default().to_lowercase();
        if description.contains("message is not modified") {
            Ok(UpdateOutcome::Unchanged)
        } else if description.contains("message to edit not found") {
            Ok(UpdateOutcome::NotFound)
        } else {
            bail!("editMessageText rejected: {description}");
        }
    }
}

/// Keeps one report message alive across cycles: the first publish sends a
/// new message, subsequent publishes edit it in place. A vanished target
/// message is replaced transparently.
pub struct Notifier<T = TelegramClient> {
    transport: T,
    message_id: Mutex<Option<i64>>,
}

impl<T: MessageTransport> Notifier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            message_id: Mutex::new(None),
        }
    }

    /// Publish the report text, reusing the remembered message when possible.
    pub async fn publish(&self, text: &str) -> Result<()> {
        let mut message_id = self.message_id.lock().await;

        let current = match *message_id {
            Some(id) => id,
            None => {
                let id = self.transport.send(text).await?;
                info!(message_id = id, "Sent new report message");
                *message_id = Some(id);
                return Ok(());
            }
        };

        match self.transport.update(current, text).await? {
            UpdateOutcome::Updated => {
                debug!(message_id = current, "Report message updated");
            }
            UpdateOutcome::Unchanged => {
                debug!(message_id = current, "Report unchanged");
            }
            UpdateOutcome::NotFound => {
                warn!(message_id = current, "Report message gone, sending a new one");
                let id = self.transport.send(text).await?;
                info!(message_id = id, "Sent new report message");
                *message_id = Some(id);
            }
        }

        Ok(())
    }
}
