//! WhatsApp channel — long-polls an HTTP gateway for inbound messages.
//!
//! The gateway is a self-hosted WhatsApp Web bridge that queues messages per
//! session and drains the queue on each poll. Endpoints:
//! - `GET  {base}/api/{session}/messages?timeout=30` → `[{id, from, to, body, fromMe}]`
//! - `POST {base}/api/{session}/sendText` body `{chatId, text}`
//! - `GET  {base}/api/{session}/me` → `{id}`

use async_trait::async_trait;

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;

/// Seconds the gateway holds a poll open before answering with an empty list.
const POLL_TIMEOUT_SECS: u32 = 30;

/// WhatsApp channel — connects to the gateway via long-polling.
pub struct WhatsAppChannel {
    base_url: String,
    session: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(base_url: &str, session: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: session.into(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}/{endpoint}", self.base_url, self.session)
    }
}

/// Convert a gateway poll response into inbound messages.
///
/// Entries flagged `fromMe` and entries with an empty body (media, status
/// updates) are skipped.
fn parse_gateway_messages(value: &serde_json::Value) -> Vec<IncomingMessage> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    let mut messages = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry["fromMe"].as_bool().unwrap_or(false) {
            continue;
        }

        let Some(body) = entry["body"].as_str().filter(|b| !b.is_empty()) else {
            continue;
        };
        let Some(from) = entry["from"].as_str() else {
            continue;
        };
        let Some(to) = entry["to"].as_str() else {
            continue;
        };

        let mut msg = IncomingMessage::new("whatsapp", from, to, body);
        if let Some(id) = entry["id"].as_str() {
            msg = msg.with_id(id);
        }
        messages.push(msg);
    }
    messages
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("messages");
        let client = self.client.clone();

        tokio::spawn(async move {
            tracing::info!("WhatsApp channel listening for messages...");

            loop {
                let resp = match client
                    .get(&url)
                    .query(&[("timeout", POLL_TIMEOUT_SECS)])
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("WhatsApp poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("WhatsApp parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                for msg in parse_gateway_messages(&data) {
                    if tx.send(msg).is_err() {
                        tracing::info!("WhatsApp listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send_text(&self, recipient: &str, text: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chatId": recipient,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendText"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "whatsapp".into(),
                reason: format!("sendText returned {status}: {err}"),
            });
        }

        Ok(())
    }

    async fn controlling_account(&self) -> Result<String, ChannelError> {
        let resp = self
            .client
            .get(self.api_url("me"))
            .send()
            .await
            .map_err(|e| ChannelError::IdentityUnavailable {
                name: "whatsapp".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ChannelError::IdentityUnavailable {
                name: "whatsapp".into(),
                reason: format!("me returned {}", resp.status()),
            });
        }

        let data: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| ChannelError::IdentityUnavailable {
                    name: "whatsapp".into(),
                    reason: e.to_string(),
                })?;

        data["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChannelError::IdentityUnavailable {
                name: "whatsapp".into(),
                reason: "gateway response has no id field".into(),
            })
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        self.controlling_account().await.map(|_| ())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("WhatsApp channel shutting down");
        Ok(())
    }
}
