//! The `Channel` trait and message types shared by all channel backends.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// An inbound message delivered by a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel-native ID, or a generated UUID when the channel has none.
    pub id: String,
    /// Source channel name: "whatsapp", "cli".
    pub channel: String,
    /// Stable handle of the human/device on the other end.
    pub sender: String,
    /// Identity of the account that received the message.
    pub recipient: String,
    /// Message body.
    pub text: String,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel: channel.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Keep the channel-native message ID instead of the generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Stream of inbound messages produced by a started channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A conversational channel: delivers inbound messages, accepts outbound
/// text, and knows which account it is operating as.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short channel name for logging.
    fn name(&self) -> &str;

    /// Begin delivering inbound messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send plain text to a recipient.
    async fn send_text(&self, recipient: &str, text: &str) -> Result<(), ChannelError>;

    /// Identity of the account this channel is connected as. Only this
    /// account may trigger onboarding.
    async fn controlling_account(&self) -> Result<String, ChannelError>;

    /// Verify the channel is reachable.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Release channel resources.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}
