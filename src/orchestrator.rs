//! Conversation orchestrator — routes each inbound message to the onboarding
//! dialog or the reply-generation path.
//!
//! All conversational state (onboarding sessions, history, day markers) is
//! owned by the orchestrator instance, so independent instances can run side
//! by side in tests. Exactly one outbound send happens per inbound message,
//! or none: an unconfigured receiving account stays silent.

use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;

use crate::channels::{Channel, IncomingMessage};
use crate::config::OrchestratorConfig;
use crate::error::{Error, LlmError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::memory::{DayTracker, HistoryLedger};
use crate::onboarding::{format_question, Onboarding, StepOutcome};
use crate::prompt;
use crate::store::{Profile, ProfileStore};

pub struct Orchestrator {
    config: OrchestratorConfig,
    channel: Arc<dyn Channel>,
    store: Arc<dyn ProfileStore>,
    llm: Arc<dyn LlmProvider>,
    onboarding: Onboarding,
    ledger: HistoryLedger,
    days: DayTracker,
    /// Identity the channel is connected as; resolved once at startup.
    controlling_account: String,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        channel: Arc<dyn Channel>,
        store: Arc<dyn ProfileStore>,
        llm: Arc<dyn LlmProvider>,
        controlling_account: String,
    ) -> Self {
        let max_senders = config.max_tracked_senders;
        Self {
            config,
            channel,
            store: Arc::clone(&store),
            llm,
            onboarding: Onboarding::new(store),
            ledger: HistoryLedger::new(max_senders),
            days: DayTracker::new(max_senders),
            controlling_account,
        }
    }

    /// Run the main loop: start the channel and handle messages until the
    /// stream ends or Ctrl+C.
    pub async fn run(&self) -> Result<(), Error> {
        let mut messages = self.channel.start().await?;

        tracing::info!(
            channel = self.channel.name(),
            account = %self.controlling_account,
            "Orchestrator ready and listening"
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = messages.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("Channel stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.handle_message(&message).await;
        }

        self.channel.shutdown().await?;
        Ok(())
    }

    /// Handle one inbound message.
    ///
    /// Dispatch order: day marker first (updated before any suspension point,
    /// so a failure further down never leaves it stale), then the trigger
    /// phrase, then an active onboarding session, then reply generation.
    pub async fn handle_message(&self, message: &IncomingMessage) {
        let today = Local::now().date_naive();
        let is_new_conversation = self.days.mark(&message.sender, today).await;

        tracing::debug!(
            sender = %message.sender,
            channel = %message.channel,
            "Received message ({} chars)",
            message.text.len()
        );

        if message.text.trim() == self.config.trigger_phrase {
            self.handle_trigger(&message.sender).await;
        } else if self.onboarding.is_active(&message.sender).await {
            self.handle_answer(&message.sender, &message.text).await;
        } else {
            self.handle_generation(message, is_new_conversation).await;
        }
    }

    /// Trigger phrase received: owner check, then a fresh session at step 0.
    async fn handle_trigger(&self, sender: &str) {
        if sender != self.controlling_account {
            tracing::warn!(sender = %sender, "Setup trigger from a non-controlling account");
            self.send(sender, &self.config.permission_denied_notice).await;
            return;
        }

        match self.onboarding.begin(sender).await {
            Ok(first) => self.send(sender, &format_question(&first)).await,
            Err(e) => {
                tracing::error!(error = %e, "Could not start onboarding");
                self.send(sender, &self.config.setup_unavailable_notice).await;
            }
        }
    }

    /// Answer for an in-flight onboarding session.
    async fn handle_answer(&self, sender: &str, text: &str) {
        match self.onboarding.advance(sender, text).await {
            Ok(StepOutcome::NextQuestion(step)) => {
                self.send(sender, &format_question(&step)).await;
            }
            Ok(StepOutcome::Completed) => {
                tracing::info!(sender = %sender, "Onboarding completed");
                self.send(sender, &self.config.completion_notice).await;
            }
            Err(e) => {
                tracing::error!(sender = %sender, error = %e, "Onboarding aborted");
                self.send(sender, &self.config.setup_unavailable_notice).await;
            }
        }
    }

    /// Generation path: profile lookup keyed by the receiving account, then
    /// one completion call. No profile (or a fetch failure) means silence.
    async fn handle_generation(&self, message: &IncomingMessage, is_new_conversation: bool) {
        let profile = match self.store.fetch_profile(&message.recipient).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::debug!(
                    recipient = %message.recipient,
                    "No profile configured, staying silent"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    recipient = %message.recipient,
                    error = %e,
                    "Profile fetch failed, staying silent"
                );
                return;
            }
        };

        match self
            .generate_reply(&profile, &message.text, &message.sender, is_new_conversation)
            .await
        {
            Ok(reply) => self.send(&message.sender, &reply).await,
            Err(e) => {
                tracing::error!(sender = %message.sender, error = %e, "Reply generation failed");
                self.send(&message.sender, &self.config.temporary_failure_notice)
                    .await;
            }
        }
    }

    /// Build the windowed request, run one completion, record the exchange.
    ///
    /// The greeting prefix decorates only the sent text; the stored history
    /// entry stays clean so future prompts are not polluted by it.
    async fn generate_reply(
        &self,
        profile: &Profile,
        text: &str,
        sender: &str,
        is_new_conversation: bool,
    ) -> Result<String, LlmError> {
        let history = self.ledger.recent(sender, prompt::HISTORY_WINDOW).await;
        let request = prompt::build_request(profile, &history, text);

        let response = self.llm.complete(CompletionRequest::new(request)).await?;
        let reply = response.content.trim().to_string();

        self.ledger
            .append_exchange(
                sender,
                ChatMessage::user(text),
                ChatMessage::assistant(&reply),
            )
            .await;

        if is_new_conversation {
            Ok(format!("{}{}", self.config.greeting_prefix, reply))
        } else {
            Ok(reply)
        }
    }

    async fn send(&self, recipient: &str, text: &str) {
        if let Err(e) = self.channel.send_text(recipient, text).await {
            tracing::error!(recipient = %recipient, error = %e, "Failed to send message");
        }
    }
}
