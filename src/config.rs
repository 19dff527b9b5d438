//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::memory::DEFAULT_MAX_SENDERS;

/// Orchestrator behavior: trigger phrase, user-visible notices, limits.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Exact text (after trimming) that starts the onboarding dialog.
    pub trigger_phrase: String,
    /// Prepended to the first reply of a sender's day.
    pub greeting_prefix: String,
    /// Sent when a non-controlling account sends the trigger phrase.
    pub permission_denied_notice: String,
    /// Sent when the onboarding step list is missing or broken.
    pub setup_unavailable_notice: String,
    /// Sent after the final onboarding answer is recorded.
    pub completion_notice: String,
    /// Sent when reply generation fails.
    pub temporary_failure_notice: String,
    /// Cap on distinct senders tracked in history and day-marker state.
    pub max_tracked_senders: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            trigger_phrase: "setup".to_string(),
            greeting_prefix: "Hey! ".to_string(),
            permission_denied_notice:
                "⚠️ Only the number connected to the bot can run setup.".to_string(),
            setup_unavailable_notice:
                "⚠️ Setup is not available right now. Please try again later.".to_string(),
            completion_notice: "✅ Setup complete! The assistant is ready to go 💪".to_string(),
            temporary_failure_notice:
                "⚠️ Something went wrong. Please try again in a moment.".to_string(),
            max_tracked_senders: DEFAULT_MAX_SENDERS,
        }
    }
}

/// WhatsApp gateway connection settings. Absent when running on the CLI
/// channel.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub session: String,
}

/// Full application configuration, read from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the profile store API.
    pub store_url: String,
    /// OpenAI API key.
    pub openai_api_key: SecretString,
    /// Chat completion model.
    pub model: String,
    /// Override for OpenAI-compatible gateways.
    pub openai_base_url: Option<String>,
    /// WhatsApp gateway; `None` falls back to the CLI channel.
    pub gateway: Option<GatewayConfig>,
    pub orchestrator: OrchestratorConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// `OPENAI_API_KEY` and `WA_ASSIST_API_URL` are required; everything else
    /// has a default. `WA_GATEWAY_URL` selects the WhatsApp channel.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let store_url = std::env::var("WA_ASSIST_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("WA_ASSIST_API_URL".to_string()))?;

        let model = env_or("WA_ASSIST_MODEL", "gpt-4");
        let openai_base_url = std::env::var("OPENAI_BASE_URL").ok();

        let gateway = std::env::var("WA_GATEWAY_URL").ok().map(|base_url| GatewayConfig {
            base_url,
            session: env_or("WA_GATEWAY_SESSION", "main"),
        });

        let defaults = OrchestratorConfig::default();
        let max_tracked_senders: usize = match std::env::var("WA_ASSIST_MAX_SENDERS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "WA_ASSIST_MAX_SENDERS".to_string(),
                message: format!("not a positive integer: {raw}"),
            })?,
            Err(_) => defaults.max_tracked_senders,
        };

        let orchestrator = OrchestratorConfig {
            trigger_phrase: env_or("WA_ASSIST_TRIGGER", &defaults.trigger_phrase),
            greeting_prefix: env_or("WA_ASSIST_GREETING", &defaults.greeting_prefix),
            permission_denied_notice: env_or(
                "WA_ASSIST_PERMISSION_DENIED_NOTICE",
                &defaults.permission_denied_notice,
            ),
            setup_unavailable_notice: env_or(
                "WA_ASSIST_SETUP_UNAVAILABLE_NOTICE",
                &defaults.setup_unavailable_notice,
            ),
            completion_notice: env_or("WA_ASSIST_COMPLETION_NOTICE", &defaults.completion_notice),
            temporary_failure_notice: env_or(
                "WA_ASSIST_FAILURE_NOTICE",
                &defaults.temporary_failure_notice,
            ),
            max_tracked_senders,
        };

        Ok(Self {
            store_url,
            openai_api_key,
            model,
            openai_base_url,
            gateway,
            orchestrator,
        })
    }
}
