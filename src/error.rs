//! Error types for WA Assist.

/// Top-level error type for the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} cannot report its controlling account: {reason}")]
    IdentityUnavailable { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Profile store errors.
///
/// A fetch failure is treated as "no profile" at the orchestrator boundary;
/// a save failure is logged and onboarding still reports success.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Profile store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Profile store returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to decode profile store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Text generation provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Onboarding flow errors.
///
/// `NoStepsConfigured` and `StepOutOfRange` cover the cases where the
/// upstream step list is empty or shrank below the session's cursor while a
/// dialog was in flight. Both are fatal to that session only.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("No onboarding steps are configured in the profile store")]
    NoStepsConfigured,

    #[error("Onboarding step {step} is out of range ({available} steps available)")]
    StepOutOfRange { step: usize, available: usize },

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for the dispatcher.
pub type Result<T> = std::result::Result<T, Error>;
