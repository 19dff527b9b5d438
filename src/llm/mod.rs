//! LLM integration — the text generation provider behind auto-replies.
//!
//! The orchestrator only sees the `LlmProvider` trait; the concrete
//! implementation talks to an OpenAI-compatible chat completions API.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Override for OpenAI-compatible gateways; defaults to api.openai.com.
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    let mut provider = OpenAiProvider::new(config.api_key.clone(), &config.model);
    if let Some(ref base_url) = config.base_url {
        provider = provider.with_base_url(base_url);
    }
    tracing::info!("Using OpenAI (model: {})", config.model);
    Arc::new(provider)
}
