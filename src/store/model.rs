//! Profile and onboarding data models.
//!
//! Field names mirror the store's JSON documents, which are written as-is by
//! the config server. Every profile field is optional on the wire; defaults
//! are substituted at prompt-build time, not here.

use serde::{Deserialize, Serialize};

/// Per-account configuration describing the assistant persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// One step of the onboarding question sequence.
///
/// The list is store-owned and re-fetched on every onboarding interaction,
/// so edits take effect mid-dialog without a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub question: String,
    pub placeholder: String,
    pub key: String,
}
