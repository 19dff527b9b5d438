//! `ProfileStore` trait — the interface the orchestrator depends on.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::model::{OnboardingStep, Profile};

/// Key-based access to per-account profiles and the onboarding question list.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by phone identifier. `Ok(None)` when no profile exists.
    async fn fetch_profile(&self, phone: &str) -> Result<Option<Profile>, StoreError>;

    /// Persist collected onboarding answers for a phone identifier.
    /// `config` is a JSON object keyed by onboarding step keys.
    async fn save_profile(&self, phone: &str, config: &serde_json::Value)
        -> Result<(), StoreError>;

    /// Fetch the current onboarding question sequence.
    async fn fetch_onboarding_steps(&self) -> Result<Vec<OnboardingStep>, StoreError>;
}
