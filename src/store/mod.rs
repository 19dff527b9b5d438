//! Profile store — per-account configuration and onboarding step definitions.

pub mod http;
pub mod model;
pub mod traits;

pub use http::HttpProfileStore;
pub use model::{OnboardingStep, Profile};
pub use traits::ProfileStore;
