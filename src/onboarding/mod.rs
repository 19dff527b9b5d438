//! Onboarding — the guided multi-question dialog that populates a profile.
//!
//! Driven per sender by the orchestrator: a session is created when the
//! controlling account sends the trigger phrase, advanced on every message
//! while present, and removed on completion of the final question.

pub mod flow;
pub mod session;

pub use flow::{format_question, Onboarding, StepOutcome};
pub use session::OnboardingSession;
