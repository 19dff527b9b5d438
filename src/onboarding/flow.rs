//! Onboarding flow — drives the question/answer loop against the store.
//!
//! Steps are re-fetched from the store on every interaction rather than
//! cached on the session, so upstream edits to the question list take effect
//! mid-dialog. A list that comes back empty, or that shrank below a running
//! session's cursor, aborts that session with an error; other senders are
//! unaffected.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::OnboardingError;
use crate::onboarding::session::OnboardingSession;
use crate::store::{OnboardingStep, ProfileStore};

/// What the dialog produced for one answer.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// More questions remain; send this one next.
    NextQuestion(OnboardingStep),
    /// Final answer recorded and the collected data saved; session removed.
    Completed,
}

/// Render a question with its example placeholder.
pub fn format_question(step: &OnboardingStep) -> String {
    format!("{}\n(e.g. {})", step.question, step.placeholder)
}

/// The per-sender onboarding state machine.
pub struct Onboarding {
    store: Arc<dyn ProfileStore>,
    sessions: Mutex<HashMap<String, OnboardingSession>>,
}

impl Onboarding {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `sender` has a session in flight.
    pub async fn is_active(&self, sender: &str) -> bool {
        self.sessions.lock().await.contains_key(sender)
    }

    /// Start a fresh session for `sender`, overwriting any prior one, and
    /// return the first question to ask.
    pub async fn begin(&self, sender: &str) -> Result<OnboardingStep, OnboardingError> {
        let steps = self.store.fetch_onboarding_steps().await?;
        let Some(first) = steps.first().cloned() else {
            return Err(OnboardingError::NoStepsConfigured);
        };

        self.sessions
            .lock()
            .await
            .insert(sender.to_string(), OnboardingSession::new());

        Ok(first)
    }

    /// Record `answer` for the sender's current step and advance.
    ///
    /// On the final step the collected answers are saved to the store; a
    /// save failure is logged but completion is still reported, so the
    /// confirmation message goes out regardless of the save outcome.
    pub async fn advance(&self, sender: &str, answer: &str) -> Result<StepOutcome, OnboardingError> {
        let steps = self.store.fetch_onboarding_steps().await?;

        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(sender) else {
            // Session vanished between the caller's check and this call;
            // treat like a shrunken step list.
            return Err(OnboardingError::StepOutOfRange {
                step: 0,
                available: steps.len(),
            });
        };

        let step_index = session.step();
        let Some(current) = steps.get(step_index) else {
            // The upstream list shrank below our cursor; abort this session.
            sessions.remove(sender);
            return Err(OnboardingError::StepOutOfRange {
                step: step_index,
                available: steps.len(),
            });
        };

        session.record_answer(&current.key, answer);

        if let Some(next) = steps.get(session.step()) {
            return Ok(StepOutcome::NextQuestion(next.clone()));
        }

        let collected = session.answers_json();
        sessions.remove(sender);
        drop(sessions);

        if let Err(e) = self.store.save_profile(sender, &collected).await {
            tracing::error!(sender = %sender, error = %e, "Failed to save onboarding answers");
        }

        Ok(StepOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    use crate::error::StoreError;
    use crate::store::Profile;

    struct FakeStore {
        steps: StdMutex<Vec<OnboardingStep>>,
        saved: StdMutex<Vec<(String, serde_json::Value)>>,
        fail_save: StdMutex<bool>,
    }

    impl FakeStore {
        fn with_steps(steps: Vec<OnboardingStep>) -> Arc<Self> {
            Arc::new(Self {
                steps: StdMutex::new(steps),
                saved: StdMutex::new(Vec::new()),
                fail_save: StdMutex::new(false),
            })
        }
    }

    #[async_trait]
    impl ProfileStore for FakeStore {
        async fn fetch_profile(&self, _phone: &str) -> Result<Option<Profile>, StoreError> {
            Ok(None)
        }

        async fn save_profile(
            &self,
            phone: &str,
            config: &serde_json::Value,
        ) -> Result<(), StoreError> {
            if *self.fail_save.lock().unwrap() {
                return Err(StoreError::Status {
                    endpoint: "/api/config".into(),
                    status: 500,
                });
            }
            self.saved
                .lock()
                .unwrap()
                .push((phone.to_string(), config.clone()));
            Ok(())
        }

        async fn fetch_onboarding_steps(&self) -> Result<Vec<OnboardingStep>, StoreError> {
            Ok(self.steps.lock().unwrap().clone())
        }
    }

    fn step(key: &str, question: &str) -> OnboardingStep {
        OnboardingStep {
            question: question.to_string(),
            placeholder: format!("example {key}"),
            key: key.to_string(),
        }
    }

    fn three_steps() -> Vec<OnboardingStep> {
        vec![
            step("assistant_name", "What should the assistant be called?"),
            step("description", "What does the business do?"),
            step("tone", "What tone should replies use?"),
        ]
    }

    #[tokio::test]
    async fn begin_returns_first_question_and_activates() {
        let store = FakeStore::with_steps(three_steps());
        let onboarding = Onboarding::new(store);

        let first = onboarding.begin("owner").await.unwrap();
        assert_eq!(first.key, "assistant_name");
        assert!(onboarding.is_active("owner").await);
        assert!(!onboarding.is_active("stranger").await);
    }

    #[tokio::test]
    async fn begin_with_empty_steps_fails_without_session() {
        let store = FakeStore::with_steps(Vec::new());
        let onboarding = Onboarding::new(store);

        let err = onboarding.begin("owner").await.unwrap_err();
        assert!(matches!(err, OnboardingError::NoStepsConfigured));
        assert!(!onboarding.is_active("owner").await);
    }

    #[tokio::test]
    async fn begin_overwrites_in_progress_session() {
        let store = FakeStore::with_steps(three_steps());
        let onboarding = Onboarding::new(store);

        onboarding.begin("owner").await.unwrap();
        onboarding.advance("owner", "Max").await.unwrap();

        // Re-trigger: cursor resets to the first question.
        onboarding.begin("owner").await.unwrap();
        match onboarding.advance("owner", "Maxine").await.unwrap() {
            StepOutcome::NextQuestion(next) => assert_eq!(next.key, "description"),
            other => panic!("expected next question, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn advance_walks_all_steps_and_saves_once() {
        let store = FakeStore::with_steps(three_steps());
        let onboarding = Onboarding::new(Arc::clone(&store) as Arc<dyn ProfileStore>);

        onboarding.begin("owner").await.unwrap();

        match onboarding.advance("owner", "Max").await.unwrap() {
            StepOutcome::NextQuestion(next) => assert_eq!(next.key, "description"),
            other => panic!("unexpected outcome {other:?}"),
        }
        match onboarding.advance("owner", "Barber shop").await.unwrap() {
            StepOutcome::NextQuestion(next) => assert_eq!(next.key, "tone"),
            other => panic!("unexpected outcome {other:?}"),
        }
        match onboarding.advance("owner", "casual").await.unwrap() {
            StepOutcome::Completed => {}
            other => panic!("unexpected outcome {other:?}"),
        }

        assert!(!onboarding.is_active("owner").await);

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let (phone, config) = &saved[0];
        assert_eq!(phone, "owner");
        assert_eq!(config["assistant_name"], "Max");
        assert_eq!(config["description"], "Barber shop");
        assert_eq!(config["tone"], "casual");
    }

    #[tokio::test]
    async fn save_failure_still_reports_completion() {
        let store = FakeStore::with_steps(vec![step("tone", "Tone?")]);
        *store.fail_save.lock().unwrap() = true;
        let onboarding = Onboarding::new(Arc::clone(&store) as Arc<dyn ProfileStore>);

        onboarding.begin("owner").await.unwrap();
        let outcome = onboarding.advance("owner", "casual").await.unwrap();
        assert!(matches!(outcome, StepOutcome::Completed));
        assert!(!onboarding.is_active("owner").await);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn shrunken_step_list_aborts_session() {
        let store = FakeStore::with_steps(three_steps());
        let onboarding = Onboarding::new(Arc::clone(&store) as Arc<dyn ProfileStore>);

        onboarding.begin("owner").await.unwrap();
        onboarding.advance("owner", "Max").await.unwrap();
        onboarding.advance("owner", "Barber shop").await.unwrap();

        // Steps shrink to one while the session sits at step 2.
        *store.steps.lock().unwrap() = vec![step("tone", "Tone?")];

        let err = onboarding.advance("owner", "casual").await.unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::StepOutOfRange {
                step: 2,
                available: 1
            }
        ));
        assert!(!onboarding.is_active("owner").await);
    }

    #[tokio::test]
    async fn changed_step_list_takes_effect_mid_dialog() {
        let store = FakeStore::with_steps(three_steps());
        let onboarding = Onboarding::new(Arc::clone(&store) as Arc<dyn ProfileStore>);

        onboarding.begin("owner").await.unwrap();
        onboarding.advance("owner", "Max").await.unwrap();

        // Swap the remaining questions upstream; the session keeps its cursor.
        let mut swapped = three_steps();
        swapped[1] = step("opening_hours", "When are you open?");
        *store.steps.lock().unwrap() = swapped;

        match onboarding.advance("owner", "9 to 5").await.unwrap() {
            StepOutcome::NextQuestion(next) => assert_eq!(next.key, "tone"),
            other => panic!("unexpected outcome {other:?}"),
        }

        onboarding.advance("owner", "casual").await.unwrap();
        let saved = store.saved.lock().unwrap();
        assert_eq!(saved[0].1["opening_hours"], "9 to 5");
    }

    #[test]
    fn format_question_includes_placeholder() {
        let q = format_question(&step("tone", "What tone should replies use?"));
        assert_eq!(q, "What tone should replies use?\n(e.g. example tone)");
    }
}
