//! Per-sender onboarding session state.

/// An in-progress profile-capture dialog.
///
/// `step` is the cursor into the question sequence; `answers` accumulate in
/// question order. The session lives in the orchestrator's session map and
/// never outlives the process.
#[derive(Debug, Clone, Default)]
pub struct OnboardingSession {
    step: usize,
    answers: Vec<(String, String)>,
}

impl OnboardingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current question index.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Record the answer for the current step and advance the cursor.
    /// Answer content is accepted as-is; no validation is performed.
    pub fn record_answer(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.answers.push((key.into(), text.into()));
        self.step += 1;
    }

    /// Collected answers in question order.
    pub fn answers(&self) -> &[(String, String)] {
        &self.answers
    }

    /// Collected answers as the JSON object the profile store expects.
    pub fn answers_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, text) in &self.answers {
            map.insert(key.clone(), serde_json::Value::String(text.clone()));
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_step_zero() {
        let session = OnboardingSession::new();
        assert_eq!(session.step(), 0);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn record_answer_advances_cursor() {
        let mut session = OnboardingSession::new();
        session.record_answer("assistant_name", "Max");
        assert_eq!(session.step(), 1);
        session.record_answer("tone", "casual");
        assert_eq!(session.step(), 2);
    }

    #[test]
    fn answers_keep_question_order() {
        let mut session = OnboardingSession::new();
        session.record_answer("assistant_name", "Max");
        session.record_answer("description", "books appointments");
        session.record_answer("tone", "casual");

        let keys: Vec<&str> = session.answers().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["assistant_name", "description", "tone"]);
    }

    #[test]
    fn answers_json_holds_all_keys() {
        let mut session = OnboardingSession::new();
        session.record_answer("assistant_name", "Max");
        session.record_answer("tone", "casual");

        let json = session.answers_json();
        assert_eq!(json["assistant_name"], "Max");
        assert_eq!(json["tone"], "casual");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn any_text_accepted_as_answer() {
        let mut session = OnboardingSession::new();
        session.record_answer("description", "   spaces and emoji 💪   ");
        assert_eq!(session.answers()[0].1, "   spaces and emoji 💪   ");
    }
}
