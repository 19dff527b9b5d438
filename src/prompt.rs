//! Prompt construction — profile to system instruction, history to request.
//!
//! Pure functions; all state is passed in. The generation request is always
//! the system instruction followed by a bounded window of recent turns, so
//! generation cost stays flat no matter how long a conversation runs.

use crate::llm::ChatMessage;
use crate::store::Profile;

/// Number of history entries (including the new user turn) sent to the
/// generation provider.
pub const HISTORY_WINDOW: usize = 6;

const DEFAULT_ASSISTANT_NAME: &str = "the personal assistant";
const DEFAULT_DESCRIPTION: &str = "a smart personal assistant representing the business";
const DEFAULT_TONE: &str = "friendly and informal";

fn field_or<'a>(field: &'a Option<String>, default: &'a str) -> &'a str {
    match field.as_deref() {
        Some(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

/// Render the profile as a system instruction. Absent or empty fields fall
/// back to the defaults.
pub fn system_instruction(profile: &Profile) -> ChatMessage {
    let assistant_name = field_or(&profile.assistant_name, DEFAULT_ASSISTANT_NAME);
    let description = field_or(&profile.description, DEFAULT_DESCRIPTION);
    let tone = field_or(&profile.tone, DEFAULT_TONE);

    ChatMessage::system(format!(
        "You are {assistant_name} – {description}.\n\
         Answer customers in a {tone} tone.\n\
         Take care not to repeat yourself, use natural language, and avoid overly formal phrasing."
    ))
}

/// Combine the profile, the sender's history, and the new message into an
/// ordered generation request: system instruction, then the last
/// [`HISTORY_WINDOW`] turns of history-including-the-new-message.
pub fn build_request(profile: &Profile, history: &[ChatMessage], new_text: &str) -> Vec<ChatMessage> {
    let mut turns = history.to_vec();
    turns.push(ChatMessage::user(new_text));

    let start = turns.len().saturating_sub(HISTORY_WINDOW);
    let mut request = Vec::with_capacity(1 + turns.len() - start);
    request.push(system_instruction(profile));
    request.extend(turns.drain(..).skip(start));
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn profile(name: Option<&str>, description: Option<&str>, tone: Option<&str>) -> Profile {
        Profile {
            assistant_name: name.map(String::from),
            description: description.map(String::from),
            tone: tone.map(String::from),
        }
    }

    #[test]
    fn system_instruction_uses_profile_fields() {
        let msg = system_instruction(&profile(
            Some("Max"),
            Some("the booking assistant for a barber shop"),
            Some("casual"),
        ));
        assert_eq!(msg.role, Role::System);
        assert!(msg.content.contains("You are Max"));
        assert!(msg.content.contains("barber shop"));
        assert!(msg.content.contains("casual tone"));
    }

    #[test]
    fn system_instruction_defaults_for_missing_fields() {
        let msg = system_instruction(&Profile::default());
        assert!(msg.content.contains(DEFAULT_ASSISTANT_NAME));
        assert!(msg.content.contains(DEFAULT_DESCRIPTION));
        assert!(msg.content.contains(DEFAULT_TONE));
    }

    #[test]
    fn system_instruction_treats_empty_string_as_missing() {
        let msg = system_instruction(&profile(Some(""), Some("   "), Some("dry")));
        assert!(msg.content.contains(DEFAULT_ASSISTANT_NAME));
        assert!(msg.content.contains(DEFAULT_DESCRIPTION));
        assert!(msg.content.contains("dry tone"));
    }

    #[test]
    fn system_instruction_is_deterministic() {
        let p = profile(Some("Max"), None, Some("casual"));
        assert_eq!(system_instruction(&p), system_instruction(&p));
    }

    #[test]
    fn build_request_empty_history() {
        let request = build_request(&Profile::default(), &[], "hello");
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request[1].role, Role::User);
        assert_eq!(request[1].content, "hello");
    }

    #[test]
    fn build_request_appends_new_message_last() {
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello, how can I help?"),
        ];
        let request = build_request(&Profile::default(), &history, "do you open on Friday?");
        assert_eq!(request.len(), 4);
        assert_eq!(request.last().unwrap().content, "do you open on Friday?");
    }

    #[test]
    fn build_request_window_never_exceeds_limit() {
        let mut history = Vec::new();
        for i in 0..20 {
            history.push(ChatMessage::user(format!("q{i}")));
            history.push(ChatMessage::assistant(format!("a{i}")));
        }
        let request = build_request(&Profile::default(), &history, "latest");
        // System instruction plus the window.
        assert_eq!(request.len(), 1 + HISTORY_WINDOW);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request.last().unwrap().content, "latest");
        // Oldest turns were silently dropped.
        assert!(!request.iter().any(|m| m.content == "q0"));
    }

    #[test]
    fn build_request_window_includes_new_message_in_count() {
        // 6 prior turns + new message: only the last 6 of the 7 survive.
        let history: Vec<ChatMessage> = (0..HISTORY_WINDOW)
            .map(|i| ChatMessage::user(format!("m{i}")))
            .collect();
        let request = build_request(&Profile::default(), &history, "new");
        assert_eq!(request.len(), 1 + HISTORY_WINDOW);
        assert!(!request.iter().any(|m| m.content == "m0"));
        assert!(request.iter().any(|m| m.content == "m1"));
    }
}
