//! Caller-owned conversation history.

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One prior message in the conversation.
///
/// The caller keeps the ordered sequence and sends it with every request;
/// nothing is stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    /// A turn authored by the user.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A turn authored by the assistant.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The last `window` turns of `history`, oldest first.
#[must_use]
pub fn recent_turns(history: &[ConversationTurn], window: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(window);
    history.get(start..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_turns_keeps_tail() {
        let history = vec![
            ConversationTurn::user("one"),
            ConversationTurn::assistant("two"),
            ConversationTurn::user("three"),
            ConversationTurn::assistant("four"),
        ];
        let recent = recent_turns(&history, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "two");
        assert_eq!(recent[2].content, "four");
    }

    #[test]
    fn test_recent_turns_short_history() {
        let history = vec![ConversationTurn::user("only")];
        assert_eq!(recent_turns(&history, 3).len(), 1);
        assert!(recent_turns(&[], 3).is_empty());
    }

    #[test]
    fn test_role_wire_format() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).expect("deserialize");
        assert_eq!(turn.role, Role::Assistant);
    }
}
