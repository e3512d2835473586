use std::fmt;

/// Opaque identifier correlating every prediction call of one conversation.
///
/// Format: `teams_{conversation_id}`. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn for_conversation(conversation_id: &str) -> Self {
        Self(format!("teams_{conversation_id}"))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_stable_per_conversation() {
        let a = SessionId::for_conversation("19:abc@thread.v2");
        let b = SessionId::for_conversation("19:abc@thread.v2");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "teams_19:abc@thread.v2");
    }

    #[test]
    fn session_id_differs_between_conversations() {
        assert_ne!(
            SessionId::for_conversation("a"),
            SessionId::for_conversation("b")
        );
    }
}
