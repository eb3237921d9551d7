//! Events produced by sources and consumed by handlers.

use parley_types::chat::ChatMessage;
use parley_types::event::EventKind;

/// A single occurrence on a client connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UserLoggedIn,
    UserLoggedOut,
    /// Raw action payload as received from the client.
    UserSendsMessage(serde_json::Value),
    UserReceivesMessage(ChatMessage),
}

impl Event {
    /// Tag used to pick the handler.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::UserLoggedIn => EventKind::UserLoggedIn,
            Event::UserLoggedOut => EventKind::UserLoggedOut,
            Event::UserSendsMessage(_) => EventKind::UserSendsMessage,
            Event::UserReceivesMessage(_) => EventKind::UserReceivesMessage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Event::UserLoggedIn.kind(), EventKind::UserLoggedIn);
        assert_eq!(Event::UserLoggedOut.kind(), EventKind::UserLoggedOut);
        assert_eq!(
            Event::UserSendsMessage(json!({"action": "send_message"})).kind(),
            EventKind::UserSendsMessage
        );
        let msg = ChatMessage::new("a".into(), "b".into(), "hi");
        assert_eq!(
            Event::UserReceivesMessage(msg).kind(),
            EventKind::UserReceivesMessage
        );
    }
}
