//! Event type tags for the per-connection event dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of event tags a dispatcher can route on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserLoggedIn,
    UserLoggedOut,
    UserSendsMessage,
    UserReceivesMessage,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::UserLoggedIn => "user_logged_in",
            EventKind::UserLoggedOut => "user_logged_out",
            EventKind::UserSendsMessage => "user_sends_message",
            EventKind::UserReceivesMessage => "user_receives_message",
        };
        f.write_str(s)
    }
}
