//! Per-session conversation history.
//!
//! Keeps a bounded, ordered transcript per session id. The full transcript
//! is sent to the completion provider on every turn, so the cap bounds both
//! memory and prompt size. Sessions are created on first use and live for
//! the process lifetime; there is no expiry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire-format role string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single transcript entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Session-keyed store of bounded conversation buffers.
///
/// One mutex guards the whole session map. Appends for different sessions
/// never interfere beyond lock contention; concurrent turns on the *same*
/// session are intentionally not transactional (see DESIGN.md).
pub struct ConversationStore {
    sessions: Mutex<HashMap<String, Vec<ChatMessage>>>,
    cap: usize,
}

impl ConversationStore {
    /// Create a store retaining at most `cap` messages per session.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            cap,
        }
    }

    /// Maximum messages retained per session.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Append a message to a session's transcript, creating the session on
    /// first use. Never fails.
    pub fn append(&self, session_id: &str, role: Role, content: impl Into<String>) {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(ChatMessage {
                role,
                content: content.into(),
            });
    }

    /// Clone of a session's transcript in chronological order.
    /// An unseen session yields an empty transcript, not an error.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Drop the oldest entries beyond the cap, keeping the most recent
    /// messages in their original relative order.
    pub fn trim(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        if let Some(messages) = sessions.get_mut(session_id) {
            if messages.len() > self.cap {
                let excess = messages.len() - self.cap;
                messages.drain(..excess);
            }
        }
    }
}
