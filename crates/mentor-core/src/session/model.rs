//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! conversation thread in the application's domain layer.

use serde::{Deserialize, Serialize};

use crate::conversation::{ChatMessage, ConversationMode};

/// Represents one conversation thread.
///
/// A session contains:
/// - The free-text topic the thread started from
/// - The ordered message history
/// - The combined conversation mode (flags and counters)
/// - Timestamps for creation and last update
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Free-text topic of the thread
    pub topic: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Ordered message history; insertion order is significant
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Conversation state machine flags and counters
    #[serde(default)]
    pub mode: ConversationMode,
}

impl Session {
    /// Creates a fresh session with an empty history and default mode.
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            topic: topic.into(),
            created_at: now.clone(),
            updated_at: now,
            messages: Vec::new(),
            mode: ConversationMode::default(),
        }
    }

    /// Number of messages in the history.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Appends a message and bumps the last-activity timestamp.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.touch();
    }

    /// Bumps the last-activity timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_empty_with_default_mode() {
        let session = Session::new("s-1", "photosynthesis");
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.mode, ConversationMode::default());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut session = Session::new("s-1", "topic");
        session.append(ChatMessage::user("first"));
        session.append(ChatMessage::assistant("second"));

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.last_message().unwrap().text, "second");
    }
}
