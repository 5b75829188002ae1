//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation
//! thread, including the sender and quiz-question detection on message text.

use serde::{Deserialize, Serialize};

/// The four option markers that make an assistant message a quiz question.
const OPTION_MARKERS: [&str; 4] = ["(A)", "(B)", "(C)", "(D)"];

/// Represents the sender of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message from the user.
    User,
    /// Message from the mentor assistant.
    Assistant,
}

/// A single message in a conversation history.
///
/// Messages are immutable once appended; ordering is insertion order and is
/// significant (the last assistant message drives which affordances are
/// shown next).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The sender of the message.
    pub sender: Sender,
    /// The raw message text (possibly containing quiz-question markup).
    pub text: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Marks a fallback response appended when the answer service failed.
    #[serde(default)]
    pub is_fallback: bool,
}

impl ChatMessage {
    /// Creates a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            is_fallback: false,
        }
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            is_fallback: false,
        }
    }

    /// Creates an assistant fallback message (apology after a service failure).
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            is_fallback: true,
            ..Self::assistant(text)
        }
    }

    /// A message is a quiz question iff its text contains all four literal
    /// option markers `(A)`, `(B)`, `(C)`, `(D)`.
    pub fn is_quiz_question(&self) -> bool {
        OPTION_MARKERS.iter().all(|marker| self.text.contains(marker))
    }

    /// True when this is a user message consisting of a single answer
    /// letter A-D.
    pub fn is_answer_letter(&self) -> bool {
        self.sender == Sender::User
            && self.text.len() == 1
            && matches!(self.text.as_str(), "A" | "B" | "C" | "D")
    }
}
