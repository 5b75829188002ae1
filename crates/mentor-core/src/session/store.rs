//! Conversation state store trait.
//!
//! The per-session load/save contract the message dispatcher works against.
//! Mode and messages are independently loadable so a UI can restore either
//! without the other; implementations back both with one session record.

use async_trait::async_trait;

use crate::conversation::{ChatMessage, ConversationMode};
use crate::error::Result;

/// Durable key-value style store for conversation state, scoped by session
/// id.
///
/// Must be safe to call from a single-threaded UI event handler; no
/// concurrency guarantees are required beyond last-write-wins, since only
/// one active UI instance per session is assumed.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the conversation mode, returning the all-default mode if it
    /// was never saved.
    async fn load_mode(&self, session_id: &str) -> Result<ConversationMode>;

    /// Saves the conversation mode.
    async fn save_mode(&self, session_id: &str, mode: &ConversationMode) -> Result<()>;

    /// Loads the ordered message history (empty if never saved).
    async fn load_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// Replaces the message history.
    async fn save_messages(&self, session_id: &str, messages: &[ChatMessage]) -> Result<()>;

    /// Appends one message to the history.
    async fn append_message(&self, session_id: &str, message: &ChatMessage) -> Result<()>;

    /// Removes all persisted state for the session.
    async fn delete_all(&self, session_id: &str) -> Result<()>;
}
