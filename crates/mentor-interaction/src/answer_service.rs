//! Answer service trait.
//!
//! The contract the conversation engine needs from the external
//! answer-generation service: raw text in, raw text out, keyed by session
//! id. The response may itself be JSON; classifying it is the caller's
//! responsibility, not the service's.

use async_trait::async_trait;

use mentor_core::Result;

/// An opaque request/response text service keyed by session id.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Sends one outbound message and awaits the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`mentor_core::MentorError::AnswerService`] on network
    /// failure, timeout, or a non-success status; the caller handles the
    /// fallback path.
    async fn send_message(&self, text: &str, session_id: Option<&str>) -> Result<String>;
}
