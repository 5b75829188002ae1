//! Application state domain model.
//!
//! Contains the application-level state that persists across restarts.

use serde::{Deserialize, Serialize};

/// Application state that persists across restarts.
///
/// # Fields
///
/// * `active_session_id` - The ID of the currently active session, used to
///   restore the conversation on startup and to discard answer-service
///   responses that arrive after the user switched sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    /// ID of the currently active session.
    pub active_session_id: Option<String>,
}

impl AppState {
    /// Creates a new AppState with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
