//! Session updater helper for common update patterns.
//!
//! This module provides `SessionUpdater` which abstracts the common
//! "find → update → save" pattern used across session metadata operations.

use std::sync::Arc;

use mentor_core::error::{MentorError, Result};
use mentor_core::session::{Session, SessionRepository};

/// Helper struct for updating sessions with a common pattern.
///
/// `SessionUpdater` encapsulates the common pattern of:
/// 1. Loading a session from storage
/// 2. Applying updates
/// 3. Updating the timestamp
/// 4. Saving back to storage
pub struct SessionUpdater {
    repository: Arc<dyn SessionRepository>,
}

impl SessionUpdater {
    /// Creates a new `SessionUpdater` with the given repository.
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Updates a session by applying the given updater function.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session doesn't exist
    /// - The updater function returns an error
    /// - Saving to storage fails
    pub async fn update<F>(&self, session_id: &str, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        tracing::debug!("[SessionUpdater] update() called for session_id: {}", session_id);

        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| MentorError::not_found("Session", session_id))?;

        updater(&mut session)?;
        session.touch();

        self.repository.save(&session).await?;

        Ok(())
    }
}
