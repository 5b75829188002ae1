//! Session lifecycle service.
//!
//! Coordinates the session repository and the application state repository
//! to create, switch, list, rename, and delete sessions while keeping the
//! active-session pointer consistent.

use std::sync::Arc;
use uuid::Uuid;

use mentor_core::error::{MentorError, Result};
use mentor_core::session::{Session, SessionRepository};
use mentor_core::state::StateRepository;

use super::updater::SessionUpdater;

/// Manages session lifecycle and the active-session pointer.
pub struct SessionService {
    /// Persistent storage backend for session data
    repository: Arc<dyn SessionRepository>,
    /// Application state repository for global state (the active session ID)
    state_repository: Arc<dyn StateRepository>,
}

impl SessionService {
    /// Creates a new `SessionService` with repository backends.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        state_repository: Arc<dyn StateRepository>,
    ) -> Self {
        Self {
            repository,
            state_repository,
        }
    }

    /// Creates a new session for the given topic and sets it as active.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the active pointer cannot be
    /// persisted.
    pub async fn create_session(&self, topic: impl Into<String>) -> Result<Session> {
        let session = Session::new(Uuid::new_v4().to_string(), topic);

        self.repository.save(&session).await?;
        self.state_repository
            .set_active_session(session.id.clone())
            .await?;

        tracing::debug!("[SessionService] Created session {}", session.id);
        Ok(session)
    }

    /// Attempts to restore the last active session on startup.
    ///
    /// # Returns
    ///
    /// `Some(session)` if an active session was recorded and still exists,
    /// `None` otherwise.
    pub async fn restore_last_session(&self) -> Result<Option<Session>> {
        if let Some(session_id) = self.state_repository.get_active_session().await {
            if let Some(session) = self.repository.find_by_id(&session_id).await? {
                return Ok(Some(session));
            }
        }
        Ok(None)
    }

    /// Switches to a different session and sets it as active.
    ///
    /// # Errors
    ///
    /// Returns an error if the session doesn't exist or the active pointer
    /// cannot be persisted.
    pub async fn switch_session(&self, session_id: &str) -> Result<Session> {
        let session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| MentorError::not_found("Session", session_id))?;

        self.state_repository
            .set_active_session(session_id.to_string())
            .await?;

        Ok(session)
    }

    /// Lists all sessions from storage, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.repository.list_all().await
    }

    /// Deletes a session, clearing the active pointer when it was active.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.repository.delete(session_id).await?;

        if self.state_repository.get_active_session().await.as_deref() == Some(session_id) {
            self.state_repository.clear_active_session().await?;
        }

        Ok(())
    }

    /// Renames a session by updating its topic.
    pub async fn rename_session(&self, session_id: &str, new_topic: String) -> Result<()> {
        let updater = SessionUpdater::new(self.repository.clone());
        updater
            .update(session_id, |session| {
                session.topic = new_topic;
                Ok(())
            })
            .await
    }

    /// Returns the ID of the currently active session.
    pub async fn active_session_id(&self) -> Option<String> {
        self.state_repository.get_active_session().await
    }
}
