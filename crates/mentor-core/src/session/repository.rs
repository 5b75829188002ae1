//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use async_trait::async_trait;

use super::model::Session;
use crate::error::Result;

/// An abstract repository for managing session persistence.
///
/// This trait defines the contract for persisting and retrieving whole
/// sessions, decoupling the application's core logic from the specific
/// storage mechanism (e.g., TOML files, a database, a browser store).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session to storage.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Deletes a session from storage. Deleting a missing session is not an
    /// error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
