//! Application state repository implementation.
//!
//! Persists application-level state (the active session ID) to a TOML file
//! and caches it in memory to avoid repeated file I/O.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use mentor_core::error::{MentorError, Result};
use mentor_core::state::{AppState, StateRepository};

/// File-backed [`StateRepository`] with an in-memory cache.
#[derive(Clone)]
pub struct TomlStateRepository {
    /// Cached app state loaded from storage.
    state: Arc<Mutex<AppState>>,
    /// Path of the backing `state.toml` file.
    file_path: PathBuf,
}

impl TomlStateRepository {
    /// Creates a repository backed by `<base_dir>/state.toml`, loading the
    /// current state or falling back to defaults when the file is missing.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)
            .map_err(|e| MentorError::io(format!("Failed to create state directory: {}", e)))?;

        let file_path = base_dir.join("state.toml");
        let initial = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| MentorError::io(format!("Failed to read state file: {}", e)))?;
            toml::from_str(&content)?
        } else {
            AppState::default()
        };

        Ok(Self {
            state: Arc::new(Mutex::new(initial)),
            file_path,
        })
    }

    /// Creates a repository at the default location (`~/.mentor`).
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| MentorError::config("Failed to get home directory"))?;
        Self::new(home_dir.join(".mentor"))
    }

    fn write_state(&self, state: &AppState) -> Result<()> {
        let content = toml::to_string_pretty(state)?;
        fs::write(&self.file_path, content)
            .map_err(|e| MentorError::io(format!("Failed to write state file: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl StateRepository for TomlStateRepository {
    async fn save_state(&self, state: AppState) -> Result<()> {
        {
            let mut cached = self.state.lock().await;
            *cached = state.clone();
        }
        self.write_state(&state)
    }

    async fn get_state(&self) -> Result<AppState> {
        Ok(self.state.lock().await.clone())
    }

    async fn get_active_session(&self) -> Option<String> {
        self.state.lock().await.active_session_id.clone()
    }

    async fn set_active_session(&self, session_id: String) -> Result<()> {
        let mut state = self.state.lock().await.clone();
        state.active_session_id = Some(session_id);
        self.save_state(state).await
    }

    async fn clear_active_session(&self) -> Result<()> {
        let mut state = self.state.lock().await.clone();
        state.active_session_id = None;
        self.save_state(state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_active_session_defaults_to_none() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlStateRepository::new(temp_dir.path()).unwrap();
        assert!(repository.get_active_session().await.is_none());
    }

    #[tokio::test]
    async fn test_set_and_clear_active_session() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlStateRepository::new(temp_dir.path()).unwrap();

        repository
            .set_active_session("session-1".to_string())
            .await
            .unwrap();
        assert_eq!(
            repository.get_active_session().await,
            Some("session-1".to_string())
        );

        repository.clear_active_session().await.unwrap();
        assert!(repository.get_active_session().await.is_none());
    }

    #[tokio::test]
    async fn test_state_survives_a_reload() {
        let temp_dir = TempDir::new().unwrap();
        {
            let repository = TomlStateRepository::new(temp_dir.path()).unwrap();
            repository
                .set_active_session("session-42".to_string())
                .await
                .unwrap();
        }

        let reloaded = TomlStateRepository::new(temp_dir.path()).unwrap();
        assert_eq!(
            reloaded.get_active_session().await,
            Some("session-42".to_string())
        );
    }
}
