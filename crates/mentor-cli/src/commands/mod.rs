pub mod chat;
pub mod sessions;

use std::sync::Arc;

use anyhow::Result;
use mentor_application::SessionService;
use mentor_infrastructure::{TomlSessionStore, TomlStateRepository};

/// Wires the file-backed stores at their default location.
pub fn open_stores() -> Result<(Arc<TomlSessionStore>, Arc<TomlStateRepository>)> {
    let store = Arc::new(TomlSessionStore::default_location()?);
    let state = Arc::new(TomlStateRepository::default_location()?);
    Ok((store, state))
}

/// Builds the session service over the default stores.
pub fn open_session_service() -> Result<SessionService> {
    let (store, state) = open_stores()?;
    Ok(SessionService::new(store, state))
}
