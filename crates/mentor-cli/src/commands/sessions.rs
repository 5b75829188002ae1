//! Session management subcommands.

use anyhow::Result;
use colored::Colorize;

use super::open_session_service;

pub async fn list() -> Result<()> {
    let service = open_session_service()?;
    let sessions = service.list_sessions().await?;
    let active = service.active_session_id().await;

    if sessions.is_empty() {
        println!("No sessions yet. Start one with `mentor sessions new <topic>`.");
        return Ok(());
    }

    for session in sessions {
        let marker = if active.as_deref() == Some(session.id.as_str()) {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {}  {}  ({} messages, updated {})",
            marker,
            session.id.dimmed(),
            session.topic,
            session.message_count(),
            session.updated_at
        );
    }

    Ok(())
}

pub async fn new(topic: String) -> Result<()> {
    let service = open_session_service()?;
    let session = service.create_session(topic).await?;
    println!("Created session {} ({})", session.id.green(), session.topic);
    Ok(())
}

pub async fn delete(id: String) -> Result<()> {
    let service = open_session_service()?;
    service.delete_session(&id).await?;
    println!("Deleted session {}", id);
    Ok(())
}

pub async fn rename(id: String, topic: String) -> Result<()> {
    let service = open_session_service()?;
    service.rename_session(&id, topic).await?;
    println!("Renamed session {}", id);
    Ok(())
}
