//! Application layer for Mentor.
//!
//! This crate provides the message dispatcher that orchestrates one
//! conversation turn end-to-end, plus session lifecycle services that
//! coordinate between the domain and infrastructure layers.

pub mod dispatcher;
pub mod session;

pub use dispatcher::{MessageDispatcher, TurnOutcome, FALLBACK_REPLY};
pub use session::{SessionService, SessionUpdater};
