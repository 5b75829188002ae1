//! Infrastructure layer for Mentor.
//!
//! File-backed implementations of the persistence traits defined in
//! `mentor-core`, plus the DTOs describing the on-disk shape.

pub mod dto;
pub mod state_repository;
pub mod toml_session_store;

pub use state_repository::TomlStateRepository;
pub use toml_session_store::TomlSessionStore;
