//! Interaction layer for Mentor.
//!
//! This crate provides the [`AnswerService`] contract the conversation
//! engine depends on, plus the HTTP webhook implementation and its
//! configuration loading.

pub mod answer_service;
pub mod config;
pub mod webhook_service;

pub use answer_service::AnswerService;
pub use config::{load_secret_config, SecretConfig, WebhookConfig};
pub use webhook_service::WebhookAnswerService;
