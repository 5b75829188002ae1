//! WebhookAnswerService - REST implementation of the answer service.
//!
//! Sends each outbound turn to an external webhook that fronts the
//! answer-generation model and returns the reply body as raw text.
//! Configuration priority: secret.json > environment variables

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::env;
use std::time::Duration;

use mentor_core::{MentorError, Result};

use crate::answer_service::AnswerService;
use crate::config::load_secret_config;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Answer service implementation that talks to an HTTP webhook.
#[derive(Clone)]
pub struct WebhookAnswerService {
    client: Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

impl WebhookAnswerService {
    /// Creates a new service with the provided configuration.
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MentorError::answer_service(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    /// Loads configuration from secret.json or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/mentor/secret.json
    /// 2. Environment variables (MENTOR_WEBHOOK_URL, MENTOR_WEBHOOK_API_KEY,
    ///    MENTOR_WEBHOOK_TIMEOUT_SECS)
    ///
    /// The request timeout defaults to 30 seconds if not specified.
    pub fn try_from_env() -> Result<Self> {
        if let Ok(secret_config) = load_secret_config() {
            if let Some(webhook) = secret_config.webhook {
                return Self::new(
                    webhook.url,
                    webhook.api_key,
                    webhook.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
                );
            }
        }

        let url = env::var("MENTOR_WEBHOOK_URL").map_err(|_| {
            MentorError::config(
                "MENTOR_WEBHOOK_URL not found in ~/.config/mentor/secret.json or environment variables",
            )
        })?;

        let api_key = env::var("MENTOR_WEBHOOK_API_KEY").ok();
        let timeout_secs = env::var("MENTOR_WEBHOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(url, api_key, timeout_secs)
    }
}

#[async_trait]
impl AnswerService for WebhookAnswerService {
    async fn send_message(&self, text: &str, session_id: Option<&str>) -> Result<String> {
        let body = WebhookRequest {
            message: text,
            session_id,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(
            "[WebhookAnswerService] Sending message ({} chars) for session {:?}",
            text.len(),
            session_id
        );

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MentorError::answer_service("Request timed out".to_string())
            } else {
                MentorError::answer_service(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MentorError::answer_service(format!(
                "Webhook returned {}: {}",
                status, detail
            )));
        }

        response
            .text()
            .await
            .map_err(|e| MentorError::answer_service(format!("Failed to read reply body: {}", e)))
    }
}
