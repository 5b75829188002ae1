//! Configuration file management for Mentor.
//!
//! Supports reading secrets from `~/.config/mentor/secret.json`.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

/// Answer-service webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Loads the secret configuration file from ~/.config/mentor/secret.json
pub fn load_secret_config() -> Result<SecretConfig, String> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            config_path.display()
        ));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        )
    })
}

/// Returns the path to the configuration file: ~/.config/mentor/secret.json
fn get_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
    Ok(home.join(".config").join("mentor").join("secret.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_webhook_section() {
        let json = r#"{
            "webhook": {
                "url": "https://hooks.example.com/mentor",
                "api_key": "sk-test",
                "timeout_secs": 45
            }
        }"#;
        let config: SecretConfig = serde_json::from_str(json).unwrap();
        let webhook = config.webhook.unwrap();
        assert_eq!(webhook.url, "https://hooks.example.com/mentor");
        assert_eq!(webhook.api_key.as_deref(), Some("sk-test"));
        assert_eq!(webhook.timeout_secs, Some(45));
    }

    #[test]
    fn webhook_section_is_optional() {
        let config: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(config.webhook.is_none());
    }
}
