//! Cloud endpoints and OAuth client settings.
//!
//! Read from an optional `cloud.toml` in the data directory, then
//! overridden by environment variables.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

const API_BASE_ENV: &str = "GHOST_NOTES_API_BASE";
const CLIENT_ID_ENV: &str = "GHOST_NOTES_OAUTH_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "GHOST_NOTES_OAUTH_CLIENT_SECRET";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    /// Base URL of the notes backend, without trailing slash
    pub api_base: String,
    pub oauth: OAuthSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    /// Desktop clients of some providers still require the secret on exchange
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    /// How long to wait for the browser redirect
    pub login_timeout_secs: u64,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8787/api".to_string(),
            oauth: OAuthSettings::default(),
        }
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            client_id: String::new(),
            client_secret: None,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            login_timeout_secs: 300,
        }
    }
}

impl OAuthSettings {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

impl CloudSettings {
    /// Load `cloud.toml` from the data directory and apply env overrides
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("cloud.toml");
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                log::warn!("Config: ignoring invalid {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base) = var(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(id) = var(CLIENT_ID_ENV) {
            self.oauth.client_id = id;
        }
        if let Some(secret) = var(CLIENT_SECRET_ENV) {
            self.oauth.client_secret = Some(secret);
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = CloudSettings::from_toml(
            r#"
            api_base = "https://notes.example.com/api"

            [oauth]
            client_id = "desktop-client"
            "#,
        )
        .unwrap();

        assert_eq!(settings.api_base, "https://notes.example.com/api");
        assert_eq!(settings.oauth.client_id, "desktop-client");
        assert_eq!(settings.oauth.scopes.len(), 3);
        assert_eq!(settings.oauth.login_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = CloudSettings::default();
        settings.apply_env(|key| match key {
            API_BASE_ENV => Some("https://api.example.com/".to_string()),
            CLIENT_SECRET_ENV => Some("shh".to_string()),
            _ => None,
        });

        assert_eq!(settings.api_base, "https://api.example.com");
        assert_eq!(settings.oauth.client_secret.as_deref(), Some("shh"));
        assert!(settings.oauth.client_id.is_empty());
    }
}
