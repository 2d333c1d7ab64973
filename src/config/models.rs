use serde::{Deserialize, Deserializer, Serialize};

/// Signed-in user profile returned by the backend login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Persisted application config
///
/// Missing keys fall back to the defaults below, so older config files
/// keep loading after new fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub onboarding_complete: bool,
    pub dark_mode: bool,
    pub confirm_delete: bool,
    pub user: Option<UserProfile>,
    pub auth_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            onboarding_complete: false,
            dark_mode: true,
            confirm_delete: true,
            user: None,
            auth_token: None,
        }
    }
}

impl AppConfig {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Copy safe to hand to windows: the auth token never leaves the core
    pub fn redacted(&self) -> Self {
        Self {
            auth_token: None,
            ..self.clone()
        }
    }

    /// Merge a partial update, returning true if anything changed
    pub fn apply(&mut self, update: ConfigUpdate) -> bool {
        let before = self.clone();
        if let Some(v) = update.onboarding_complete {
            self.onboarding_complete = v;
        }
        if let Some(v) = update.dark_mode {
            self.dark_mode = v;
        }
        if let Some(v) = update.confirm_delete {
            self.confirm_delete = v;
        }
        if let Some(v) = update.user {
            self.user = v;
        }
        if let Some(v) = update.auth_token {
            self.auth_token = v;
        }
        *self != before
    }
}

/// Partial config sent by the settings window
///
/// Nullable fields are doubly optional: an absent key leaves the value
/// alone, an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub onboarding_complete: Option<bool>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
    #[serde(default)]
    pub confirm_delete: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub user: Option<Option<UserProfile>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub auth_token: Option<Option<String>>,
}

impl ConfigUpdate {
    /// Update that clears the signed-in session
    pub fn sign_out() -> Self {
        Self {
            user: Some(None),
            auth_token: Some(None),
            ..Default::default()
        }
    }

    /// Update that stores a new signed-in session
    pub fn sign_in(user: UserProfile, token: String) -> Self {
        Self {
            onboarding_complete: Some(true),
            user: Some(Some(user)),
            auth_token: Some(Some(token)),
            ..Default::default()
        }
    }
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"darkMode": false, "extra": 1}"#).unwrap();
        assert!(!config.dark_mode);
        assert!(config.confirm_delete);
        assert!(!config.onboarding_complete);
        assert!(config.user.is_none());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let mut config = AppConfig {
            user: Some(UserProfile {
                id: "u1".to_string(),
                email: None,
                name: Some("Ada".to_string()),
                picture: None,
            }),
            auth_token: Some("secret".to_string()),
            ..Default::default()
        };

        let absent: ConfigUpdate = serde_json::from_str(r#"{"darkMode": false}"#).unwrap();
        assert!(absent.user.is_none());
        assert!(config.apply(absent));
        assert_eq!(config.user_id(), Some("u1"));

        let cleared: ConfigUpdate = serde_json::from_str(r#"{"user": null, "authToken": null}"#).unwrap();
        assert_eq!(cleared.user, Some(None));
        assert!(config.apply(cleared));
        assert!(config.user.is_none());
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_apply_reports_no_change() {
        let mut config = AppConfig::default();
        let update = ConfigUpdate {
            dark_mode: Some(true),
            ..Default::default()
        };
        assert!(!config.apply(update));
    }

    #[test]
    fn test_redacted_drops_token() {
        let config = AppConfig {
            auth_token: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!json.contains("secret"));
    }
}
