//! Process-local user profile used to fill templates and reach collaborators.

use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryCredentials;

pub mod handlers;

/// The account application emails are sent from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderAccount {
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing)]
    pub app_password: String,
}

/// Replaced by the user on each save; fields are only checked when used.
/// Secrets are the exception, see [`UserSettings::keep_secrets_from`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub portfolio: String,
    /// Comma-separated.
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub email_template: String,
    #[serde(default)]
    pub discovery: DiscoveryCredentials,
    #[serde(default)]
    pub sender: SenderAccount,
}

impl UserSettings {
    /// Carries over secrets the client did not send. Secrets are never
    /// returned by the API, so a client echoing back what it read must not
    /// erase them. A blank password keeps the stored one; an explicit empty
    /// discovery key clears it.
    pub fn keep_secrets_from(&mut self, current: &UserSettings) {
        if self.sender.app_password.trim().is_empty() {
            self.sender
                .app_password
                .clone_from(&current.sender.app_password);
        }
        if self.discovery.primary_api_key.is_none() {
            self.discovery
                .primary_api_key
                .clone_from(&current.discovery.primary_api_key);
        }
        if self.discovery.secondary_api_key.is_none() {
            self.discovery
                .secondary_api_key
                .clone_from(&current.discovery.secondary_api_key);
        }
    }
}

/// Settings as returned to clients: secrets become presence flags.
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsView {
    pub name: String,
    pub portfolio: String,
    pub skills: String,
    pub email_template: String,
    pub sender_address: String,
    pub has_sender_password: bool,
    pub has_primary_discovery_key: bool,
    pub has_secondary_discovery_key: bool,
}

impl From<&UserSettings> for SettingsView {
    fn from(settings: &UserSettings) -> Self {
        Self {
            name: settings.name.clone(),
            portfolio: settings.portfolio.clone(),
            skills: settings.skills.clone(),
            email_template: settings.email_template.clone(),
            sender_address: settings.sender.address.clone(),
            has_sender_password: !settings.sender.app_password.trim().is_empty(),
            has_primary_discovery_key: settings.discovery.primary().is_some(),
            has_secondary_discovery_key: settings.discovery.secondary().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"name": "Fox", "skills": "Go, SQL"}"#).unwrap();
        assert_eq!(settings.name, "Fox");
        assert!(settings.email_template.is_empty());
        assert!(settings.discovery.primary().is_none());
    }

    #[test]
    fn test_secrets_are_accepted_but_never_serialized() {
        let settings: UserSettings = serde_json::from_str(
            r#"{
                "sender": {"address": "me@gmail.com", "app_password": "pw"},
                "discovery": {"primary_api_key": "p", "secondary_api_key": "s"}
            }"#,
        )
        .unwrap();
        assert_eq!(settings.sender.app_password, "pw");
        assert_eq!(settings.discovery.secondary(), Some("s"));

        let raw = serde_json::to_string(&settings).unwrap();
        assert!(!raw.contains("pw"));
        assert!(!raw.contains("primary_api_key"));
    }

    #[test]
    fn test_keep_secrets_from_fills_absent_secrets() {
        let mut current = UserSettings::default();
        current.sender.app_password = "pw".into();
        current.discovery.primary_api_key = Some("p".into());
        current.discovery.secondary_api_key = Some("s".into());

        let mut incoming: UserSettings = serde_json::from_str(
            r#"{"name": "Fox", "sender": {"address": "me@gmail.com"}, "discovery": {"secondary_api_key": ""}}"#,
        )
        .unwrap();
        incoming.keep_secrets_from(&current);

        assert_eq!(incoming.name, "Fox");
        assert_eq!(incoming.sender.app_password, "pw");
        assert_eq!(incoming.discovery.primary(), Some("p"));
        assert!(incoming.discovery.secondary().is_none());
    }

    #[test]
    fn test_view_reports_presence_flags() {
        let mut settings = UserSettings::default();
        settings.sender.app_password = "pw".into();
        settings.discovery.primary_api_key = Some("key".into());

        let view = SettingsView::from(&settings);
        assert!(view.has_sender_password);
        assert!(view.has_primary_discovery_key);
        assert!(!view.has_secondary_discovery_key);
    }
}
