//! Typed configuration for the Jira and Google Sheets integrations.
//!
//! Values come from environment variables, falling back to the `env` map of
//! `$HOME/.jira-metrics/settings.json` (see [`Settings`]).

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::utils::{mask_secret, Settings};

/// Custom field holding the engineering discipline on our Jira instance.
pub const DEFAULT_DISCIPLINE_FIELD: &str = "customfield_12142";

/// Default HTTP timeout for API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Jira connection settings.
#[derive(Debug, Clone, Serialize)]
pub struct JiraConfig {
    /// Account used for basic auth.
    pub username: String,
    /// API token used as the basic auth password.
    #[serde(serialize_with = "serialize_masked")]
    pub token: String,
    /// Base URL of the Jira instance.
    pub endpoint_prefix: String,
    /// Custom field id carrying the discipline.
    pub discipline_field: String,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl JiraConfig {
    /// Reads the Jira configuration from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            username: settings.require("JIRA_USERNAME")?,
            token: settings.require("JIRA_TOKEN")?,
            endpoint_prefix: settings.require("JIRA_ENDPOINT_PREFIX")?,
            discipline_field: settings
                .get_env_var("JIRA_DISCIPLINE_FIELD")
                .unwrap_or_else(|| DEFAULT_DISCIPLINE_FIELD.to_string()),
            timeout: Duration::from_secs(
                settings.get_parsed_or("JIRA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
        })
    }
}

/// Google Sheets destination settings.
#[derive(Debug, Clone, Serialize)]
pub struct SheetsConfig {
    /// OAuth bearer token. Only needed when actually writing.
    #[serde(serialize_with = "serialize_masked_opt")]
    pub access_token: Option<String>,
    /// Spreadsheet id from the sheet URL.
    pub spreadsheet_id: String,
    /// A1 range ticket rows are appended to.
    pub tickets_range: String,
    /// A1 range sprint rows are appended to.
    pub sprints_range: String,
    /// Sheet id of the tickets tab.
    pub tickets_gid: i64,
    /// Sheet id of the sprint list tab.
    pub sprints_gid: i64,
}

impl SheetsConfig {
    /// Reads the spreadsheet configuration from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            access_token: settings
                .get_env_var("GOOGLE_ACCESS_TOKEN")
                .filter(|t| !t.trim().is_empty()),
            spreadsheet_id: settings.require("GOOGLE_SPREADSHEET")?,
            tickets_range: settings.require("GOOGLE_SPREADSHEET_TICKETS_WR")?,
            sprints_range: settings.require("GOOGLE_SPREADSHEET_SPRINTS_WR")?,
            tickets_gid: settings.get_parsed_or("GOOGLE_SPREADSHEET_TICKETS_GID", 0)?,
            sprints_gid: settings.get_parsed_or("GOOGLE_SPREADSHEET_SPRINTS_GID", 0)?,
        })
    }

    /// Returns the access token or an error explaining how to set it.
    pub fn require_access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .context("Google access token not found. Set GOOGLE_ACCESS_TOKEN or use --dry-run")
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Jira settings.
    pub jira: JiraConfig,
    /// Spreadsheet settings.
    pub sheets: SheetsConfig,
}

impl AppConfig {
    /// Loads settings from the default location and builds the configuration.
    pub fn load() -> Result<Self> {
        let settings = Settings::load().context("Failed to load settings")?;
        Self::from_settings(&settings)
    }

    /// Builds the configuration from already loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            jira: JiraConfig::from_settings(settings).context("Incomplete Jira configuration")?,
            sheets: SheetsConfig::from_settings(settings)
                .context("Incomplete Google Sheets configuration")?,
        })
    }
}

fn serialize_masked<S: serde::Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&mask_secret(value))
}

fn serialize_masked_opt<S: serde::Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(&mask_secret(v)),
        None => serializer.serialize_none(),
    }
}

mod duration_secs {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;

    const CONFIG_KEYS: [&str; 11] = [
        "JIRA_USERNAME",
        "JIRA_TOKEN",
        "JIRA_ENDPOINT_PREFIX",
        "JIRA_DISCIPLINE_FIELD",
        "JIRA_TIMEOUT_SECS",
        "GOOGLE_ACCESS_TOKEN",
        "GOOGLE_SPREADSHEET",
        "GOOGLE_SPREADSHEET_TICKETS_WR",
        "GOOGLE_SPREADSHEET_SPRINTS_WR",
        "GOOGLE_SPREADSHEET_TICKETS_GID",
        "GOOGLE_SPREADSHEET_SPRINTS_GID",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serializes tests touching config keys and clears any exported ones,
    /// since the environment wins over the settings map.
    fn lock_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        for key in CONFIG_KEYS {
            env::remove_var(key);
        }
        guard
    }

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        Settings {
            env: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JIRA_USERNAME", "bot@example.com"),
            ("JIRA_TOKEN", "secret-token-1234"),
            ("JIRA_ENDPOINT_PREFIX", "https://example.atlassian.net"),
            ("GOOGLE_SPREADSHEET", "sheet-id"),
            ("GOOGLE_SPREADSHEET_TICKETS_WR", "Tickets!A:K"),
            ("GOOGLE_SPREADSHEET_SPRINTS_WR", "Sprints!A:C"),
            ("GOOGLE_SPREADSHEET_TICKETS_GID", "123"),
        ]
    }

    #[test]
    fn app_config_defaults() {
        let _env = lock_env();
        let config = AppConfig::from_settings(&settings(&complete())).unwrap();
        assert_eq!(config.jira.discipline_field, DEFAULT_DISCIPLINE_FIELD);
        assert_eq!(config.jira.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.sheets.tickets_gid, 123);
        assert_eq!(config.sheets.sprints_gid, 0);
    }

    #[test]
    fn missing_jira_key_is_reported() {
        let _env = lock_env();
        let pairs: Vec<_> = complete()
            .into_iter()
            .filter(|(k, _)| *k != "JIRA_TOKEN")
            .collect();
        let err = AppConfig::from_settings(&settings(&pairs)).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Incomplete Jira configuration"));
        assert!(chain.contains("JIRA_TOKEN"));
    }

    #[test]
    fn secrets_are_masked_when_serialized() {
        let _env = lock_env();
        let mut pairs = complete();
        pairs.push(("GOOGLE_ACCESS_TOKEN", "ya29.abcdefgh"));
        let config = AppConfig::from_settings(&settings(&pairs)).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret-token-1234"));
        assert!(yaml.contains("*************1234"));
        assert!(!yaml.contains("ya29.abcdefgh"));
    }

    #[test]
    fn access_token_required_only_on_demand() {
        let _env = lock_env();
        let config = SheetsConfig::from_settings(&settings(&complete())).unwrap();
        assert!(config.require_access_token().is_err());
    }

    #[test]
    fn environment_overrides_settings_file() {
        let _env = lock_env();
        env::set_var("JIRA_DISCIPLINE_FIELD", "customfield_00000");

        let mut pairs = complete();
        pairs.push(("JIRA_DISCIPLINE_FIELD", "customfield_11111"));
        let config = AppConfig::from_settings(&settings(&pairs));
        env::remove_var("JIRA_DISCIPLINE_FIELD");

        assert_eq!(config.unwrap().jira.discipline_field, "customfield_00000");
    }
}
