//! Configuration management for equiptrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::listing::TableName;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "equiptrack";

/// Default local storage database file name.
const STORAGE_FILE_NAME: &str = "local_storage.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "EQUIPTRACK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `EQUIPTRACK_`, nested with `__`)
/// 2. TOML config file at `~/.config/equiptrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session gate configuration.
    pub session: SessionConfig,
    /// Listing view configuration.
    pub listing: ListingConfig,
    /// Notification configuration.
    pub notifications: NotificationConfig,
    /// Interactive shell configuration.
    pub shell: ShellConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the local storage database.
    /// Defaults to `~/.local/share/equiptrack/local_storage.db`
    pub storage_path: Option<PathBuf>,
    /// Key under which the signed-in user record is kept.
    pub storage_key: String,
}

/// Listing view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Table shown when the database view is first opened.
    pub default_table: String,
    /// Symbol prefixed to non-empty product costs.
    pub currency_symbol: String,
    /// Text of the placeholder row shown for an empty table.
    pub placeholder_text: String,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a notification stays on screen, in milliseconds.
    pub dismiss_after_ms: u64,
}

/// Interactive shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each command.
    pub prompt: String,
    /// Echo each command back before running it (useful for scripts).
    pub echo_commands: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: None, // Resolved at runtime
            storage_key: "user".to_string(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_table: "products".to_string(),
            currency_symbol: "$".to_string(),
            placeholder_text: "No records found".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 5_000,
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "equiptrack> ".to_string(),
            echo_commands: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.listing.default_table.parse::<TableName>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "listing.default_table must be one of products, assignments, returns (got '{}')",
                    self.listing.default_table
                ),
            });
        }

        if self.session.storage_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "session.storage_key must not be empty".to_string(),
            });
        }

        if self.notifications.dismiss_after_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "notifications.dismiss_after_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the local storage path, resolving defaults if not set.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.session
            .storage_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(STORAGE_FILE_NAME))
    }

    /// Get the configured default table.
    ///
    /// Falls back to products when the value does not name a table, which
    /// can only happen for configs that skipped [`Config::validate`].
    #[must_use]
    pub fn default_table(&self) -> TableName {
        TableName::from_selector(&self.listing.default_table)
    }

    /// Get the notification display time as a Duration.
    #[must_use]
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.notifications.dismiss_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.session.storage_key, "user");
        assert_eq!(config.listing.default_table, "products");
        assert_eq!(config.listing.currency_symbol, "$");
        assert_eq!(config.notifications.dismiss_after_ms, 5_000);
        assert!(!config.shell.echo_commands);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_default_table() {
        let mut config = Config::default();
        config.listing.default_table = "widgets".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_table"));
        assert!(err.contains("widgets"));
    }

    #[test]
    fn test_validate_empty_storage_key() {
        let mut config = Config::default();
        config.session.storage_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage_key"));
    }

    #[test]
    fn test_validate_zero_dismiss() {
        let mut config = Config::default();
        config.notifications.dismiss_after_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("dismiss_after_ms"));
    }

    #[test]
    fn test_storage_path_default() {
        let config = Config::default();
        let path = config.storage_path();

        assert!(path.to_string_lossy().contains("equiptrack"));
        assert!(path.to_string_lossy().ends_with("local_storage.db"));
    }

    #[test]
    fn test_storage_path_custom() {
        let mut config = Config::default();
        config.session.storage_path = Some(PathBuf::from("/custom/ls.db"));

        assert_eq!(config.storage_path(), PathBuf::from("/custom/ls.db"));
    }

    #[test]
    fn test_default_table() {
        let mut config = Config::default();
        assert_eq!(config.default_table(), TableName::Products);

        config.listing.default_table = "Returns".to_string();
        assert_eq!(config.default_table(), TableName::Returns);
    }

    #[test]
    fn test_dismiss_after() {
        assert_eq!(
            Config::default().dismiss_after(),
            Duration::from_millis(5_000)
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("equiptrack"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml = r#"
            [listing]
            default_table = "assignments"
            currency_symbol = "EUR "

            [shell]
            echo_commands = true
        "#;
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();

        assert_eq!(config.default_table(), TableName::Assignments);
        assert_eq!(config.listing.currency_symbol, "EUR ");
        assert!(config.shell.echo_commands);
        // Untouched sections keep their defaults.
        assert_eq!(config.session.storage_key, "user");
        assert_eq!(config.listing.placeholder_text, "No records found");
    }

    #[test]
    fn test_listing_config_deserialize_partial() {
        let json = r#"{"placeholder_text": "Nothing here"}"#;
        let listing: ListingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(listing.placeholder_text, "Nothing here");
        assert_eq!(listing.default_table, "products");
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("storage_key"));
        assert!(json.contains("dismiss_after_ms"));
    }
}
