//! Configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variables that override the `[sheets]` credentials.
pub const ENV_SHEET_ID: &str = "GOOGLE_SHEET_ID";
pub const ENV_CLIENT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const ENV_PRIVATE_KEY: &str = "GOOGLE_PRIVATE_KEY";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where rounds are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Google Sheets via a service account
    #[default]
    Google,
    /// In-process sheet, lost on exit
    Memory,
}

/// Spreadsheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Spreadsheet ID (from the sheet URL)
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Service account email
    #[serde(default)]
    pub client_email: Option<String>,

    /// Service account private key (PEM)
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            spreadsheet_id: None,
            client_email: None,
            private_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl SheetsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Fill credentials from `lookup`; set variables win over the file.
    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(id) = non_empty(ENV_SHEET_ID) {
            self.spreadsheet_id = Some(id);
        }
        if let Some(email) = non_empty(ENV_CLIENT_EMAIL) {
            self.client_email = Some(email);
        }
        if let Some(key) = non_empty(ENV_PRIVATE_KEY) {
            self.private_key = Some(key);
        }
    }
}

/// Game configuration: which ranges hold the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Range read on load
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Range new rounds are appended to
    #[serde(default = "default_append_range")]
    pub append_range: String,

    /// Range the header row is written to
    #[serde(default = "default_header_range")]
    pub header_range: String,
}

fn default_history_range() -> String {
    "sheet1!A1:E1000".to_string()
}

fn default_append_range() -> String {
    "sheet1!A:E".to_string()
}

fn default_header_range() -> String {
    "sheet1!A1:E1".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            history_range: default_history_range(),
            append_range: default_append_range(),
            header_range: default_header_range(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub game: GameConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            sheets: SheetsConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists (defaults otherwise), apply environment
    /// overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.sheets.apply_vars(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let ranges = [
            ("history_range", &self.game.history_range),
            ("append_range", &self.game.append_range),
            ("header_range", &self.game.header_range),
        ];
        for (name, range) in ranges {
            if range.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "game.{} must not be empty",
                    name
                )));
            }
        }

        if self.sheets.backend == StoreBackend::Google {
            let missing: Vec<&str> = [
                (ENV_SHEET_ID, &self.sheets.spreadsheet_id),
                (ENV_CLIENT_EMAIL, &self.sheets.client_email),
                (ENV_PRIVATE_KEY, &self.sheets.private_key),
            ]
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name)
            .collect();

            if !missing.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Google Sheets backend needs credentials, missing: {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.sheets.backend = StoreBackend::Memory;
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sheets.backend, StoreBackend::Google);
        assert_eq!(config.game.history_range, "sheet1!A1:E1000");
        assert_eq!(config.game.append_range, "sheet1!A:E");
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(memory_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = memory_config();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_range() {
        let mut config = memory_config();
        config.game.append_range = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_google_needs_credentials() {
        let mut config = AppConfig::default();
        config.sheets.spreadsheet_id = Some("sheet-id".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains(ENV_CLIENT_EMAIL));
        assert!(err.contains(ENV_PRIVATE_KEY));
        assert!(!err.contains(ENV_SHEET_ID));

        config.sheets.client_email = Some("bot@example.com".to_string());
        config.sheets.private_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_credentials() {
        let vars: HashMap<&str, &str> = [
            (ENV_SHEET_ID, "from-env"),
            (ENV_CLIENT_EMAIL, ""),
            (ENV_PRIVATE_KEY, "pem"),
        ]
        .into_iter()
        .collect();

        let mut sheets = SheetsConfig {
            spreadsheet_id: Some("from-file".to_string()),
            client_email: Some("file@example.com".to_string()),
            ..SheetsConfig::default()
        };
        sheets.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(sheets.spreadsheet_id.as_deref(), Some("from-env"));
        // empty variables don't clobber the file
        assert_eq!(sheets.client_email.as_deref(), Some("file@example.com"));
        assert_eq!(sheets.private_key.as_deref(), Some("pem"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[server]
port = 9090

[sheets]
backend = "memory"

[game]
history_range = "games!A1:E500"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.sheets.backend, StoreBackend::Memory);
        assert_eq!(config.sheets.timeout_seconds, 30);
        assert_eq!(config.game.history_range, "games!A1:E500");
        assert_eq!(config.game.append_range, "sheet1!A:E");
    }

    #[test]
    fn test_from_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_load_missing_file_needs_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = AppConfig::load_with(&path, |_| None).unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains(ENV_SHEET_ID));
        assert!(err.to_string().contains(ENV_PRIVATE_KEY));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let vars: HashMap<&str, &str> = [
            (ENV_SHEET_ID, "sheet-id"),
            (ENV_CLIENT_EMAIL, "bot@example.com"),
            (ENV_PRIVATE_KEY, "pem"),
        ]
        .into_iter()
        .collect();

        let config =
            AppConfig::load_with(&path, |name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sheets.backend, StoreBackend::Google);
        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("sheet-id"));
        assert_eq!(config.game.history_range, "sheet1!A1:E1000");
    }

    #[test]
    fn test_config_serialization_skips_private_key() {
        let mut config = memory_config();
        config.sheets.private_key = Some("secret".to_string());

        let toml_str = toml::to_string(&config).unwrap();
        assert!(!toml_str.contains("secret"));

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.sheets.backend, StoreBackend::Memory);
        assert_eq!(parsed.game.header_range, config.game.header_range);
    }
}
