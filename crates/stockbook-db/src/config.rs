//! # Configuration
//!
//! Where the ledger database lives and which app namespace it writes under.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKBOOK_DB_PATH=/data/stockbook.db                               │
//! │     STOCKBOOK_APP_ID=stockbook-staging                                 │
//! │     STOCKBOOK_MAX_CONNECTIONS=4                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockbook/stockbook.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockbook.stockbook/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/stockbook/stockbook.db"
//! max_connections = 5
//! connect_timeout_secs = 30
//! idle_timeout_secs = 600
//!
//! [ledger]
//! app_id = "stockbook"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::pool::DbConfig;

pub const CONFIG_FILE_NAME: &str = "stockbook.toml";
pub const DEFAULT_APP_ID: &str = "stockbook";

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle pooled connections are closed after this long.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stockbook", "stockbook")
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("stockbook.db"))
        .unwrap_or_else(|| PathBuf::from("./stockbook.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// `[ledger]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Namespace every document is written under, next to the owner id.
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            app_id: default_app_id(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Stockbook configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockbookConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,
}

impl StockbookConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else the platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// `stockbook.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("ledger.app_id must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        Ok(())
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.database.idle_timeout_secs))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(app_id) = std::env::var("STOCKBOOK_APP_ID") {
            debug!(app_id = %app_id, "Overriding app id from environment");
            self.ledger.app_id = app_id;
        }

        if let Ok(max) = std::env::var("STOCKBOOK_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid STOCKBOOK_MAX_CONNECTIONS"),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StockbookConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.app_id, "stockbook");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = StockbookConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/shop.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.connect_timeout_secs, 30);
        assert_eq!(config.database.idle_timeout_secs, 600);
        assert_eq!(config.ledger.app_id, "stockbook");
    }

    #[test]
    fn test_db_config_mapping() {
        let config = StockbookConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/shop.db"
            max_connections = 2
            connect_timeout_secs = 7
            idle_timeout_secs = 45
            "#,
        )
        .unwrap();

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(db.max_connections, 2);
        assert_eq!(db.connect_timeout, Duration::from_secs(7));
        assert_eq!(db.idle_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_invalid_values() {
        let blank_app = StockbookConfig::from_toml_str("[ledger]\napp_id = \"  \"\n").unwrap();
        assert!(matches!(blank_app.validate(), Err(ConfigError::Invalid(_))));

        let no_conns =
            StockbookConfig::from_toml_str("[database]\nmax_connections = 0\n").unwrap();
        assert!(no_conns.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = StockbookConfig::from_toml_str("[database\npath = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_explicit_file_falls_back_to_defaults() {
        let config = StockbookConfig::load_or_default(Some(PathBuf::from(
            "/nonexistent/stockbook/stockbook.toml",
        )));
        assert!(!config.ledger.app_id.is_empty());
    }
}
