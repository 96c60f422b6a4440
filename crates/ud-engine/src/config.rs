//! # Engine Configuration
//!
//! Configuration for the database pool, engine switches and logging.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     UD_DATABASE_PATH=/data/ud-ledger.db                                │
//! │     UD_GUARD_COMPLETION=true                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/ledger/ud-ledger.toml (Linux)                            │
//! │     ~/Library/Application Support/com.ud.ledger/ud-ledger.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "ud-ledger.db"
//! max_connections = 5
//! min_connections = 1
//! acquire_timeout_secs = 30
//!
//! [engine]
//! max_code_attempts = 3
//! guard_completion = false
//!
//! [logging]
//! filter = "info,ud_engine=debug,ud_db=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use ud_db::DbConfig;

use crate::error::{EngineError, EngineResult};

const CONFIG_FILE_NAME: &str = "ud-ledger.toml";

// =============================================================================
// Database Settings
// =============================================================================

/// Connection pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// How long a store call waits for a free connection (seconds).
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("ud-ledger.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

// =============================================================================
// Engine Settings
// =============================================================================

/// Behavior switches of the transaction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// How many times creation re-allocates a code after losing a race.
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,

    /// Run the period guard on `complete` too. Off by default: a draft whose
    /// period was closed after creation may still be completed.
    #[serde(default)]
    pub guard_completion: bool,
}

fn default_max_code_attempts() -> u32 {
    3
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_code_attempts: default_max_code_attempts(),
            guard_completion: false,
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,ud_engine=debug,ud_db=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ud-ledger.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.engine.max_code_attempts == 0 {
            return Err(EngineError::Config(
                "max_code_attempts must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(EngineError::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(EngineError::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(EngineError::Config("database path is empty".into()));
        }

        Ok(())
    }

    /// Pool configuration for [`ud_db::Database::new`].
    pub fn to_db_config(&self) -> DbConfig {
        if self.database.path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }

        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("UD_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("UD_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid UD_MAX_CONNECTIONS"),
            }
        }

        if let Ok(attempts) = std::env::var("UD_MAX_CODE_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(n) => self.engine.max_code_attempts = n,
                Err(_) => warn!(value = %attempts, "Ignoring invalid UD_MAX_CODE_ATTEMPTS"),
            }
        }

        if let Ok(guard) = std::env::var("UD_GUARD_COMPLETION") {
            match guard.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.engine.guard_completion = true,
                "0" | "false" | "no" | "off" => self.engine.guard_completion = false,
                _ => warn!(value = %guard, "Ignoring invalid UD_GUARD_COMPLETION"),
            }
        }

        if let Ok(filter) = std::env::var("UD_LOG_FILTER") {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ud", "ledger")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.engine.max_code_attempts, 3);
        assert!(!config.engine.guard_completion);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.engine.max_code_attempts = 0;
        assert!(config.validate().is_err());

        config.engine.max_code_attempts = 1;
        config.database.min_connections = 10;
        assert!(config.validate().is_err());

        config.database.min_connections = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [engine]
            guard_completion = true
            "#,
        )
        .unwrap();
        assert!(config.engine.guard_completion);
        assert_eq!(config.engine.max_code_attempts, 3);
        assert_eq!(config.database.path, PathBuf::from("ud-ledger.db"));
    }

    #[test]
    fn test_toml_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_memory_path_maps_to_in_memory_pool() {
        let mut config = EngineConfig::default();
        config.database.path = PathBuf::from(":memory:");
        assert!(config.to_db_config().is_in_memory());

        config.database.path = PathBuf::from("ledger.db");
        config.database.acquire_timeout_secs = 7;
        let db = config.to_db_config();
        assert!(!db.is_in_memory());
        assert_eq!(db.acquire_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("ud-ledger-{}.toml", uuid::Uuid::new_v4()));
        let mut config = EngineConfig::default();
        config.engine.max_code_attempts = 7;
        config.save(Some(path.clone())).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let loaded: EngineConfig = toml::from_str(&raw).unwrap();
        assert_eq!(loaded.engine.max_code_attempts, 7);
        std::fs::remove_file(&path).unwrap();
    }
}
