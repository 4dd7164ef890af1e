//! Bootstrap configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ConfigOverrides`] (the binary's argument
//! parser reads both); this module merges them with the TOML file and the
//! compiled defaults into a validated [`ServiceConfig`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JWT_SECRET: &str = "super-secret-jwt-key";
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 86_400;
pub const DEFAULT_SWAPI_BASE_URL: &str = "https://www.swapi.tech/api";
pub const DEFAULT_SYNC_HOUR: u32 = 3;
pub const DEFAULT_SYNC_MINUTE: u32 = 0;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration file contents. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub jwt_expiration_secs: Option<i64>,
    pub swapi_base_url: Option<String>,
    pub sync_hour: Option<u32>,
    pub sync_minute: Option<u32>,
    pub http_timeout_secs: Option<u64>,
    pub seed_default_users: Option<bool>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub jwt_expiration_secs: Option<i64>,
    pub swapi_base_url: Option<String>,
    pub sync_hour: Option<u32>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
    pub swapi_base_url: String,
    /// Local time of day for the scheduled sync
    pub sync_hour: u32,
    pub sync_minute: u32,
    pub http_timeout_secs: u64,
    pub seed_default_users: bool,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, file and defaults, then validate.
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let config = Self {
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or_else(default_database_path),
            jwt_secret: overrides
                .jwt_secret
                .or(file.jwt_secret)
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            jwt_expiration_secs: overrides
                .jwt_expiration_secs
                .or(file.jwt_expiration_secs)
                .unwrap_or(DEFAULT_JWT_EXPIRATION_SECS),
            swapi_base_url: overrides
                .swapi_base_url
                .or(file.swapi_base_url)
                .unwrap_or_else(|| DEFAULT_SWAPI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            sync_hour: overrides.sync_hour.or(file.sync_hour).unwrap_or(DEFAULT_SYNC_HOUR),
            sync_minute: file.sync_minute.unwrap_or(DEFAULT_SYNC_MINUTE),
            http_timeout_secs: file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            seed_default_users: file.seed_default_users.unwrap_or(true),
            log_level: file.logging.level,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(Error::Config("jwt_secret must not be empty".to_string()));
        }
        if self.jwt_expiration_secs <= 0 {
            return Err(Error::Config(format!(
                "jwt_expiration_secs must be positive, got {}",
                self.jwt_expiration_secs
            )));
        }
        if self.sync_hour > 23 {
            return Err(Error::Config(format!("sync_hour must be 0-23, got {}", self.sync_hour)));
        }
        if self.sync_minute > 59 {
            return Err(Error::Config(format!(
                "sync_minute must be 0-59, got {}",
                self.sync_minute
            )));
        }
        if self.swapi_base_url.is_empty() {
            return Err(Error::Config("swapi_base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// True when no secret was configured anywhere.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Load the TOML config file.
///
/// Returns `Ok(None)` when the file does not exist so the caller can fall
/// back to defaults. A file that exists but does not parse is an error.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok(Some(config))
}

/// `~/.config/holocron/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("holocron").join("config.toml"))
}

/// `~/.local/share/holocron/holocron.db` (platform equivalent elsewhere)
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("holocron"))
        .unwrap_or_else(|| PathBuf::from("./holocron_data"))
        .join("holocron.db")
}
