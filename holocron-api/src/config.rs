//! Command-line arguments
//!
//! Each flag can also be given through its environment variable; both feed
//! the highest-priority tier of [`ServiceConfig`] resolution.

use clap::Parser;
use holocron_common::config::{
    default_config_path, load_toml_config, ConfigOverrides, ServiceConfig,
};
use std::path::PathBuf;

/// Command-line arguments for holocron-api
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "holocron-api")]
#[command(about = "Movie catalog service with Star Wars API synchronization")]
#[command(version)]
pub struct Args {
    /// TOML config file (defaults to ~/.config/holocron/config.toml)
    #[arg(short, long, env = "HOLOCRON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "HOLOCRON_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "HOLOCRON_DATABASE")]
    pub database: Option<PathBuf>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRATION_SECS")]
    pub jwt_expiration_secs: Option<i64>,

    /// Star Wars API base URL
    #[arg(long, env = "SWAPI_BASE_URL")]
    pub swapi_base_url: Option<String>,

    /// Local hour (0-23) of the daily synchronization
    #[arg(long, env = "HOLOCRON_SYNC_HOUR")]
    pub sync_hour: Option<u32>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            database_path: self.database.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration_secs: self.jwt_expiration_secs,
            swapi_base_url: self.swapi_base_url.clone(),
            sync_hour: self.sync_hour,
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }
}

/// Resolved configuration plus the file it came from, if one was read
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServiceConfig,
    pub source: Option<PathBuf>,
}

/// Merge arguments, the config file and defaults.
pub fn load(args: &Args) -> holocron_common::Result<LoadedConfig> {
    let path = args.config_path();
    let file = match &path {
        Some(path) => load_toml_config(path)?,
        None => None,
    };
    let source = file.as_ref().and(path);

    let config = ServiceConfig::resolve(args.overrides(), file.unwrap_or_default())?;
    Ok(LoadedConfig { config, source })
}
