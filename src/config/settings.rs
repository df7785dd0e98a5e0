//! Application settings loaded from config.toml and the environment.
//!
//! The TOML file is optional: every section has defaults, and `DATABASE_URL`,
//! `HOST` and `PORT` override whatever the file says.

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Optional administrator created on first start
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the listener.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database settings
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Bootstrap administrator account
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Login name
    pub username: String,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Initial password
    pub password: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

/// Parses configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT value '{port}': {e}"),
        })?;
    }
    Ok(())
}

/// Loads the application configuration.
///
/// Reads `CONFIG_PATH` (default `config.toml`) when the file exists, falls back
/// to defaults otherwise, then applies environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {path}");
        config
    } else {
        warn!("{path} not found, using default configuration");
        AppConfig::default()
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}
