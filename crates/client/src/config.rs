//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes the working directory for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SALLA_CLIENT_ID`: OAuth client ID (required)
//! - `SALLA_CLIENT_SECRET`: OAuth client secret (required)
//! - `SALLA_CALLBACK_URL`: Registered redirect URI (required)
//! - `SALLA_SCOPES`: Space-separated scopes (default `offline_access`)
//! - `SALLA_API_BASE_URL`: Merchant API base URL
//! - `SALLA_ACCOUNTS_URL`: Accounts server base URL
//! - `SALLA_HTTP_TIMEOUT_SECS`: Outbound request timeout (default 30)
//!
//! ## File Locations
//! `salla.toml`, `salla.json`, `config.toml`, `config.json` in the current
//! working directory, then next to the executable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use salla_auth::types::DEFAULT_ACCOUNTS_URL;
use salla_auth::OAuthConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::endpoints::{BaseUrls, DEFAULT_API_BASE_URL};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No config file found in any of the standard locations")]
    NoConfigFile,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML format: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SallaConfig {
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub api: ApiSettings,
}

/// Partner-portal app credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

/// Remote endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scopes() -> Vec<String> {
    vec!["offline_access".to_string()]
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_accounts_url() -> String {
    DEFAULT_ACCOUNTS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            accounts_url: default_accounts_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    #[must_use]
    pub fn base_urls(&self) -> BaseUrls {
        BaseUrls::new(self.base_url.clone(), self.accounts_url.clone())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SallaConfig {
    /// Build with default endpoints
    #[must_use]
    pub fn new(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            oauth: OAuthSettings {
                client_id,
                client_secret,
                callback_url,
                scopes: default_scopes(),
            },
            api: ApiSettings::default(),
        }
    }

    /// Check that every configured URL parses
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidUrl`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("oauth.callback_url", &self.oauth.callback_url),
            ("api.base_url", &self.api.base_url),
            ("api.accounts_url", &self.api.accounts_url),
        ];
        for (field, value) in fields {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })?;
        }
        Ok(())
    }

    /// OAuth client configuration against the configured accounts server
    #[must_use]
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::salla(
            self.oauth.client_id.clone(),
            self.oauth.client_secret.clone(),
            self.oauth.callback_url.clone(),
        )
        .with_accounts_url(self.api.accounts_url.clone())
        .with_scopes(self.oauth.scopes.clone())
    }
}

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns [`ConfigError`] if neither source yields a valid configuration
pub fn load() -> Result<SallaConfig, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns [`ConfigError`] if a required variable is missing or a value
/// does not parse
pub fn load_from_env() -> Result<SallaConfig, ConfigError> {
    let mut config = SallaConfig::new(
        env_var("SALLA_CLIENT_ID")?,
        env_var("SALLA_CLIENT_SECRET")?,
        env_var("SALLA_CALLBACK_URL")?,
    );

    if let Ok(scopes) = std::env::var("SALLA_SCOPES") {
        config.oauth.scopes = scopes.split_whitespace().map(str::to_string).collect();
    }
    if let Ok(base_url) = std::env::var("SALLA_API_BASE_URL") {
        config.api.base_url = base_url;
    }
    if let Ok(accounts_url) = std::env::var("SALLA_ACCOUNTS_URL") {
        config.api.accounts_url = accounts_url;
    }
    if let Ok(timeout) = std::env::var("SALLA_HTTP_TIMEOUT_SECS") {
        config.api.timeout_secs = timeout.parse().map_err(|e| ConfigError::InvalidValue {
            key: "SALLA_HTTP_TIMEOUT_SECS".to_string(),
            message: format!("{e}"),
        })?;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns [`ConfigError`] if the file is missing, unreadable or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<SallaConfig, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::FileNotFound(p));
            }
            p
        }
        None => probe_config_paths().ok_or(ConfigError::NoConfigFile)?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)?;
    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<SallaConfig, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents)?),
        "json" => Ok(serde_json::from_str(contents)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["salla.toml", "salla.json", "config.toml", "config.json"];

    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter().flat_map(|dir| NAMES.iter().map(move |name| dir.join(name))).find(|p| p.exists())
}

fn env_var(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
}
