//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use packing_list_core::Language;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Without a database the service keeps catalog and history in memory.
    pub database_url: Option<String>,
    pub log_level: Level,
    /// Without a key the enhancement step is disabled.
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub enhancement_model: String,
    pub enhancement_timeout: Duration,
    pub default_language: Language,
    pub reminders_enabled: bool,
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            log_level: Level::INFO,
            openrouter_api_key: None,
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            enhancement_model: "openai/gpt-4.1-nano".to_string(),
            enhancement_timeout: Duration::from_secs(20),
            default_language: Language::default(),
            reminders_enabled: true,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server and Database Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        // --- Enhancement Settings ---
        let openrouter_api_key = lookup("OPENROUTER_API_KEY").filter(|key| !key.trim().is_empty());
        let openrouter_base_url =
            lookup("OPENROUTER_BASE_URL").unwrap_or(defaults.openrouter_base_url);
        let enhancement_model = lookup("ENHANCEMENT_MODEL").unwrap_or(defaults.enhancement_model);

        let enhancement_timeout = match lookup("ENHANCEMENT_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "ENHANCEMENT_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    )
                })?,
            None => defaults.enhancement_timeout,
        };

        // --- Localization and Reminders ---
        let default_language = match lookup("DEFAULT_LANGUAGE") {
            Some(raw) => raw.parse::<Language>().map_err(|e| {
                ConfigError::InvalidValue("DEFAULT_LANGUAGE".to_string(), e.to_string())
            })?,
            None => defaults.default_language,
        };

        let reminders_enabled = match lookup("REMINDERS_ENABLED") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "REMINDERS_ENABLED".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => defaults.reminders_enabled,
        };

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openrouter_api_key,
            openrouter_base_url,
            enhancement_model,
            enhancement_timeout,
            default_language,
            reminders_enabled,
            cors_origin,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
