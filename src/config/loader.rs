//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process
/// environment overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(file = ?path, "Configuration loaded");
    Ok(config)
}

/// Overlay environment variables on top of file values.
///
/// Recognised variables: `DATABASE_URI`, `BOT_TOKEN`, `BOT_API_BASE_URL`,
/// `PORT` (binds `0.0.0.0:<PORT>`) and `LOG_LEVEL`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(uri) = lookup("DATABASE_URI") {
        config.database.uri = uri;
    }
    if let Some(token) = lookup("BOT_TOKEN") {
        config.bot.token = token;
    }
    if let Some(base) = lookup("BOT_API_BASE_URL") {
        config.bot.api_base_url = base;
    }
    if let Some(port) = lookup("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: port.clone(),
        })?;
        config.server.bind_address = format!("0.0.0.0:{}", port);
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    Ok(())
}
