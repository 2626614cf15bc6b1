//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the host.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bot host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Database connectivity settings.
    pub database: DatabaseConfig,

    /// Bot client settings.
    pub bot: BotConfig,

    /// Startup/shutdown sequencing settings.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `postgres://user:pass@db:5432/app`.
    ///
    /// Left unchecked by validation: an unusable URI is reported by the
    /// database step of the startup sequence.
    pub uri: String,
}

/// Bot client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot API token (`<id>:<secret>`). Empty means "no bot configured".
    pub token: String,

    /// Base URL of the Bot HTTP API.
    pub api_base_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

/// Lifecycle sequencing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Upper bound for the bot `stop` call during shutdown.
    ///
    /// `None` waits indefinitely.
    pub stop_timeout_secs: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.database.uri.is_empty());
        assert!(config.bot.token.is_empty());
        assert_eq!(config.lifecycle.stop_timeout_secs, None);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            uri = "postgres://db:5432/app"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.uri, "postgres://db:5432/app");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.bot.api_base_url, "https://api.telegram.org");
    }
}
