// File: src/config.rs
// Purpose: Configuration parsing from switchyard.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use switchyard_router::RoutesConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pattern sets and routes
    #[serde(default)]
    pub routing: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on one dispatch; expired requests get 504
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Dispatch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Status sent when no controller produced a response
    #[serde(default = "default_fallback_status")]
    pub fallback_status: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,
}

// Default values
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_fallback_status() -> u16 {
    404
}

fn default_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fallback_status: default_fallback_status(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to `INFO` for unknown names
    pub fn max_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Config {
    /// Load configuration from switchyard.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./switchyard.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("switchyard.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_timeout_ms, 30_000);
        assert_eq!(config.app.fallback_status, 404);
        assert_eq!(config.logging.max_level(), tracing::Level::INFO);
        assert!(config.routing.routes.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.app.fallback_status, 404);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load("does/not/exist/switchyard.toml").unwrap();
        assert_eq!(config.server.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [server]
            port = 8080
            request_timeout_ms = 250

            [app]
            fallback_status = 410

            [logging]
            level = "debug"

            [routing.patterns]
            id = { regex = '^\d+$' }

            [[routing.routes]]
            name = "user"
            definition = ["users", { name = "id", value = { set = "id" } }]
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_timeout(), std::time::Duration::from_millis(250));
        assert_eq!(config.app.fallback_status, 410);
        assert_eq!(config.logging.max_level(), tracing::Level::DEBUG);
        assert_eq!(config.routing.routes.len(), 1);
        assert_eq!(config.routing.patterns.len(), 1);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let logging = LoggingConfig {
            level: "chatty".into(),
        };
        assert_eq!(logging.max_level(), tracing::Level::INFO);
    }
}
