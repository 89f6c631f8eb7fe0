//! Configuration system for the NLQ server
//!
//! Loads configuration from:
//! 1. config.yaml - operational settings (port, database, budgets, logging)
//! 2. .env file - local environment overrides
//!
//! Environment variables always override config.yaml values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the DuckDB database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/people.duckdb".to_string(),
        }
    }
}

/// Query execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum rows a single query may return
    #[serde(default)]
    pub max_rows: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_rows: Some(10_000),
        }
    }
}

/// Sandboxed renderer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Wall-clock budget for one render, in milliseconds
    pub budget_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { budget_ms: 2_000 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a config file
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NLQ_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NLQ_SERVER_PORT") {
            if let Ok(port_num) = port.parse() {
                self.server.port = port_num;
            }
        }

        if let Ok(path) = std::env::var("NLQ_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Ok(max_rows) = std::env::var("NLQ_MAX_ROWS") {
            if let Ok(n) = max_rows.parse() {
                self.execution.max_rows = Some(n);
            }
        }
        if let Ok(budget) = std::env::var("NLQ_RENDER_BUDGET_MS") {
            if let Ok(ms) = budget.parse() {
                self.render.budget_ms = ms;
            }
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Set logging environment variables for the logging module
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/people.duckdb");
        assert_eq!(config.execution.max_rows, Some(10_000));
        assert_eq!(config.render.budget_ms, 2_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_load_with_env_override() {
        std::env::set_var("NLQ_SERVER_PORT", "9090");
        std::env::set_var("NLQ_RENDER_BUDGET_MS", "500");

        let config_yaml = r#"
server:
  host: "0.0.0.0"
  port: 8080
database:
  path: "data/test.duckdb"
render:
  budget_ms: 1000
"#;
        let temp_file = std::env::temp_dir().join("nlq_test_config.yaml");
        std::fs::write(&temp_file, config_yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090); // Overridden
        assert_eq!(config.render.budget_ms, 500); // Overridden
        assert_eq!(config.database.path, "data/test.duckdb");

        std::env::remove_var("NLQ_SERVER_PORT");
        std::env::remove_var("NLQ_RENDER_BUDGET_MS");
        std::fs::remove_file(temp_file).ok();
    }
}
