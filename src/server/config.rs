//! # Server Configuration Module
//!
//! Configuration for the classification server. Values come from (in order of
//! precedence) command-line arguments, environment variables, then defaults.
//! Every setting is validated before the server starts.

use crate::error::{ClassifierError, Result};
use clap::{ArgAction, Parser};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{metadata::ParseLevelError, Level};

/// Wrapper for `tracing::Level` with serde and `FromStr` support
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLevel(Level);

impl LogLevel {
    /// Returns the inner `tracing::Level` value.
    #[must_use]
    pub fn inner(&self) -> Level {
        self.0
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        Self(level)
    }
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        log_level.0
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s.parse().map_err(serde::de::Error::custom)?))
    }
}

/// Server configuration
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "classify-number",
    about = "HTTP service that classifies integers and adds a fun fact",
    version,
    long_about = None
)]
pub struct ServerConfig {
    /// Network address to bind the server to
    #[arg(
        short = 'b',
        long = "bind",
        value_name = "ADDRESS:PORT",
        default_value = "0.0.0.0:8080",
        env = "CLASSIFY_BIND_ADDR",
        help = "Network address to bind the server to"
    )]
    pub bind_addr: SocketAddr,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        env = "LOG_LEVEL",
        help = "Logging level (error, warn, info, debug, trace)"
    )]
    pub log_level: LogLevel,

    /// Base URL of the numbers trivia service
    ///
    /// Facts are requested as `{base}/{number}/{category}?json`.
    #[arg(
        long = "fun-fact-url",
        value_name = "URL",
        default_value = crate::DEFAULT_FUN_FACT_BASE_URL,
        env = "FUN_FACT_BASE_URL",
        help = "Base URL of the numbers trivia service"
    )]
    pub fun_fact_base_url: String,

    /// Upper bound on a single fun fact lookup, in milliseconds
    ///
    /// Must be shorter than the request timeout so a slow trivia service
    /// degrades to the fallback text instead of failing the request.
    #[arg(
        long = "fun-fact-timeout",
        value_name = "MILLISECONDS",
        default_value_t = crate::FUN_FACT_TIMEOUT_MS,
        env = "FUN_FACT_TIMEOUT_MS",
        help = "Timeout for fun fact lookups in milliseconds"
    )]
    pub fun_fact_timeout_ms: u64,

    /// Maximum POST body size in bytes
    #[arg(
        short = 'm',
        long = "max-payload-size",
        value_name = "BYTES",
        default_value_t = crate::MAX_PAYLOAD_SIZE,
        env = "MAX_PAYLOAD_SIZE",
        help = "Maximum request payload size in bytes"
    )]
    pub max_payload_size: usize,

    /// Request timeout in milliseconds
    #[arg(
        short = 't',
        long = "request-timeout",
        value_name = "MILLISECONDS",
        default_value_t = crate::REQUEST_TIMEOUT_MS,
        env = "REQUEST_TIMEOUT_MS",
        help = "Request timeout in milliseconds"
    )]
    pub request_timeout_ms: u64,

    /// Number of Tokio worker threads (defaults to 2x CPU cores, capped at 16)
    #[arg(
        short = 'w',
        long = "worker-threads",
        value_name = "COUNT",
        env = "WORKER_THREADS",
        help = "Number of worker threads (default: 2x CPU cores, max 16)"
    )]
    pub worker_threads: Option<usize>,

    /// Expose Prometheus counters at /metrics
    #[arg(
        long = "enable-metrics",
        env = "ENABLE_METRICS",
        help = "Enable Prometheus metrics endpoint"
    )]
    pub enable_metrics: bool,

    /// Expose service health at /health
    #[arg(
        long = "enable-health-check",
        env = "ENABLE_HEALTH_CHECK",
        default_value = "true",
        action = ArgAction::Set,
        help = "Enable health check endpoint"
    )]
    pub enable_health_check: bool,
}

impl ServerConfig {
    /// Create a new configuration with default values
    ///
    /// ## Example
    /// ```rust
    /// use classify_number::ServerConfig;
    ///
    /// let config = ServerConfig::new();
    /// assert_eq!(config.bind_addr.port(), 8080);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from command-line arguments and environment
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Validate the configuration for consistency
    ///
    /// ## Errors
    /// - `ClassifierError::ConfigError`: if any setting is unusable
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.ip().is_unspecified() {
            tracing::warn!(
                "Binding to wildcard address {} - ensure this is intended",
                self.bind_addr
            );
        }

        let base_url = url::Url::parse(&self.fun_fact_base_url).map_err(|e| {
            ClassifierError::config_error(
                format!("Invalid fun fact base URL '{}': {e}", self.fun_fact_base_url),
                Some(Box::new(e)),
            )
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClassifierError::config_error(
                format!(
                    "Fun fact base URL must use http or https, got '{}'",
                    base_url.scheme()
                ),
                None,
            ));
        }

        if self.max_payload_size == 0 {
            return Err(ClassifierError::config_error(
                "Maximum payload size cannot be zero",
                None,
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(ClassifierError::config_error(
                "Request timeout cannot be zero",
                None,
            ));
        }

        if self.fun_fact_timeout_ms == 0 {
            return Err(ClassifierError::config_error(
                "Fun fact timeout cannot be zero",
                None,
            ));
        }

        if self.fun_fact_timeout_ms >= self.request_timeout_ms {
            return Err(ClassifierError::config_error(
                format!(
                    "Fun fact timeout ({}ms) must be shorter than the request timeout ({}ms)",
                    self.fun_fact_timeout_ms, self.request_timeout_ms
                ),
                None,
            ));
        }

        if let Some(workers) = self.worker_threads {
            if workers == 0 {
                return Err(ClassifierError::config_error(
                    "Worker thread count cannot be zero",
                    None,
                ));
            }

            if workers > 64 {
                tracing::warn!(
                    "Very high worker thread count: {} - this may cause excessive context switching",
                    workers
                );
            }
        }

        Ok(())
    }

    /// Configured worker thread count, or 2x CPU cores capped at 16
    #[must_use]
    pub fn get_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() * 2)
                .unwrap_or(4)
                .clamp(4, 16)
        })
    }

    /// Fun fact lookup timeout as a `Duration`
    #[must_use]
    pub fn fun_fact_timeout(&self) -> Duration {
        Duration::from_millis(self.fun_fact_timeout_ms)
    }

    /// Whole-request timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(
                crate::DEFAULT_BIND_ADDR.into(),
                crate::DEFAULT_PORT,
            ),
            log_level: LogLevel::from(Level::INFO),
            fun_fact_base_url: crate::DEFAULT_FUN_FACT_BASE_URL.to_string(),
            fun_fact_timeout_ms: crate::FUN_FACT_TIMEOUT_MS,
            max_payload_size: crate::MAX_PAYLOAD_SIZE,
            request_timeout_ms: crate::REQUEST_TIMEOUT_MS,
            worker_threads: None,
            enable_metrics: false,
            enable_health_check: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.log_level, LogLevel::from(Level::INFO));
        assert_eq!(config.fun_fact_base_url, "http://numbersapi.com");
        assert_eq!(config.max_payload_size, crate::MAX_PAYLOAD_SIZE);
        assert_eq!(config.request_timeout_ms, crate::REQUEST_TIMEOUT_MS);
        assert!(config.enable_health_check);
        assert!(!config.enable_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = ServerConfig::default();
        config.fun_fact_base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.fun_fact_base_url = "ftp://numbers.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_limits() {
        let mut config = ServerConfig::default();
        config.max_payload_size = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.fun_fact_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.worker_threads = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fun_fact_timeout_must_fit_in_request_timeout() {
        let mut config = ServerConfig::default();
        config.fun_fact_timeout_ms = config.request_timeout_ms;
        assert!(config.validate().is_err());

        config.fun_fact_timeout_ms = config.request_timeout_ms - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_threads_calculation() {
        let config = ServerConfig::default();
        let worker_count = config.get_worker_threads();
        assert!(worker_count >= 4);
        assert!(worker_count <= 16);

        let mut config = ServerConfig::default();
        config.worker_threads = Some(8);
        assert_eq!(config.get_worker_threads(), 8);
    }

    #[test]
    fn test_cli_parsing() {
        let config = ServerConfig::try_parse_from([
            "classify-number",
            "--bind",
            "127.0.0.1:9000",
            "--fun-fact-url",
            "http://localhost:3000",
            "--fun-fact-timeout",
            "500",
            "--enable-health-check",
            "false",
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.fun_fact_base_url, "http://localhost:3000");
        assert_eq!(config.fun_fact_timeout(), Duration::from_millis(500));
        assert!(!config.enable_health_check);
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default();

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("bind_addr"));
        assert!(json.contains("fun_fact_base_url"));

        let deserialized: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.bind_addr, config.bind_addr);
        assert_eq!(deserialized.log_level, config.log_level);
        assert_eq!(deserialized.fun_fact_timeout_ms, config.fun_fact_timeout_ms);
    }

}
