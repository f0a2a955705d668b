//! # Error Handling Module
//!
//! Error taxonomy for the classification service. Client-facing failures
//! (bad input, negative numbers) carry a descriptive message and the offending
//! token; everything else is logged in full and answered with a generic message.
//!
//! ## Propagation
//!
//! - **Input / Domain errors**: returned to the caller as HTTP 400
//! - **Upstream errors**: produced by fun-fact sources and always absorbed by
//!   [`crate::facts::FunFactClient`], never surfaced to a caller
//! - **Server / Config / Internal errors**: HTTP 500 with a sanitized message

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// All error conditions raised by the classification service
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The number token was missing, blank, or not a base-10 integer
    ///
    /// Also covers malformed POST bodies and oversized payloads.
    #[error("Invalid input: {message}")]
    InputError {
        /// Human-readable reason, safe to return to the client
        message: String,
        /// The raw token that was rejected, if one was supplied
        input: Option<String>,
    },

    /// The number parsed but is outside the supported domain (negative)
    #[error("Unsupported number: {message}")]
    DomainError {
        /// Human-readable reason, safe to return to the client
        message: String,
        /// The raw token that was rejected
        input: Option<String>,
    },

    /// The fun-fact service could not be reached or answered with garbage
    #[error("Upstream fun fact service failed: {message}")]
    UpstreamError {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// HTTP server operation failed
    #[error("Server error: {message}")]
    ServerError {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Server configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unexpected internal failure (panicked worker, request timeout)
    #[error("Internal error: {message}")]
    InternalError {
        /// Internal error message for logging
        message: String,
        /// Optional source error for error chain analysis
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClassifierError {
    /// Create an input error for a rejected token
    #[inline]
    pub fn input_error<T>(message: T, input: Option<String>) -> Self
    where
        T: Into<String>,
    {
        Self::InputError {
            message: message.into(),
            input,
        }
    }

    /// Create a domain error for a token that parsed but cannot be classified
    #[inline]
    pub fn domain_error<T>(message: T, input: Option<String>) -> Self
    where
        T: Into<String>,
    {
        Self::DomainError {
            message: message.into(),
            input,
        }
    }

    /// Create an upstream error with message and optional source
    #[inline]
    pub fn upstream_error<T>(
        message: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self::UpstreamError {
            message: message.into(),
            source,
        }
    }

    /// Create a server error with message and optional source
    #[inline]
    pub fn server_error<T>(
        message: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self::ServerError {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error with message and optional source
    #[inline]
    pub fn config_error<T>(
        message: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create an internal error with message and optional source
    #[inline]
    pub fn internal_error<T>(
        message: T,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self
    where
        T: Into<String>,
    {
        Self::InternalError {
            message: message.into(),
            source,
        }
    }

    /// HTTP status code used when this error reaches a client
    ///
    /// Upstream errors map to 502 for completeness, but the handler never
    /// lets one escape.
    #[inline]
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InputError { .. } | Self::DomainError { .. } => 400,
            Self::UpstreamError { .. } => 502,
            Self::ServerError { .. } | Self::ConfigError { .. } | Self::InternalError { .. } => 500,
        }
    }

    /// Message returned to the client
    ///
    /// Validation failures echo their descriptive message so callers can fix
    /// the request. Everything else gets a generic string.
    #[must_use]
    pub fn client_message(&self) -> &str {
        match self {
            Self::InputError { message, .. } | Self::DomainError { message, .. } => message,
            Self::UpstreamError { .. } => "Upstream service unavailable",
            Self::ServerError { .. } | Self::InternalError { .. } => "Internal server error",
            Self::ConfigError { .. } => "Service unavailable",
        }
    }

    /// Detailed message for server-side logging
    #[inline]
    #[must_use]
    pub fn internal_message(&self) -> &str {
        match self {
            Self::InputError { message, .. }
            | Self::DomainError { message, .. }
            | Self::UpstreamError { message, .. }
            | Self::ServerError { message, .. }
            | Self::ConfigError { message, .. }
            | Self::InternalError { message, .. } => message,
        }
    }

    /// The rejected number token, echoed back in 400 responses
    #[must_use]
    pub fn offending_input(&self) -> Option<&str> {
        match self {
            Self::InputError { input, .. } | Self::DomainError { input, .. } => input.as_deref(),
            _ => None,
        }
    }

    /// Whether this error should be logged at ERROR level
    ///
    /// Bad requests and upstream hiccups are expected in normal operation.
    #[inline]
    #[must_use]
    pub fn is_critical(&self) -> bool {
        match self {
            Self::InputError { .. } | Self::DomainError { .. } | Self::UpstreamError { .. } => {
                false
            }
            Self::ServerError { .. } | Self::ConfigError { .. } | Self::InternalError { .. } => true,
        }
    }
}

impl From<std::io::Error> for ClassifierError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        Self::server_error(format!("I/O error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_json::Error> for ClassifierError {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Self::input_error(format!("JSON parsing error: {err}"), None)
    }
}

impl From<hyper::http::Error> for ClassifierError {
    fn from(err: hyper::http::Error) -> Self {
        Self::server_error(format!("HTTP error: {err}"), Some(Box::new(err)))
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Fun fact request timed out: {err}")
        } else if err.is_decode() {
            format!("Fun fact response was not valid JSON: {err}")
        } else {
            format!("Fun fact request failed: {err}")
        };
        Self::upstream_error(message, Some(Box::new(err)))
    }
}
