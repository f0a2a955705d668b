//! # Middleware Module
//!
//! Per-request timing and completion logging.

use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Times one request and logs its outcome
#[derive(Debug, Clone)]
pub struct RequestTimer {
    method: String,
    path: String,
    started: Instant,
}

impl RequestTimer {
    /// Start timing a request
    pub fn start(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            started: Instant::now(),
        }
    }

    /// Time since the request started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log request completion, at warn level for 4xx/5xx
    pub fn log_completion(&self, status_code: u16) {
        let elapsed_ms = self.elapsed().as_secs_f64() * 1000.0;

        if status_code >= 400 {
            warn!(
                "Request completed: {} {} - {} ({:.2}ms)",
                self.method, self.path, status_code, elapsed_ms
            );
        } else {
            info!(
                "Request completed: {} {} - {} ({:.2}ms)",
                self.method, self.path, status_code, elapsed_ms
            );
        }
    }
}
