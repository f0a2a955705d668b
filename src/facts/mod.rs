//! # Fun Fact Enrichment
//!
//! Classification responses carry a short trivia string about the number,
//! fetched from an external numbers trivia service. The service is treated as
//! unreliable: any failure degrades to [`crate::FALLBACK_FUN_FACT`] and never
//! fails the request.
//!
//! The outbound call sits behind the [`FunFactSource`] trait so the HTTP
//! implementation ([`NumbersApiSource`]) can be swapped for a fake in tests.

pub mod numbers_api;

pub use numbers_api::NumbersApiSource;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Topic requested from the trivia service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
    /// Mathematical facts, used for Armstrong numbers
    Math,
    /// General trivia
    Trivia,
}

impl FactCategory {
    /// `Math` for special numbers, `Trivia` otherwise
    #[must_use]
    pub fn for_number(is_special: bool) -> Self {
        if is_special {
            Self::Math
        } else {
            Self::Trivia
        }
    }

    /// Path segment used by the trivia service
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Trivia => "trivia",
        }
    }
}

impl std::fmt::Display for FactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body returned by the trivia service
///
/// Only `text` is used. The other fields vary between upstream response
/// shapes and are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunFact {
    /// The fact itself
    #[serde(default)]
    pub text: Option<String>,
    /// Number the fact is about
    #[serde(default)]
    pub number: Option<serde_json::Number>,
    /// Whether the service had a fact for this exact number
    #[serde(default)]
    pub found: Option<bool>,
    /// Category reported back by the service
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl FunFact {
    /// The fact text, if present and not blank
    #[must_use]
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Capability to look up a fun fact for a number
///
/// Implementations perform at most one outbound call per invocation and must
/// bound how long that call may take.
#[async_trait]
pub trait FunFactSource: Send + Sync + std::fmt::Debug {
    /// Fetch the fact for `number` in `category`
    async fn fetch(&self, number: u64, category: FactCategory) -> Result<FunFact>;
}

/// Counters for fun fact lookups
#[derive(Debug, Clone, Copy, Default)]
pub struct FactMetrics {
    /// Lookups attempted
    pub requests: u64,
    /// Lookups answered with the fallback text
    pub fallbacks: u64,
}

impl FactMetrics {
    /// Share of lookups that fell back, as a percentage
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fallback_rate_percent(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.fallbacks as f64 / self.requests as f64) * 100.0
        }
    }
}

/// Fetches fun facts and absorbs every upstream failure
#[derive(Debug)]
pub struct FunFactClient {
    source: Arc<dyn FunFactSource>,
    timeout: Duration,
    requests: AtomicU64,
    fallbacks: AtomicU64,
}

impl FunFactClient {
    /// Wrap a fact source; lookups running longer than `timeout` fall back
    pub fn new(source: Arc<dyn FunFactSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            requests: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Fun fact text for `number`, never empty
    ///
    /// Armstrong numbers get a math fact, everything else a trivia fact.
    /// Network errors, bad JSON, missing or blank text, and sources that
    /// outlive the lookup timeout all yield [`crate::FALLBACK_FUN_FACT`].
    #[instrument(level = "debug", name = "fun_fact", skip(self))]
    pub async fn fun_fact(&self, number: u64, is_armstrong: bool) -> String {
        let category = FactCategory::for_number(is_armstrong);
        self.requests.fetch_add(1, Ordering::Relaxed);

        let lookup = tokio::time::timeout(self.timeout, self.source.fetch(number, category));
        let failure = match lookup.await {
            Ok(Ok(fact)) => match fact.usable_text() {
                Some(text) => {
                    debug!(found = ?fact.found, kind = ?fact.kind, "Fun fact received");
                    return text.to_string();
                }
                None => "response had no text".to_string(),
            },
            Ok(Err(e)) => e.internal_message().to_string(),
            Err(_) => format!("lookup exceeded {}ms", self.timeout.as_millis()),
        };

        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        warn!(
            number,
            %category,
            reason = %failure,
            "Fun fact unavailable, using fallback"
        );
        crate::FALLBACK_FUN_FACT.to_string()
    }

    /// Snapshot of lookup counters
    #[must_use]
    pub fn get_metrics(&self) -> FactMetrics {
        FactMetrics {
            requests: self.requests.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}
