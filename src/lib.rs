//! # Classify Number
//!
//! An HTTP service that takes an integer and describes its arithmetic
//! properties (prime, perfect, Armstrong, parity, digit sum) along with a fun
//! fact fetched from an external numbers trivia service.
//!
//! ## Architecture
//!
//! - [`numbers`] - pure property checks and the combined classification
//! - [`facts`] - fun fact lookup behind a substitutable [`facts::FunFactSource`]
//! - [`server`] - Hyper-based HTTP server, configuration, and handlers
//! - [`error`] - error taxonomy and HTTP status mapping
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use classify_number::{start_server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "0.0.0.0:8080".parse()?,
//!         ..ServerConfig::default()
//!     };
//!
//!     start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! Only malformed or negative input is reported to callers (HTTP 400). A slow
//! or broken trivia service degrades to [`FALLBACK_FUN_FACT`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod facts;
pub mod numbers;
pub mod server;

pub use error::{ClassifierError, Result};
pub use facts::{FactCategory, FunFact, FunFactClient, FunFactSource, NumbersApiSource};
pub use numbers::{NumberClassification, PropertyTag};
pub use server::{start_server, ClassifierServer, ServerConfig};

use std::net::Ipv4Addr;

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address for the server
pub const DEFAULT_BIND_ADDR: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Maximum POST body size in bytes
///
/// A classification body is a single short token; anything near this size
/// is not a legitimate request.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Timeout for a whole request in milliseconds
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Timeout for a single fun fact lookup in milliseconds
pub const FUN_FACT_TIMEOUT_MS: u64 = 3_000;

/// Base URL of the public numbers trivia service
pub const DEFAULT_FUN_FACT_BASE_URL: &str = "http://numbersapi.com";

/// Text returned in `fun_fact` when no fact could be fetched
pub const FALLBACK_FUN_FACT: &str = "No fact available";
