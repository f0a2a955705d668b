//! # HTTP Server Module
//!
//! Hyper-based HTTP/1.1 server for the classification API. Each connection is
//! served on its own Tokio task; handlers share only immutable state and
//! atomic counters, so any number of requests can be in flight at once.
//!
//! ## Routes
//!
//! - `GET|POST /api/classify-number` - number classification
//! - `GET /health` - service status (when enabled)
//! - `GET /metrics` - Prometheus counters (when enabled)

pub mod config;
pub mod handlers;
pub mod middleware;

pub use config::ServerConfig;
pub use handlers::{ClassificationResponse, ClassifyHandler, ErrorBody, CLASSIFY_PATH};

use crate::error::{ClassifierError, Result};
use crate::facts::{FunFactClient, FunFactSource, NumbersApiSource};
use http_body_util::Full;
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use middleware::RequestTimer;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Request counters exposed by `/metrics`
#[derive(Debug, Default)]
struct RequestCounters {
    requests: AtomicU64,
    rejected: AtomicU64,
}

/// Server instance owning configuration and handlers
#[derive(Debug)]
pub struct ClassifierServer {
    config: ServerConfig,
    fun_facts: Arc<FunFactClient>,
    classify_handler: ClassifyHandler,
    counters: RequestCounters,
}

impl ClassifierServer {
    /// Create a server that fetches fun facts from the configured trivia service
    ///
    /// ## Errors
    /// - `ClassifierError::ConfigError`: if the configuration is invalid or the
    ///   HTTP client cannot be built
    #[instrument(level = "info", name = "server_new")]
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let source = NumbersApiSource::new(&config.fun_fact_base_url, config.fun_fact_timeout())?;
        Ok(Self::with_fact_source(config, Arc::new(source)))
    }

    /// Create a server with an explicit fun fact source
    pub fn with_fact_source(config: ServerConfig, source: Arc<dyn FunFactSource>) -> Self {
        let fun_facts = Arc::new(FunFactClient::new(source, config.fun_fact_timeout()));
        let classify_handler = ClassifyHandler::new(Arc::clone(&fun_facts), config.max_payload_size);

        info!("Classification server initialized");

        Self {
            config,
            fun_facts,
            classify_handler,
            counters: RequestCounters::default(),
        }
    }

    /// Bind the configured address and serve until the process stops
    ///
    /// ## Errors
    /// - `ClassifierError::ServerError`: if binding or accepting fails
    #[instrument(level = "info", name = "server_start", skip(self))]
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.bind_addr;

        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            error!("Failed to bind to address {}: {}", bind_addr, e);
            ClassifierError::server_error(
                format!("Failed to bind to address {bind_addr}: {e}"),
                Some(Box::new(e)),
            )
        })?;

        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    ///
    /// ## Errors
    /// - `ClassifierError::ServerError`: if accepting a connection fails
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("Server listening on {}", listener.local_addr()?);

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await.map_err(|e| {
                error!("Failed to accept connection: {}", e);
                ClassifierError::server_error(
                    format!("Failed to accept connection: {e}"),
                    Some(Box::new(e)),
                )
            })?;

            let server_clone = Arc::clone(&server);

            tokio::task::spawn(async move {
                if let Err(e) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(
                        TokioIo::new(stream),
                        service_fn(move |req: Request<Incoming>| {
                            let server = Arc::clone(&server_clone);
                            async move { server.handle_request(req, remote_addr).await }
                        }),
                    )
                    .await
                {
                    warn!("Connection error from {}: {}", remote_addr, e);
                }
            });
        }
    }

    /// Route a request and convert any error into a JSON error response
    ///
    /// Generic over the body so tests can drive it without a socket.
    #[instrument(level = "debug", name = "handle_request", skip(self, request))]
    pub async fn handle_request<B>(
        &self,
        request: Request<B>,
        remote_addr: SocketAddr,
    ) -> std::result::Result<Response<Full<Bytes>>, Infallible>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let timer = RequestTimer::start(request.method().as_str(), request.uri().path());
        self.counters.requests.fetch_add(1, Ordering::Relaxed);

        let routed = tokio::time::timeout(self.config.request_timeout(), self.route(request))
            .await
            .unwrap_or_else(|_| {
                Err(ClassifierError::internal_error(
                    format!(
                        "Request timed out after {}ms",
                        self.config.request_timeout_ms
                    ),
                    None,
                ))
            });

        let response = match routed {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_critical() {
                    error!("Critical error handling request from {}: {}", remote_addr, e);
                } else {
                    warn!("Request error from {}: {}", remote_addr, e.internal_message());
                }
                if e.status_code() == 400 {
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                }
                self.create_error_response(&e)
            }
        };

        timer.log_completion(response.status().as_u16());
        Ok(response)
    }

    async fn route<B>(&self, request: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match (&method, path.as_str()) {
            (&Method::GET | &Method::POST, CLASSIFY_PATH) => {
                self.classify_handler.handle(request).await
            }
            (&Method::GET, "/health") if self.config.enable_health_check => {
                self.handle_health_check()
            }
            (&Method::GET, "/metrics") if self.config.enable_metrics => self.handle_metrics(),
            _ => {
                warn!("Unknown endpoint: {} {}", method, path);
                handlers::json_response(StatusCode::NOT_FOUND, &ErrorBody::new("Not found"))
            }
        }
    }

    fn handle_health_check(&self) -> Result<Response<Full<Bytes>>> {
        let facts = self.fun_facts.get_metrics();

        let health_status = serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION,
            "fun_fact": {
                "requests": facts.requests,
                "fallbacks": facts.fallbacks,
                "fallback_rate": facts.fallback_rate_percent(),
            }
        });

        handlers::json_response(StatusCode::OK, &health_status)
    }

    fn handle_metrics(&self) -> Result<Response<Full<Bytes>>> {
        let facts = self.fun_facts.get_metrics();

        let prometheus_metrics = format!(
            "# HELP classify_requests_total Total HTTP requests received\n\
             # TYPE classify_requests_total counter\n\
             classify_requests_total {}\n\
             # HELP classify_rejected_total Requests rejected with 400\n\
             # TYPE classify_rejected_total counter\n\
             classify_rejected_total {}\n\
             # HELP classify_fun_fact_requests_total Fun fact lookups attempted\n\
             # TYPE classify_fun_fact_requests_total counter\n\
             classify_fun_fact_requests_total {}\n\
             # HELP classify_fun_fact_fallbacks_total Fun fact lookups answered with fallback text\n\
             # TYPE classify_fun_fact_fallbacks_total counter\n\
             classify_fun_fact_fallbacks_total {}\n",
            self.counters.requests.load(Ordering::Relaxed),
            self.counters.rejected.load(Ordering::Relaxed),
            facts.requests,
            facts.fallbacks,
        );

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "text/plain; version=0.0.4")
            .header("cache-control", "no-cache")
            .body(Full::new(Bytes::from(prometheus_metrics)))?)
    }

    /// JSON error response for `err`, falling back to a bare 500
    fn create_error_response(&self, err: &ClassifierError) -> Response<Full<Bytes>> {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        handlers::json_response(status, &ErrorBody::from(err)).unwrap_or_else(|_| {
            let mut response = Response::new(Full::new(Bytes::from_static(
                br#"{"error":true,"message":"Internal server error"}"#,
            )));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
    }
}

/// Build a server from `config` and serve until the process stops
///
/// ## Example
/// ```rust,no_run
/// use classify_number::{start_server, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig {
///         bind_addr: "127.0.0.1:8080".parse()?,
///         ..ServerConfig::default()
///     };
///     start_server(config).await?;
///     Ok(())
/// }
/// ```
///
/// ## Errors
/// - `ClassifierError::ConfigError`: invalid configuration
/// - `ClassifierError::ServerError`: bind or accept failure
#[instrument(level = "info", name = "start_server")]
pub async fn start_server(config: ServerConfig) -> Result<()> {
    ClassifierServer::new(config)?.start().await
}
