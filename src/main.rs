//! # Classify Number Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:8080, facts from numbersapi.com
//! classify-number
//!
//! # Custom configuration
//! classify-number --bind 127.0.0.1:9000 --fun-fact-timeout 1500
//!
//! # With environment variables
//! export CLASSIFY_BIND_ADDR=0.0.0.0:8080
//! export FUN_FACT_BASE_URL=http://numbersapi.com
//! export LOG_LEVEL=debug
//! classify-number
//! ```
//!
//! ## Exit Codes
//! - 0: clean shutdown
//! - 1: configuration or logging error
//! - 2: server startup error
//! - 3: runtime error

use classify_number::{server::ServerConfig, ClassifierServer};
use std::process;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let config = ServerConfig::from_args();

    if let Err(e) = setup_logging(&config) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    info!("Starting Classify Number Server v{}", classify_number::VERSION);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e.internal_message());
        process::exit(1);
    }
    display_startup_info(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.get_worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build Tokio runtime: {}", e);
            process::exit(2);
        }
    };

    let exit_code = runtime.block_on(run(config));
    process::exit(exit_code);
}

/// Serve until the server fails or a shutdown signal arrives; returns the exit code
async fn run(config: ServerConfig) -> i32 {
    let server = match ClassifierServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e.internal_message());
            return 2;
        }
    };

    tokio::select! {
        result = server.start() => match result {
            Ok(()) => {
                info!("Server shut down cleanly");
                0
            }
            Err(e) => {
                error!("Server error: {}", e.internal_message());
                if e.is_critical() { 2 } else { 3 }
            }
        },
        () = shutdown_signal() => {
            info!("Received shutdown signal, stopping server...");
            0
        }
    }
}

/// Setup structured logging
///
/// JSON output when `ENVIRONMENT=production`, pretty output otherwise.
/// `RUST_LOG` overrides the configured level.
fn setup_logging(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let is_production = std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production")
        .unwrap_or(false);

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.inner().into())
        .from_env()?
        .add_directive("hyper=info".parse()?)
        .add_directive("hyper_util=info".parse()?)
        .add_directive("reqwest=info".parse()?)
        .add_directive("mio=warn".parse()?);

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!("Initialized structured JSON logging for production");
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();

        info!("Initialized pretty-printed logging for development");
    }

    Ok(())
}

/// Completes on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        () = terminate => info!("Received SIGTERM"),
    }
}

/// Log a configuration summary at startup
fn display_startup_info(config: &ServerConfig) {
    info!("=== Classify Number Server Configuration ===");
    info!("Bind Address: {}", config.bind_addr);
    info!("Log Level: {}", config.log_level);
    info!("Fun Fact Service: {}", config.fun_fact_base_url);
    info!("Fun Fact Timeout: {}ms", config.fun_fact_timeout_ms);
    info!("Request Timeout: {}ms", config.request_timeout_ms);
    info!("Max Payload Size: {} bytes", config.max_payload_size);
    info!("Worker Threads: {}", config.get_worker_threads());
    info!(
        "Classify endpoint: http://{}{}",
        config.bind_addr,
        classify_number::server::CLASSIFY_PATH
    );
    if config.enable_health_check {
        info!("Health endpoint: http://{}/health", config.bind_addr);
    }
    if config.enable_metrics {
        info!("Metrics endpoint: http://{}/metrics", config.bind_addr);
    }
    info!("============================================");
}
