//! Pipeline DAG API Server
//!
//! Entry point for the REST server that checks editor pipelines for cycles.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (0.0.0.0:8000, editor at http://localhost:3000)
//! cargo run --bin pipeline-server
//!
//! # Custom host, port and allowed origins
//! cargo run --bin pipeline-server -- --host 127.0.0.1 --port 9090 \
//!     --cors-origins http://localhost:3000,https://editor.example.com
//!
//! # Enable debug logging
//! RUST_LOG=debug cargo run --bin pipeline-server
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter, overrides `--log-level`
//! - `PIPELINE_HOST`, `PIPELINE_PORT`, `PIPELINE_REQUEST_TIMEOUT`
//! - `PIPELINE_CORS_ORIGINS`, `PIPELINE_CORS_METHODS`, `PIPELINE_CORS_HEADERS`,
//!   `PIPELINE_CORS_CREDENTIALS`, `PIPELINE_CORS_MAX_AGE`
//! - `PIPELINE_MAX_NODES`, `PIPELINE_MAX_EDGES`, `PIPELINE_MAX_BODY_BYTES`,
//!   `PIPELINE_REJECT_DANGLING_EDGES`
//! - `PIPELINE_JSON_LOGS`: Emit JSON log lines

use anyhow::Result;
use clap::{ArgAction, Parser};
use pipeline_api_server::{CorsConfig, GraphLimits, ServerBuilder, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pipeline DAG API Server
#[derive(Parser, Debug)]
#[command(
    name = "pipeline-server",
    version,
    about = "REST server that reports whether editor pipelines are acyclic",
    long_about = None
)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "PIPELINE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8000", env = "PIPELINE_PORT")]
    port: u16,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", env = "PIPELINE_REQUEST_TIMEOUT")]
    request_timeout: u64,

    /// Allowed CORS origins, comma separated ("*" for any)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "http://localhost:3000",
        env = "PIPELINE_CORS_ORIGINS"
    )]
    cors_origins: Vec<String>,

    /// Allowed CORS methods, comma separated ("*" for any)
    #[arg(long, value_delimiter = ',', default_value = "*", env = "PIPELINE_CORS_METHODS")]
    cors_methods: Vec<String>,

    /// Allowed CORS request headers, comma separated ("*" for any)
    #[arg(long, value_delimiter = ',', default_value = "*", env = "PIPELINE_CORS_HEADERS")]
    cors_headers: Vec<String>,

    /// Allow credentialed cross-origin requests
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        env = "PIPELINE_CORS_CREDENTIALS"
    )]
    cors_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[arg(long, default_value = "3600", env = "PIPELINE_CORS_MAX_AGE")]
    cors_max_age: u64,

    /// Maximum nodes per pipeline
    #[arg(long, default_value = "10000", env = "PIPELINE_MAX_NODES")]
    max_nodes: usize,

    /// Maximum edges per pipeline
    #[arg(long, default_value = "50000", env = "PIPELINE_MAX_EDGES")]
    max_edges: usize,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "2097152", env = "PIPELINE_MAX_BODY_BYTES")]
    max_body_bytes: usize,

    /// Reject pipelines with edges that reference unknown nodes
    #[arg(long, env = "PIPELINE_REJECT_DANGLING_EDGES")]
    reject_dangling_edges: bool,

    /// Enable JSON logging format
    #[arg(long, env = "PIPELINE_JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: self.request_timeout,
            cors: CorsConfig {
                allowed_origins: self.cors_origins.clone(),
                allowed_methods: self.cors_methods.clone(),
                allowed_headers: self.cors_headers.clone(),
                allow_credentials: self.cors_credentials,
                max_age: self.cors_max_age,
            },
            limits: GraphLimits {
                max_nodes: self.max_nodes,
                max_edges: self.max_edges,
                max_body_bytes: self.max_body_bytes,
                reject_dangling_edges: self.reject_dangling_edges,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);

    info!("🚀 Starting Pipeline DAG API Server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = ServerBuilder::new().config(args.server_config()).build()?;

    info!("✓ Server configuration complete");
    info!("📚 API documentation: http://{}:{}/api-docs/", args.host, args.port);
    info!("💚 Health check: http://{}:{}/health", args.host, args.port);
    info!("📊 Metrics: http://{}:{}/metrics", args.host, args.port);
    info!("Press Ctrl+C to shutdown gracefully");

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Default filter when `RUST_LOG` is not set
fn default_filter(args: &Args) -> String {
    let log_level = args.log_level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        tracing::Level::INFO
    });
    let deps = if log_level <= tracing::Level::DEBUG {
        "debug"
    } else {
        "info"
    };

    format!(
        "pipeline_api_server={},pipeline_dag={},tower_http={},axum={}",
        log_level, log_level, deps, deps
    )
}

/// Initialize tracing/logging subsystem
fn init_tracing(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(args).into());

    if args.json_logs {
        // JSON structured logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Human-readable logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
