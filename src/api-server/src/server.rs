//! HTTP server setup and lifecycle management
//!
//! This module handles:
//! - Server initialization and configuration
//! - Graceful shutdown on signals (SIGTERM, SIGINT)
//! - TCP listener setup

use crate::{config::ServerConfig, routes, state::AppState};
use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// HTTP server instance
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the server and block until a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an existing listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting Pipeline DAG API Server");
        info!("Configuration: {:?}", self.config);

        let app = self.router()?;

        let local_addr = listener.local_addr()?;
        info!("Server listening on http://{}", local_addr);
        info!("API documentation available at http://{}/api-docs/", local_addr);
        info!("Pipeline endpoint: http://{}/pipelines/parse", local_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Build the router this server would serve
    pub fn router(&self) -> Result<Router> {
        routes::create_router(&self.config, self.state.clone())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Wait for shutdown signal
///
/// Listens for:
/// - SIGTERM (kill command, docker stop, kubernetes)
/// - SIGINT (Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    info!("Shutdown signal received, waiting for active connections to close...");
}

/// Builder for creating a server with custom configuration
pub struct ServerBuilder {
    config: ServerConfig,
    state: Option<AppState>,
}

impl ServerBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            state: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the host to bind to
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port to listen on
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the request timeout in seconds
    pub fn request_timeout(mut self, timeout: u64) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the application state
    ///
    /// The state's metrics are reused; its limits are replaced by the
    /// configured ones at build time.
    pub fn state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    /// Build the server, creating state if none was given
    pub fn build(self) -> Result<Server> {
        let state = match self.state {
            Some(state) => AppState {
                limits: self.config.limits,
                ..state
            },
            None => AppState::new(self.config.limits).context("Failed to register metrics")?,
        };

        Ok(Server::new(self.config, state))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphLimits;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_server_builder() {
        let server = ServerBuilder::new()
            .host("127.0.0.1")
            .port(9090)
            .request_timeout(60)
            .build()
            .unwrap();

        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 9090);
        assert_eq!(server.config().request_timeout, 60);
    }

    #[test]
    fn test_server_builder_keeps_given_metrics() {
        let state = AppState::new(GraphLimits::default()).unwrap();

        let server = ServerBuilder::new().state(state.clone()).build().unwrap();
        assert!(Arc::ptr_eq(&server.state().metrics, &state.metrics));
    }

    #[tokio::test]
    async fn test_server_builder_limits_follow_config() {
        let config = ServerConfig {
            limits: GraphLimits {
                max_nodes: 1,
                ..GraphLimits::default()
            },
            ..ServerConfig::default()
        };
        let state = AppState::new(GraphLimits::default()).unwrap();

        let server = ServerBuilder::new()
            .state(state)
            .config(config)
            .build()
            .unwrap();
        assert_eq!(server.state().limits.max_nodes, 1);

        let request = Request::builder()
            .method("POST")
            .uri("/pipelines/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"nodes": [{"id": "a"}, {"id": "b"}], "edges": []}).to_string(),
            ))
            .unwrap();
        let response = server.router().unwrap().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_serve_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = ServerBuilder::new().build().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));

        let response = reqwest::Client::new()
            .post(format!("http://{}/pipelines/parse", addr))
            .json(&json!({"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json, json!({"num_nodes": 2, "num_edges": 1, "is_dag": true}));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
