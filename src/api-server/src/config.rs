//! Server configuration
//!
//! Built once at startup (from CLI flags and environment, see `main.rs`)
//! and shared read-only with every request afterwards.

use serde::Deserialize;
use std::time::Duration;

/// Errors raised while turning configuration into runtime layers
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("Invalid CORS method: {0}")]
    InvalidMethod(String),

    #[error("Invalid CORS header: {0}")]
    InvalidHeader(String),
}

/// Top-level server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Cross-origin policy
    pub cors: CorsConfig,

    /// Input size caps
    pub limits: GraphLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout: 30,
            cors: CorsConfig::default(),
            limits: GraphLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Cross-origin resource sharing policy
///
/// A single `"*"` entry in any list means "anything". When credentials are
/// allowed, wildcards are answered by mirroring the request instead, since
/// browsers refuse a literal `*` on credentialed requests.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 3600,
        }
    }
}

/// Caps applied to a submitted pipeline before it reaches the validator
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GraphLimits {
    /// Maximum entries in the `nodes` list
    pub max_nodes: usize,

    /// Maximum entries in the `edges` list
    pub max_edges: usize,

    /// Maximum request body size in bytes
    pub max_body_bytes: usize,

    /// Reject edges that point at unknown nodes instead of ignoring them
    pub reject_dangling_edges: bool,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_edges: 50_000,
            max_body_bytes: 2 * 1024 * 1024,
            reject_dangling_edges: false,
        }
    }
}
