// API Server for the pipeline editor
// REST layer over the pipeline-dag validator, with OpenAPI documentation

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CorsConfig, GraphLimits, ServerConfig};
pub use error::{ApiError, Result};
pub use server::{Server, ServerBuilder};
pub use state::AppState;
