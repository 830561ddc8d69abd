//! Route definitions for the API server
//!
//! Routes are organized by functionality:
//! - Ping, health and metrics endpoints
//! - Pipeline analysis

use crate::{config::ServerConfig, handlers, middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pipeline DAG API",
        version = "1.0.0",
        description = "Checks pipeline graphs from the editor for cycles",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        handlers::ping,
        handlers::health_check,
        handlers::metrics,
        handlers::parse_pipeline,
    ),
    components(
        schemas(
            crate::models::ParsePipelineRequest,
            crate::models::ParsePipelineResponse,
            crate::models::PingResponse,
            crate::models::HealthResponse,
            crate::models::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health and monitoring endpoints"),
        (name = "pipelines", description = "Pipeline analysis endpoints"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server"),
    )
)]
pub struct ApiDoc;

/// Create the application router with all routes and middleware
///
/// Graph and body caps come from `state.limits`; `config` supplies CORS and
/// the request timeout.
pub fn create_router(config: &ServerConfig, state: AppState) -> anyhow::Result<Router> {
    let cors = middleware::cors_layer(&config.cors)?;
    let limits = state.limits;

    let router = Router::new()
        .route("/", get(handlers::ping))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/pipelines/parse", post(handlers::parse_pipeline))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        // Middleware layers (executed bottom to top)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(axum_middleware::from_fn(middleware::error_body_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
