use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{debug, warn};

use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};

/// Liveness ping
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is reachable", body = PingResponse)
    ),
    tag = "health"
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        ping: "Pong".to_string(),
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Get metrics (Prometheus format)
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Prometheus metrics", body = String),
        (status = 500, description = "Metrics encoding failed", body = ErrorResponse)
    ),
    tag = "health"
)]
pub async fn metrics(State(state): State<AppState>) -> Result<String> {
    Ok(state.metrics.export()?)
}

/// Analyze a pipeline graph
///
/// Counts nodes and edges and reports whether the graph is acyclic.
/// Edges pointing at unknown node ids are ignored by the cycle check unless
/// the server runs with dangling-edge rejection enabled.
#[utoipa::path(
    post,
    path = "/pipelines/parse",
    request_body = ParsePipelineRequest,
    responses(
        (status = 200, description = "Pipeline analyzed", body = ParsePipelineResponse),
        (status = 400, description = "Malformed JSON", body = ErrorResponse),
        (status = 413, description = "Pipeline exceeds configured limits", body = ErrorResponse),
        (status = 415, description = "Missing JSON content type", body = ErrorResponse),
        (status = 422, description = "Body does not match the pipeline schema", body = ErrorResponse)
    ),
    tag = "pipelines"
)]
pub async fn parse_pipeline(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ParsePipelineRequest>, JsonRejection>,
) -> Result<Json<ParsePipelineResponse>> {
    let result = analyze_payload(&state, payload);

    if let Err(ref e) = result {
        warn!(reason = e.reason(), error = %e, "Pipeline rejected");
        state.metrics.record_rejection(e.reason());
    }

    result
}

fn analyze_payload(
    state: &AppState,
    payload: std::result::Result<Json<ParsePipelineRequest>, JsonRejection>,
) -> Result<Json<ParsePipelineResponse>> {
    let Json(req) = payload?;
    let limits = &state.limits;

    if req.nodes.len() > limits.max_nodes {
        return Err(ApiError::LimitExceeded(format!(
            "{} nodes submitted, at most {} allowed",
            req.nodes.len(),
            limits.max_nodes
        )));
    }
    if req.edges.len() > limits.max_edges {
        return Err(ApiError::LimitExceeded(format!(
            "{} edges submitted, at most {} allowed",
            req.edges.len(),
            limits.max_edges
        )));
    }

    let timer = state.metrics.analysis_duration.start_timer();
    let analysis = pipeline_dag::kahn(&req.nodes, &req.edges);
    timer.observe_duration();

    if limits.reject_dangling_edges && analysis.dangling_edges > 0 {
        let known: std::collections::HashSet<_> = req.nodes.iter().map(|n| &n.id).collect();
        let edge = req
            .edges
            .iter()
            .find(|e| !known.contains(&e.source) || !known.contains(&e.target))
            .map(|e| format!("{} -> {}", e.source, e.target))
            .unwrap_or_default();
        return Err(ApiError::DanglingEdge(edge));
    }

    state.metrics.record_analysis(&analysis);

    let response = ParsePipelineResponse::from(
        analysis.into_report(req.nodes.len(), req.edges.len()),
    );

    debug!(
        num_nodes = response.num_nodes,
        num_edges = response.num_edges,
        dangling_edges = analysis.dangling_edges,
        is_dag = response.is_dag,
        "Pipeline analyzed"
    );

    Ok(Json(response))
}
