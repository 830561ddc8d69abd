use pipeline_dag::{Edge, Node, ValidationReport};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pipeline submitted by the editor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParsePipelineRequest {
    /// Node objects, each with at least an `id` (string or integer)
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<Node>,

    /// Edge objects, each with at least `source` and `target`
    #[schema(value_type = Vec<Object>)]
    pub edges: Vec<Edge>,
}

/// Pipeline analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParsePipelineResponse {
    /// Number of submitted nodes
    pub num_nodes: usize,

    /// Number of submitted edges, including ones pointing at unknown nodes
    pub num_edges: usize,

    /// Whether the pipeline is a directed acyclic graph
    pub is_dag: bool,
}

impl From<ValidationReport> for ParsePipelineResponse {
    fn from(report: ValidationReport) -> Self {
        Self {
            num_nodes: report.num_nodes,
            num_edges: report.num_edges,
            is_dag: report.is_dag,
        }
    }
}

/// Liveness ping response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    #[serde(rename = "Ping")]
    pub ping: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
