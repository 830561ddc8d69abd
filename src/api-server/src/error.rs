use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Expected request with `Content-Type: application/json`")]
    UnsupportedMediaType,

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Edge references unknown node: {0}")]
    DanglingEdge(String),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            ApiError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::LimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::DanglingEdge(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the rejection metric
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::MalformedJson(_) => "malformed_json",
            ApiError::SchemaMismatch(_) => "schema_mismatch",
            ApiError::UnsupportedMediaType => "unsupported_media_type",
            ApiError::LimitExceeded(_) => "limit_exceeded",
            ApiError::DanglingEdge(_) => "dangling_edge",
            ApiError::Rejected { .. } => "rejected",
            ApiError::InternalError(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::SchemaMismatch(e.body_text()),
            JsonRejection::JsonSyntaxError(e) => ApiError::MalformedJson(e.body_text()),
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType,
            other => ApiError::Rejected {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<prometheus::Error> for ApiError {
    fn from(err: prometheus::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
