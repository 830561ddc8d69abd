//! Middleware layer for the API server
//!
//! This module provides middleware components for:
//! - Request ID tracking
//! - Request logging
//! - JSON bodies for bare error responses
//! - CORS configuration

use crate::{
    config::{ConfigError, CorsConfig},
    error::ApiError,
};
use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::info;
use uuid::Uuid;

/// Request ID header name
pub const X_REQUEST_ID: &str = "x-request-id";

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v.trim() == "*")
}

/// Build the CORS layer from startup configuration
///
/// Fails on origins, methods or headers that are not valid HTTP tokens.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    let credentials = config.allow_credentials;

    let origins = if is_wildcard(&config.allowed_origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim()).map_err(|_| ConfigError::InvalidOrigin(o.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if is_wildcard(&config.allowed_methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::any()
        }
    } else {
        let methods = config
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| ConfigError::InvalidMethod(m.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowMethods::list(methods)
    };

    let headers = if is_wildcard(&config.allowed_headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::any()
        }
    } else {
        let headers = config
            .allowed_headers
            .iter()
            .map(|h| {
                HeaderName::from_bytes(h.trim().as_bytes())
                    .map_err(|_| ConfigError::InvalidHeader(h.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowHeaders::list(headers)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials)
        .expose_headers([HeaderName::from_static(X_REQUEST_ID)])
        .max_age(Duration::from_secs(config.max_age)))
}

/// Request ID middleware
///
/// Reuses the caller's `x-request-id` when it is a UUID, otherwise generates
/// one. The id is stored in request extensions and echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    response.headers_mut().insert(
        X_REQUEST_ID,
        HeaderValue::from_str(&request_id.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("invalid-uuid")),
    );

    response
}

/// Request logging middleware
///
/// Logs method, URI, status and latency, tagged with the request ID.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<Uuid>()
        .copied()
        .unwrap_or_else(Uuid::new_v4);

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    let duration_ms = elapsed.as_millis() as u64;

    // event levels must be constant per callsite
    match status {
        500..=599 => tracing::error!(
            request_id = %request_id, method = %method, uri = %uri,
            status, duration_ms, "Request completed"
        ),
        400..=499 => tracing::warn!(
            request_id = %request_id, method = %method, uri = %uri,
            status, duration_ms, "Request completed"
        ),
        _ => tracing::info!(
            request_id = %request_id, method = %method, uri = %uri,
            status, duration_ms, "Request completed"
        ),
    }

    response
}

/// Error body middleware
///
/// Error responses produced outside the handlers (unknown route, wrong
/// method, request timeout) arrive without a body. They are rewritten into
/// the `{"error", "status"}` shape; the `Allow` header of a 405 is kept.
pub async fn error_body_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error())
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rewritten = ApiError::Rejected {
        status,
        message: status.canonical_reason().unwrap_or("Request failed").to_string(),
    }
    .into_response();

    if let Some(allow) = allow {
        rewritten.headers_mut().insert(header::ALLOW, allow);
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    fn cors_app(config: &CorsConfig) -> Router {
        Router::new()
            .route("/", post(test_handler))
            .layer(cors_layer(config).unwrap())
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_request_id_generated() {
        let app = Router::new()
            .route("/", post(test_handler))
            .layer(middleware::from_fn(request_id_middleware));

        let response = app
            .oneshot(Request::builder().method("POST").uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let app = Router::new()
            .route("/", post(test_handler))
            .layer(middleware::from_fn(request_id_middleware));
        let id = Uuid::new_v4().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(X_REQUEST_ID, &id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), id.as_str());
    }

    async fn timed_out() -> StatusCode {
        StatusCode::REQUEST_TIMEOUT
    }

    async fn teapot() -> (StatusCode, &'static str) {
        (StatusCode::IM_A_TEAPOT, "short and stout")
    }

    #[tokio::test]
    async fn test_bare_error_gets_json_body() {
        let app = Router::new()
            .route("/", post(timed_out))
            .layer(middleware::from_fn(error_body_middleware));

        let response = app
            .oneshot(Request::builder().method("POST").uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 408);
        assert_eq!(json["error"], "Request Timeout");
    }

    #[tokio::test]
    async fn test_error_with_body_untouched() {
        let app = Router::new()
            .route("/", post(teapot))
            .layer(middleware::from_fn(error_body_middleware));

        let response = app
            .oneshot(Request::builder().method("POST").uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"short and stout");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let app = cors_app(&CorsConfig::default());

        let response = app.oneshot(preflight("http://localhost:3000")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let app = cors_app(&CorsConfig::default());

        let response = app.oneshot(preflight("http://evil.example")).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_without_credentials() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            ..CorsConfig::default()
        };
        let app = cors_app(&config);

        let response = app.oneshot(preflight("http://anywhere.example")).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_wildcard_with_credentials_mirrors_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            ..CorsConfig::default()
        };
        let app = cors_app(&config);

        let response = app.oneshot(preflight("http://anywhere.example")).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://anywhere.example"
        );
    }

    #[test]
    fn test_cors_rejects_invalid_entries() {
        let bad_method = CorsConfig {
            allowed_methods: vec!["GE T".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_layer(&bad_method),
            Err(ConfigError::InvalidMethod(_))
        ));

        let bad_header = CorsConfig {
            allowed_headers: vec!["content type".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_layer(&bad_header),
            Err(ConfigError::InvalidHeader(_))
        ));

        let bad_origin = CorsConfig {
            allowed_origins: vec!["http://local\0host".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(
            cors_layer(&bad_origin),
            Err(ConfigError::InvalidOrigin(_))
        ));
    }
}
