pub mod api_v1;
pub mod chat;
pub mod forward;
pub mod health;
pub mod static_files;
pub mod vision;

use crate::config::Config;
use crate::proxy::{ForwardResponse, HttpForwardService};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Images arrive base64-encoded inside JSON, so the analysis route gets a
/// larger body limit than axum's default.
const IMAGE_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Immutable state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: HttpForwardService,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let forwarder = HttpForwardService::with_timeout(config.upstream_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            forwarder,
        })
    }
}

/// How the outer HTTP status of a forward envelope is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Reached upstreams always answer 200; callers read `meta.status`.
    Wrap,
    /// The outer status mirrors the upstream status.
    Echo,
}

/// Serializes an envelope with the outer status picked by `policy`.
///
/// Unreachable targets answer 502 under either policy.
pub fn envelope_response(response: ForwardResponse, policy: StatusPolicy) -> Response {
    let status = if response.is_network_error() {
        StatusCode::BAD_GATEWAY
    } else {
        match policy {
            StatusPolicy::Wrap => StatusCode::OK,
            StatusPolicy::Echo => {
                StatusCode::from_u16(response.meta.status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    };

    if let Some(ref error) = response.error {
        tracing::warn!(status = response.meta.status, error = %error, "Forward failed");
    } else {
        tracing::debug!(
            status = response.meta.status,
            duration = response.meta.duration,
            "Forward completed"
        );
    }

    (status, Json(response)).into_response()
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/forward", post(forward::forward_request))
        .route("/api/chat", post(chat::chat_completion))
        .route(
            "/api/analyze-image",
            post(vision::analyze_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route("/api/v1/*path", any(api_v1::proxy_v1))
        .fallback(static_files::serve_static)
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ResponseMeta;
    use serde_json::json;
    use std::collections::HashMap;

    fn reached(status: u16) -> ForwardResponse {
        ForwardResponse::success(
            json!({}),
            ResponseMeta {
                status,
                status_text: String::new(),
                duration: 0,
                response_headers: HashMap::new(),
            },
        )
    }

    #[test]
    fn test_wrap_policy_always_ok() {
        let resp = envelope_response(reached(404), StatusPolicy::Wrap);
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_echo_policy_mirrors_upstream() {
        let resp = envelope_response(reached(404), StatusPolicy::Echo);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_network_error_is_bad_gateway() {
        let err = ForwardResponse::network_error("refused", 1);
        assert_eq!(
            envelope_response(err.clone(), StatusPolicy::Wrap).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            envelope_response(err, StatusPolicy::Echo).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
