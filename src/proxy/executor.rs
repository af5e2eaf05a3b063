//! Upstream request execution.
//!
//! Performs one outbound call per `ForwardRequest`, timing it from before the
//! request is built until the body has been read (or the call has failed).

use super::response_builder::{build_network_error, build_success, ResponseBuildParams};
use super::types::*;
use crate::shared::RequestTimer;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Builds the reqwest client shared by every forwarded call.
///
/// Redirects are followed with reqwest's default policy and compressed
/// bodies are decoded transparently.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(16)
        .build()
}

/// Executes a forward request and normalizes whatever comes back.
///
/// Never fails: a call that cannot reach the target yields the network-error
/// envelope (status 0) instead of an `Err`.
pub async fn execute_forward(
    client: &reqwest::Client,
    request: &ForwardRequest,
    default_timeout: Duration,
) -> ForwardResponse {
    let timer = RequestTimer::start();
    let request_timeout = request
        .timeout
        .map(Duration::from_millis)
        .unwrap_or(default_timeout);

    let mut builder = client
        .request(request.method.to_reqwest(), &request.target_url)
        .header(AUTHORIZATION, format!("Bearer {}", request.api_key))
        .header(CONTENT_TYPE, "application/json")
        .timeout(request_timeout);

    if let Some(body) = request.outgoing_body() {
        builder = builder.body(body.to_string());
    }

    let response = match builder.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                method = %request.method,
                url = %request.target_url,
                error = %e,
                "Upstream unreachable"
            );
            return build_network_error(&e, timer.elapsed_ms());
        }
    };

    let status = response.status().as_u16();
    let headers = response.headers().clone();

    let body_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                url = %request.target_url,
                error = %e,
                "Failed to read upstream body"
            );
            return build_network_error(&e, timer.elapsed_ms());
        }
    };

    let duration = timer.elapsed_ms();
    tracing::debug!(status, duration, "Upstream responded");

    build_success(ResponseBuildParams {
        status,
        headers: &headers,
        body_text: &body_text,
        duration,
    })
}
