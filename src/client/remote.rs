//! `ForwardService` that talks to a running Prompt Forge server.

use crate::proxy::{ForwardFuture, ForwardRequest, ForwardResponse, ForwardService, ResponseMeta};
use crate::shared::{status_text, RequestTimer};
use serde::Deserialize;
use std::collections::HashMap;

/// Path of the canonical forwarding endpoint.
pub const FORWARD_PATH: &str = "/api/forward";

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct RemoteForwardService {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteForwardService {
    /// `server_url` is the Prompt Forge origin, e.g. `http://localhost:3000`.
    pub fn new(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), FORWARD_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: ForwardRequest) -> ForwardResponse {
        let timer = RequestTimer::start();

        let response = match self.client.post(&self.endpoint).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                return ForwardResponse::network_error(
                    format!("Could not reach Prompt Forge: {}", e),
                    timer.elapsed_ms(),
                )
            }
        };

        let status = response.status().as_u16();
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return ForwardResponse::network_error(e.to_string(), timer.elapsed_ms()),
        };

        // 200 and 502 carry an envelope; anything else is the forwarder
        // rejecting the request itself.
        if let Ok(envelope) = serde_json::from_slice::<ForwardResponse>(&bytes) {
            return envelope;
        }

        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .map(|b| b.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());

        ForwardResponse {
            result: None,
            error: Some(message),
            meta: ResponseMeta {
                status,
                status_text: status_text(status),
                duration: timer.elapsed_ms(),
                response_headers: HashMap::new(),
            },
        }
    }
}

impl ForwardService for RemoteForwardService {
    fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_> {
        Box::pin(self.send(request))
    }
}
