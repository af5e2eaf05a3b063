use axum::{body::Bytes, extract::State, response::Response};
use serde::Deserialize;
use serde_json::json;

use super::{envelope_response, AppState, StatusPolicy};
use crate::error::AppError;
use crate::proxy::types::required;
use crate::proxy::{ForwardMethod, ForwardRequest, ForwardService};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Prompt-only payload; the chat-completion body is built server side.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
}

impl ChatPayload {
    pub fn into_forward_request(self) -> Result<ForwardRequest, AppError> {
        let api_url = required(self.api_url, "apiUrl")?;
        let api_key = required(self.api_key, "apiKey")?;
        let prompt = required(self.prompt, "prompt")?;
        let model = self
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        ForwardRequest::new(ForwardMethod::Post, api_url, api_key)
            .with_body(body.to_string())
            .validated()
    }
}

pub async fn chat_completion(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: ChatPayload =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
    let request = payload.into_forward_request()?;

    tracing::debug!(url = %request.target_url, "Forwarding chat prompt");

    let response = state.forwarder.forward(request).await;
    Ok(envelope_response(response, StatusPolicy::Wrap))
}
