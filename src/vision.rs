//! Image analysis against a fixed vision-capable chat-completion API.

use crate::error::AppError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Prompt sent alongside every image.
pub const IMAGE_PROMPT: &str = "What's in this image?";

const MAX_TOKENS: u32 = 300;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeImagePayload {
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedImage {
    pub image: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub message: String,
    pub analyzed_image: AnalyzedImage,
}

/// Turns the incoming image into a data URL, validating the base64 payload.
///
/// Bare base64 is assumed to be JPEG.
pub fn to_data_url(image: &str) -> Result<String, AppError> {
    let image = image.trim();
    let (prefix, encoded) = match image.split_once(";base64,") {
        Some((mime, data)) if mime.starts_with("data:") => (format!("{};base64,", mime), data),
        _ => ("data:image/jpeg;base64,".to_string(), image),
    };

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AppError::InvalidField {
            field: "image",
            reason: format!("not valid base64 ({})", e),
        })?;

    Ok(format!("{}{}", prefix, encoded))
}

/// Builds the chat-completion payload for one image.
pub fn build_payload(model: &str, data_url: &str) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": IMAGE_PROMPT },
                { "type": "image_url", "image_url": { "url": data_url } }
            ]
        }],
        "max_tokens": MAX_TOKENS,
    })
}

/// Pulls `choices[0].message.content` out of a chat-completion response.
pub fn extract_description(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Calls the vision API and returns the description of the image.
pub async fn analyze_image(
    client: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    model: &str,
    data_url: &str,
    timeout: Duration,
) -> Result<String, AppError> {
    let response = client
        .post(api_url)
        .bearer_auth(api_key)
        .timeout(timeout)
        .json(&build_payload(model, data_url))
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("unreadable vision response: {}", e)))?;

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("no error message");
        return Err(AppError::Upstream(format!(
            "vision API returned {}: {}",
            status.as_u16(),
            message
        )));
    }

    extract_description(&body)
        .ok_or_else(|| AppError::Upstream("vision response has no description".to_string()))
}
