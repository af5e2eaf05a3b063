//! Normalization of upstream responses into the forward envelope.

use super::types::*;
use crate::shared::status_text;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Parses the upstream body as JSON, falling back to the raw text.
pub fn parse_result(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Flattens response headers into a name→value map.
///
/// Names are lower-case; repeated headers are joined with `", "`. Values that
/// are not valid UTF-8 are decoded lossily.
pub fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match collected.entry(name.as_str().to_string()) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
        }
    }
    collected
}

/// Parameters for building a success envelope.
pub struct ResponseBuildParams<'a> {
    pub status: u16,
    pub headers: &'a HeaderMap,
    pub body_text: &'a str,
    pub duration: u64,
}

/// Builds the envelope for a call that reached the target, whatever its status.
pub fn build_success(params: ResponseBuildParams<'_>) -> ForwardResponse {
    let ResponseBuildParams {
        status,
        headers,
        body_text,
        duration,
    } = params;

    ForwardResponse::success(
        parse_result(body_text),
        ResponseMeta {
            status,
            status_text: status_text(status),
            duration,
            response_headers: collect_headers(headers),
        },
    )
}

/// Builds the envelope for a call that never reached the target.
pub fn build_network_error(error: &reqwest::Error, duration: u64) -> ForwardResponse {
    let message = if error.is_timeout() {
        format!("Request timed out: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };
    ForwardResponse::network_error(message, duration)
}
