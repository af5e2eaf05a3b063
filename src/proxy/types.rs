use crate::error::AppError;
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Status text reported when the target could not be reached at all.
pub const NETWORK_ERROR_STATUS_TEXT: &str = "Network Error";

/// HTTP methods the forwarder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ForwardMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForwardMethod::Get => "GET",
            ForwardMethod::Post => "POST",
            ForwardMethod::Put => "PUT",
            ForwardMethod::Delete => "DELETE",
        }
    }

    /// Only POST and PUT carry an outgoing body.
    pub fn carries_body(&self) -> bool {
        matches!(self, ForwardMethod::Post | ForwardMethod::Put)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            ForwardMethod::Get => reqwest::Method::GET,
            ForwardMethod::Post => reqwest::Method::POST,
            ForwardMethod::Put => reqwest::Method::PUT,
            ForwardMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for ForwardMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForwardMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(ForwardMethod::Get),
            "POST" => Ok(ForwardMethod::Post),
            "PUT" => Ok(ForwardMethod::Put),
            "DELETE" => Ok(ForwardMethod::Delete),
            _ => Err(AppError::InvalidMethod(s.to_string())),
        }
    }
}

/// Incoming forward payload before validation. Every field is optional so
/// that a missing field is reported by name instead of as a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPayload {
    pub target_url: Option<String>,
    pub api_key: Option<String>,
    pub method: Option<String>,
    /// Raw JSON text. A JSON object is accepted too and serialized as-is.
    pub body: Option<Value>,
    /// Timeout in milliseconds
    pub timeout: Option<u64>,
}

impl ForwardPayload {
    /// Decodes a raw request body into a payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes).map_err(|e| AppError::InvalidPayload(e.to_string()))
    }

    /// Checks required fields and turns the payload into a `ForwardRequest`.
    pub fn validate(self) -> Result<ForwardRequest, AppError> {
        let target_url = required(self.target_url, "targetUrl")?;
        let api_key = required(self.api_key, "apiKey")?;
        let method: ForwardMethod = required(self.method, "method")?.parse()?;

        let body = match self.body {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text),
            Some(other) => Some(other.to_string()),
        };

        ForwardRequest {
            target_url,
            api_key,
            method,
            body,
            timeout: self.timeout,
        }
        .validated()
    }
}

/// Returns the value when present and non-blank, otherwise a missing-field error.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::MissingField(field)),
    }
}

/// A validated description of one upstream call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRequest {
    pub target_url: String,
    pub api_key: String,
    pub method: ForwardMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ForwardRequest {
    pub fn new(method: ForwardMethod, target_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            api_key: api_key.into(),
            method,
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The body that will actually go out: dropped for GET/DELETE and when empty.
    pub fn outgoing_body(&self) -> Option<&str> {
        if !self.method.carries_body() {
            return None;
        }
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }

    /// Validates URL, key and (for POST/PUT) the JSON body.
    pub fn validated(self) -> Result<Self, AppError> {
        let url = url::Url::parse(&self.target_url)
            .map_err(|e| AppError::InvalidUrl(format!("{}: {}", self.target_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            AppError::InvalidField {
                field: "apiKey",
                reason: "contains characters not allowed in a header".to_string(),
            }
        })?;

        if let Some(body) = self.outgoing_body() {
            serde_json::from_str::<Value>(body).map_err(|e| AppError::InvalidField {
                field: "body",
                reason: format!("not valid JSON ({})", e),
            })?;
        }

        Ok(self)
    }
}

/// Response metadata shared by the success and network-error envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub status: u16,
    pub status_text: String,
    /// Elapsed milliseconds
    pub duration: u64,
    #[serde(default)]
    pub response_headers: HashMap<String, String>,
}

/// Keeps a present `null` as `Some(Value::Null)`; only an absent field is `None`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The envelope returned by every forwarding route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardResponse {
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub meta: ResponseMeta,
}

impl ForwardResponse {
    pub fn success(result: Value, meta: ResponseMeta) -> Self {
        Self {
            result: Some(result),
            error: None,
            meta,
        }
    }

    pub fn network_error(message: impl Into<String>, duration: u64) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
            meta: ResponseMeta {
                status: 0,
                status_text: NETWORK_ERROR_STATUS_TEXT.to_string(),
                duration,
                response_headers: HashMap::new(),
            },
        }
    }

    /// True when the target was never reached.
    pub fn is_network_error(&self) -> bool {
        self.meta.status == 0
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.meta.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta
            .response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
