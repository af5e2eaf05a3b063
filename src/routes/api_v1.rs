use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    response::Response,
};

use super::{envelope_response, AppState, StatusPolicy};
use crate::error::AppError;
use crate::proxy::{ForwardMethod, ForwardRequest, ForwardService};

/// Header naming the upstream base URL for `/api/v1/*` calls.
pub const TARGET_BASE_HEADER: &str = "x-target-base-url";

const V1_PREFIX: &str = "/api/v1/";

/// Reads the key from an `Authorization: Bearer` header. The scheme name
/// matches case-insensitively.
fn bearer_key(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.split_once(' ')?;
    let key = key.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !key.is_empty()).then_some(key)
}

/// Proxy form of the forwarder: `/api/v1/<path>` is replayed against
/// `<base>/api/v1/<path>` and the upstream status is echoed back.
pub async fn proxy_v1(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let base = match headers.get(TARGET_BASE_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::InvalidField {
                field: TARGET_BASE_HEADER,
                reason: "not valid ASCII".to_string(),
            })?
            .to_string(),
        None => state
            .config
            .default_base_url
            .clone()
            .ok_or(AppError::MissingField(TARGET_BASE_HEADER))?,
    };

    let api_key = bearer_key(&headers).ok_or(AppError::MissingField("Authorization"))?;

    let method: ForwardMethod = method.as_str().parse()?;

    // The raw path keeps percent-escapes exactly as the caller sent them.
    let path = uri.path().strip_prefix(V1_PREFIX).unwrap_or_default();
    let mut target_url = format!("{}{}{}", base.trim_end_matches('/'), V1_PREFIX, path);
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        target_url.push('?');
        target_url.push_str(query);
    }

    let mut request = ForwardRequest::new(method, target_url, api_key);
    if !body.is_empty() {
        let text = String::from_utf8(body.to_vec()).map_err(|_| AppError::InvalidField {
            field: "body",
            reason: "not valid UTF-8".to_string(),
        })?;
        request.body = Some(text);
    }
    let request = request.validated()?;

    tracing::debug!(
        method = %request.method,
        url = %request.target_url,
        "Proxying /api/v1 request"
    );

    let response = state.forwarder.forward(request).await;
    Ok(envelope_response(response, StatusPolicy::Echo))
}
