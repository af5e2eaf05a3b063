use axum::{body::Bytes, extract::State, response::Response};

use super::{envelope_response, AppState, StatusPolicy};
use crate::error::AppError;
use crate::proxy::{ForwardPayload, ForwardService};

/// Canonical forwarding endpoint.
///
/// The body is decoded by hand so that malformed JSON gets the same
/// `{error, code}` shape as every other input error.
pub async fn forward_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = ForwardPayload::from_slice(&body)?.validate()?;

    tracing::debug!(
        method = %request.method,
        url = %request.target_url,
        "Forwarding request"
    );

    let response = state.forwarder.forward(request).await;
    Ok(envelope_response(response, StatusPolicy::Wrap))
}
