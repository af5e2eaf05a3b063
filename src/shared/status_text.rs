use axum::http::StatusCode;

/// Canonical reason phrase for a status code, `"Unknown"` when there is none.
pub fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}
