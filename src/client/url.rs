use super::catalog::{Endpoint, ID_PLACEHOLDER};

/// Builds the absolute target URL for an endpoint.
///
/// Trailing slashes are stripped from `base_url`. The `:id` placeholder is
/// replaced once, and only when the endpoint requires an id and one is given.
pub fn build_target_url(base_url: &str, endpoint: &Endpoint, resource_id: Option<&str>) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = match resource_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if endpoint.requires_id => endpoint.path.replacen(ID_PLACEHOLDER, id, 1),
        _ => endpoint.path.to_string(),
    };
    format!("{}{}", base, path)
}
