use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Browser UI bundle, embedded at build time.
#[derive(RustEmbed)]
#[folder = "frontend/"]
struct UiAssets;

const INDEX: &str = "index.html";

/// Serves the embedded UI. Unknown paths without an extension fall back to
/// `index.html` so client-side routes resolve.
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    let candidates = [
        path.to_string(),
        format!("{}.html", path),
        format!("{}/{}", path.trim_end_matches('/'), INDEX),
    ];
    for candidate in candidates.iter().filter(|c| !c.is_empty()) {
        if let Some(asset) = UiAssets::get(candidate) {
            return asset_response(candidate, asset.data.into_owned());
        }
    }

    if path.is_empty() || !path.contains('.') {
        if let Some(asset) = UiAssets::get(INDEX) {
            return asset_response(INDEX, asset.data.into_owned());
        }
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn asset_response(path: &str, data: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let cache = if path == INDEX {
        "no-cache"
    } else {
        "public, max-age=31536000, immutable"
    };

    let mut response = Body::from(data).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));
    response
}
