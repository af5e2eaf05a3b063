use axum::{body::Bytes, extract::State, Json};

use super::AppState;
use crate::error::AppError;
use crate::vision::{self, AnalyzeImagePayload, AnalyzeImageResponse, AnalyzedImage};

pub async fn analyze_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalyzeImageResponse>, AppError> {
    let payload: AnalyzeImagePayload =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
    let image = payload
        .image
        .filter(|i| !i.trim().is_empty())
        .ok_or(AppError::MissingField("image"))?;
    let data_url = vision::to_data_url(&image)?;

    let config = &state.config;
    let api_key = config.vision_api_key().ok_or_else(|| {
        AppError::Configuration(format!("{} is not set", config.vision_api_key_var))
    })?;

    tracing::debug!(bytes = image.len(), "Analyzing image");

    let description = vision::analyze_image(
        state.forwarder.client(),
        &config.vision_api_url,
        &api_key,
        &config.vision_model,
        &data_url,
        state.forwarder.default_timeout(),
    )
    .await
    .map_err(|e| {
        tracing::warn!(error = %e, "Image analysis failed");
        e
    })?;

    Ok(Json(AnalyzeImageResponse {
        message: "Image analyzed successfully".to_string(),
        analyzed_image: AnalyzedImage { image, description },
    }))
}
