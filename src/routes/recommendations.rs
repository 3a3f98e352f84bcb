use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Audience, PhotoRecord},
    routes::AppState,
    services::{mixer::MAX_RATIO, Recommendations},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub liked_photos: Vec<PhotoRecord>,
    #[serde(default)]
    pub gender: Audience,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default = "default_ratio")]
    pub pexels_ratio: u8,
}

fn default_ratio() -> u8 {
    MAX_RATIO
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    tracing::info!(
        request_id = %request_id,
        liked = request.liked_photos.len(),
        audience = %request.gender,
        "Processing recommendation request"
    );

    let recommendations = state
        .recommendations
        .recommend(
            &request.liked_photos,
            request.gender,
            request.custom_prompt.as_deref(),
            request.pexels_ratio,
        )
        .await?;

    tracing::info!(
        request_id = %request_id,
        results = recommendations.photos.len(),
        fallback_used = recommendations.fallback_used,
        "Recommendation request completed"
    );

    Ok(Json(recommendations))
}
