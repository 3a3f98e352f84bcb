use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{Audience, PhotoRecord},
    routes::AppState,
    services::mixer::LISTING_TOTAL,
};

#[derive(Debug, Deserialize)]
pub struct ListPhotosQuery {
    #[serde(default)]
    pub gender: Audience,
    /// Share of the batch drawn from the provider, in percent
    #[serde(default)]
    pub pexels_ratio: u8,
    #[serde(default)]
    pub count: Option<usize>,
}

/// Handler for the photo listing endpoint
pub async fn list_photos(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ListPhotosQuery>,
) -> AppResult<Json<Vec<PhotoRecord>>> {
    let count = params.count.unwrap_or(LISTING_TOTAL);
    if count == 0 || count > LISTING_TOTAL {
        return Err(AppError::InvalidInput(format!(
            "count must be between 1 and {}",
            LISTING_TOTAL
        )));
    }

    tracing::info!(
        request_id = %request_id,
        audience = %params.gender,
        ratio = params.pexels_ratio,
        count = count,
        "Processing photo listing request"
    );

    let photos = state
        .photos
        .list_photos(params.gender, params.pexels_ratio, count)
        .await?;

    Ok(Json(photos))
}
