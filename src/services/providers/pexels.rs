//! Pexels photo search provider
//!
//! Single endpoint: GET /v1/search with the API key in the `Authorization` header.
//! Responses carry a `photos` array whose entries hold nested resolution variants
//! under `src`; they are normalized into `PhotoRecord`s here.
use reqwest::Client as HttpClient;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{PexelsSearchResponse, PhotoRecord},
    services::providers::{PhotoSearchProvider, SearchRequest},
};

/// Outfit photos are always requested upright
const ORIENTATION: &str = "portrait";

#[derive(Clone)]
pub struct PexelsProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

impl PexelsProvider {
    pub fn new(api_key: Option<String>, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url,
        })
    }
}

#[async_trait::async_trait]
impl PhotoSearchProvider for PexelsProvider {
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<PhotoRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("PEXELS_API_KEY"))?;

        let url = format!("{}/v1/search", self.api_url.trim_end_matches('/'));
        let page = request.page.to_string();
        let per_page = request.per_page.to_string();

        tracing::debug!(query = %request.query, page = request.page, "Querying Pexels");

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", api_key)
            .query(&[
                ("query", request.query.as_str()),
                ("orientation", ORIENTATION),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Pexels API returned an error");
            return Err(AppError::upstream(
                status,
                format!("Pexels API returned status {}", status),
            ));
        }

        let response_text = response.text().await?;
        let parsed: PexelsSearchResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, "Failed to deserialize Pexels response");
            AppError::MalformedResponse(format!("Failed to parse Pexels response: {}", e))
        })?;

        let received = parsed.photos.len();
        let photos: Vec<PhotoRecord> = parsed
            .photos
            .into_iter()
            .filter_map(|photo| photo.into_record())
            .collect();

        tracing::info!(
            query = %request.query,
            page = request.page,
            received = received,
            results = photos.len(),
            provider = "pexels",
            "Photo search completed"
        );

        Ok(photos)
    }

    fn name(&self) -> &'static str {
        "pexels"
    }
}
