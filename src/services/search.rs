use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Audience, PhotoRecord},
    services::{
        providers::{PhotoSearchProvider, SearchRequest},
        random::RandomSource,
        recency::RecencyCache,
    },
};

/// Audience-parameterized query templates rotated across calls
const QUERY_TEMPLATES: [&str; 6] = [
    "japanese asian {audience} fashion outfit full body",
    "{audience} street style fashion",
    "{audience} casual outfit full body",
    "{audience} model fashion portrait",
    "{audience} minimalist fashion look",
    "{audience} trendy clothing style",
];

/// Pages the listing query is spread over
const PAGE_WINDOW: std::ops::RangeInclusive<u32> = 1..=5;
/// Photos requested from the provider per listing call
const LISTING_PAGE_SIZE: u32 = 30;
/// Below this many unseen photos the recency cache is reset
const MIN_FRESH_PHOTOS: usize = 10;

/// Listing-path access to the external provider with recency dedup
pub struct SearchAdapter {
    provider: Arc<dyn PhotoSearchProvider>,
    recency: Arc<RecencyCache>,
    random: Arc<RandomSource>,
    timeout: Duration,
}

impl SearchAdapter {
    pub fn new(
        provider: Arc<dyn PhotoSearchProvider>,
        recency: Arc<RecencyCache>,
        random: Arc<RandomSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            recency,
            random,
            timeout,
        }
    }

    /// Builds a randomized listing request for the audience
    pub fn listing_request(&self, audience: Audience) -> SearchRequest {
        let template = self
            .random
            .choose(&QUERY_TEMPLATES)
            .copied()
            .unwrap_or(QUERY_TEMPLATES[0]);
        let page = self.random.in_range(PAGE_WINDOW);

        SearchRequest::new(
            template.replace("{audience}", audience.as_str()),
            page,
            LISTING_PAGE_SIZE,
        )
    }

    /// Fetches up to `count` provider photos, preferring ones not served recently
    pub async fn fetch(&self, audience: Audience, count: usize) -> AppResult<Vec<PhotoRecord>> {
        let request = self.listing_request(audience);
        let photos = search_with_timeout(self.provider.as_ref(), &request, self.timeout).await?;

        if photos.is_empty() {
            return Err(AppError::MalformedResponse(format!(
                "No photos received from {}",
                self.provider.name()
            )));
        }

        let mut recent = self.recency.lock().await;

        let fresh: Vec<PhotoRecord> = photos
            .iter()
            .filter(|photo| !recent.contains(photo.id))
            .cloned()
            .collect();

        let mut batch = if fresh.len() < MIN_FRESH_PHOTOS {
            tracing::debug!(
                fresh = fresh.len(),
                received = photos.len(),
                "Too few unseen photos, resetting recency cache"
            );
            recent.clear();
            photos
        } else {
            fresh
        };

        self.random.shuffle(&mut batch);
        batch.truncate(count);
        recent.record(batch.iter().map(|photo| photo.id));

        tracing::info!(
            audience = %audience,
            query = %request.query,
            page = request.page,
            results = batch.len(),
            recent = recent.len(),
            provider = self.provider.name(),
            "Listing search completed"
        );

        Ok(batch)
    }
}

/// Runs one provider search bounded by `timeout`
pub async fn search_with_timeout(
    provider: &dyn PhotoSearchProvider,
    request: &SearchRequest,
    timeout: Duration,
) -> AppResult<Vec<PhotoRecord>> {
    match tokio::time::timeout(timeout, provider.search(request)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timed_out(provider.name(), timeout)),
    }
}
