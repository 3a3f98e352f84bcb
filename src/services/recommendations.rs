use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Audience, PhotoRecord, StyleKeywordSet},
    services::{
        catalog::LocalCatalog,
        mixer::{split_counts, validate_ratio, MAX_RATIO},
        providers::{PhotoSearchProvider, SearchRequest},
        random::RandomSource,
        search::search_with_timeout,
        synthesizer::PreferenceSynthesizer,
    },
};

/// Batch size for recommendation calls
pub const RECOMMENDATION_TOTAL: usize = 10;
/// Keywords folded into the recommendation query
const QUERY_KEYWORDS: usize = 3;
const FALLBACK_QUERY_SUFFIX: &str = "fashion outfit";

/// Queries the provider with style keywords, bypassing the recency cache
pub struct RecommendationFetcher {
    provider: Arc<dyn PhotoSearchProvider>,
    timeout: Duration,
}

impl RecommendationFetcher {
    pub fn new(provider: Arc<dyn PhotoSearchProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn keyword_query(keywords: &StyleKeywordSet, audience: Audience) -> String {
        std::iter::once(audience.as_str())
            .chain(keywords.as_slice().iter().take(QUERY_KEYWORDS).map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn fallback_query(audience: Audience) -> String {
        format!("{} {}", audience.as_str(), FALLBACK_QUERY_SUFFIX)
    }

    /// Returns up to `limit` photos, or none when both the keyword query and
    /// the generic fallback query come back empty or fail
    pub async fn fetch(
        &self,
        keywords: &StyleKeywordSet,
        audience: Audience,
        limit: usize,
    ) -> Vec<PhotoRecord> {
        if limit == 0 {
            return Vec::new();
        }

        let primary = Self::keyword_query(keywords, audience);
        match self.query(&primary, limit).await {
            Ok(photos) if !photos.is_empty() => return dedup_capped(photos, limit),
            Ok(_) => tracing::warn!(query = %primary, "No photos found for style keywords, trying generic query"),
            Err(e) => tracing::warn!(query = %primary, error = %e, "Keyword search failed, trying generic query"),
        }

        let fallback = Self::fallback_query(audience);
        match self.query(&fallback, limit).await {
            Ok(photos) => {
                if photos.is_empty() {
                    tracing::warn!(query = %fallback, "Generic query returned no photos");
                }
                dedup_capped(photos, limit)
            }
            Err(e) => {
                tracing::warn!(query = %fallback, error = %e, "Generic query failed, returning no recommendations");
                Vec::new()
            }
        }
    }

    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<PhotoRecord>> {
        let request = SearchRequest::new(query, 1, limit as u32);
        search_with_timeout(self.provider.as_ref(), &request, self.timeout).await
    }
}

fn dedup_capped(photos: Vec<PhotoRecord>, limit: usize) -> Vec<PhotoRecord> {
    let mut seen = HashSet::new();
    photos
        .into_iter()
        .filter(|photo| seen.insert(photo.id))
        .take(limit)
        .collect()
}

/// Result of a recommendation call
#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub photos: Vec<PhotoRecord>,
    pub keywords: StyleKeywordSet,
    pub fallback_used: bool,
}

/// Liked photos -> keywords -> matching photos
pub struct RecommendationEngine {
    synthesizer: Arc<PreferenceSynthesizer>,
    fetcher: Arc<RecommendationFetcher>,
    catalog: Arc<LocalCatalog>,
    random: Arc<RandomSource>,
}

impl RecommendationEngine {
    pub fn new(
        synthesizer: Arc<PreferenceSynthesizer>,
        fetcher: Arc<RecommendationFetcher>,
        catalog: Arc<LocalCatalog>,
        random: Arc<RandomSource>,
    ) -> Self {
        Self {
            synthesizer,
            fetcher,
            catalog,
            random,
        }
    }

    /// Generates recommendations for a non-empty liked set.
    ///
    /// An empty `photos` list is a normal outcome meaning nothing matched.
    pub async fn recommend(
        &self,
        liked: &[PhotoRecord],
        audience: Audience,
        hint: Option<&str>,
        ratio: u8,
    ) -> AppResult<Recommendations> {
        if liked.is_empty() {
            return Err(AppError::InvalidInput(
                "liked_photos must contain at least one photo".to_string(),
            ));
        }
        let ratio = validate_ratio(ratio)?;

        tracing::info!(
            liked = liked.len(),
            audience = %audience,
            ratio = ratio,
            has_hint = hint.is_some(),
            "Generating recommendations"
        );

        let synthesis = self.synthesizer.synthesize(liked, hint).await;
        let keywords = synthesis.keywords().clone();

        let photos = match ratio {
            MAX_RATIO => {
                self.fetcher
                    .fetch(&keywords, audience, RECOMMENDATION_TOTAL)
                    .await
            }
            0 => {
                self.catalog
                    .select_or_empty(audience, Some(keywords.as_slice()), RECOMMENDATION_TOTAL)
                    .await
            }
            _ => {
                let (remote_target, _) = split_counts(RECOMMENDATION_TOTAL, ratio);
                let mut photos = self.fetcher.fetch(&keywords, audience, remote_target).await;
                let local_needed = RECOMMENDATION_TOTAL - photos.len();
                photos.extend(
                    self.catalog
                        .select_or_empty(audience, Some(keywords.as_slice()), local_needed)
                        .await,
                );
                self.random.shuffle(&mut photos);
                photos
            }
        };

        if photos.is_empty() {
            tracing::warn!(audience = %audience, "No recommendations found");
        } else {
            tracing::info!(results = photos.len(), "Recommendations ready");
        }

        Ok(Recommendations {
            photos,
            fallback_used: synthesis.is_fallback(),
            keywords,
        })
    }
}
