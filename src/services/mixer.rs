use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Audience, PhotoRecord},
    services::{catalog::LocalCatalog, random::RandomSource, search::SearchAdapter},
};

/// Batch size for listing calls
pub const LISTING_TOTAL: usize = 30;
/// Upper bound of the provider share percentage
pub const MAX_RATIO: u8 = 100;

/// Splits `total` into (remote, local) counts for a provider percentage.
/// `remote = round(total * ratio / 100)`, halves rounding up.
pub fn split_counts(total: usize, ratio: u8) -> (usize, usize) {
    let ratio = ratio.min(MAX_RATIO) as usize;
    let remote = (total * ratio + 50) / 100;
    (remote, total - remote)
}

pub fn validate_ratio(ratio: u8) -> AppResult<u8> {
    if ratio > MAX_RATIO {
        return Err(AppError::InvalidInput(format!(
            "pexels_ratio must be between 0 and {}, got {}",
            MAX_RATIO, ratio
        )));
    }
    Ok(ratio)
}

/// Blends local catalog photos and provider photos at a requested ratio
pub struct PhotoAggregator {
    catalog: Arc<LocalCatalog>,
    search: Arc<SearchAdapter>,
    random: Arc<RandomSource>,
}

impl PhotoAggregator {
    pub fn new(catalog: Arc<LocalCatalog>, search: Arc<SearchAdapter>, random: Arc<RandomSource>) -> Self {
        Self {
            catalog,
            search,
            random,
        }
    }

    /// Returns at most `total` photos.
    ///
    /// * ratio 0 uses the local catalog only and never calls the provider
    /// * ratio 100 uses the provider only; its failures are returned as-is
    /// * anything in between degrades to local photos when the provider fails
    pub async fn list_photos(
        &self,
        audience: Audience,
        ratio: u8,
        total: usize,
    ) -> AppResult<Vec<PhotoRecord>> {
        let ratio = validate_ratio(ratio)?;

        match ratio {
            0 => Ok(self.catalog.select_or_empty(audience, None, total).await),
            MAX_RATIO => self.search.fetch(audience, total).await,
            _ => Ok(self.blend(audience, ratio, total).await),
        }
    }

    async fn blend(&self, audience: Audience, ratio: u8, total: usize) -> Vec<PhotoRecord> {
        let (remote_target, local_target) = split_counts(total, ratio);

        let remote = if remote_target == 0 {
            Vec::new()
        } else {
            match self.search.fetch(audience, remote_target).await {
                Ok(photos) => photos,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        audience = %audience,
                        ratio = ratio,
                        "Provider unavailable, filling batch from local catalog"
                    );
                    Vec::new()
                }
            }
        };

        let local_needed = total - remote.len();
        let local = self
            .catalog
            .select_or_empty(audience, None, local_needed)
            .await;

        tracing::info!(
            audience = %audience,
            ratio = ratio,
            remote_target = remote_target,
            local_target = local_target,
            remote = remote.len(),
            local = local.len(),
            "Blended photo batch"
        );

        let mut combined = remote;
        combined.extend(local);
        self.random.shuffle(&mut combined);
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        classification::ClassificationRules,
        providers::MockPhotoSearchProvider,
        recency::RecencyCache,
        search::tests::remote_batch,
    };
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        aggregator: PhotoAggregator,
    }

    fn local_catalog(dir: PathBuf, random: Arc<RandomSource>) -> Arc<LocalCatalog> {
        Arc::new(LocalCatalog::new(dir, ClassificationRules::default(), random))
    }

    fn fixture(provider: MockPhotoSearchProvider, local_files: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..local_files {
            std::fs::write(dir.path().join(format!("look_{}.jpg", i)), b"img").unwrap();
        }
        let random = Arc::new(RandomSource::seeded(11));
        let search = Arc::new(SearchAdapter::new(
            Arc::new(provider),
            Arc::new(RecencyCache::new()),
            random.clone(),
            Duration::from_secs(5),
        ));
        let aggregator = PhotoAggregator::new(
            local_catalog(dir.path().to_path_buf(), random.clone()),
            search,
            random,
        );
        Fixture {
            _dir: dir,
            aggregator,
        }
    }

    fn healthy_provider() -> MockPhotoSearchProvider {
        let mut provider = MockPhotoSearchProvider::new();
        provider
            .expect_search()
            .returning(|_| Ok(remote_batch(1..31)));
        provider.expect_name().return_const("mock");
        provider
    }

    fn failing_provider() -> MockPhotoSearchProvider {
        let mut provider = MockPhotoSearchProvider::new();
        provider.expect_search().returning(|_| {
            Err(AppError::Upstream {
                status: Some(503),
                message: "down".to_string(),
            })
        });
        provider.expect_name().return_const("mock");
        provider
    }

    #[test]
    fn test_split_counts_sum_and_rounding() {
        for total in [10usize, 30] {
            for ratio in 0..=100u8 {
                let (remote, local) = split_counts(total, ratio);
                assert_eq!(remote + local, total);
                let expected = (total as f64 * ratio as f64 / 100.0).round() as usize;
                assert_eq!(remote, expected, "total={} ratio={}", total, ratio);
            }
        }
        assert_eq!(split_counts(30, 50), (15, 15));
        assert_eq!(split_counts(10, 25), (3, 7));
    }

    #[test]
    fn test_ratio_above_100_rejected() {
        assert!(validate_ratio(100).is_ok());
        assert!(matches!(validate_ratio(101), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_ratio_zero_never_calls_provider() {
        let mut provider = MockPhotoSearchProvider::new();
        provider.expect_search().times(0);
        provider.expect_name().return_const("mock");
        let fx = fixture(provider, 40);

        let photos = fx
            .aggregator
            .list_photos(Audience::Female, 0, LISTING_TOTAL)
            .await
            .unwrap();

        assert_eq!(photos.len(), 30);
        assert!(photos.iter().all(PhotoRecord::is_local));
    }

    #[tokio::test]
    async fn test_ratio_100_surfaces_provider_failure() {
        let fx = fixture(failing_provider(), 40);

        let result = fx
            .aggregator
            .list_photos(Audience::Female, 100, LISTING_TOTAL)
            .await;

        match result {
            Err(AppError::Upstream { status, .. }) => assert_eq!(status, Some(503)),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ratio_100_remote_only() {
        let fx = fixture(healthy_provider(), 40);

        let photos = fx
            .aggregator
            .list_photos(Audience::Male, 100, LISTING_TOTAL)
            .await
            .unwrap();

        assert_eq!(photos.len(), 30);
        assert!(photos.iter().all(|p| !p.is_local()));
    }

    #[tokio::test]
    async fn test_ratio_50_falls_back_to_local_on_failure() {
        let fx = fixture(failing_provider(), 40);

        let photos = fx
            .aggregator
            .list_photos(Audience::Female, 50, LISTING_TOTAL)
            .await
            .unwrap();

        assert_eq!(photos.len(), 30);
        assert!(photos.iter().all(PhotoRecord::is_local));
    }

    #[tokio::test]
    async fn test_mixed_ratio_splits_sources() {
        let fx = fixture(healthy_provider(), 40);

        let photos = fx
            .aggregator
            .list_photos(Audience::Female, 40, LISTING_TOTAL)
            .await
            .unwrap();

        let remote = photos.iter().filter(|p| !p.is_local()).count();
        let local = photos.iter().filter(|p| p.is_local()).count();
        assert_eq!(remote, 12);
        assert_eq!(local, 18);
    }

    #[tokio::test]
    async fn test_mixed_ratio_with_missing_catalog_returns_remote_share() {
        let random = Arc::new(RandomSource::seeded(2));
        let search = Arc::new(SearchAdapter::new(
            Arc::new(healthy_provider()),
            Arc::new(RecencyCache::new()),
            random.clone(),
            Duration::from_secs(5),
        ));
        let aggregator = PhotoAggregator::new(
            local_catalog(PathBuf::from("/no/such/catalog"), random.clone()),
            search,
            random,
        );

        let photos = aggregator
            .list_photos(Audience::Female, 50, LISTING_TOTAL)
            .await
            .unwrap();

        assert_eq!(photos.len(), 15);
    }

    #[tokio::test]
    async fn test_ratio_zero_with_missing_catalog_is_empty() {
        let random = Arc::new(RandomSource::seeded(2));
        let mut provider = MockPhotoSearchProvider::new();
        provider.expect_search().times(0);
        let search = Arc::new(SearchAdapter::new(
            Arc::new(provider),
            Arc::new(RecencyCache::new()),
            random.clone(),
            Duration::from_secs(5),
        ));
        let aggregator = PhotoAggregator::new(
            local_catalog(PathBuf::from("/no/such/catalog"), random.clone()),
            search,
            random,
        );

        let photos = aggregator.list_photos(Audience::Male, 0, 30).await.unwrap();
        assert!(photos.is_empty());
    }
}
