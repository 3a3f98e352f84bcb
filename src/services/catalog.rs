use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Audience, PhotoRecord, PhotoUrls, LOCAL_ID_BASE, LOCAL_PHOTOGRAPHER},
    services::{classification::ClassificationRules, random::RandomSource},
};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
/// Below this many keyword matches the keyword constraint is dropped
const MIN_KEYWORD_MATCHES: usize = 5;
/// Public path prefix the image directory is served under
pub const IMAGES_ROUTE: &str = "/images";

const LOCAL_WIDTH: u32 = 800;
const LOCAL_HEIGHT: u32 = 1200;

/// Fixed local photo catalog filtered by audience and optional keywords
pub struct LocalCatalog {
    images_dir: PathBuf,
    rules: ClassificationRules,
    random: Arc<RandomSource>,
}

impl LocalCatalog {
    pub fn new(images_dir: PathBuf, rules: ClassificationRules, random: Arc<RandomSource>) -> Self {
        Self {
            images_dir,
            rules,
            random,
        }
    }

    /// Selects up to `limit` random photos for the audience.
    ///
    /// With keywords, file names must contain at least one of them unless
    /// fewer than five files match, in which case audience-only filtering
    /// is used. Fails with `LocalSourceUnavailable` when the directory
    /// cannot be read.
    pub async fn select(
        &self,
        audience: Audience,
        keywords: Option<&[String]>,
        limit: usize,
    ) -> AppResult<Vec<PhotoRecord>> {
        let files = self.list_image_files().await?;

        let by_audience: Vec<String> = files
            .into_iter()
            .filter(|file| self.rules.accepts(file, audience))
            .collect();

        let mut selected = match keywords {
            Some(keywords) if !keywords.is_empty() => {
                let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
                let matching: Vec<String> = by_audience
                    .iter()
                    .filter(|file| {
                        let name = file.to_lowercase();
                        lowered.iter().any(|k| name.contains(k.as_str()))
                    })
                    .cloned()
                    .collect();

                if matching.len() < MIN_KEYWORD_MATCHES {
                    tracing::debug!(
                        keyword_matches = matching.len(),
                        audience = %audience,
                        "Too few keyword matches, using audience-only filter"
                    );
                    by_audience
                } else {
                    matching
                }
            }
            _ => by_audience,
        };

        self.random.shuffle(&mut selected);
        selected.truncate(limit);

        tracing::info!(
            audience = %audience,
            results = selected.len(),
            provider = "local",
            "Local catalog selection completed"
        );

        Ok(selected
            .iter()
            .enumerate()
            .map(|(index, file)| local_photo(index, file, audience))
            .collect())
    }

    /// Same as [`select`](Self::select) but an unreadable catalog yields no photos
    pub async fn select_or_empty(
        &self,
        audience: Audience,
        keywords: Option<&[String]>,
        limit: usize,
    ) -> Vec<PhotoRecord> {
        match self.select(audience, keywords, limit).await {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!(error = %e, "Local catalog unavailable, continuing without local photos");
                Vec::new()
            }
        }
    }

    /// Image file names in the catalog directory, sorted
    async fn list_image_files(&self) -> AppResult<Vec<String>> {
        let unavailable = |e: std::io::Error| {
            AppError::LocalSourceUnavailable(format!("{}: {}", self.images_dir.display(), e))
        };

        let mut entries = tokio::fs::read_dir(&self.images_dir).await.map_err(unavailable)?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_image_file(&name) {
                files.push(name);
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn local_photo(index: usize, file: &str, audience: Audience) -> PhotoRecord {
    let url = format!("{}/{}", IMAGES_ROUTE, file);
    PhotoRecord {
        id: LOCAL_ID_BASE + index as u64,
        width: LOCAL_WIDTH,
        height: LOCAL_HEIGHT,
        src: PhotoUrls::uniform(&url),
        photographer: LOCAL_PHOTOGRAPHER.to_string(),
        photographer_url: None,
        alt: alt_text(file, audience),
        liked: false,
    }
}

/// Describes a local photo from its file name, e.g.
/// `street_look_12.jpg` -> `Women's street outfit`
pub fn alt_text(file: &str, audience: Audience) -> String {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file)
        .to_lowercase();

    // Drop a trailing `_<digits>` sequence number
    let base = match stem.rsplit_once('_') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => head,
        _ => stem.as_str(),
    };

    let category = ["casual", "formal", "street", "business"]
        .into_iter()
        .find(|c| base.contains(c))
        .unwrap_or("fashion");

    format!("{} {} outfit", audience.label(), category)
}
