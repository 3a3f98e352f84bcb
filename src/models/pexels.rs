use serde::Deserialize;

use super::{PhotoRecord, PhotoUrls};

// ============================================================================
// Pexels API Types
// ============================================================================

/// Raw response from GET /v1/search
#[derive(Debug, Deserialize)]
pub struct PexelsSearchResponse {
    #[serde(default)]
    pub page: Option<u32>,
    pub photos: Vec<PexelsPhoto>,
}

/// One photo descriptor as returned by Pexels
#[derive(Debug, Clone, Deserialize)]
pub struct PexelsPhoto {
    pub id: u64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub photographer_url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub src: PexelsSource,
}

/// Nested resolution variants
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PexelsSource {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub tiny: String,
}

impl PexelsPhoto {
    /// Normalizes the descriptor, dropping photos without the
    /// medium and large variants consumers rely on
    pub fn into_record(self) -> Option<PhotoRecord> {
        if self.src.medium.is_empty() || self.src.large.is_empty() {
            return None;
        }

        let src = self.src;
        let original = if src.original.is_empty() {
            src.large.clone()
        } else {
            src.original
        };
        let small = if src.small.is_empty() {
            src.medium.clone()
        } else {
            src.small
        };
        let tiny = if src.tiny.is_empty() {
            small.clone()
        } else {
            src.tiny
        };

        let alt = self
            .alt
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Fashion outfit photo".to_string());

        Some(PhotoRecord {
            id: self.id,
            width: self.width,
            height: self.height,
            src: PhotoUrls {
                original,
                large: src.large,
                medium: src.medium,
                small,
                tiny,
            },
            photographer: self
                .photographer
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| "Pexels".to_string()),
            photographer_url: self.photographer_url.filter(|u| !u.is_empty()),
            alt,
            liked: false,
        })
    }
}
