use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod pexels;
pub mod style;

pub use pexels::{PexelsPhoto, PexelsSearchResponse, PexelsSource};
pub use style::{FallbackReason, KeywordSynthesis, StyleKeywordSet, FALLBACK_KEYWORDS};

/// Source label attached to every photo from the local catalog
pub const LOCAL_PHOTOGRAPHER: &str = "Local Collection";

/// First id handed out to local photos. Provider ids stay far below this,
/// so local and remote photos never share an id within a batch.
pub const LOCAL_ID_BASE: u64 = 9_000_000_000_000;

/// Target audience for a photo batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[serde(alias = "menswear")]
    Male,
    #[default]
    #[serde(alias = "womenswear")]
    Female,
}

impl Audience {
    /// Term used in provider search queries and classification rules
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Male => "male",
            Audience::Female => "female",
        }
    }

    /// Human-facing label used in alt text and chat prompts
    pub fn label(&self) -> &'static str {
        match self {
            Audience::Male => "Men's",
            Audience::Female => "Women's",
        }
    }
}

impl Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolution variants of a single photo, all pointing at equivalent content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoUrls {
    pub original: String,
    pub large: String,
    pub medium: String,
    pub small: String,
    pub tiny: String,
}

impl PhotoUrls {
    /// Every variant points at the same URL
    pub fn uniform(url: &str) -> Self {
        Self {
            original: url.to_string(),
            large: url.to_string(),
            medium: url.to_string(),
            small: url.to_string(),
            tiny: url.to_string(),
        }
    }
}

/// A photo normalized from either source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoRecord {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub src: PhotoUrls,
    pub photographer: String,
    #[serde(default)]
    pub photographer_url: Option<String>,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub liked: bool,
}

impl PhotoRecord {
    /// Whether the photo was sourced from the local catalog
    pub fn is_local(&self) -> bool {
        self.id >= LOCAL_ID_BASE
    }
}
