use serde::Serialize;

/// Keywords used whenever the generative service cannot produce usable ones
pub const FALLBACK_KEYWORDS: [&str; 5] = ["fashion outfit", "style", "clothing", "trendy", "full body"];

pub const MIN_KEYWORDS: usize = 3;
pub const MAX_KEYWORDS: usize = 5;

/// Ordered set of 3-5 short style descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleKeywordSet(Vec<String>);

impl StyleKeywordSet {
    /// Trims and drops blank entries, keeps the first five.
    /// Returns `Err(count)` with the usable count when fewer than three remain.
    pub fn new<I, S>(keywords: I) -> Result<Self, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .take(MAX_KEYWORDS)
            .collect();

        if cleaned.len() < MIN_KEYWORDS {
            return Err(cleaned.len());
        }

        Ok(Self(cleaned))
    }

    pub fn fallback() -> Self {
        Self(FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Why keyword synthesis fell back to the fixed set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    ServiceFailure(String),
    EmptyResponse,
    Malformed(String),
    TooFewKeywords(usize),
}

/// Outcome of keyword synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSynthesis {
    Generated(StyleKeywordSet),
    Fallback {
        keywords: StyleKeywordSet,
        reason: FallbackReason,
    },
}

impl KeywordSynthesis {
    pub fn fallback(reason: FallbackReason) -> Self {
        KeywordSynthesis::Fallback {
            keywords: StyleKeywordSet::fallback(),
            reason,
        }
    }

    pub fn keywords(&self) -> &StyleKeywordSet {
        match self {
            KeywordSynthesis::Generated(keywords) => keywords,
            KeywordSynthesis::Fallback { keywords, .. } => keywords,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, KeywordSynthesis::Fallback { .. })
    }
}
