use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::models::Audience;

const UNISEX: &str = "unisex";

/// Include/exclude substring patterns for one audience
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudiencePatterns {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Gender classification metadata for the local catalog.
///
/// Precedence, most specific first:
/// 1. explicit per-item tag (`"male"`, `"female"` or `"unisex"`)
/// 2. exclude pattern match rejects
/// 3. include pattern match accepts
/// 4. everything else is accepted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationRules {
    #[serde(default)]
    items: HashMap<String, String>,
    #[serde(default)]
    patterns: HashMap<Audience, AudiencePatterns>,
}

/// Which rule decided a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    TaggedMatch,
    TaggedOther,
    Excluded,
    Included,
    Default,
}

impl Verdict {
    pub fn accepts(self) -> bool {
        matches!(self, Verdict::TaggedMatch | Verdict::Included | Verdict::Default)
    }
}

impl ClassificationRules {
    /// Loads rules from a JSON document.
    ///
    /// A missing or unreadable document degrades to the empty rule set,
    /// which accepts every item.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No classification rules found, accepting all local photos");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read classification rules");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(rules) => {
                tracing::info!(
                    path = %path.display(),
                    tagged_items = rules.items.len(),
                    "Loaded classification rules"
                );
                rules
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid classification rules document");
                Self::default()
            }
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: ClassificationRules = serde_json::from_str(raw)?;

        // Matching is case-insensitive on both sides
        let items = parsed
            .items
            .into_iter()
            .map(|(file, tag)| (file.to_lowercase(), tag.trim().to_lowercase()))
            .collect();
        let patterns = parsed
            .patterns
            .into_iter()
            .map(|(audience, p)| {
                let lower = |list: Vec<String>| -> Vec<String> {
                    list.into_iter().map(|s| s.to_lowercase()).collect()
                };
                (
                    audience,
                    AudiencePatterns {
                        include: lower(p.include),
                        exclude: lower(p.exclude),
                    },
                )
            })
            .collect();

        Ok(Self { items, patterns })
    }

    pub fn classify(&self, file_name: &str, audience: Audience) -> Verdict {
        let lower = file_name.to_lowercase();

        if let Some(tag) = self.items.get(&lower) {
            return if tag == UNISEX || tag == audience.as_str() {
                Verdict::TaggedMatch
            } else {
                Verdict::TaggedOther
            };
        }

        let Some(patterns) = self.patterns.get(&audience) else {
            return Verdict::Default;
        };

        if patterns.exclude.iter().any(|p| lower.contains(p.as_str())) {
            Verdict::Excluded
        } else if patterns.include.iter().any(|p| lower.contains(p.as_str())) {
            Verdict::Included
        } else {
            Verdict::Default
        }
    }

    pub fn accepts(&self, file_name: &str, audience: Audience) -> bool {
        self.classify(file_name, audience).accepts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ClassificationRules {
        ClassificationRules::from_json(
            r#"{
                "items": {
                    "Shared_Coat.jpg": "unisex",
                    "suit_01.jpg": "male",
                    "female_suit.jpg": "male"
                },
                "patterns": {
                    "male": { "include": ["male", "mens"], "exclude": ["female", "dress"] },
                    "female": { "include": ["female", "dress"], "exclude": ["_male", "mens"] }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unisex_item_included_for_both_audiences() {
        let rules = rules();
        assert!(rules.accepts("shared_coat.jpg", Audience::Male));
        assert!(rules.accepts("shared_coat.jpg", Audience::Female));
    }

    #[test]
    fn test_exclude_beats_include() {
        let rules = rules();
        // matches include "male" and exclude "female"
        assert_eq!(rules.classify("female_casual.jpg", Audience::Male), Verdict::Excluded);
        assert!(!rules.accepts("female_casual.jpg", Audience::Male));
        // matches include "dress" and exclude "mens"
        assert!(!rules.accepts("mens_dress_shirt.jpg", Audience::Female));
    }

    #[test]
    fn test_explicit_tag_beats_patterns() {
        let rules = rules();
        assert_eq!(rules.classify("female_suit.jpg", Audience::Male), Verdict::TaggedMatch);
        assert_eq!(rules.classify("suit_01.jpg", Audience::Female), Verdict::TaggedOther);
    }

    #[test]
    fn test_unmatched_defaults_to_accept() {
        let rules = rules();
        assert_eq!(rules.classify("street_look.png", Audience::Female), Verdict::Default);
        assert!(rules.accepts("street_look.png", Audience::Male));
    }

    #[test]
    fn test_missing_document_accepts_everything() {
        let rules = ClassificationRules::load(Path::new("/definitely/not/here.json"));
        assert!(rules.accepts("female_anything.jpg", Audience::Male));
    }

    #[test]
    fn test_invalid_document_accepts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();

        let rules = ClassificationRules::load(&path);
        assert!(rules.accepts("mens_dress.jpg", Audience::Female));
    }
}
