use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AppError,
    models::{FallbackReason, KeywordSynthesis, PhotoRecord, StyleKeywordSet},
    services::providers::{ChatTurn, CompletionRequest, ModelTier, StyleGenerator},
};

const SYSTEM_PROMPT: &str =
    "You are a fashion expert who can identify style patterns and generate relevant search keywords.";

/// What the generative service sees of a liked photo
#[derive(Debug, Serialize)]
struct LikedPhotoSummary<'a> {
    id: u64,
    description: &'a str,
    photographer: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordPayload {
    Object { keywords: Vec<serde_json::Value> },
    List(Vec<serde_json::Value>),
}

/// Turns liked photos into style keywords via the generative service.
///
/// Never fails: any problem yields [`KeywordSynthesis::Fallback`] with the
/// fixed keyword set.
pub struct PreferenceSynthesizer {
    generator: Arc<dyn StyleGenerator>,
    timeout: Duration,
}

impl PreferenceSynthesizer {
    pub fn new(generator: Arc<dyn StyleGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn synthesize(&self, liked: &[PhotoRecord], hint: Option<&str>) -> KeywordSynthesis {
        let outcome = self.try_synthesize(liked, hint).await;

        match &outcome {
            KeywordSynthesis::Generated(keywords) => tracing::info!(
                liked = liked.len(),
                keywords = ?keywords.as_slice(),
                "Synthesized style keywords"
            ),
            KeywordSynthesis::Fallback { reason, .. } => tracing::warn!(
                liked = liked.len(),
                reason = ?reason,
                "Keyword synthesis failed, using fallback keywords"
            ),
        }

        outcome
    }

    async fn try_synthesize(&self, liked: &[PhotoRecord], hint: Option<&str>) -> KeywordSynthesis {
        if !self.generator.has_credentials() {
            return KeywordSynthesis::fallback(FallbackReason::MissingCredential);
        }

        let request = CompletionRequest {
            tier: ModelTier::Analysis,
            messages: vec![
                ChatTurn::system(SYSTEM_PROMPT),
                ChatTurn::user(build_prompt(liked, hint)),
            ],
            json_output: true,
            temperature: None,
            max_tokens: None,
        };

        let content = match tokio::time::timeout(self.timeout, self.generator.complete(&request)).await {
            Ok(Ok(content)) => content,
            Ok(Err(AppError::MissingCredential(_))) => {
                return KeywordSynthesis::fallback(FallbackReason::MissingCredential)
            }
            Ok(Err(e)) => return KeywordSynthesis::fallback(FallbackReason::ServiceFailure(e.to_string())),
            Err(_) => {
                let e = AppError::timed_out(self.generator.name(), self.timeout);
                return KeywordSynthesis::fallback(FallbackReason::ServiceFailure(e.to_string()));
            }
        };

        parse_keywords(&content)
    }
}

/// Builds the user prompt: liked set as JSON, optional hint, output format
pub fn build_prompt(liked: &[PhotoRecord], hint: Option<&str>) -> String {
    let summaries: Vec<LikedPhotoSummary<'_>> = liked
        .iter()
        .map(|photo| LikedPhotoSummary {
            id: photo.id,
            description: &photo.alt,
            photographer: &photo.photographer,
        })
        .collect();
    let liked_json = serde_json::to_string(&summaries).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = format!(
        "I have liked these fashion outfit photos:\n{}\n\n\
         Based on these photos, identify the common fashion style elements and generate \
         5 specific search keywords or phrases that would help find similar outfits.",
        liked_json
    );

    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        prompt.push_str(&format!(
            "\n\nAdditionally, give weight to this specific request from the user: \"{}\"",
            hint
        ));
    }

    prompt.push_str(
        "\n\nReturn ONLY a JSON object of the form {\"keywords\": [\"...\", \"...\"]} with exactly 5 strings.",
    );
    prompt
}

/// Parses `{"keywords": [...]}` or a bare array into a keyword set
pub fn parse_keywords(content: &str) -> KeywordSynthesis {
    let content = content.trim();
    if content.is_empty() {
        return KeywordSynthesis::fallback(FallbackReason::EmptyResponse);
    }

    let payload: KeywordPayload = match serde_json::from_str(content) {
        Ok(payload) => payload,
        Err(e) => return KeywordSynthesis::fallback(FallbackReason::Malformed(e.to_string())),
    };

    let values = match payload {
        KeywordPayload::Object { keywords } | KeywordPayload::List(keywords) => keywords,
    };
    let strings: Vec<&str> = values.iter().filter_map(|v| v.as_str()).collect();

    match StyleKeywordSet::new(strings) {
        Ok(keywords) => KeywordSynthesis::Generated(keywords),
        Err(count) => KeywordSynthesis::fallback(FallbackReason::TooFewKeywords(count)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AppResult;
    use crate::models::FALLBACK_KEYWORDS;
    use crate::services::providers::MockStyleGenerator;
    use crate::services::search::tests::remote_photo;
    use tokio_test::assert_ok;

    /// Generator that replies only after `delay`
    pub(crate) struct SlowGenerator {
        pub(crate) delay: Duration,
    }

    #[async_trait::async_trait]
    impl StyleGenerator for SlowGenerator {
        async fn complete(&self, _request: &CompletionRequest) -> AppResult<String> {
            tokio::time::sleep(self.delay).await;
            Ok(r#"["late", "too late", "much too late"]"#.to_string())
        }

        fn has_credentials(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn synthesizer_with(generator: MockStyleGenerator) -> PreferenceSynthesizer {
        PreferenceSynthesizer::new(Arc::new(generator), Duration::from_secs(5))
    }

    fn generator_replying(reply: &'static str) -> MockStyleGenerator {
        let mut generator = MockStyleGenerator::new();
        generator.expect_has_credentials().return_const(true);
        generator.expect_name().return_const("mock");
        generator
            .expect_complete()
            .returning(move |_| Ok(reply.to_string()));
        generator
    }

    fn assert_fixed_fallback(outcome: &KeywordSynthesis) {
        assert!(outcome.is_fallback());
        assert_eq!(outcome.keywords().len(), 5);
        assert_eq!(outcome.keywords().as_slice(), FALLBACK_KEYWORDS.map(String::from).as_slice());
    }

    #[test]
    fn test_prompt_includes_liked_summary_and_hint() {
        let liked = vec![remote_photo(1), remote_photo(2)];
        let prompt = build_prompt(&liked, Some("  minimalist streetwear "));

        assert!(prompt.contains(r#""id":1"#));
        assert!(prompt.contains(r#""description":"look""#));
        assert!(prompt.contains("\"minimalist streetwear\""));
        assert!(prompt.contains("{\"keywords\""));
    }

    #[test]
    fn test_prompt_omits_blank_hint() {
        let prompt = build_prompt(&[remote_photo(1)], Some("   "));
        assert!(!prompt.contains("specific request"));
    }

    #[test]
    fn test_parse_object_and_list() {
        let outcome = parse_keywords(r#"{"keywords": ["oversized blazer", "wide leg", "neutral", "loafers", "tote"]}"#);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.keywords().as_slice()[0], "oversized blazer");

        let outcome = parse_keywords(r#"["denim", "layered", "sneakers"]"#);
        assert_eq!(outcome.keywords().len(), 3);
    }

    #[test]
    fn test_parse_failures_fall_back() {
        assert_eq!(
            parse_keywords("   "),
            KeywordSynthesis::fallback(FallbackReason::EmptyResponse)
        );
        assert!(matches!(
            parse_keywords("Here are some keywords: denim"),
            KeywordSynthesis::Fallback { reason: FallbackReason::Malformed(_), .. }
        ));
        assert!(matches!(
            parse_keywords(r#"{"keywords": []}"#),
            KeywordSynthesis::Fallback { reason: FallbackReason::TooFewKeywords(0), .. }
        ));
        assert!(matches!(
            parse_keywords(r#"{"styles": ["a", "b", "c"]}"#),
            KeywordSynthesis::Fallback { reason: FallbackReason::Malformed(_), .. }
        ));
        assert!(matches!(
            parse_keywords(r#"{"keywords": [1, 2, "only"]}"#),
            KeywordSynthesis::Fallback { reason: FallbackReason::TooFewKeywords(1), .. }
        ));
    }

    #[tokio::test]
    async fn test_generated_keywords() {
        let synthesizer = synthesizer_with(generator_replying(
            r#"{"keywords": ["minimalist", "streetwear", "monochrome", "oversized", "sneakers"]}"#,
        ));

        let outcome = synthesizer
            .synthesize(&[remote_photo(1)], Some("minimalist streetwear"))
            .await;

        assert_eq!(
            outcome,
            KeywordSynthesis::Generated(
                assert_ok!(StyleKeywordSet::new(["minimalist", "streetwear", "monochrome", "oversized", "sneakers"]))
            )
        );
    }

    #[tokio::test]
    async fn test_malformed_response_yields_fixed_fallback() {
        let synthesizer = synthesizer_with(generator_replying("not json at all"));
        let outcome = synthesizer.synthesize(&[remote_photo(1)], None).await;
        assert_fixed_fallback(&outcome);
    }

    #[tokio::test]
    async fn test_empty_response_yields_fixed_fallback() {
        let synthesizer = synthesizer_with(generator_replying(""));
        let outcome = synthesizer.synthesize(&[remote_photo(1)], None).await;
        assert_fixed_fallback(&outcome);
        assert!(matches!(
            outcome,
            KeywordSynthesis::Fallback { reason: FallbackReason::EmptyResponse, .. }
        ));
    }

    #[tokio::test]
    async fn test_service_failure_yields_fixed_fallback() {
        let mut generator = MockStyleGenerator::new();
        generator.expect_has_credentials().return_const(true);
        generator.expect_name().return_const("mock");
        generator.expect_complete().returning(|_| {
            Err(AppError::Upstream {
                status: Some(429),
                message: "rate limited".to_string(),
            })
        });

        let outcome = synthesizer_with(generator)
            .synthesize(&[remote_photo(1)], None)
            .await;

        assert_fixed_fallback(&outcome);
        assert!(matches!(
            outcome,
            KeywordSynthesis::Fallback { reason: FallbackReason::ServiceFailure(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_the_call() {
        let mut generator = MockStyleGenerator::new();
        generator.expect_has_credentials().return_const(false);
        generator.expect_complete().times(0);

        let outcome = synthesizer_with(generator)
            .synthesize(&[remote_photo(1)], None)
            .await;

        assert_eq!(outcome, KeywordSynthesis::fallback(FallbackReason::MissingCredential));
    }

    #[tokio::test]
    async fn test_timeout_falls_back_as_service_failure() {
        let synthesizer = PreferenceSynthesizer::new(
            Arc::new(SlowGenerator {
                delay: Duration::from_secs(5),
            }),
            Duration::from_millis(50),
        );

        let outcome = synthesizer.synthesize(&[remote_photo(1)], None).await;

        assert_fixed_fallback(&outcome);
        match outcome {
            KeywordSynthesis::Fallback {
                reason: FallbackReason::ServiceFailure(message),
                ..
            } => assert!(message.contains("timed out")),
            other => panic!("expected service failure fallback, got {:?}", other),
        }
    }
}
