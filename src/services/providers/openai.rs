//! OpenAI-compatible chat completion client used as the generative text service.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    services::providers::{ChatTurn, CompletionRequest, ModelTier, StyleGenerator},
};

/// Request body for POST /chat/completions
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Connection settings for the generative service
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub org_id: Option<String>,
    pub api_url: String,
    pub analysis_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    settings: OpenAiSettings,
}

impl OpenAiGenerator {
    pub fn new(mut settings: OpenAiSettings) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(settings.timeout).build()?;
        settings.api_key = settings.api_key.filter(|k| !k.trim().is_empty());
        settings.org_id = settings.org_id.filter(|o| !o.trim().is_empty());

        tracing::info!(
            url = %settings.api_url,
            analysis_model = %settings.analysis_model,
            chat_model = %settings.chat_model,
            has_api_key = settings.api_key.is_some(),
            "Initialized generative text client"
        );

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Analysis => &self.settings.analysis_model,
            ModelTier::Chat => &self.settings.chat_model,
        }
    }
}

#[async_trait::async_trait]
impl StyleGenerator for OpenAiGenerator {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("OPENAI_API_KEY"))?;

        let url = format!(
            "{}/chat/completions",
            self.settings.api_url.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: self.model_for(request.tier),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_output.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let mut builder = self.http_client.post(&url).bearer_auth(api_key).json(&body);
        if let Some(org_id) = self.settings.org_id.as_deref() {
            builder = builder.header("OpenAI-Organization", org_id);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                status,
                format!("Generative service returned status {}: {}", status, message),
            ));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::MalformedResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        tracing::debug!(
            model = %self.model_for(request.tier),
            content_length = content.len(),
            "Completion received"
        );

        Ok(content)
    }

    fn has_credentials(&self) -> bool {
        self.settings.api_key.is_some()
    }

    fn has_organization(&self) -> bool {
        self.settings.org_id.is_some()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
