use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AppError,
    models::Audience,
    services::providers::{ChatRole, ChatTurn, CompletionRequest, ModelTier, StyleGenerator},
};

const CHAT_TEMPERATURE: f32 = 0.8;
const CHAT_MAX_TOKENS: u32 = 150;

const UNAVAILABLE_REPLY: &str =
    "Looks like the AI stylist is offline right now, but no worries, I'll still use your likes to find outfits you'll love!";
const BLANK_REPLY: &str = "Hmm... let me think about that one for a second 😊";
const AUTH_REPLY: &str =
    "There's a problem with the stylist's API key setup... but don't worry, I'll still find great outfits from your likes!";
const BUSY_REPLY: &str = "I'm a little swamped right now... give it a moment and try again!";
const PROVIDER_DOWN_REPLY: &str =
    "The AI service is having a temporary hiccup... hang tight and try again shortly!";
const CONNECTIVITY_REPLY: &str =
    "I can't reach the AI service right now, maybe check your connection?";
const GENERIC_REPLY: &str =
    "Hmm, something's a bit off on my side... but leave it to me, I'll find outfits that match your taste! ✨";

/// Conversational stylist; always produces a reply
pub struct Stylist {
    generator: Arc<dyn StyleGenerator>,
    timeout: Duration,
}

impl Stylist {
    pub fn new(generator: Arc<dyn StyleGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn reply(&self, conversation: &[ChatTurn], audience: Audience) -> String {
        if !self.generator.has_credentials() {
            tracing::info!("No generative service key configured, sending canned stylist reply");
            return UNAVAILABLE_REPLY.to_string();
        }

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatTurn::system(system_prompt(audience)));
        // Callers may not inject their own system instructions
        messages.extend(
            conversation
                .iter()
                .filter(|turn| turn.role != ChatRole::System)
                .cloned(),
        );

        let request = CompletionRequest {
            tier: ModelTier::Chat,
            messages,
            json_output: false,
            temperature: Some(CHAT_TEMPERATURE),
            max_tokens: Some(CHAT_MAX_TOKENS),
        };

        let result = match tokio::time::timeout(self.timeout, self.generator.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timed_out(self.generator.name(), self.timeout)),
        };

        match result {
            Ok(content) if content.trim().is_empty() => BLANK_REPLY.to_string(),
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, turns = conversation.len(), "Stylist chat failed");
                failure_reply(&e).to_string()
            }
        }
    }
}

fn system_prompt(audience: Audience) -> String {
    format!(
        "You are a fashionable stylist AI who talks like a friend. \
         You help the user with {} fashion questions.\n\
         - Use emoji moderately to stay approachable\n\
         - Keep replies short and easy to read\n\
         - Include concrete advice\n\
         - Keep a casual tone\n\
         - Be empathetic to how the user feels",
        audience.label().to_lowercase()
    )
}

/// Canned reply for a failed completion
pub fn failure_reply(error: &AppError) -> &'static str {
    match error {
        AppError::MissingCredential(_) => UNAVAILABLE_REPLY,
        AppError::Upstream { status: Some(401), .. } => AUTH_REPLY,
        AppError::Upstream { status: Some(429), .. } => BUSY_REPLY,
        AppError::Upstream { status: Some(s), .. } if *s >= 500 => PROVIDER_DOWN_REPLY,
        AppError::Upstream { status: None, .. } | AppError::HttpClient(_) => CONNECTIVITY_REPLY,
        _ => GENERIC_REPLY,
    }
}
