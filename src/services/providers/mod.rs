//! External collaborator abstractions
//!
//! The photo search provider and the generative text service are reached through
//! these traits so the engine can be driven by in-process fakes in tests and the
//! concrete HTTP clients (Pexels, OpenAI) stay swappable.
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::PhotoRecord};

#[cfg(test)]
use mockall::automock;

pub mod openai;
pub mod pexels;

/// One keyed search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            query: query.into(),
            page,
            per_page,
        }
    }
}

/// Trait for external photo search providers
///
/// Implementations return normalized photos. A successful response with no
/// photos is `Ok(vec![])`; callers decide whether that is a failure.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PhotoSearchProvider: Send + Sync {
    /// Search photos by free-text query
    ///
    /// Fails with `MissingCredential` when no key is configured, `Upstream` on a
    /// non-success status and `MalformedResponse` when the body is unusable.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<PhotoRecord>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Which configured model a completion should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Structured keyword synthesis
    Analysis,
    /// Conversational replies
    Chat,
}

/// Request to the generative text service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub tier: ModelTier,
    pub messages: Vec<ChatTurn>,
    /// Ask the service for a JSON object response
    pub json_output: bool,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Trait for the generative text service
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait StyleGenerator: Send + Sync {
    /// Returns the raw text content of the first completion choice
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;

    /// Whether an API key is configured
    fn has_credentials(&self) -> bool;

    /// Whether an organization id is configured
    fn has_organization(&self) -> bool {
        false
    }

    /// Generator name for logging and debugging
    fn name(&self) -> &'static str;
}
