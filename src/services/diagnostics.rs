use serde::Serialize;
use std::time::Duration;

use crate::{
    error::AppError,
    services::providers::{ChatTurn, CompletionRequest, ModelTier, StyleGenerator},
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CredentialStatus {
    pub has_api_key: bool,
    pub has_org_id: bool,
}

/// Connectivity report for the generative text service
#[derive(Debug, Serialize)]
pub struct GenerationDiagnostics {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    pub credentials: CredentialStatus,
}

/// Sends one tiny completion to confirm the service answers
pub async fn check_generation(generator: &dyn StyleGenerator, timeout: Duration) -> GenerationDiagnostics {
    let credentials = CredentialStatus {
        has_api_key: generator.has_credentials(),
        has_org_id: generator.has_organization(),
    };

    if !credentials.has_api_key {
        return GenerationDiagnostics {
            success: false,
            message: None,
            error: Some("OPENAI_API_KEY is not set".to_string()),
            upstream_status: None,
            credentials,
        };
    }

    let request = CompletionRequest {
        tier: ModelTier::Chat,
        messages: vec![
            ChatTurn::system("You are a test assistant. Respond with 'API is working!'"),
            ChatTurn::user("Hello"),
        ],
        json_output: false,
        temperature: None,
        max_tokens: Some(10),
    };

    let result = match tokio::time::timeout(timeout, generator.complete(&request)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timed_out(generator.name(), timeout)),
    };

    match result {
        Ok(content) => GenerationDiagnostics {
            success: true,
            message: Some(content),
            error: None,
            upstream_status: None,
            credentials,
        },
        Err(e) => {
            tracing::warn!(error = %e, generator = generator.name(), "Generation diagnostics failed");
            let upstream_status = match &e {
                AppError::Upstream { status, .. } => *status,
                _ => None,
            };
            GenerationDiagnostics {
                success: false,
                message: None,
                error: Some(e.to_string()),
                upstream_status,
                credentials,
            }
        }
    }
}
