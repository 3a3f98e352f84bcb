use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Audience,
    routes::AppState,
    services::{
        diagnostics::{check_generation, GenerationDiagnostics},
        providers::ChatTurn,
    },
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub gender: Audience,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Handler for the stylist chat endpoint
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(AppError::InvalidInput(
            "messages must contain at least one turn".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        turns = request.messages.len(),
        audience = %request.gender,
        "Processing stylist chat request"
    );

    let message = state.stylist.reply(&request.messages, request.gender).await;
    Ok(Json(ChatResponse { message }))
}

/// Handler reporting whether the generative service is reachable
pub async fn generation_diagnostics(State(state): State<AppState>) -> Json<GenerationDiagnostics> {
    Json(check_generation(state.generator.as_ref(), state.upstream_timeout).await)
}
