use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::Config,
    error::AppResult,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        catalog::IMAGES_ROUTE,
        providers::{
            openai::{OpenAiGenerator, OpenAiSettings},
            pexels::PexelsProvider,
            PhotoSearchProvider, StyleGenerator,
        },
        ClassificationRules, LocalCatalog, PhotoAggregator, PreferenceSynthesizer, RandomSource,
        RecencyCache, RecommendationEngine, RecommendationFetcher, SearchAdapter, Stylist,
    },
};

pub mod chat;
pub mod photos;
pub mod recommendations;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub photos: Arc<PhotoAggregator>,
    pub recommendations: Arc<RecommendationEngine>,
    pub stylist: Arc<Stylist>,
    pub generator: Arc<dyn StyleGenerator>,
    pub images_dir: PathBuf,
    pub upstream_timeout: Duration,
}

/// Everything the engine needs from the outside world
pub struct Collaborators {
    pub provider: Arc<dyn PhotoSearchProvider>,
    pub generator: Arc<dyn StyleGenerator>,
    pub images_dir: PathBuf,
    pub rules: ClassificationRules,
    pub random: Arc<RandomSource>,
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Wires the Pexels and OpenAI clients from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let timeout = config.upstream_timeout();

        let provider = PexelsProvider::new(
            config.pexels_api_key.clone(),
            config.pexels_api_url.clone(),
            timeout,
        )?;
        let generator = OpenAiGenerator::new(OpenAiSettings {
            api_key: config.openai_api_key.clone(),
            org_id: config.openai_org_id.clone(),
            api_url: config.openai_api_url.clone(),
            analysis_model: config.openai_model.clone(),
            chat_model: config.openai_chat_model.clone(),
            timeout,
        })?;

        Ok(Self::new(Collaborators {
            provider: Arc::new(provider),
            generator: Arc::new(generator),
            images_dir: config.images_dir.clone(),
            rules: ClassificationRules::load(&config.classification_rules),
            random: Arc::new(RandomSource::from_entropy()),
            upstream_timeout: timeout,
        }))
    }

    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            provider,
            generator,
            images_dir,
            rules,
            random,
            upstream_timeout,
        } = collaborators;

        let recency = Arc::new(RecencyCache::new());
        let catalog = Arc::new(LocalCatalog::new(images_dir.clone(), rules, random.clone()));
        let search = Arc::new(SearchAdapter::new(
            provider.clone(),
            recency,
            random.clone(),
            upstream_timeout,
        ));
        let synthesizer = Arc::new(PreferenceSynthesizer::new(generator.clone(), upstream_timeout));
        let fetcher = Arc::new(RecommendationFetcher::new(provider, upstream_timeout));

        Self {
            photos: Arc::new(PhotoAggregator::new(catalog.clone(), search, random.clone())),
            recommendations: Arc::new(RecommendationEngine::new(
                synthesizer,
                fetcher,
                catalog,
                random,
            )),
            stylist: Arc::new(Stylist::new(generator.clone(), upstream_timeout)),
            generator,
            images_dir,
            upstream_timeout,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let images = ServeDir::new(&state.images_dir);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .nest_service(IMAGES_ROUTE, images)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/photos", get(photos::list_photos))
        .route("/recommendations", post(recommendations::recommend))
        .route("/chat", post(chat::chat))
        .route("/diagnostics/generation", get(chat::generation_diagnostics))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
