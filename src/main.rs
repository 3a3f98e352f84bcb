use stylematch_api::{
    config::Config,
    routes::{create_router, AppState},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stylematch_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    if config.pexels_api_key.is_none() {
        tracing::warn!("PEXELS_API_KEY is not set; provider-backed listings will fail");
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; recommendations will use fallback keywords");
    }

    let state = AppState::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, images_dir = %config.images_dir.display(), "Server running");

    axum::serve(listener, app).await?;
    Ok(())
}
