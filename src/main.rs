use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use translation_contrib::cache::TranslationCacheState;
use translation_contrib::config::Config;
use translation_contrib::db::Database;
use translation_contrib::remote::ContributionClient;
use translation_contrib::server::{self, AppState};
use translation_contrib::translation::TranslationService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_contrib=info".parse()?),
        )
        .init();

    info!("Starting translation contribution service");

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    let remote = ContributionClient::new(&config)?;
    let service = TranslationService::new(
        Arc::new(db),
        Arc::new(TranslationCacheState::new()),
        remote,
    );

    let app = server::router(AppState {
        service,
        api_key: config.api_key.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
