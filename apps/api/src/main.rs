mod auth;
mod config;
mod db;
mod errors;
mod feedback;
mod interview;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::identity::IdentityToolkitClient;
use crate::auth::store::PgUserStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, ModelPair, RetryPolicy};
use crate::resume::extractor::PdfExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (lazy: first query opens the connection)
    let db = create_pool(&config.database_url)?;

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "Could not create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_base_url.clone());
    let models = ModelPair::new(config.primary_model.clone(), config.fallback_model.clone());
    info!(
        "LLM client initialized (model: {}, fallback: {})",
        models.primary, models.fallback
    );

    let state = AppState {
        config: config.clone(),
        llm: Arc::new(llm),
        models,
        retry: RetryPolicy::default(),
        extractor: Arc::new(PdfExtractor),
        identity: Arc::new(IdentityToolkitClient::new(config.identity_api_key.clone())),
        users: Arc::new(PgUserStore::new(db)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the frontend host once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr} ({} mode)", config.app_env);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
