mod config;
mod errors;
mod models;
mod routes;
mod search;
mod sources;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::search::pipeline::SearchEngine;
use crate::search::scoring::{KeywordRelevanceScorer, ScoringWeights};
use crate::sources::AtsCatalog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sponsor-search v{}", env!("CARGO_PKG_VERSION"));

    // One pooled HTTP client shared by every fetcher
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .user_agent(concat!("sponsor-search/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let registry = config.registry();
    info!(
        "Sources: {} Greenhouse boards, {} Lever tenants",
        registry.greenhouse_boards.len(),
        registry.lever_tenants.len()
    );
    let catalog = AtsCatalog::new(
        client,
        registry,
        config.source_concurrency,
        config.detail_concurrency,
        config.greenhouse_detail_limit,
        config.lever_posting_limit,
    );

    // Keyword scorer by default; any RelevanceScorer can be swapped in here
    let scorer = Arc::new(KeywordRelevanceScorer::new(ScoringWeights::default()));
    let engine = SearchEngine::new(config.engine_config(), scorer);

    let state = AppState {
        config: config.clone(),
        catalog: Arc::new(catalog),
        engine: Arc::new(engine),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
