//! Axum route handler for the Search API.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::posting::PostingView;
use crate::models::query::{SearchParams, SearchQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<PostingView>,
}

/// GET /api/search
///
/// Collects raw postings from the catalog and runs the search pipeline over them.
/// Unknown option values mean "any" and a repeated key keeps its first value; only an
/// undecodable query string is rejected.
pub async fn handle_search(
    State(state): State<AppState>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pairs) = pairs.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = SearchQuery::from(SearchParams::from_pairs(pairs));

    let raw = state.catalog.collect().await;

    // CPU-bound ranking runs off the async executor
    let engine = Arc::clone(&state.engine);
    let now = Utc::now();
    let items = tokio::task::spawn_blocking(move || engine.search(&raw, &query, now))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in search: {e}")))?;

    let cache_control = format!("public, max-age={}", state.config.cache_max_age_secs);
    Ok((
        [(header::CACHE_CONTROL, cache_control)],
        Json(SearchResponse { items }),
    ))
}
