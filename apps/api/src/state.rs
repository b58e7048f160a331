use std::sync::Arc;

use crate::config::Config;
use crate::search::pipeline::SearchEngine;
use crate::sources::PostingCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Where each request's raw postings come from. Live ATS fetchers in production.
    pub catalog: Arc<dyn PostingCatalog>,
    pub engine: Arc<SearchEngine>,
}
