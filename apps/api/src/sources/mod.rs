//! Fetch collaborators. Pull raw postings from public ATS job-board APIs.
//!
//! Each provider implements [`JobSource`] for a single board/tenant. A failing board never fails
//! the request: the error is logged at `warn` and the board contributes nothing.
//! [`PostingCatalog`] is what the HTTP handler sees; it fans out over every configured board.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::FetchError;
use crate::models::posting::RawPosting;

pub mod greenhouse;
pub mod lever;

use greenhouse::GreenhouseSource;
use lever::LeverSource;

/// Board slugs and tenant names to query, handed to the collaborators as parameters.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    pub greenhouse_boards: Vec<String>,
    pub lever_tenants: Vec<String>,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Provider label, for logs.
    fn name(&self) -> &'static str;

    /// All postings of one board. Never fails; an unreachable board yields an empty list.
    async fn fetch(&self, slug: &str) -> Vec<RawPosting>;
}

/// The raw collection one search request runs over.
#[async_trait]
pub trait PostingCatalog: Send + Sync {
    async fn collect(&self) -> Vec<RawPosting>;
}

/// Live catalog backed by the Greenhouse and Lever public APIs.
pub struct AtsCatalog {
    greenhouse: Arc<dyn JobSource>,
    lever: Arc<dyn JobSource>,
    registry: SourceRegistry,
    source_concurrency: usize,
}

impl AtsCatalog {
    pub fn new(
        client: Client,
        registry: SourceRegistry,
        source_concurrency: usize,
        detail_concurrency: usize,
        greenhouse_detail_limit: usize,
        lever_posting_limit: usize,
    ) -> Self {
        Self {
            greenhouse: Arc::new(GreenhouseSource::new(
                client.clone(),
                greenhouse_detail_limit,
                detail_concurrency,
            )),
            lever: Arc::new(LeverSource::new(client, lever_posting_limit)),
            registry,
            source_concurrency,
        }
    }
}

#[async_trait]
impl PostingCatalog for AtsCatalog {
    async fn collect(&self) -> Vec<RawPosting> {
        let (mut postings, lever) = tokio::join!(
            fan_out(
                Arc::clone(&self.greenhouse),
                &self.registry.greenhouse_boards,
                self.source_concurrency,
            ),
            fan_out(
                Arc::clone(&self.lever),
                &self.registry.lever_tenants,
                self.source_concurrency,
            ),
        );
        info!(
            greenhouse = postings.len(),
            lever = lever.len(),
            "Collected raw postings"
        );
        postings.extend(lever);
        postings
    }
}

/// Fetches every slug through `source`, at most `concurrency` boards at a time.
/// Results keep the order of `slugs`.
pub async fn fan_out(
    source: Arc<dyn JobSource>,
    slugs: &[String],
    concurrency: usize,
) -> Vec<RawPosting> {
    let batches = with_limit(slugs.to_vec(), concurrency, move |slug| {
        let source = Arc::clone(&source);
        async move { source.fetch(&slug).await }
    })
    .await;
    batches.into_iter().flatten().collect()
}

/// Runs `worker` over `items` with at most `limit` in flight. Output order follows input order;
/// a task that panics is logged and dropped.
pub async fn with_limit<T, R, F, Fut>(items: Vec<T>, limit: usize, worker: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let job = worker(item);
        tasks.spawn(async move {
            // the semaphore is never closed, so acquire cannot fail
            let _permit = permits.acquire_owned().await.ok();
            (index, job.await)
        });
    }

    let mut done: Vec<(usize, R)> = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => done.push(result),
            Err(e) => warn!("fetch task aborted: {e}"),
        }
    }
    done.sort_by_key(|(index, _)| *index);
    done.into_iter().map(|(_, result)| result).collect()
}

/// GET `url` and decode the JSON body. Non-2xx statuses are errors.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// In-memory catalog for router tests.
#[cfg(test)]
pub struct StaticCatalog(pub Vec<RawPosting>);

#[cfg(test)]
#[async_trait]
impl PostingCatalog for StaticCatalog {
    async fn collect(&self) -> Vec<RawPosting> {
        self.0.clone()
    }
}
