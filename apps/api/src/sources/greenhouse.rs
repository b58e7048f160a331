//! Greenhouse job-board API: one list call per board, then one detail call per job for the
//! (HTML-escaped) description.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::FetchError;
use crate::models::posting::{RawPosting, Source};
use crate::sources::{get_json, with_limit, JobSource};

const GREENHOUSE_API: &str = "https://boards-api.greenhouse.io/v1/boards";

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct JobSummary {
    id: u64,
    #[serde(default)]
    title: String,
    location: Option<JobLocation>,
    updated_at: Option<String>,
    absolute_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JobLocation {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JobDetail {
    content: Option<String>,
}

pub struct GreenhouseSource {
    client: Client,
    detail_limit: usize,
    detail_concurrency: usize,
}

impl GreenhouseSource {
    pub fn new(client: Client, detail_limit: usize, detail_concurrency: usize) -> Self {
        Self {
            client,
            detail_limit,
            detail_concurrency,
        }
    }

    async fn try_fetch(&self, board: &str) -> Result<Vec<RawPosting>, FetchError> {
        let list: JobList = get_json(&self.client, &format!("{GREENHOUSE_API}/{board}/jobs")).await?;
        let jobs: Vec<JobSummary> = list.jobs.into_iter().take(self.detail_limit).collect();
        debug!(board, jobs = jobs.len(), "Fetching Greenhouse job details");

        let client = self.client.clone();
        let board = board.to_string();
        let postings = with_limit(jobs, self.detail_concurrency, move |job| {
            let client = client.clone();
            let board = board.clone();
            async move {
                let url = format!("{GREENHOUSE_API}/{board}/jobs/{}", job.id);
                match get_json::<JobDetail>(&client, &url).await {
                    Ok(detail) => Some(to_raw_posting(&board, job, detail)),
                    Err(e) => {
                        warn!(provider = "greenhouse", board = %board, job = job.id, "Detail fetch failed: {e}");
                        None
                    }
                }
            }
        })
        .await;

        Ok(postings.into_iter().flatten().collect())
    }
}

#[async_trait]
impl JobSource for GreenhouseSource {
    fn name(&self) -> &'static str {
        "greenhouse"
    }

    async fn fetch(&self, board: &str) -> Vec<RawPosting> {
        match self.try_fetch(board).await {
            Ok(postings) => postings,
            Err(e) => {
                warn!(provider = self.name(), board, "Board fetch failed, skipping: {e}");
                vec![]
            }
        }
    }
}

fn to_raw_posting(board: &str, job: JobSummary, detail: JobDetail) -> RawPosting {
    let mut posting = RawPosting::new(Source::Greenhouse, board, &job.id.to_string(), &job.title);
    posting.body = detail.content.unwrap_or_default();
    posting.location = job.location.and_then(|l| l.name);
    posting.posted_at = job.updated_at.as_deref().and_then(parse_timestamp);
    posting.company = job.absolute_url.as_deref().and_then(company_from_url);
    posting.url = job.absolute_url;
    posting
}

/// `https://boards.greenhouse.io/{company}/jobs/{id}` → `{company}`.
fn company_from_url(url: &str) -> Option<String> {
    url.split('/')
        .nth(3)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
