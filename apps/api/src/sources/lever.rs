//! Lever postings API: a single JSON call per tenant returns every posting with its description.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::errors::FetchError;
use crate::models::posting::{RawPosting, Source};
use crate::sources::{get_json, JobSource};

const LEVER_API: &str = "https://api.lever.co/v0/postings";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    id: String,
    #[serde(default)]
    text: String,
    description: Option<String>,
    description_plain: Option<String>,
    #[serde(default)]
    lists: Vec<LeverList>,
    additional: Option<String>,
    categories: Option<LeverCategories>,
    /// Epoch milliseconds.
    created_at: Option<i64>,
    hosted_url: Option<String>,
    company: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LeverList {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeverCategories {
    commitment: Option<String>,
    location: Option<String>,
}

pub struct LeverSource {
    client: Client,
    posting_limit: usize,
}

impl LeverSource {
    pub fn new(client: Client, posting_limit: usize) -> Self {
        Self {
            client,
            posting_limit,
        }
    }

    async fn try_fetch(&self, tenant: &str) -> Result<Vec<RawPosting>, FetchError> {
        let url = format!("{LEVER_API}/{tenant}?mode=json");
        let postings: Vec<LeverPosting> = get_json(&self.client, &url).await?;
        Ok(postings
            .into_iter()
            .take(self.posting_limit)
            .map(|p| to_raw_posting(tenant, p))
            .collect())
    }
}

#[async_trait]
impl JobSource for LeverSource {
    fn name(&self) -> &'static str {
        "lever"
    }

    async fn fetch(&self, tenant: &str) -> Vec<RawPosting> {
        match self.try_fetch(tenant).await {
            Ok(postings) => postings,
            Err(e) => {
                warn!(provider = self.name(), tenant, "Tenant fetch failed, skipping: {e}");
                vec![]
            }
        }
    }
}

fn to_raw_posting(tenant: &str, posting: LeverPosting) -> RawPosting {
    let categories = posting.categories.unwrap_or_default();
    let body = body_text(
        posting.description.or(posting.description_plain),
        &posting.lists,
        posting.additional,
    );

    let mut raw = RawPosting::new(Source::Lever, tenant, &posting.id, &posting.text);
    raw.body = body;
    raw.location = categories.location;
    raw.commitment = categories.commitment;
    raw.posted_at = posting.created_at.and_then(from_epoch_millis);
    raw.url = posting.hosted_url;
    raw.company = posting.company;
    raw
}

/// Description followed by each requirement list and the closing section.
fn body_text(description: Option<String>, lists: &[LeverList], additional: Option<String>) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.extend(description);
    for list in lists {
        parts.extend(list.text.clone());
        parts.extend(list.content.clone());
    }
    parts.extend(additional);
    parts.retain(|p| !p.trim().is_empty());
    parts.join(" ")
}

fn from_epoch_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
