use std::str::FromStr;

use anyhow::{Context, Result};

use crate::search::pipeline::EngineConfig;
use crate::sources::SourceRegistry;

const DEFAULT_GREENHOUSE_BOARDS: &str = "coinbase,datadog,stripe,asana,plaid,notion";
const DEFAULT_LEVER_TENANTS: &str = "airtable,shopify,vercel,figma,postman";

/// Application configuration loaded from environment variables.
/// Every variable is optional; a present but malformed number fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub greenhouse_boards: Vec<String>,
    pub lever_tenants: Vec<String>,
    /// Boards/tenants fetched concurrently per provider.
    pub source_concurrency: usize,
    /// Greenhouse detail requests in flight per board.
    pub detail_concurrency: usize,
    pub greenhouse_detail_limit: usize,
    pub lever_posting_limit: usize,
    pub http_timeout_secs: u64,
    pub max_results: usize,
    pub cache_max_age_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            greenhouse_boards: split_list(DEFAULT_GREENHOUSE_BOARDS),
            lever_tenants: split_list(DEFAULT_LEVER_TENANTS),
            source_concurrency: 3,
            detail_concurrency: 5,
            greenhouse_detail_limit: 60,
            lever_posting_limit: 120,
            http_timeout_secs: 20,
            max_results: 100,
            cache_max_age_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            greenhouse_boards: list_env("GREENHOUSE_BOARDS", defaults.greenhouse_boards),
            lever_tenants: list_env("LEVER_TENANTS", defaults.lever_tenants),
            source_concurrency: parse_env("SOURCE_CONCURRENCY", defaults.source_concurrency)?,
            detail_concurrency: parse_env("DETAIL_CONCURRENCY", defaults.detail_concurrency)?,
            greenhouse_detail_limit: parse_env(
                "GREENHOUSE_DETAIL_LIMIT",
                defaults.greenhouse_detail_limit,
            )?,
            lever_posting_limit: parse_env("LEVER_POSTING_LIMIT", defaults.lever_posting_limit)?,
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            max_results: parse_env("MAX_RESULTS", defaults.max_results)?,
            cache_max_age_secs: parse_env("CACHE_MAX_AGE_SECS", defaults.cache_max_age_secs)?,
        })
    }

    pub fn registry(&self) -> SourceRegistry {
        SourceRegistry {
            greenhouse_boards: self.greenhouse_boards.clone(),
            lever_tenants: self.lever_tenants.clone(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_results: self.max_results,
            ..EngineConfig::default()
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(std::env::var(key).ok(), key, default)
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
    }
}

fn list_env(key: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => split_list(&value),
        _ => default,
    }
}

/// Comma-separated slugs, trimmed, empties dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
