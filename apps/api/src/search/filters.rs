//! Structured filters. All predicates are conjunctive; a `None` option always passes.

use chrono::{DateTime, Utc};

use crate::models::posting::NormalizedPosting;
use crate::models::query::SearchQuery;

/// True when `posting` satisfies every structured option of `query`.
pub fn matches_filters(posting: &NormalizedPosting, query: &SearchQuery, now: DateTime<Utc>) -> bool {
    posted_within(posting, query, now)
        && query.work_mode.map_or(true, |mode| posting.work_mode == mode)
        && query.job_type.map_or(true, |kind| posting.job_type == kind)
        && query
            .sponsorship
            .map_or(true, |status| posting.sponsor_status == status)
        && query.source.map_or(true, |source| posting.source == source)
        && query
            .min_salary
            .map_or(true, |floor| posting.salary_min.unwrap_or(0.0) >= floor)
        && query
            .min_years
            .map_or(true, |floor| posting.min_years_experience.unwrap_or(0) >= floor)
        && query
            .company_contains
            .as_deref()
            .map_or(true, |needle| contains_folded(&posting.company, needle))
        && query.city_contains.as_deref().map_or(true, |needle| {
            [posting.city.as_deref(), posting.state.as_deref()]
                .into_iter()
                .flatten()
                .any(|field| contains_folded(field, needle))
        })
}

/// Postings with an unknown date always pass the age window.
fn posted_within(posting: &NormalizedPosting, query: &SearchQuery, now: DateTime<Utc>) -> bool {
    match (query.posted_within.window(), posting.posted_at) {
        (Some(window), Some(posted_at)) => posted_at >= now - window,
        _ => true,
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
