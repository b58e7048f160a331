//! Search pipeline, the single entry point the handler calls.
//!
//! raw → normalize (attributes + sponsorship) → dedupe → structured filters → score/rank
//! → weak-match fallback → cap → strip search surface.
//!
//! Synchronous and allocation-only: no I/O, no shared mutable state.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::models::posting::{NormalizedPosting, PostingView, RawPosting, SponsorStatus};
use crate::models::query::SearchQuery;
use crate::search::dedup::dedupe;
use crate::search::filters::matches_filters;
use crate::search::normalize::normalize_posting;
use crate::search::scoring::{
    KeywordRelevanceScorer, PreparedQuery, RelevanceScore, RelevanceScorer,
};

/// Pipeline tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_results: usize,
    /// How many top results are inspected before falling back.
    pub fallback_window: usize,
    /// If every inspected result scores below this, the ranked list is discarded.
    pub fallback_threshold: f64,
    /// Query tokens shorter than this do not score.
    pub min_token_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            fallback_window: 12,
            fallback_threshold: 1.0,
            min_token_len: 3,
        }
    }
}

/// A posting paired with its relevance; lives only for the duration of one ranking.
#[derive(Debug, Clone)]
pub struct ScoredPosting {
    pub posting: NormalizedPosting,
    pub score: RelevanceScore,
}

pub struct SearchEngine {
    config: EngineConfig,
    scorer: Arc<dyn RelevanceScorer>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Arc::new(KeywordRelevanceScorer::default()))
    }
}

impl SearchEngine {
    pub fn new(config: EngineConfig, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { config, scorer }
    }

    /// Runs the full pipeline over one request's raw collection.
    pub fn search(
        &self,
        raw: &[RawPosting],
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Vec<PostingView> {
        let normalized: Vec<NormalizedPosting> = raw.iter().map(normalize_posting).collect();
        let deduped = dedupe(normalized);
        let deduped_count = deduped.len();

        let filtered: Vec<NormalizedPosting> = deduped
            .into_iter()
            .filter(|p| matches_filters(p, query, now))
            .collect();
        let filtered_count = filtered.len();

        let prepared = PreparedQuery::new(&query.text, self.config.min_token_len);
        let ranked = self.rank(&filtered, &prepared, now);

        let fallback = !prepared.is_empty() && self.is_weak(&ranked);
        let mut items: Vec<NormalizedPosting> = if fallback {
            sponsored_by_recency(filtered)
        } else {
            ranked.into_iter().map(|s| s.posting).collect()
        };
        items.truncate(self.config.max_results);

        debug!(
            scorer = self.scorer.name(),
            raw = raw.len(),
            deduped = deduped_count,
            filtered = filtered_count,
            returned = items.len(),
            fallback,
            "search pipeline finished"
        );

        items.into_iter().map(NormalizedPosting::into_view).collect()
    }

    /// Scores and orders postings: score descending, then newest first, then input order.
    /// With a non-empty query, postings without any textual relevance are dropped.
    pub fn rank(
        &self,
        postings: &[NormalizedPosting],
        query: &PreparedQuery,
        now: DateTime<Utc>,
    ) -> Vec<ScoredPosting> {
        let mut scored: Vec<ScoredPosting> = postings
            .iter()
            .map(|posting| {
                let score = self.scorer.score(posting, query, now);
                trace!(
                    id = %posting.id,
                    total = score.total,
                    text = score.text,
                    sponsorship = score.sponsorship,
                    recency = score.recency,
                    "scored posting"
                );
                ScoredPosting {
                    score,
                    posting: posting.clone(),
                }
            })
            .filter(|s| query.is_empty() || s.score.text > 0.0)
            .collect();

        // sort_by is stable: equal keys keep their input order
        scored.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.posting.posted_at.cmp(&a.posting.posted_at))
        });
        scored
    }

    fn is_weak(&self, ranked: &[ScoredPosting]) -> bool {
        ranked
            .iter()
            .take(self.config.fallback_window)
            .all(|s| s.score.total < self.config.fallback_threshold)
    }
}

/// Fallback list: positively sponsoring postings, newest first (unknown dates last).
fn sponsored_by_recency(postings: Vec<NormalizedPosting>) -> Vec<NormalizedPosting> {
    let mut sponsored: Vec<NormalizedPosting> = postings
        .into_iter()
        .filter(|p| p.sponsor_status == SponsorStatus::Yes)
        .collect();
    sponsored.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
    sponsored
}

/// Convenience entry point with the default engine.
pub fn run_search(raw: &[RawPosting], query: &SearchQuery, now: DateTime<Utc>) -> Vec<PostingView> {
    SearchEngine::default().search(raw, query, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::{Source, WorkMode};
    use crate::models::query::PostedWithin;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn raw(board: &str, id: &str, title: &str, body: &str, days_ago: Option<i64>) -> RawPosting {
        let mut posting = RawPosting::new(Source::Greenhouse, board, id, title);
        posting.body = body.to_string();
        posting.location = Some("New York, NY".to_string());
        posting.posted_at = days_ago.map(|d| now() - Duration::days(d));
        posting
    }

    #[test]
    fn test_end_to_end_sponsorship_scenario() {
        let collection = vec![
            raw(
                "acme",
                "1",
                "Senior Backend Engineer",
                "We offer H-1B sponsorship, including cap-exempt transfers",
                Some(2),
            ),
            raw(
                "acme",
                "2",
                "Backend Engineer",
                "Must be authorized to work without sponsorship",
                Some(1),
            ),
        ];
        let query = SearchQuery {
            text: "backend".to_string(),
            sponsorship: Some(SponsorStatus::Yes),
            ..SearchQuery::default()
        };

        let results = run_search(&collection, &query, now());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "acme-gh-1");
        assert!(results[0].sponsor_flags.contains(&"H-1B transfer".to_string()));
        assert!(results[0].sponsor_flags.contains(&"H-1B cap-exempt".to_string()));
    }

    #[test]
    fn test_fallback_returns_sponsored_by_recency() {
        let bodies = [
            "O-1 visas supported",
            "E-3 candidates welcome",
            "We will sponsor H-1B",
            "Green card sponsorship offered",
            "TN visa holders considered",
        ];
        let collection: Vec<RawPosting> = (0..10)
            .map(|i| {
                raw(
                    &format!("board{i}"),
                    &i.to_string(),
                    &format!("Designer {i}"),
                    bodies[i % bodies.len()],
                    // out of order on purpose
                    Some(((i * 7) % 10) as i64 + 1),
                )
            })
            .collect();

        let results = run_search(&collection, &SearchQuery::text("quantum chemistry"), now());

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|p| p.sponsor_status == SponsorStatus::Yes));
        assert!(results
            .windows(2)
            .all(|w| w[0].posted_at >= w[1].posted_at));
    }

    #[test]
    fn test_fallback_keeps_only_sponsored_postings() {
        let collection = vec![
            raw("a", "1", "Designer", "O-1 welcome", Some(5)),
            raw("b", "2", "Designer", "no visa sponsorship", Some(1)),
            raw("c", "3", "Recruiter", "great team", Some(2)),
            raw("d", "4", "Analyst", "E-3 welcome", Some(3)),
        ];

        let results = run_search(&collection, &SearchQuery::text("kubernetes"), now());
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["d-gh-4", "a-gh-1"]);
    }

    #[test]
    fn test_strong_match_suppresses_fallback() {
        let collection = vec![
            raw("a", "1", "Rust Engineer", "systems work", Some(10)),
            raw("b", "2", "Designer", "O-1 welcome", Some(1)),
        ];

        let results = run_search(&collection, &SearchQuery::text("rust"), now());
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a-gh-1"]);
    }

    #[test]
    fn test_empty_query_orders_by_recency() {
        let collection = vec![
            raw("a", "1", "Engineer A", "", Some(9)),
            raw("b", "2", "Engineer B", "", None),
            raw("c", "3", "Engineer C", "", Some(1)),
            raw("d", "4", "Engineer D", "", Some(4)),
        ];

        let results = run_search(&collection, &SearchQuery::default(), now());
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c-gh-3", "d-gh-4", "a-gh-1", "b-gh-2"]);
    }

    #[test]
    fn test_ranking_is_stable_and_repeatable() {
        let collection: Vec<RawPosting> = (0..6)
            .map(|i| raw(&format!("b{i}"), "1", &format!("Backend Engineer {i}"), "", None))
            .collect();
        let query = SearchQuery::text("backend engineer");

        let first = run_search(&collection, &query, now());
        let second = run_search(&collection, &query, now());
        assert_eq!(first, second);

        // identical scores and dates: input order is preserved
        let ids: Vec<&str> = first.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b0-gh-1", "b1-gh-1", "b2-gh-1", "b3-gh-1", "b4-gh-1", "b5-gh-1"]);
    }

    #[test]
    fn test_duplicates_collapse_before_ranking() {
        let collection = vec![
            raw("acme", "1", "Backend Engineer", "", Some(20)),
            raw("acme", "2", "Backend Engineer", "", Some(3)),
        ];
        let results = run_search(&collection, &SearchQuery::text("backend"), now());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "acme-gh-2");
    }

    #[test]
    fn test_filters_apply_before_scoring() {
        let mut remote = raw("a", "1", "Backend Engineer", "", Some(2));
        remote.location = Some("Remote".to_string());
        let onsite = raw("b", "2", "Backend Engineer II", "", Some(40));

        let query = SearchQuery {
            text: "backend".to_string(),
            work_mode: Some(WorkMode::Remote),
            posted_within: PostedWithin::Week,
            ..SearchQuery::default()
        };
        let results = run_search(&[remote, onsite], &query, now());
        assert_eq!(results.len(), 1);
        assert!(results[0].remote);
    }

    #[test]
    fn test_output_is_capped() {
        let collection: Vec<RawPosting> = (0..30)
            .map(|i| raw(&format!("b{i}"), "1", &format!("Engineer {i}"), "", Some(i)))
            .collect();
        let engine = SearchEngine::new(
            EngineConfig {
                max_results: 5,
                ..EngineConfig::default()
            },
            Arc::new(KeywordRelevanceScorer::default()),
        );

        let results = engine.search(&collection, &SearchQuery::default(), now());
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn test_company_name_query_finds_its_postings() {
        let collection = vec![
            raw("stripe", "1", "Backend Engineer", "Build payment APIs.", Some(4)),
            raw("plaid", "1", "Designer", "O-1 welcome", Some(1)),
        ];

        let results = run_search(&collection, &SearchQuery::text("stripe"), now());
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["stripe-gh-1"]);
    }

    #[test]
    fn test_sparse_input_is_tolerated() {
        assert!(run_search(&[], &SearchQuery::text("rust"), now()).is_empty());
        assert!(run_search(&[], &SearchQuery::default(), now()).is_empty());
    }
}
