//! Relevance Scoring: pluggable, trait-based scorer that measures a posting against a query.
//!
//! Default: `KeywordRelevanceScorer` (phrase + token containment, bounded fuzzy fallback,
//! sponsorship and recency boosts). Scoring is a pure function of (posting, query, now):
//! no hidden state, so identical inputs always rank identically.

use chrono::{DateTime, Utc};

use crate::models::posting::NormalizedPosting;
use crate::search::fuzzy::fuzzy_matches_any;
use crate::search::text::{normalize, tokenize};

// ────────────────────────────────────────────────────────────────────────────
// Weights
// ────────────────────────────────────────────────────────────────────────────

/// Bonus table for the keyword scorer.
///
/// The non-textual boosts (`sponsor_flag` + `recency_max`) must stay below the pipeline's
/// fallback threshold, otherwise a posting with no textual match could suppress the fallback.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub title_phrase: f64,
    pub surface_phrase: f64,
    pub title_token: f64,
    pub surface_token: f64,
    pub fuzzy_title: f64,
    pub fuzzy_surface: f64,
    /// Applied once when the phrase or any token names the hiring company.
    pub company_match: f64,
    pub sponsor_flag: f64,
    pub recency_max: f64,
    pub recency_window_days: f64,
    pub empty_query_baseline: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_phrase: 10.0,
            surface_phrase: 4.0,
            title_token: 3.0,
            surface_token: 1.5,
            fuzzy_title: 1.5,
            fuzzy_surface: 0.75,
            company_match: 3.0,
            sponsor_flag: 0.25,
            recency_max: 0.5,
            recency_window_days: 60.0,
            empty_query_baseline: 0.1,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Query / score models
// ────────────────────────────────────────────────────────────────────────────

/// A query normalized once per request: the full phrase plus its distinct scoring tokens
/// (stop words and tokens shorter than `min_token_len` dropped).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub phrase: String,
    pub tokens: Vec<String>,
}

impl PreparedQuery {
    pub fn new(text: &str, min_token_len: usize) -> Self {
        let phrase = normalize(text);
        let mut tokens: Vec<String> = Vec::new();
        for token in tokenize(&phrase) {
            if token.chars().count() >= min_token_len && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        Self { phrase, tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

/// Score with its components, so callers can tell textual relevance from boosts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelevanceScore {
    pub total: f64,
    pub text: f64,
    pub sponsorship: f64,
    pub recency: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The relevance scorer trait. Implement this to swap ranking strategies without touching the
/// pipeline or the handler.
pub trait RelevanceScorer: Send + Sync {
    fn score(
        &self,
        posting: &NormalizedPosting,
        query: &PreparedQuery,
        now: DateTime<Utc>,
    ) -> RelevanceScore;

    /// Backend label, for logs.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordRelevanceScorer (default)
// ────────────────────────────────────────────────────────────────────────────

/// Keyword scorer.
///
/// Algorithm:
/// 1. Empty query → `empty_query_baseline`, nothing else (ordering falls through to recency)
/// 2. Phrase in title → `title_phrase`, else phrase in search surface → `surface_phrase`
/// 3. Per distinct query token:
///    - in title → `title_token`
///    - else in surface → `surface_token`
///    - else fuzzy match on a title word → `fuzzy_title`
///    - else fuzzy match on a surface word → `fuzzy_surface`
/// 4. Phrase or any token in the company name → `company_match`, once
/// 5. Any sponsorship flag → `sponsor_flag`
/// 6. Recency: linear from `recency_max` at age 0 to 0 at `recency_window_days`
#[derive(Debug, Clone, Default)]
pub struct KeywordRelevanceScorer {
    pub weights: ScoringWeights,
}

impl KeywordRelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    fn text_score(&self, posting: &NormalizedPosting, query: &PreparedQuery) -> f64 {
        let w = &self.weights;
        let title = normalize(&posting.title);
        let surface = posting.search_text.as_str();
        let mut score = 0.0;

        if title.contains(&query.phrase) {
            score += w.title_phrase;
        } else if surface.contains(&query.phrase) {
            score += w.surface_phrase;
        }

        let title_words = tokenize(&title);
        let mut surface_words: Option<Vec<String>> = None;

        for token in &query.tokens {
            if title.contains(token.as_str()) {
                score += w.title_token;
            } else if surface.contains(token.as_str()) {
                score += w.surface_token;
            } else if fuzzy_matches_any(token, title_words.iter().map(String::as_str)) {
                score += w.fuzzy_title;
            } else {
                let words = surface_words.get_or_insert_with(|| tokenize(surface));
                if fuzzy_matches_any(token, words.iter().map(String::as_str)) {
                    score += w.fuzzy_surface;
                }
            }
        }

        let company = normalize(&posting.company);
        if !company.is_empty()
            && (company.contains(&query.phrase)
                || query.tokens.iter().any(|t| company.contains(t.as_str())))
        {
            score += w.company_match;
        }

        score
    }
}

impl RelevanceScorer for KeywordRelevanceScorer {
    fn score(
        &self,
        posting: &NormalizedPosting,
        query: &PreparedQuery,
        now: DateTime<Utc>,
    ) -> RelevanceScore {
        if query.is_empty() {
            return RelevanceScore {
                total: self.weights.empty_query_baseline,
                ..RelevanceScore::default()
            };
        }

        let text = self.text_score(posting, query);
        let sponsorship = if posting.has_sponsor_flags() {
            self.weights.sponsor_flag
        } else {
            0.0
        };
        let recency = recency_boost(posting.posted_at, now, &self.weights);

        RelevanceScore {
            total: text + sponsorship + recency,
            text,
            sponsorship,
            recency,
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Linear decay from `recency_max` (posted now or in the future) to 0 at the window edge.
/// Unknown post dates get nothing.
pub fn recency_boost(
    posted_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> f64 {
    let Some(posted_at) = posted_at else {
        return 0.0;
    };
    let age_days = ((now - posted_at).num_seconds() as f64 / 86_400.0).max(0.0);
    let remaining = (1.0 - age_days / weights.recency_window_days).clamp(0.0, 1.0);
    weights.recency_max * remaining
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
