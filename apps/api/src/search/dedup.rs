//! Deduplicator: collapses postings that describe the same role.
//!
//! The key is the case-folded `(company, title, city, state)` tuple. `source` and `id` are
//! not part of it; a role mirrored on two ATS boards collapses too.

use std::collections::{HashMap, HashSet};

use crate::models::posting::NormalizedPosting;

type DedupKey = (String, String, String, String);

fn dedup_key(posting: &NormalizedPosting) -> DedupKey {
    let fold = |s: Option<&str>| s.unwrap_or_default().trim().to_lowercase();
    (
        fold(Some(posting.company.as_str())),
        fold(Some(posting.title.as_str())),
        fold(posting.city.as_deref()),
        fold(posting.state.as_deref()),
    )
}

/// Milliseconds since the epoch; a missing timestamp counts as the epoch, i.e. least recent.
fn recency(posting: &NormalizedPosting) -> i64 {
    posting
        .posted_at
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

/// Keeps the most recently posted member of each key group.
///
/// The survivor takes the slot of the group's first occurrence; ties keep the earlier posting.
/// Returns a new collection; the input is consumed, not mutated in place. Ids in the result are
/// unique.
pub fn dedupe(postings: Vec<NormalizedPosting>) -> Vec<NormalizedPosting> {
    let mut slots: Vec<NormalizedPosting> = Vec::with_capacity(postings.len());
    let mut index: HashMap<DedupKey, usize> = HashMap::new();

    for posting in postings {
        let key = dedup_key(&posting);
        match index.get(&key) {
            Some(&slot) => {
                if recency(&posting) > recency(&slots[slot]) {
                    slots[slot] = posting;
                }
            }
            None => {
                index.insert(key, slots.len());
                slots.push(posting);
            }
        }
    }

    let mut seen_ids: HashSet<String> = HashSet::with_capacity(slots.len());
    slots
        .into_iter()
        .filter(|p| seen_ids.insert(p.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::{JobType, SponsorStatus, Source, WorkMode};
    use chrono::{Duration, TimeZone, Utc};

    fn posting(id: &str, company: &str, title: &str, days_ago: Option<i64>) -> NormalizedPosting {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        NormalizedPosting {
            id: id.to_string(),
            source: Source::Greenhouse,
            company: company.to_string(),
            title: title.to_string(),
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            work_mode: WorkMode::Onsite,
            job_type: JobType::Fulltime,
            sponsor_status: SponsorStatus::Unknown,
            sponsor_flags: vec![],
            salary_min: None,
            salary_max: None,
            min_years_experience: None,
            posted_at: days_ago.map(|d| now - Duration::days(d)),
            url: None,
            search_text: title.to_lowercase(),
        }
    }

    #[test]
    fn test_later_posting_survives() {
        let older = posting("a", "Stripe", "Backend Engineer", Some(10));
        let newer = posting("b", "stripe", "backend engineer", Some(2));

        let result = dedupe(vec![older, newer]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "b");
    }

    #[test]
    fn test_missing_date_loses_to_any_date() {
        let undated = posting("a", "Stripe", "Backend Engineer", None);
        let dated = posting("b", "Stripe", "Backend Engineer", Some(400));

        let result = dedupe(vec![undated, dated]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "b");
    }

    #[test]
    fn test_cross_source_duplicates_collapse() {
        let gh = posting("stripe-gh-1", "Stripe", "Backend Engineer", Some(5));
        let mut lv = posting("stripe-lv-9", "Stripe", "Backend Engineer", Some(1));
        lv.source = Source::Lever;

        let result = dedupe(vec![gh, lv]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, Source::Lever);
    }

    #[test]
    fn test_distinct_keys_keep_order() {
        let a = posting("a", "Stripe", "Backend Engineer", Some(1));
        let b = posting("b", "Plaid", "Backend Engineer", Some(3));
        let mut c = posting("c", "Stripe", "Backend Engineer", Some(2));
        c.city = Some("Seattle".to_string());

        let ids: Vec<String> = dedupe(vec![a, b, c]).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tie_keeps_first_and_ids_stay_unique() {
        let first = posting("a", "Stripe", "Backend Engineer", Some(3));
        let tie = posting("b", "Stripe", "Backend Engineer", Some(3));
        let same_id = posting("a", "Stripe", "Frontend Engineer", Some(1));

        let ids: Vec<String> = dedupe(vec![first, tie, same_id])
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a"]);
    }
}
