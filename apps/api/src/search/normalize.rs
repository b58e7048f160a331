//! RawPosting → NormalizedPosting. Runs once per fetch cycle; the result is never mutated.

use crate::models::posting::{NormalizedPosting, RawPosting, SponsorStatus};
use crate::search::attributes::{
    extract_job_type, extract_min_years, extract_salary, extract_work_mode, split_location,
};
use crate::search::sponsorship::classify_sponsorship;
use crate::search::text::{normalize, strip_html};

pub fn normalize_posting(raw: &RawPosting) -> NormalizedPosting {
    let body = strip_html(&raw.body);
    let search_text = normalize(&format!("{} {}", raw.title, body));
    let location = raw.location.as_deref().map(str::trim);

    let (city, state) = split_location(location);
    let salary = extract_salary(&body);
    let sponsorship = classify_sponsorship(&search_text);

    let mut flags = sponsorship.flags;
    if sponsorship.status != SponsorStatus::Yes {
        flags.clear();
    }

    NormalizedPosting {
        id: format!("{}-{}-{}", raw.board, raw.source.id_tag(), raw.id),
        source: raw.source,
        company: raw
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(raw.board.as_str())
            .to_string(),
        title: raw.title.trim().to_string(),
        city,
        state,
        work_mode: extract_work_mode(&search_text, location),
        job_type: extract_job_type(raw.commitment.as_deref(), &search_text),
        sponsor_status: sponsorship.status,
        sponsor_flags: flags,
        salary_min: salary.map(|s| s.min),
        salary_max: salary.map(|s| s.max),
        min_years_experience: extract_min_years(&body),
        posted_at: raw.posted_at,
        url: raw.url.clone(),
        search_text,
    }
}
