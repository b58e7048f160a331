//! Attribute Extractor: structured fields derived from free text and provider metadata.
//!
//! Every extractor is independent and total: malformed or missing input yields `None` or the
//! enum default, never an error.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::posting::{JobType, SalaryRange, WorkMode};

/// Standard full-time hours per year, used to annualize hourly rates.
pub const HOURS_PER_YEAR: f64 = 2080.0;

const AMOUNT: &str = r"(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d+))?(?:\s?(k)\b)?";
const UNIT: &str =
    r"(?:\s*(?:/\s*|per\s+|an?\s+)(hour|hr|year|yr|annum)\b|\s+(hourly|annually))?";
const SCALE: &str = r"(\s?(?:mm|m|million|bn|b|billion)\b)?";

/// "$120,000 - $180,000", "$120k – 150k/yr", "$50 to $70 per hour"
static RE_SALARY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\$\s?{AMOUNT}\s*(?:-|–|—|to)\s*\$?\s?{AMOUNT}{SCALE}{UNIT}"
    ))
    .unwrap()
});

/// "$60/hr", "$150,000 per year", "$95k"
static RE_SALARY_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\$\s?{AMOUNT}{SCALE}{UNIT}")).unwrap());

/// First small integer followed by years/yrs; a leading range ("3-5 years") keeps its first number.
static RE_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:\s*[-–]\s*\d{1,2})?\s*\+?\s*(?:years?|yrs?)\b").unwrap()
});

static RE_PART_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpart[-\s]?time\b").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Work mode / job type
// ────────────────────────────────────────────────────────────────────────────

/// Hybrid is checked before remote: a posting mentioning both is the more specific hybrid.
pub fn extract_work_mode(text: &str, location: Option<&str>) -> WorkMode {
    let haystack = format!("{} {}", text, location.unwrap_or_default()).to_lowercase();
    if haystack.contains("hybrid") {
        WorkMode::Hybrid
    } else if haystack.contains("remote") {
        WorkMode::Remote
    } else {
        WorkMode::Onsite
    }
}

/// Provider commitment metadata is authoritative for contract roles.
pub fn extract_job_type(commitment: Option<&str>, text: &str) -> JobType {
    let commitment = commitment.unwrap_or_default();
    if commitment.to_lowercase().contains("contract") {
        JobType::Contract
    } else if RE_PART_TIME.is_match(commitment) || RE_PART_TIME.is_match(text) {
        JobType::Parttime
    } else {
        JobType::Fulltime
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Salary
// ────────────────────────────────────────────────────────────────────────────

/// Extracts an annualized USD salary band.
///
/// A range wins over a single figure. A single figure without a unit is assumed to be annual;
/// hourly figures are multiplied by [`HOURS_PER_YEAR`]. Zero is never a salary.
pub fn extract_salary(text: &str) -> Option<SalaryRange> {
    for caps in RE_SALARY_RANGE.captures_iter(text) {
        // groups: 1-3 low amount, 4-6 high amount, 7 scale, 8-9 unit
        if caps.get(7).is_some() {
            continue;
        }
        let (Some(mut low), Some(mut high)) = (amount(&caps, 1), amount(&caps, 4)) else {
            continue;
        };
        let low_k = caps.get(3).is_some();
        let high_k = caps.get(6).is_some();
        if high_k && !low_k && low < 1000.0 {
            low *= 1000.0;
        } else if low_k && !high_k && high < 1000.0 {
            high *= 1000.0;
        }
        let factor = unit_factor(&caps, 8);
        if let Some(range) = ordered_range(low * factor, high * factor) {
            return Some(range);
        }
    }

    for caps in RE_SALARY_SINGLE.captures_iter(text) {
        // groups: 1-3 amount, 4 scale, 5-6 unit
        if caps.get(4).is_some() {
            continue;
        }
        let Some(value) = amount(&caps, 1) else {
            continue;
        };
        let annual = value * unit_factor(&caps, 5);
        if annual > 0.0 {
            return Some(SalaryRange {
                min: annual,
                max: annual,
            });
        }
    }

    None
}

/// Parses the amount starting at capture group `first` (digits, decimals, `k` suffix).
fn amount(caps: &Captures, first: usize) -> Option<f64> {
    let digits: String = caps.get(first)?.as_str().replace(',', "");
    let mut value: f64 = digits.parse().ok()?;
    if let Some(decimals) = caps.get(first + 1) {
        let fraction: f64 = format!("0.{}", decimals.as_str()).parse().ok()?;
        value += fraction;
    }
    if caps.get(first + 2).is_some() {
        value *= 1000.0;
    }
    Some(value)
}

fn unit_factor(caps: &Captures, first: usize) -> f64 {
    let unit = caps
        .get(first)
        .or_else(|| caps.get(first + 1))
        .map(|m| m.as_str().to_lowercase());
    match unit.as_deref() {
        Some(u) if u.starts_with('h') => HOURS_PER_YEAR,
        _ => 1.0,
    }
}

fn ordered_range(a: f64, b: f64) -> Option<SalaryRange> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    Some(SalaryRange {
        min: a.min(b),
        max: a.max(b),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Experience / location
// ────────────────────────────────────────────────────────────────────────────

pub fn extract_min_years(text: &str) -> Option<u32> {
    RE_YEARS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Splits "City, State[, Country]" into its first two comma-separated parts.
pub fn split_location(location: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(location) = location else {
        return (None, None);
    };
    let mut parts = location.split(',').map(str::trim);
    let city = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    let state = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (city, state)
}
