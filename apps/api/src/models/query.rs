//! Search options as they arrive from the handler, and their typed form.
//!
//! Every option is lenient: an unrecognized value means "any" rather than a rejected request.

use chrono::Duration;

use crate::models::posting::{JobType, SponsorStatus, Source, WorkMode};

/// Raw query-string parameters. Aliases accept the short names (`q`, `posted`, `mode`, `type`).
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub text: Option<String>,
    pub posted_within: Option<String>,
    pub work_mode: Option<String>,
    pub job_type: Option<String>,
    pub sponsorship: Option<String>,
    pub source: Option<String>,
    pub min_salary: Option<String>,
    pub min_years: Option<String>,
    pub company_contains: Option<String>,
    pub city_contains: Option<String>,
}

impl SearchParams {
    /// Builds params from decoded query-string pairs. When a key repeats, or a name and its
    /// alias are both given, the first value wins. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = SearchParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "text" | "q" => &mut params.text,
                "postedWithin" | "posted" => &mut params.posted_within,
                "workMode" | "mode" => &mut params.work_mode,
                "jobType" | "type" => &mut params.job_type,
                "sponsorship" => &mut params.sponsorship,
                "source" => &mut params.source,
                "minSalary" => &mut params.min_salary,
                "minYears" => &mut params.min_years,
                "companyContains" => &mut params.company_contains,
                "cityContains" => &mut params.city_contains,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostedWithin {
    Day,
    Week,
    Month,
    #[default]
    Any,
}

impl PostedWithin {
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "24h" | "1d" => PostedWithin::Day,
            "7d" => PostedWithin::Week,
            "30d" => PostedWithin::Month,
            _ => PostedWithin::Any,
        }
    }

    pub fn window(&self) -> Option<Duration> {
        match self {
            PostedWithin::Day => Some(Duration::days(1)),
            PostedWithin::Week => Some(Duration::days(7)),
            PostedWithin::Month => Some(Duration::days(30)),
            PostedWithin::Any => None,
        }
    }
}

/// Typed search query consumed by the pipeline. `None` on a filter means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub posted_within: PostedWithin,
    pub work_mode: Option<WorkMode>,
    pub job_type: Option<JobType>,
    pub sponsorship: Option<SponsorStatus>,
    pub source: Option<Source>,
    pub min_salary: Option<f64>,
    pub min_years: Option<u32>,
    pub company_contains: Option<String>,
    pub city_contains: Option<String>,
}

impl SearchQuery {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        SearchQuery {
            text: params.text.unwrap_or_default().trim().to_lowercase(),
            posted_within: params
                .posted_within
                .as_deref()
                .map(PostedWithin::from_param)
                .unwrap_or_default(),
            work_mode: params.work_mode.as_deref().and_then(parse_work_mode),
            job_type: params.job_type.as_deref().and_then(parse_job_type),
            sponsorship: params.sponsorship.as_deref().and_then(parse_sponsorship),
            source: params.source.as_deref().and_then(Source::from_param),
            min_salary: params
                .min_salary
                .as_deref()
                .and_then(parse_number)
                .filter(|v| *v > 0.0),
            min_years: params
                .min_years
                .as_deref()
                .and_then(parse_number)
                .filter(|v| *v > 0.0)
                .map(|v| v as u32),
            company_contains: non_blank(params.company_contains),
            city_contains: non_blank(params.city_contains),
        }
    }
}

fn parse_work_mode(value: &str) -> Option<WorkMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "remote" => Some(WorkMode::Remote),
        "hybrid" => Some(WorkMode::Hybrid),
        "onsite" | "on-site" => Some(WorkMode::Onsite),
        _ => None,
    }
}

fn parse_job_type(value: &str) -> Option<JobType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "fulltime" | "full-time" => Some(JobType::Fulltime),
        "contract" => Some(JobType::Contract),
        "parttime" | "part-time" => Some(JobType::Parttime),
        _ => None,
    }
}

fn parse_sponsorship(value: &str) -> Option<SponsorStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(SponsorStatus::Yes),
        "no" | "false" => Some(SponsorStatus::No),
        "unknown" => Some(SponsorStatus::Unknown),
        _ => None,
    }
}

/// Accepts "120000", "120,000" and "120k".
fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| *c != ',' && *c != '$' && *c != '_')
        .collect();
    let (digits, multiplier) = match cleaned.strip_suffix('k') {
        Some(rest) => (rest, 1000.0),
        None => (cleaned.as_str(), 1.0),
    };
    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        SearchParams::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_full_option_set_parses() {
        let query = SearchQuery::from(params(&[
            ("text", "  Backend "),
            ("postedWithin", "7d"),
            ("workMode", "hybrid"),
            ("jobType", "contract"),
            ("sponsorship", "yes"),
            ("source", "lever"),
            ("minSalary", "120,000"),
            ("minYears", "3"),
            ("companyContains", " Stripe "),
            ("cityContains", "NY"),
        ]));

        assert_eq!(query.text, "backend");
        assert_eq!(query.posted_within, PostedWithin::Week);
        assert_eq!(query.work_mode, Some(WorkMode::Hybrid));
        assert_eq!(query.job_type, Some(JobType::Contract));
        assert_eq!(query.sponsorship, Some(SponsorStatus::Yes));
        assert_eq!(query.source, Some(Source::Lever));
        assert_eq!(query.min_salary, Some(120_000.0));
        assert_eq!(query.min_years, Some(3));
        assert_eq!(query.company_contains.as_deref(), Some("stripe"));
        assert_eq!(query.city_contains.as_deref(), Some("ny"));
    }

    #[test]
    fn test_short_aliases_are_accepted() {
        let query = SearchQuery::from(params(&[
            ("q", "rust"),
            ("posted", "24h"),
            ("mode", "remote"),
            ("type", "fulltime"),
        ]));
        assert_eq!(query.text, "rust");
        assert_eq!(query.posted_within, PostedWithin::Day);
        assert_eq!(query.work_mode, Some(WorkMode::Remote));
        assert_eq!(query.job_type, Some(JobType::Fulltime));
    }

    #[test]
    fn test_repeated_keys_keep_first_value() {
        let query = SearchQuery::from(params(&[
            ("q", "rust"),
            ("text", "go"),
            ("mode", "remote"),
            ("workMode", "hybrid"),
            ("sponsorship", "yes"),
            ("sponsorship", "no"),
            ("page", "2"),
        ]));
        assert_eq!(query.text, "rust");
        assert_eq!(query.work_mode, Some(WorkMode::Remote));
        assert_eq!(query.sponsorship, Some(SponsorStatus::Yes));
    }

    #[test]
    fn test_unsupported_values_degrade_to_any() {
        let query = SearchQuery::from(params(&[
            ("postedWithin", "3h"),
            ("workMode", "any"),
            ("jobType", "internship"),
            ("sponsorship", "maybe"),
            ("source", "workday"),
            ("minSalary", "lots"),
            ("minYears", "-2"),
            ("companyContains", "   "),
        ]));
        assert_eq!(query, SearchQuery::default());
    }

    #[test]
    fn test_parse_number_handles_k_suffix() {
        assert_eq!(parse_number("150k"), Some(150_000.0));
        assert_eq!(parse_number("$90,500"), Some(90_500.0));
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_posted_within_windows() {
        assert_eq!(PostedWithin::Day.window(), Some(Duration::days(1)));
        assert_eq!(PostedWithin::Month.window(), Some(Duration::days(30)));
        assert_eq!(PostedWithin::Any.window(), None);
    }
}
