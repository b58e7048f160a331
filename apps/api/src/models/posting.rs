use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ATS provider a posting was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Greenhouse,
    Lever,
}

impl Source {
    /// Short tag used inside provider-qualified ids (`stripe-gh-123`).
    pub fn id_tag(&self) -> &'static str {
        match self {
            Source::Greenhouse => "gh",
            Source::Lever => "lv",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "greenhouse" | "gh" => Some(Source::Greenhouse),
            "lever" | "lv" => Some(Source::Lever),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    Remote,
    Hybrid,
    #[default]
    Onsite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    #[default]
    Fulltime,
    Contract,
    Parttime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorStatus {
    Yes,
    No,
    #[default]
    Unknown,
}

/// A posting as handed over by a fetch collaborator. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPosting {
    pub source: Source,
    /// Board slug (Greenhouse) or tenant name (Lever) the posting came from.
    pub board: String,
    pub id: String,
    pub title: String,
    /// Free-text body, possibly HTML.
    pub body: String,
    pub location: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    /// Provider employment-commitment metadata, e.g. "Full-time", "Contract".
    pub commitment: Option<String>,
    pub url: Option<String>,
    pub company: Option<String>,
}

impl RawPosting {
    pub fn new(source: Source, board: &str, id: &str, title: &str) -> Self {
        Self {
            source,
            board: board.to_string(),
            id: id.to_string(),
            title: title.to_string(),
            body: String::new(),
            location: None,
            posted_at: None,
            commitment: None,
            url: None,
            company: None,
        }
    }
}

/// Annualized USD salary band. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

/// The engine's primary entity: a posting with every derived field attached.
///
/// `search_text` is the normalized title + body used for matching. It never leaves the engine;
/// convert with [`NormalizedPosting::into_view`] before returning results.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPosting {
    pub id: String,
    pub source: Source,
    pub company: String,
    pub title: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub work_mode: WorkMode,
    pub job_type: JobType,
    pub sponsor_status: SponsorStatus,
    pub sponsor_flags: Vec<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub min_years_experience: Option<u32>,
    pub posted_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub search_text: String,
}

/// Caller-facing posting: everything except the search surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingView {
    pub id: String,
    pub source: Source,
    pub company: String,
    pub title: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub remote: bool,
    pub work_mode: WorkMode,
    pub job_type: JobType,
    pub sponsor_status: SponsorStatus,
    pub sponsor_flags: Vec<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub min_years_experience: Option<u32>,
    pub posted_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl NormalizedPosting {
    pub fn has_sponsor_flags(&self) -> bool {
        !self.sponsor_flags.is_empty()
    }

    /// Strips the search surface.
    pub fn into_view(self) -> PostingView {
        PostingView {
            remote: self.work_mode == WorkMode::Remote,
            id: self.id,
            source: self.source,
            company: self.company,
            title: self.title,
            city: self.city,
            state: self.state,
            work_mode: self.work_mode,
            job_type: self.job_type,
            sponsor_status: self.sponsor_status,
            sponsor_flags: self.sponsor_flags,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            min_years_experience: self.min_years_experience,
            posted_at: self.posted_at,
            url: self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_param_is_case_insensitive() {
        assert_eq!(Source::from_param("Greenhouse"), Some(Source::Greenhouse));
        assert_eq!(Source::from_param(" lever "), Some(Source::Lever));
        assert_eq!(Source::from_param("workday"), None);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&WorkMode::Hybrid).unwrap(), r#""hybrid""#);
        assert_eq!(serde_json::to_string(&JobType::Parttime).unwrap(), r#""parttime""#);
        assert_eq!(serde_json::to_string(&SponsorStatus::Yes).unwrap(), r#""yes""#);
        assert_eq!(serde_json::to_string(&Source::Lever).unwrap(), r#""lever""#);
    }

    #[test]
    fn test_view_omits_search_text_and_derives_remote() {
        let posting = NormalizedPosting {
            id: "stripe-gh-1".to_string(),
            source: Source::Greenhouse,
            company: "stripe".to_string(),
            title: "Backend Engineer".to_string(),
            city: Some("Remote".to_string()),
            state: None,
            work_mode: WorkMode::Remote,
            job_type: JobType::Fulltime,
            sponsor_status: SponsorStatus::Unknown,
            sponsor_flags: vec![],
            salary_min: None,
            salary_max: None,
            min_years_experience: None,
            posted_at: None,
            url: None,
            search_text: "backend engineer secret body".to_string(),
        };

        let view = posting.into_view();
        assert!(view.remote);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("searchText").is_none());
        assert!(json.get("search_text").is_none());
        assert_eq!(json["workMode"], "remote");
        assert_eq!(json["sponsorFlags"], serde_json::json!([]));
    }
}
