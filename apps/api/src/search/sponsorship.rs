//! Sponsorship Classifier: labels a posting's visa-sponsorship stance from its text.
//!
//! Rules are data, not control flow: each rule is a tagged pattern (category, label, regex).
//! Within a category the first matching rule wins, so adding a visa pathway means adding rows.
//!
//! Any NEGATIVE match makes the posting non-sponsoring, even when it also advertises
//! sponsorship elsewhere in the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::models::posting::SponsorStatus;

// ────────────────────────────────────────────────────────────────────────────
// Rule tables
// ────────────────────────────────────────────────────────────────────────────

/// Explicit non-sponsorship disclaimers. (category, label, pattern)
const NEGATIVE_RULES: &[(&str, &str, &str)] = &[
    (
        "disclaimer",
        "without sponsorship",
        r"without\s+(?:(?:visa|employer|company|immigration)\s+)?sponsorship",
    ),
    (
        "disclaimer",
        "no sponsorship",
        r"\bno\s+(?:(?:visa|immigration|h[-\s]?1b)\s+)?sponsorship",
    ),
    (
        "disclaimer",
        "unable to sponsor",
        r"(?:\bnot\s+(?:be\s+)?(?:able|available)|\bunable)\s+to\s+sponsor",
    ),
    (
        "disclaimer",
        "will not sponsor",
        r"\b(?:will\s+not|won't|cannot|can't|does\s+not|do\s+not|is\s+not\s+able\s+to)\s+(?:(?:provide|offer|support)\s+)?(?:visa\s+)?sponsor",
    ),
    (
        "disclaimer",
        "sponsorship not available",
        r"sponsorship\s+(?:is\s+)?not\s+(?:available|offered|provided|possible)",
    ),
    (
        "disclaimer",
        "authorized without sponsorship",
        r"must\s+be\s+(?:legally\s+)?authorized\s+to\s+work.*without",
    ),
    ("disclaimer", "C2C only", r"\bc2c\s+only\b"),
];

/// Sponsorship offers and named visa pathways. (category, label, pattern)
///
/// Rows of one category are ordered most specific first.
const POSITIVE_RULES: &[(&str, &str, &str)] = &[
    (
        "general",
        "Visa sponsorship",
        r"(?:visa|immigration)\s+sponsorship\s+(?:is\s+)?(?:available|offered|provided)|\b(?:offers?|provides?)\s+(?:(?:visa|immigration)\s+)?sponsorship|\bwill\s+sponsor\b|\bsponsorship\s+(?:is\s+)?available",
    ),
    (
        "h1b",
        "H-1B transfer",
        r"\bh[-\s]?1b\b.{0,60}\btransfers?\b|\btransfers?\b.{0,30}\bh[-\s]?1b\b",
    ),
    ("h1b", "H-1B (new)", r"\bh[-\s]?1b\b"),
    ("cap_exempt", "H-1B cap-exempt", r"\bcap[-\s]?exempt\b"),
    ("e3", "E-3", r"\be-?3\b"),
    (
        "tn",
        "TN",
        r"\btn\s+(?:visas?|status)\b|\b(?:nafta|usmca)\b|\b(?:h[-\s]?1b|e-?3|o-?1)\s*(?:,|/|\bor\b|\band\b)\s*tn\b|\btn\s*(?:,|/|\bor\b|\band\b)\s*(?:h[-\s]?1b|e-?3|o-?1)\b",
    ),
    ("o1", "O-1", r"\bo-?1a?\b"),
    (
        "green_card",
        "GC sponsor",
        r"green\s*cards?\s+(?:sponsorship|sponsor|process|support)|\bsponsor\w*\s+(?:(?:a|your)\s+)?green\s*cards?",
    ),
    ("opt", "STEM OPT-friendly", r"\bstem[-\s]?opt\b"),
    (
        "opt",
        "OPT-friendly",
        r"\bopt\s*(?:/|\bor\b|\band\b)\s*cpt\b|\bcpt\s*(?:/|\bor\b|\band\b)\s*opt\b|\bopt\s+(?:candidates|students|holders|eligible|friendly|ead|extension|visa)\b|\b(?:f-?1|on|accepts?|welcomes?|supports?)\s+opt\b|optional\s+practical\s+training",
    ),
    (
        "cpt",
        "CPT-friendly",
        r"\bopt\s*(?:/|\bor\b|\band\b)\s*cpt\b|\bcpt\s*(?:/|\bor\b|\band\b)\s*opt\b|\bcpt\s+(?:candidates|students|eligible|friendly|internships?)\b|\b(?:on|accepts?|welcomes?|supports?)\s+cpt\b|curricular\s+practical\s+training",
    ),
];

// ────────────────────────────────────────────────────────────────────────────
// Tagged patterns
// ────────────────────────────────────────────────────────────────────────────

/// A regex tagged with the category it belongs to and the label it yields.
#[derive(Debug, Clone)]
pub struct TaggedPattern {
    pub category: &'static str,
    pub label: &'static str,
    regex: Regex,
}

impl TaggedPattern {
    /// Compiles `pattern` case-insensitively.
    pub fn new(
        category: &'static str,
        label: &'static str,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            label,
            regex: Regex::new(&format!("(?i){pattern}"))?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn compile(rules: &[(&'static str, &'static str, &str)]) -> Vec<TaggedPattern> {
    rules
        .iter()
        .filter_map(|&(category, label, pattern)| {
            TaggedPattern::new(category, label, pattern)
                .map_err(|e| warn!(category, label, "Dropping sponsorship rule: {e}"))
                .ok()
        })
        .collect()
}

/// Evaluates `rules` in order and returns the first match of each category,
/// in the order the categories first matched.
pub fn first_match_per_category<'r>(
    rules: &'r [TaggedPattern],
    text: &str,
) -> Vec<&'r TaggedPattern> {
    let mut seen: Vec<&str> = Vec::new();
    let mut hits = Vec::new();
    for rule in rules {
        if seen.contains(&rule.category) {
            continue;
        }
        if rule.is_match(text) {
            seen.push(rule.category);
            hits.push(rule);
        }
    }
    hits
}

// ────────────────────────────────────────────────────────────────────────────
// Classifier
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of classification. `flags` is non-empty only when `status` is `Yes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sponsorship {
    pub status: SponsorStatus,
    pub flags: Vec<String>,
}

pub struct SponsorshipClassifier {
    negatives: Vec<TaggedPattern>,
    positives: Vec<TaggedPattern>,
}

impl Default for SponsorshipClassifier {
    fn default() -> Self {
        Self::new(compile(NEGATIVE_RULES), compile(POSITIVE_RULES))
    }
}

impl SponsorshipClassifier {
    pub fn new(negatives: Vec<TaggedPattern>, positives: Vec<TaggedPattern>) -> Self {
        Self {
            negatives,
            positives,
        }
    }

    pub fn classify(&self, text: &str) -> Sponsorship {
        let text = fold_apostrophes(&text.to_lowercase());

        if self.negatives.iter().any(|rule| rule.is_match(&text)) {
            return Sponsorship {
                status: SponsorStatus::No,
                flags: vec![],
            };
        }

        let hits = first_match_per_category(&self.positives, &text);
        if hits.is_empty() {
            return Sponsorship::default();
        }

        let mut flags: Vec<String> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !flags.iter().any(|f| f == hit.label) {
                flags.push(hit.label.to_string());
            }
        }

        Sponsorship {
            status: SponsorStatus::Yes,
            flags,
        }
    }
}

/// Typographic apostrophes (`won’t`) become ASCII so contractions in the rules match.
fn fold_apostrophes(text: &str) -> String {
    text.replace(|c: char| c == '\u{2019}' || c == '\u{2018}' || c == '\u{02bc}', "'")
}

static DEFAULT_CLASSIFIER: Lazy<SponsorshipClassifier> = Lazy::new(SponsorshipClassifier::default);

/// Classifies with the built-in rule tables.
pub fn classify_sponsorship(text: &str) -> Sponsorship {
    DEFAULT_CLASSIFIER.classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(text: &str) -> Vec<String> {
        classify_sponsorship(text).flags
    }

    #[test]
    fn test_all_rule_tables_compile() {
        assert_eq!(compile(NEGATIVE_RULES).len(), NEGATIVE_RULES.len());
        assert_eq!(compile(POSITIVE_RULES).len(), POSITIVE_RULES.len());
    }

    #[test]
    fn test_negative_disclaimers_yield_no() {
        let disclaimers = [
            "Candidates must be authorized to work without sponsorship.",
            "No visa sponsorship is offered for this role",
            "We are not able to sponsor visas at this time",
            "The company is unable to sponsor work authorization",
            "We will not sponsor applicants",
            "Sponsorship is not available",
            "C2C only, no exceptions",
        ];
        for text in disclaimers {
            let result = classify_sponsorship(text);
            assert_eq!(result.status, SponsorStatus::No, "expected no for {text:?}");
            assert!(result.flags.is_empty());
        }
    }

    #[test]
    fn test_negative_takes_precedence_over_positive() {
        let text = "We offer H-1B transfers and O-1 support, but cannot sponsor new visas. \
                    Must be authorized to work without sponsorship.";
        let result = classify_sponsorship(text);
        assert_eq!(result.status, SponsorStatus::No);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let result = classify_sponsorship("Build payment APIs in Rust and Go. Opt out anytime.");
        assert_eq!(result.status, SponsorStatus::Unknown);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_h1b_transfer_and_cap_exempt() {
        let result =
            classify_sponsorship("We offer H-1B sponsorship, including cap-exempt transfers");
        assert_eq!(result.status, SponsorStatus::Yes);
        assert!(result.flags.contains(&"H-1B transfer".to_string()));
        assert!(result.flags.contains(&"H-1B cap-exempt".to_string()));
        // the transfer row wins the h1b category
        assert!(!result.flags.contains(&"H-1B (new)".to_string()));
    }

    #[test]
    fn test_new_h1b_without_transfer() {
        assert_eq!(flags("H1B visa holders welcome"), vec!["H-1B (new)"]);
    }

    #[test]
    fn test_named_pathways() {
        assert_eq!(flags("We support E-3 visas"), vec!["E-3"]);
        assert_eq!(flags("TN visa candidates considered"), vec!["TN"]);
        assert_eq!(flags("O-1 extraordinary ability"), vec!["O-1"]);
        assert_eq!(flags("Green card sponsorship after one year"), vec!["GC sponsor"]);
        assert_eq!(flags("STEM OPT extension supported"), vec!["STEM OPT-friendly"]);
        assert_eq!(flags("OPT candidates encouraged to apply"), vec!["OPT-friendly"]);
        assert_eq!(
            flags("Visa sponsorship available for this role"),
            vec!["Visa sponsorship"]
        );
    }

    #[test]
    fn test_opt_cpt_combination_yields_both() {
        let result = classify_sponsorship("Interns on OPT/CPT welcome");
        assert_eq!(result.status, SponsorStatus::Yes);
        assert_eq!(result.flags, vec!["OPT-friendly", "CPT-friendly"]);
    }

    #[test]
    fn test_positive_flags_are_non_empty_and_duplicate_free() {
        let texts = [
            "H-1B, TN, E-3 and O-1 sponsorship; h1b transfer also OK",
            "We will sponsor H-1B. We will sponsor a green card.",
            "cap exempt employer - cap-exempt H-1B",
        ];
        for text in texts {
            let result = classify_sponsorship(text);
            assert_eq!(result.status, SponsorStatus::Yes, "{text:?}");
            assert!(!result.flags.is_empty());
            let mut deduped = result.flags.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), result.flags.len(), "duplicates in {text:?}");
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "O-1, E-3 or H-1B transfer; green card sponsorship";
        assert_eq!(classify_sponsorship(text), classify_sponsorship(text));
    }

    #[test]
    fn test_first_match_per_category_keeps_rule_order() {
        let rules = vec![
            TaggedPattern::new("a", "first", r"alpha").unwrap(),
            TaggedPattern::new("a", "second", r"alp").unwrap(),
            TaggedPattern::new("b", "third", r"beta").unwrap(),
        ];
        let hits = first_match_per_category(&rules, "beta alpha");
        let labels: Vec<&str> = hits.iter().map(|h| h.label).collect();
        assert_eq!(labels, vec!["first", "third"]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(TaggedPattern::new("x", "broken", r"(unclosed").is_err());
    }

    #[test]
    fn test_typographic_contraction_disclaimer_yields_no() {
        let result = classify_sponsorship("We won\u{2019}t sponsor H-1B visas for this role.");
        assert_eq!(result.status, SponsorStatus::No);
        assert!(result.flags.is_empty());

        let result = classify_sponsorship("We can\u{2019}t sponsor visas");
        assert_eq!(result.status, SponsorStatus::No);
    }
}
