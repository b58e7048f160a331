//! Text normalization shared by every search stage.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Articles, prepositions and conjunctions dropped by [`tokenize`].
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "of", "in", "on", "at", "to", "for", "with", "by",
    "from", "as", "into", "onto", "about", "over", "under", "via", "per", "than",
];

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Removes markup tags, lowercases and collapses whitespace.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let without_tags = RE_TAG.replace_all(text, " ");
    let lowered = without_tags.to_lowercase();
    RE_WHITESPACE.replace_all(&lowered, " ").trim().to_string()
}

/// Splits on runs of non-alphanumeric characters (keeping `+`, so "c++" survives),
/// drops empty tokens and stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Wrap width handed to html2text; wide enough that body lines are never wrapped.
const TEXT_WIDTH: usize = 10_000;

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&(?:[a-z][a-z0-9]*|#[0-9]+|#x[0-9a-f]+);").unwrap());

/// Turns provider HTML into plain text with whitespace collapsed.
///
/// Greenhouse ships its content entity-escaped (`&lt;p&gt;`), so the first pass only unescapes
/// the markup; when tags or entities survive it, the text is rendered once more.
pub fn strip_html(html: &str) -> String {
    let mut text = html_to_text(html);
    if RE_TAG.is_match(&text) || RE_ENTITY.is_match(&text) {
        text = html_to_text(&text);
    }
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|_| RE_TAG.replace_all(html, " ").into_owned())
}
