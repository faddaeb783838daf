//! Per-field comparison strategies
//!
//! All comparators take values that already went through
//! [`normalize`](crate::normalize::normalize) and return a score in `[0, 1]`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::normalize::name_set;

lazy_static! {
    /// First free-standing four-digit run, e.g. the year in `2022 05 01`
    static ref YEAR_PATTERN: Regex = Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap();
}

/// Words skipped when matching venue abbreviations
const VENUE_STOP_WORDS: &[&str] = &["of", "on", "the", "and", "for", "in", "a", "an", "de", "der", "und"];

/// Comparison strategy for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparator {
    /// 1.0 iff the normalized values are identical
    Exact,
    /// Normalized Levenshtein similarity
    Fuzzy,
    /// Integer (year) comparison with a tolerance in units
    Numeric {
        #[serde(default)]
        tolerance: u32,
    },
    /// Jaccard similarity over canonical person names
    NameSet,
    /// Whole-word substring or abbreviation match, falling back to fuzzy.
    ///
    /// Substrings must start and end on word boundaries: `nature` is inside
    /// `nature physics` but `physics` is not inside `astrophysics`.
    Containment,
}

impl Comparator {
    /// Score two normalized values
    pub fn compare(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::Exact => {
                if a == b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Fuzzy => fuzzy_similarity(a, b),
            Self::Numeric { tolerance } => match (parse_year(a), parse_year(b)) {
                (Some(x), Some(y)) => numeric_similarity(x, y, *tolerance),
                _ => fuzzy_similarity(a, b),
            },
            Self::NameSet => name_similarity(a, b),
            Self::Containment => containment_similarity(a, b),
        }
    }

    /// Whether the pair mismatches badly enough to trip a veto.
    ///
    /// Numeric values veto only when both parse and differ beyond tolerance;
    /// unparseable years never veto.
    pub fn is_veto_mismatch(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Numeric { tolerance } => match (parse_year(a), parse_year(b)) {
                (Some(x), Some(y)) => x.abs_diff(y) > u64::from(*tolerance),
                _ => false,
            },
            other => other.compare(a, b) <= 0.0,
        }
    }
}

/// `1 - levenshtein / max_len`, in characters
pub fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    normalized_levenshtein(a, b).clamp(0.0, 1.0)
}

/// Extract a year (or any integer) from a normalized value
pub(crate) fn parse_year(value: &str) -> Option<i64> {
    if let Some(caps) = YEAR_PATTERN.captures(value) {
        return caps.get(1).and_then(|m| m.as_str().parse().ok());
    }
    value.trim().parse().ok()
}

fn numeric_similarity(a: i64, b: i64, tolerance: u32) -> f64 {
    let diff = a.abs_diff(b);
    if diff == 0 {
        1.0
    } else if diff > u64::from(tolerance) {
        0.0
    } else {
        1.0 - diff as f64 / (f64::from(tolerance) + 1.0)
    }
}

/// Jaccard similarity over canonical names; fuzzy when a list yields no names
fn name_similarity(a: &str, b: &str) -> f64 {
    let names_a = name_set(a);
    let names_b = name_set(b);

    if names_a.is_empty() || names_b.is_empty() {
        return fuzzy_similarity(a, b);
    }

    let intersection = names_a.intersection(&names_b).count();
    let union = names_a.union(&names_b).count();

    intersection as f64 / union as f64
}

fn containment_similarity(a: &str, b: &str) -> f64 {
    if contains_tokens(a, b) || contains_tokens(b, a) || abbreviates(a, b) || abbreviates(b, a) {
        return 1.0;
    }
    fuzzy_similarity(a, b)
}

/// `needle` appears in `haystack` on token boundaries
fn contains_tokens(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// Whether `short` abbreviates every content word of `long`.
///
/// Each abbreviation token either prefixes the next word (`j` → `journal`,
/// `comput` → `computing`) or is an acronym of the next few words
/// (`tse` → `transactions software engineering`). Stop words are skipped.
fn abbreviates(short: &str, long: &str) -> bool {
    let words: Vec<&str> = long
        .split_whitespace()
        .filter(|w| !VENUE_STOP_WORDS.contains(w))
        .collect();
    let tokens: Vec<&str> = short
        .split_whitespace()
        .filter(|t| !VENUE_STOP_WORDS.contains(t))
        .collect();

    if tokens.is_empty() || words.is_empty() || short.len() >= long.len() {
        return false;
    }

    let mut i = 0;
    for token in tokens {
        let Some(word) = words.get(i) else {
            return false;
        };
        if word.starts_with(token) {
            i += 1;
            continue;
        }

        let n = token.chars().count();
        if n > 1
            && i + n <= words.len()
            && token
                .chars()
                .zip(&words[i..i + n])
                .all(|(c, w)| w.starts_with(c))
        {
            i += n;
            continue;
        }

        return false;
    }

    i == words.len()
}
