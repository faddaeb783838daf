//! Field value normalization for duplicate comparison
//!
//! Every comparator sees values only after they pass through [`normalize`]:
//! markup stripped, diacritics folded to base Latin letters, lowercased,
//! punctuation and whitespace collapsed. The result is stable under repeated
//! normalization.

use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::entry::Field;

lazy_static! {
    /// LaTeX control words that spell out a letter rather than accent one
    static ref LETTER_COMMANDS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("ss", "ss");
        m.insert("SS", "ss");
        m.insert("o", "o");
        m.insert("O", "o");
        m.insert("l", "l");
        m.insert("L", "l");
        m.insert("ae", "ae");
        m.insert("AE", "ae");
        m.insert("oe", "oe");
        m.insert("OE", "oe");
        m.insert("aa", "a");
        m.insert("AA", "a");
        m.insert("i", "i");
        m.insert("j", "j");
        m.insert("dh", "d");
        m.insert("DH", "d");
        m.insert("dj", "d");
        m.insert("DJ", "d");
        m.insert("th", "th");
        m.insert("TH", "th");
        m.insert("ng", "ng");
        m.insert("NG", "ng");
        m
    };
}

/// Accent commands written with a symbol instead of a letter (`\"u`, `\'e`)
const ACCENT_SYMBOLS: &[char] = &['"', '\'', '`', '^', '~', '=', '.'];

/// Resolver prefixes stripped from identifiers
const IDENTIFIER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
    "arxiv:",
];

/// Leading articles that don't affect title matching
const TITLE_ARTICLES: &[&str] = &["the ", "an ", "a "];

/// How a field's text is canonicalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    /// Free text: punctuation becomes whitespace
    Text,
    /// Title text: as `Text`, minus leading articles
    Title,
    /// Person-name lists: keeps `,` and `;` separators
    Names,
    /// DOIs, URLs, eprints: keeps path punctuation, drops resolver prefixes
    Identifier,
    /// ISBN / ISSN: digits and check character only, separators dropped
    Code,
}

impl FieldKind {
    pub(crate) fn of(field: Field) -> Self {
        match field {
            Field::Title | Field::BookTitle => Self::Title,
            Field::Author | Field::Editor => Self::Names,
            Field::Doi | Field::Url | Field::Eprint => Self::Identifier,
            Field::Isbn | Field::Issn => Self::Code,
            _ => Self::Text,
        }
    }
}

/// Normalize a raw field value for comparison.
///
/// Never fails: malformed markup is stripped on a best-effort basis.
pub fn normalize(field: Field, raw: &str) -> String {
    normalize_as(FieldKind::of(field), raw)
}

pub(crate) fn normalize_as(kind: FieldKind, raw: &str) -> String {
    let stripped = strip_markup(raw);
    let folded = fold_to_latin(&stripped);

    let mut result = String::with_capacity(folded.len());
    for c in folded.chars() {
        if keeps(kind, c) {
            result.push(c);
        } else if kind_keeps_spaces(kind)
            && (c.is_whitespace() || kind_spaces_punctuation(kind))
        {
            result.push(' ');
        }
    }

    let mut result = collapse_whitespace(&result);

    match kind {
        FieldKind::Identifier => result = strip_identifier_prefixes(&result),
        FieldKind::Title => result = strip_leading_articles(&result),
        _ => {}
    }

    result
}

fn keeps(kind: FieldKind, c: char) -> bool {
    match kind {
        FieldKind::Text | FieldKind::Title => c.is_alphanumeric(),
        FieldKind::Names => c.is_alphanumeric() || c == ',' || c == ';',
        FieldKind::Identifier => c.is_alphanumeric() || "/.-_:".contains(c),
        FieldKind::Code => c.is_ascii_digit() || c == 'x',
    }
}

fn kind_keeps_spaces(kind: FieldKind) -> bool {
    kind != FieldKind::Code
}

fn kind_spaces_punctuation(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::Text | FieldKind::Title | FieldKind::Names)
}

/// Remove bibliography markup while keeping the letters it protects.
///
/// `{Bay}esian` → `Bayesian`, `M\"{u}ller` → `Muller`, `\emph{Deep}` → `Deep`,
/// `\ss` → `ss`, `\&` → `&`.
pub(crate) fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                Some(next) if ACCENT_SYMBOLS.contains(&next) => {
                    // the accent itself; the letter follows
                    chars.next();
                }
                Some(next) if next.is_ascii_alphabetic() => {
                    let mut word = String::new();
                    while let Some(&l) = chars.peek() {
                        if !l.is_ascii_alphabetic() {
                            break;
                        }
                        word.push(l);
                        chars.next();
                    }
                    if let Some(letters) = LETTER_COMMANDS.get(word.as_str()) {
                        out.push_str(letters);
                    }
                    // a control word swallows one trailing space
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }
                }
                Some(next) => {
                    out.push(next);
                    chars.next();
                }
                None => {}
            },
            '{' | '}' | '$' => {}
            '~' => out.push(' '),
            _ => out.push(c),
        }
    }

    out
}

/// Strip diacritics and case-fold to lowercase base letters
fn fold_to_latin(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for decomposed in input.nfkd().filter(|c| !is_combining_mark(*c)) {
        for lower in decomposed.to_lowercase() {
            match lower {
                'ß' => out.push_str("ss"),
                'æ' => out.push_str("ae"),
                'œ' => out.push_str("oe"),
                'þ' => out.push_str("th"),
                'ø' => out.push('o'),
                'ł' => out.push('l'),
                'đ' | 'ð' => out.push('d'),
                'ı' => out.push('i'),
                other => out.push(other),
            }
        }
    }

    out
}

/// Collapse whitespace runs into a single space and trim
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_identifier_prefixes(s: &str) -> String {
    let mut rest = s;
    loop {
        let trimmed = rest.trim_start();
        match IDENTIFIER_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
        {
            Some(stripped) => rest = stripped,
            None => break,
        }
    }
    rest.trim().to_string()
}

fn strip_leading_articles(s: &str) -> String {
    let mut rest = s;
    while let Some(stripped) = TITLE_ARTICLES
        .iter()
        .find_map(|article| rest.strip_prefix(article))
    {
        rest = stripped;
    }
    rest.to_string()
}

// ===== Person names =====

/// Split a normalized name list on ` and ` and `;`
pub(crate) fn split_names(list: &str) -> Vec<&str> {
    list.split(" and ")
        .flat_map(|s| s.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Canonical `surname initial` key for one normalized name.
///
/// Accepts `last, first`, `last, jr, first` and `first last`. Middle names
/// are dropped so `smith, john q` and `john smith` agree.
pub(crate) fn canonical_name(name: &str) -> Option<String> {
    let name = name.trim().trim_matches(',').trim();
    if name.is_empty() || name == "others" {
        return None;
    }

    let (surname_part, given_part) = if name.contains(',') {
        let parts: Vec<&str> = name.split(',').map(str::trim).collect();
        let given = if parts.len() >= 3 { parts[2] } else { parts[1] };
        (parts[0], given)
    } else {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        match tokens.split_last() {
            Some((last, rest)) => (*last, rest.first().copied().unwrap_or("")),
            None => return None,
        }
    };

    let surname = surname_part.split_whitespace().last()?;
    let initial = given_part.split_whitespace().next().and_then(|g| g.chars().next());

    Some(match initial {
        Some(initial) => format!("{} {}", surname, initial),
        None => surname.to_string(),
    })
}

/// Order-insensitive set of canonical names in a normalized name list
pub(crate) fn name_set(list: &str) -> BTreeSet<String> {
    split_names(list)
        .into_iter()
        .filter_map(canonical_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Field::Title, "The Quick Brown Fox", "quick brown fox")]
    #[case(Field::Title, "Machine   Learning", "machine learning")]
    #[case(Field::Title, "Hello, World!", "hello world")]
    #[case(Field::Title, "Études Françaises", "etudes francaises")]
    #[case(Field::Title, "{B}ayesian {I}nference", "bayesian inference")]
    #[case(Field::Title, r"\emph{Deep} Learning", "deep learning")]
    #[case(Field::Journal, "ACM Computing Surveys", "acm computing surveys")]
    #[case(Field::Journal, r"Journal of Physics \& Chemistry", "journal of physics chemistry")]
    #[case(Field::Author, r#"M\"{u}ller, Hans"#, "muller, hans")]
    #[case(Field::Author, r"Gau\ss, Carl F.", "gauss, carl f")]
    #[case(Field::Author, "Brown, Alice and Doe, J.", "brown, alice and doe, j")]
    #[case(Field::Author, "Søren Kierkegaard", "soren kierkegaard")]
    #[case(Field::Doi, "https://doi.org/10.1038/Nature12373", "10.1038/nature12373")]
    #[case(Field::Doi, "doi: 10.1000/XYZ-1", "10.1000/xyz-1")]
    #[case(Field::Isbn, "978-0-262-03384-8", "9780262033848")]
    #[case(Field::Isbn, "0-8044-2957-X", "080442957x")]
    #[case(Field::Isbn, "978 0 262 03384 8", "9780262033848")]
    #[case(Field::Issn, "ISSN 0028 0836", "00280836")]
    #[case(Field::Year, " 2022 ", "2022")]
    fn test_normalize(#[case] field: Field, #[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(field, raw), expected);
    }

    #[test]
    fn test_strip_markup_accents() {
        assert_eq!(strip_markup(r#"M\"uller"#), "Muller");
        assert_eq!(strip_markup(r"caf\'{e}"), "cafe");
        assert_eq!(strip_markup(r"\c{c}a va"), "ca va");
        assert_eq!(strip_markup(r"\v s"), "s");
        assert_eq!(strip_markup(r"Erd\H{o}s"), "Erdos");
        assert_eq!(strip_markup(r"Ma\l{}ecki"), "Malecki");
    }

    #[test]
    fn test_strip_markup_malformed() {
        assert_eq!(strip_markup(r"Unclosed {brace"), "Unclosed brace");
        assert_eq!(strip_markup(r"trailing \"), "trailing ");
        assert_eq!(strip_markup(r"math $x^2$ here"), "math x^2 here");
        assert_eq!(strip_markup("non~breaking"), "non breaking");
    }

    #[test]
    fn test_normalize_idempotent_on_samples() {
        let samples = [
            (Field::Title, r"The {\'E}tude of \textbf{Rust} --- a Primer"),
            (Field::Author, r"von Neumann, John and Erd\H{o}s, P\'al"),
            (Field::Doi, "doi:doi: https://doi.org/10.1/ABC"),
            (Field::Title, "the the the"),
            (Field::Journal, "Ærø ŁÓDŹ ß"),
        ];
        for (field, raw) in samples {
            let once = normalize(field, raw);
            assert_eq!(normalize(field, &once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_empty_and_markup_only_values() {
        assert_eq!(normalize(Field::Title, ""), "");
        assert_eq!(normalize(Field::Title, "{}"), "");
        assert_eq!(normalize(Field::Title, "   "), "");
    }

    #[test]
    fn test_split_names() {
        assert_eq!(
            split_names("john smith and jane doe"),
            vec!["john smith", "jane doe"]
        );
        assert_eq!(split_names("smith, j; doe, j"), vec!["smith, j", "doe, j"]);
    }

    #[rstest]
    #[case("smith, john", Some("smith j"))]
    #[case("john smith", Some("smith j"))]
    #[case("smith, j", Some("smith j"))]
    #[case("john q smith", Some("smith j"))]
    #[case("smith, jr, john", Some("smith j"))]
    #[case("ludwig van beethoven", Some("beethoven l"))]
    #[case("van beethoven, ludwig", Some("beethoven l"))]
    #[case("plato", Some("plato"))]
    #[case("others", None)]
    #[case(",", None)]
    fn test_canonical_name(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(canonical_name(name).as_deref(), expected);
    }

    #[test]
    fn test_name_set_is_order_insensitive() {
        let a = name_set("smith, john and doe, jane");
        let b = name_set("jane doe and john smith");
        assert_eq!(a, b);
    }
}
