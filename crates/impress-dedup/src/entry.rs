//! Bibliographic entry data structures

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mode::ComparisonMode;
use crate::normalize::normalize;

/// Bibliographic entry type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Thesis,
    Proceedings,
    TechReport,
    Unpublished,
    Online,
    Software,
    Dataset,
    /// A dialect-specific type the standard set does not cover
    Other(String),
}

impl EntryType {
    /// Parse an entry type from a string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "thesis" => Self::Thesis,
            "proceedings" => Self::Proceedings,
            "techreport" | "report" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            "online" | "electronic" | "www" => Self::Online,
            "software" => Self::Software,
            "dataset" => Self::Dataset,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Thesis => "thesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
            Self::Online => "online",
            Self::Software => "software",
            Self::Dataset => "dataset",
            Self::Other(name) => name.as_str(),
        }
    }

    /// All types with a row in the standard registry
    pub fn standard() -> &'static [EntryType] {
        &[
            Self::Article,
            Self::Book,
            Self::Booklet,
            Self::InBook,
            Self::InCollection,
            Self::InProceedings,
            Self::Manual,
            Self::MastersThesis,
            Self::Misc,
            Self::PhdThesis,
            Self::Thesis,
            Self::Proceedings,
            Self::TechReport,
            Self::Unpublished,
            Self::Online,
            Self::Software,
            Self::Dataset,
        ]
    }
}

impl From<String> for EntryType {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl From<EntryType> for String {
    fn from(t: EntryType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known field names across the BibTeX and BibLaTeX dialects.
///
/// Dialect synonyms (`journal` / `journaltitle`) are distinct variants here;
/// [`ComparisonMode`] decides which of them carry the same logical field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum Field {
    Title,
    Author,
    Editor,
    Year,
    Date,
    Month,
    Journal,
    JournalTitle,
    BookTitle,
    Publisher,
    School,
    Institution,
    Organization,
    Address,
    Location,
    HowPublished,
    Doi,
    Isbn,
    Issn,
    Url,
    Eprint,
    Volume,
    Number,
    Pages,
    Edition,
    Chapter,
    Series,
    Version,
    Note,
    Abstract,
    Keywords,
}

impl Field {
    /// Look up a field by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name.trim().to_lowercase().as_str() {
            "title" => Self::Title,
            "author" => Self::Author,
            "editor" => Self::Editor,
            "year" => Self::Year,
            "date" => Self::Date,
            "month" => Self::Month,
            "journal" => Self::Journal,
            "journaltitle" => Self::JournalTitle,
            "booktitle" => Self::BookTitle,
            "publisher" => Self::Publisher,
            "school" => Self::School,
            "institution" => Self::Institution,
            "organization" => Self::Organization,
            "address" => Self::Address,
            "location" => Self::Location,
            "howpublished" => Self::HowPublished,
            "doi" => Self::Doi,
            "isbn" => Self::Isbn,
            "issn" => Self::Issn,
            "url" => Self::Url,
            "eprint" => Self::Eprint,
            "volume" => Self::Volume,
            "number" => Self::Number,
            "pages" => Self::Pages,
            "edition" => Self::Edition,
            "chapter" => Self::Chapter,
            "series" => Self::Series,
            "version" => Self::Version,
            "note" => Self::Note,
            "abstract" => Self::Abstract,
            "keywords" => Self::Keywords,
            _ => return None,
        };
        Some(field)
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Editor => "editor",
            Self::Year => "year",
            Self::Date => "date",
            Self::Month => "month",
            Self::Journal => "journal",
            Self::JournalTitle => "journaltitle",
            Self::BookTitle => "booktitle",
            Self::Publisher => "publisher",
            Self::School => "school",
            Self::Institution => "institution",
            Self::Organization => "organization",
            Self::Address => "address",
            Self::Location => "location",
            Self::HowPublished => "howpublished",
            Self::Doi => "doi",
            Self::Isbn => "isbn",
            Self::Issn => "issn",
            Self::Url => "url",
            Self::Eprint => "eprint",
            Self::Volume => "volume",
            Self::Number => "number",
            Self::Pages => "pages",
            Self::Edition => "edition",
            Self::Chapter => "chapter",
            Self::Series => "series",
            Self::Version => "version",
            Self::Note => "note",
            Self::Abstract => "abstract",
            Self::Keywords => "keywords",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bibliographic entry: a type tag plus field values.
///
/// Known fields live in `fields`; anything else is kept in `extra` under its
/// lowercased name so entries from unfamiliar dialects survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_type: EntryType,
    pub fields: BTreeMap<Field, String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Entry {
    /// Create an entry with no fields
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            fields: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set a field by name, routing unknown names to `extra`
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        match Field::from_name(name) {
            Some(field) => {
                self.fields.insert(field, value.into());
            }
            None => {
                self.extra.insert(name.trim().to_lowercase(), value.into());
            }
        }
    }

    /// Builder-style variant of [`Entry::set_field`]
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a known field
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Remove a known field, returning its value
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.fields.remove(&field)
    }

    /// Raw value of a known field
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Raw value of a field by name, known or extra
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        match Field::from_name(name) {
            Some(field) => self.get(field),
            None => self
                .extra
                .get(&name.trim().to_lowercase())
                .map(String::as_str),
        }
    }

    /// Value carrying a logical field under the given mode.
    ///
    /// Walks the mode's synonyms in preference order and skips values that
    /// normalize to nothing (`""`, `"{}"`, `"--"`), so an empty field and a
    /// missing field look the same to callers.
    pub fn resolve(&self, field: Field, mode: ComparisonMode) -> Option<&str> {
        mode.aliases(&field)
            .iter()
            .filter_map(|alias| self.get(*alias))
            .find(|value| !normalize(field, value).is_empty())
    }

    /// True when no field carries any text
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
            && self.extra.values().all(|v| v.trim().is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.get(Field::Title)
    }

    pub fn author(&self) -> Option<&str> {
        self.get(Field::Author)
    }

    pub fn year(&self) -> Option<&str> {
        self.get(Field::Year)
    }

    pub fn doi(&self) -> Option<&str> {
        self.get(Field::Doi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_parsing() {
        assert_eq!(EntryType::from_str("article"), EntryType::Article);
        assert_eq!(EntryType::from_str("ARTICLE"), EntryType::Article);
        assert_eq!(
            EntryType::from_str("conference"),
            EntryType::InProceedings
        );
        assert_eq!(EntryType::from_str("report"), EntryType::TechReport);
        assert_eq!(
            EntryType::from_str("Patent"),
            EntryType::Other("patent".to_string())
        );
    }

    #[test]
    fn test_entry_type_string_round_trip() {
        for entry_type in EntryType::standard() {
            let name: String = entry_type.clone().into();
            assert_eq!(&EntryType::from(name), entry_type);
        }
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::from_name("JournalTitle"), Some(Field::JournalTitle));
        assert_eq!(Field::from_name(" doi "), Some(Field::Doi));
        assert_eq!(Field::from_name("timestamp"), None);
        assert_eq!(Field::BookTitle.as_str(), "booktitle");
    }

    #[test]
    fn test_unknown_fields_go_to_extra() {
        let entry = Entry::new(EntryType::Misc)
            .with_field("Title", "A Title")
            .with_field("Timestamp", "2024-01-01");

        assert_eq!(entry.title(), Some("A Title"));
        assert_eq!(entry.extra.get("timestamp").map(String::as_str), Some("2024-01-01"));
        assert_eq!(entry.get_by_name("TIMESTAMP"), Some("2024-01-01"));
    }

    #[test]
    fn test_resolve_skips_blank_values() {
        let entry = Entry::new(EntryType::Article)
            .with_field("journaltitle", "   ")
            .with_field("journal", "Nature");

        assert_eq!(
            entry.resolve(Field::Journal, ComparisonMode::BibLaTeX),
            Some("Nature")
        );
        assert_eq!(entry.resolve(Field::Title, ComparisonMode::BibTeX), None);
    }

    #[test]
    fn test_resolve_skips_values_that_normalize_to_nothing() {
        let entry = Entry::new(EntryType::Article)
            .with_field("journaltitle", "{}")
            .with_field("journal", "Nature");
        assert_eq!(
            entry.resolve(Field::Journal, ComparisonMode::BibLaTeX),
            Some("Nature")
        );

        let entry = Entry::new(EntryType::Article)
            .with_field("year", "--")
            .with_field("date", "2021-06-01");
        assert_eq!(
            entry.resolve(Field::Year, ComparisonMode::BibLaTeX),
            Some("2021-06-01")
        );
    }

    #[test]
    fn test_resolve_respects_mode() {
        let entry = Entry::new(EntryType::Article).with_field("journaltitle", "Nature");

        assert_eq!(entry.resolve(Field::Journal, ComparisonMode::BibTeX), None);
        assert_eq!(
            entry.resolve(Field::Journal, ComparisonMode::BibLaTeX),
            Some("Nature")
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Entry::new(EntryType::Misc).is_empty());
        assert!(Entry::new(EntryType::Misc).with_field("title", " ").is_empty());
        assert!(!Entry::new(EntryType::Misc).with_field("title", "x").is_empty());
    }
}
