//! Weighted similarity scoring over the selected fields

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, Field};
use crate::mode::ComparisonMode;
use crate::normalize::{normalize, normalize_as, FieldKind};
use crate::registry::FieldDescriptor;

/// Result of comparing one field present in both entries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FieldOutcome {
    pub field: Field,
    pub score: f64,
    pub weight: f64,
    pub vetoed: bool,
}

/// Aggregate score plus the per-field evidence behind it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub outcomes: Vec<FieldOutcome>,
    /// Selected fields missing (or blank) on at least one side
    pub skipped: Vec<Field>,
    /// An identity field (DOI, ISBN) matched exactly
    pub identity_match: bool,
}

impl ScoreBreakdown {
    /// Fields whose mismatch trips a veto
    pub fn vetoed_by(&self) -> Vec<Field> {
        self.outcomes
            .iter()
            .filter(|o| o.vetoed)
            .map(|o| o.field)
            .collect()
    }

    /// Total weight of the fields that contributed evidence
    pub fn compared_weight(&self) -> f64 {
        self.outcomes.iter().map(|o| o.weight).sum()
    }

    pub fn has_evidence(&self) -> bool {
        !self.outcomes.is_empty()
    }
}

/// Score two entries over `selected` fields.
///
/// Fields missing on either side contribute neither score nor weight. With
/// nothing to compare the score is 0.0. A field scoring under its floor is
/// vetoed unless an identity field matched; veto mismatches always stand.
pub fn score(
    a: &Entry,
    b: &Entry,
    selected: &[FieldDescriptor],
    mode: ComparisonMode,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut below_floor = Vec::new();

    for descriptor in selected {
        let (Some(value_a), Some(value_b)) = (
            normalized(a, descriptor.field, mode),
            normalized(b, descriptor.field, mode),
        ) else {
            breakdown.skipped.push(descriptor.field);
            continue;
        };

        let field_score = descriptor.comparator.compare(&value_a, &value_b);
        let mismatch = descriptor.veto && descriptor.comparator.is_veto_mismatch(&value_a, &value_b);
        let floored = descriptor.is_below_floor(field_score);
        let vetoed = mismatch || floored;

        tracing::trace!(
            "{}: '{}' vs '{}' -> {:.3} (weight {}, vetoed {})",
            descriptor.field,
            value_a,
            value_b,
            field_score,
            descriptor.weight,
            vetoed
        );

        if descriptor.identity && field_score >= 1.0 {
            breakdown.identity_match = true;
        }

        weighted_sum += descriptor.weight * field_score;
        weight_sum += descriptor.weight;

        if floored && !mismatch {
            below_floor.push(breakdown.outcomes.len());
        }

        breakdown.outcomes.push(FieldOutcome {
            field: descriptor.field,
            score: field_score,
            weight: descriptor.weight,
            vetoed,
        });
    }

    if breakdown.identity_match {
        for index in below_floor {
            breakdown.outcomes[index].vetoed = false;
        }
    }

    breakdown.score = if breakdown.identity_match {
        1.0
    } else if weight_sum > 0.0 {
        (weighted_sum / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    };

    breakdown
}

/// Normalized value of a logical field, `None` when absent or blank
fn normalized(entry: &Entry, field: Field, mode: ComparisonMode) -> Option<String> {
    entry
        .resolve(field, mode)
        .map(|raw| normalize(field, raw))
        .filter(|value| !value.is_empty())
}

/// Share of populated fields whose normalized values are identical.
///
/// Considers every field of both entries, known and extra, so it only
/// approaches 1.0 for records that differ in formatting alone. Entries of
/// different types score 0.0; two empty entries of the same type score 1.0.
pub fn strict_similarity(a: &Entry, b: &Entry, mode: ComparisonMode) -> f64 {
    if a.entry_type != b.entry_type {
        return 0.0;
    }

    let values_a = strict_values(a, mode);
    let values_b = strict_values(b, mode);

    let keys: BTreeSet<&String> = values_a.keys().chain(values_b.keys()).collect();
    if keys.is_empty() {
        return 1.0;
    }

    let matching = keys
        .iter()
        .filter(|key| values_a.get(**key) == values_b.get(**key))
        .count();

    matching as f64 / keys.len() as f64
}

/// Every populated field keyed by its logical name under `mode`
fn strict_values(entry: &Entry, mode: ComparisonMode) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for field in entry.fields.keys() {
        let logical = mode.canonical(*field);
        if let Some(value) = normalized(entry, logical, mode) {
            values.insert(logical.as_str().to_string(), value);
        }
    }

    for (name, raw) in &entry.extra {
        let value = normalize_as(FieldKind::Text, raw);
        if !value.is_empty() {
            values.insert(name.clone(), value);
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Comparator;
    use crate::entry::EntryType;

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new(Field::Title, Comparator::Fuzzy, 3.0),
            FieldDescriptor::new(Field::Author, Comparator::NameSet, 3.0),
            FieldDescriptor::new(Field::Year, Comparator::Numeric { tolerance: 0 }, 2.0).as_veto(),
            FieldDescriptor::new(Field::Doi, Comparator::Exact, 2.0).as_identity(),
        ]
    }

    fn article() -> Entry {
        Entry::new(EntryType::Article)
            .with_field("title", "Deep Learning Approaches")
            .with_field("author", "Brown, Alice and Green, Bob")
            .with_field("year", "2022")
    }

    #[test]
    fn identical_entries_score_one() {
        let breakdown = score(&article(), &article(), &descriptors(), ComparisonMode::BibTeX);
        assert_eq!(breakdown.score, 1.0);
        assert_eq!(breakdown.skipped, vec![Field::Doi]);
        assert!(breakdown.vetoed_by().is_empty());
    }

    #[test]
    fn weighted_average() {
        let other = article().with_field("author", "Brown, Alice");
        let breakdown = score(&article(), &other, &descriptors(), ComparisonMode::BibTeX);
        // (3 * 1.0 + 3 * 0.5 + 2 * 1.0) / 8
        assert!((breakdown.score - 0.8125).abs() < 1e-12);
        assert_eq!(breakdown.compared_weight(), 8.0);
    }

    #[test]
    fn year_mismatch_is_vetoed() {
        let other = article().with_field("year", "2024");
        let breakdown = score(&article(), &other, &descriptors(), ComparisonMode::BibTeX);
        assert_eq!(breakdown.vetoed_by(), vec![Field::Year]);
    }

    #[test]
    fn no_evidence_scores_zero() {
        let a = Entry::new(EntryType::Article).with_field("title", "{}");
        let b = Entry::new(EntryType::Article).with_field("journal", "Nature");
        let breakdown = score(&a, &b, &descriptors(), ComparisonMode::BibTeX);
        assert_eq!(breakdown.score, 0.0);
        assert!(!breakdown.has_evidence());
    }

    #[test]
    fn identity_match_short_circuits() {
        let a = article().with_field("doi", "https://doi.org/10.1145/3505244");
        let b = Entry::new(EntryType::Article)
            .with_field("title", "Deep-learning approaches: a survey")
            .with_field("doi", "10.1145/3505244");
        let breakdown = score(&a, &b, &descriptors(), ComparisonMode::BibTeX);
        assert!(breakdown.identity_match);
        assert_eq!(breakdown.score, 1.0);
    }

    fn floored_descriptors() -> Vec<FieldDescriptor> {
        let mut selected = descriptors();
        selected[0] = selected[0].with_floor(0.8);
        selected
    }

    #[test]
    fn title_below_floor_is_vetoed() {
        let other = article().with_field("title", "Shallow Learning Approaches");
        let breakdown = score(&article(), &other, &floored_descriptors(), ComparisonMode::BibTeX);
        assert_eq!(breakdown.vetoed_by(), vec![Field::Title]);
        // the aggregate stays a weighted average; the veto decides
        assert!(breakdown.score > 0.75);
    }

    #[test]
    fn title_at_or_above_floor_is_not_vetoed() {
        let other = article().with_field("title", "Deep Learnign Approaches");
        let breakdown = score(&article(), &other, &floored_descriptors(), ComparisonMode::BibTeX);
        assert!(breakdown.vetoed_by().is_empty());
    }

    #[test]
    fn identity_match_lifts_floor_veto_only() {
        let a = article().with_field("doi", "10.1145/3505244");
        let b = article()
            .with_field("title", "A Survey of Representation Methods")
            .with_field("doi", "10.1145/3505244");
        let breakdown = score(&a, &b, &floored_descriptors(), ComparisonMode::BibTeX);
        assert!(breakdown.identity_match);
        assert!(breakdown.vetoed_by().is_empty());

        let c = b.clone().with_field("year", "2019");
        let breakdown = score(&a, &c, &floored_descriptors(), ComparisonMode::BibTeX);
        assert_eq!(breakdown.vetoed_by(), vec![Field::Year]);
    }

    #[test]
    fn strict_similarity_counts_identical_fields() {
        let a = article().with_field("note", "Preprint");
        let b = article().with_field("title", "{Deep} learning approaches");
        assert_eq!(strict_similarity(&a, &b, ComparisonMode::BibTeX), 0.75);
        assert_eq!(strict_similarity(&a, &a, ComparisonMode::BibTeX), 1.0);
    }

    #[test]
    fn strict_similarity_edges() {
        let empty_article = Entry::new(EntryType::Article);
        let empty_book = Entry::new(EntryType::Book);
        assert_eq!(
            strict_similarity(&empty_article, &empty_article, ComparisonMode::BibTeX),
            1.0
        );
        assert_eq!(
            strict_similarity(&empty_article, &empty_book, ComparisonMode::BibTeX),
            0.0
        );
    }

    #[test]
    fn strict_similarity_uses_mode_aliases() {
        let a = Entry::new(EntryType::Article).with_field("journal", "Nature");
        let b = Entry::new(EntryType::Article).with_field("journaltitle", "Nature");
        assert_eq!(strict_similarity(&a, &b, ComparisonMode::BibLaTeX), 1.0);
        assert_eq!(strict_similarity(&a, &b, ComparisonMode::BibTeX), 0.0);
    }
}
