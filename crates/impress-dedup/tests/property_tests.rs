//! Property-based tests for the duplicate detector

use impress_dedup::{normalize, ComparisonMode, DuplicateDetector, Entry, EntryType, Field};
use proptest::prelude::*;

fn entry_type() -> impl Strategy<Value = EntryType> {
    prop::sample::select(EntryType::standard().to_vec())
}

fn mode() -> impl Strategy<Value = ComparisonMode> {
    prop_oneof![Just(ComparisonMode::BibTeX), Just(ComparisonMode::BibLaTeX)]
}

prop_compose! {
    fn entry()(
        entry_type in entry_type(),
        title in "[A-Za-z]{3,10}( [A-Za-z]{3,10}){0,5}",
        author in "[A-Z][a-z]{2,8}, [A-Z][a-z]{2,8}( and [A-Z][a-z]{2,8}, [A-Z][a-z]{2,8}){0,2}",
        year in 1950u32..2030,
        venue in proptest::option::of("[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10}){0,3}"),
        doi in proptest::option::of("10\\.[0-9]{4}/[a-z0-9]{5,10}"),
    ) -> Entry {
        let mut entry = Entry::new(entry_type)
            .with_field("title", title)
            .with_field("author", author)
            .with_field("year", year.to_string());
        if let Some(venue) = venue {
            entry.set_field("journal", venue.clone());
            entry.set_field("booktitle", venue.clone());
            entry.set_field("publisher", venue);
        }
        if let Some(doi) = doi {
            entry.set_field("doi", doi);
        }
        entry
    }
}

proptest! {
    #[test]
    fn test_reflexive(entry in entry(), mode in mode()) {
        let detector = DuplicateDetector::default();
        let result = detector.compare(&entry, &entry, mode).unwrap();
        prop_assert!(result.is_duplicate, "entry should duplicate itself: {:?}", result);
        prop_assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_symmetric(a in entry(), b in entry(), mode in mode()) {
        let detector = DuplicateDetector::default();
        let ab = detector.compare(&a, &b, mode).unwrap();
        let ba = detector.compare(&b, &a, mode).unwrap();
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn test_score_in_unit_interval(a in entry(), b in entry(), mode in mode()) {
        let detector = DuplicateDetector::default();
        let result = detector.compare(&a, &b, mode).unwrap();
        prop_assert!((0.0..=1.0).contains(&result.score), "score {}", result.score);
        for outcome in &result.outcomes {
            prop_assert!((0.0..=1.0).contains(&outcome.score));
        }
    }

    #[test]
    fn test_normalization_is_idempotent(raw in "[A-Za-z0-9À-ÿ \\\\{}$~.,;:/'\"&-]{0,40}") {
        for field in [Field::Title, Field::Author, Field::Journal, Field::Doi, Field::Isbn, Field::Year] {
            let once = normalize(field, &raw);
            prop_assert_eq!(normalize(field, &once), once.clone(), "field {}", field);
        }
    }

    #[test]
    fn test_normalization_ignores_case_and_spacing(title in "[A-Za-z]{2,10}( [A-Za-z]{2,10}){0,4}") {
        let shouted = title.to_uppercase().replace(' ', "   ");
        prop_assert_eq!(normalize(Field::Title, &title), normalize(Field::Title, &shouted));
    }

    #[test]
    fn test_missing_field_never_scores_below_mismatch(
        entry in entry(),
        other_venue in "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10}){0,3}",
    ) {
        let detector = DuplicateDetector::default();
        let article = Entry { entry_type: EntryType::Article, ..entry }
            .with_field("journal", "Zzyzx Quarterly Annals");

        let mut missing = article.clone();
        missing.remove(Field::Journal);
        let mut mismatched = article.clone();
        mismatched.set_field("journal", other_venue);

        let with_missing = detector.compare(&article, &missing, ComparisonMode::BibTeX).unwrap();
        let with_mismatch = detector.compare(&article, &mismatched, ComparisonMode::BibTeX).unwrap();
        prop_assert!(with_missing.score >= with_mismatch.score);
    }

    #[test]
    fn test_dropping_non_veto_field_keeps_duplicate(entry in entry(), mode in mode()) {
        let detector = DuplicateDetector::default();
        let mut sparse = entry.clone();
        sparse.remove(Field::Title);

        let result = detector.compare(&entry, &sparse, mode).unwrap();
        prop_assert!(result.is_duplicate);
    }
}
