//! impress-dedup: Duplicate detection for bibliographic entries.
//!
//! Decides whether two entries (articles, books, conference papers, ...)
//! describe the same work despite formatting differences, missing fields or
//! small transcription errors.
//!
//! # Pipeline
//!
//! 1. The [`TypeRegistry`] picks the fields that matter for the pair of entry
//!    types, with a comparator, weight and veto flag for each.
//! 2. Each field present in both entries is [normalized](normalize::normalize)
//!    and scored by its [`Comparator`].
//! 3. The scorer takes the weighted average of the field scores.
//! 4. The [`DecisionPolicy`] rejects vetoed pairs (a mismatched year, a title
//!    under its similarity floor) and applies the same-type or the stricter
//!    cross-type threshold.
//!
//! With the `uniffi` feature, [`DedupEngine`] and [`EntryRecord`] form the
//! Swift/Kotlin API.
//!
//! ```
//! use impress_dedup::{ComparisonMode, DuplicateDetector, Entry, EntryType};
//!
//! let a = Entry::new(EntryType::Article)
//!     .with_field("title", "Deep Learning Approaches")
//!     .with_field("author", "Brown, Alice")
//!     .with_field("year", "2022");
//! let b = Entry::new(EntryType::Article)
//!     .with_field("title", "Deep {L}earning approaches")
//!     .with_field("author", "Alice Brown")
//!     .with_field("year", "2022");
//!
//! let detector = DuplicateDetector::default();
//! assert!(detector.is_duplicate(&a, &b, ComparisonMode::BibTeX).unwrap());
//! ```

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

pub mod compare;
pub mod config;
pub mod decision;
pub mod detector;
pub mod entry;
pub mod error;
pub mod ffi;
pub mod mode;
pub mod normalize;
pub mod registry;
pub mod scorer;

pub use compare::Comparator;
pub use config::DedupConfig;
pub use decision::DecisionPolicy;
pub use detector::{DuplicateDetector, SimilarityResult};
pub use entry::{Entry, EntryType, Field};
pub use error::{ConfigError, DedupError, Result};
pub use ffi::{normalize_field, DedupEngine, EngineError, EntryRecord};
pub use mode::ComparisonMode;
pub use normalize::normalize;
pub use registry::{FieldDescriptor, TypeRegistry, TypeSchema};
pub use scorer::{strict_similarity, FieldOutcome, ScoreBreakdown};
