//! Foreign-language surface of the detector.
//!
//! With the `uniffi` feature these types become the Swift/Kotlin API: entries
//! cross the boundary as a type name plus a string map, and a shared
//! [`DedupEngine`] handle does the comparing.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::DedupConfig;
use crate::detector::{DuplicateDetector, SimilarityResult};
use crate::entry::{Entry, EntryType, Field};
use crate::error::DedupError;
use crate::mode::ComparisonMode;

/// Error type for the foreign API, exposed via UniFFI.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum EngineError {
    #[error("Unknown entry type: {0}")]
    UnknownEntryType(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<DedupError> for EngineError {
    fn from(e: DedupError) -> Self {
        match e {
            DedupError::UnknownEntryType(t) => EngineError::UnknownEntryType(t),
            other => EngineError::InvalidConfig(other.to_string()),
        }
    }
}

/// An entry as foreign callers see it: raw BibTeX type and field names
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct EntryRecord {
    pub entry_type: String,
    pub fields: HashMap<String, String>,
}

impl From<&EntryRecord> for Entry {
    fn from(record: &EntryRecord) -> Self {
        let mut entry = Entry::new(EntryType::from_str(&record.entry_type));
        for (name, value) in &record.fields {
            entry.set_field(name, value.clone());
        }
        entry
    }
}

/// Shared detector handle for foreign callers
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct DedupEngine {
    detector: DuplicateDetector,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl DedupEngine {
    /// Engine with the built-in registry and thresholds
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            detector: DuplicateDetector::default(),
        })
    }

    /// Engine configured from a TOML document
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn from_toml(config: String) -> Result<Arc<Self>, EngineError> {
        let config = DedupConfig::from_toml(&config)?;
        let detector = DuplicateDetector::with_config(config)?;
        Ok(Arc::new(Self { detector }))
    }

    pub fn compare(
        &self,
        a: EntryRecord,
        b: EntryRecord,
        mode: ComparisonMode,
    ) -> Result<SimilarityResult, EngineError> {
        Ok(self.detector.compare(&Entry::from(&a), &Entry::from(&b), mode)?)
    }

    pub fn is_duplicate(
        &self,
        a: EntryRecord,
        b: EntryRecord,
        mode: ComparisonMode,
    ) -> Result<bool, EngineError> {
        Ok(self
            .detector
            .is_duplicate(&Entry::from(&a), &Entry::from(&b), mode)?)
    }

    pub fn strict_similarity(&self, a: EntryRecord, b: EntryRecord, mode: ComparisonMode) -> f64 {
        self.detector
            .strict_similarity(&Entry::from(&a), &Entry::from(&b), mode)
    }
}

/// Normalize one field value the way the detector sees it
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn normalize_field(field: Field, raw: String) -> String {
    crate::normalize::normalize(field, &raw)
}
