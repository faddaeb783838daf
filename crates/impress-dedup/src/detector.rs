//! Duplicate detection engine
//!
//! [`DuplicateDetector`] wires field selection, scoring and the decision
//! policy together. It holds read-only configuration only, so one detector can
//! be shared across threads and called concurrently.

use serde::{Deserialize, Serialize};

use crate::config::DedupConfig;
use crate::decision::DecisionPolicy;
use crate::entry::{Entry, Field};
use crate::error::Result;
use crate::mode::ComparisonMode;
use crate::registry::TypeRegistry;
use crate::scorer::{self, FieldOutcome};

/// Verdict for one pair of entries, with the evidence behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct SimilarityResult {
    /// Weighted similarity in `[0, 1]`
    pub score: f64,
    pub is_duplicate: bool,
    /// The entries have different types (stricter threshold applied)
    pub cross_type: bool,
    /// An identity field (DOI, ISBN) matched exactly
    pub identity_match: bool,
    /// Fields that ruled the pair out: veto mismatches and similarity floors
    pub vetoed_by: Vec<Field>,
    /// Per-field scores, in selection order
    pub outcomes: Vec<FieldOutcome>,
}

/// Decides whether two bibliographic entries describe the same work
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    registry: TypeRegistry,
    policy: DecisionPolicy,
}

impl DuplicateDetector {
    pub fn new(registry: TypeRegistry, policy: DecisionPolicy) -> Self {
        Self { registry, policy }
    }

    /// Build a detector from validated configuration
    pub fn with_config(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.registry, config.policy))
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Compare two entries under the given dialect.
    ///
    /// Fails only when an entry type has no row in the registry.
    pub fn compare(&self, a: &Entry, b: &Entry, mode: ComparisonMode) -> Result<SimilarityResult> {
        let selected = self.registry.select_fields(&a.entry_type, &b.entry_type)?;
        let cross_type = a.entry_type != b.entry_type;

        let breakdown = scorer::score(a, b, &selected, mode);
        let vetoed_by = breakdown.vetoed_by();
        let is_duplicate = self.policy.decide(breakdown.score, &vetoed_by, cross_type);

        tracing::debug!(
            "{} vs {} ({}): score {:.3}, duplicate {}, vetoed by {:?}",
            a.entry_type,
            b.entry_type,
            mode,
            breakdown.score,
            is_duplicate,
            vetoed_by
        );

        Ok(SimilarityResult {
            score: breakdown.score,
            is_duplicate,
            cross_type,
            identity_match: breakdown.identity_match,
            vetoed_by,
            outcomes: breakdown.outcomes,
        })
    }

    /// Verdict only
    pub fn is_duplicate(&self, a: &Entry, b: &Entry, mode: ComparisonMode) -> Result<bool> {
        Ok(self.compare(a, b, mode)?.is_duplicate)
    }

    /// See [`scorer::strict_similarity`]
    pub fn strict_similarity(&self, a: &Entry, b: &Entry, mode: ComparisonMode) -> f64 {
        scorer::strict_similarity(a, b, mode)
    }
}
