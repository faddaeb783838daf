//! Threshold and veto policy turning a score into a verdict

use serde::{Deserialize, Serialize};

use crate::entry::Field;
use crate::error::ConfigError;

/// Duplicate thresholds for same-type and cross-type pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
#[serde(default)]
pub struct DecisionPolicy {
    /// Minimum score for two entries of the same type
    pub same_type_threshold: f64,

    /// Minimum score when the entry types differ (stricter)
    pub cross_type_threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            same_type_threshold: 0.75,
            cross_type_threshold: 0.90,
        }
    }
}

impl DecisionPolicy {
    pub fn new(same_type_threshold: f64, cross_type_threshold: f64) -> Self {
        Self {
            same_type_threshold,
            cross_type_threshold,
        }
    }

    pub fn threshold(&self, cross_type: bool) -> f64 {
        if cross_type {
            self.cross_type_threshold
        } else {
            self.same_type_threshold
        }
    }

    /// Final verdict: any veto rules it out, otherwise the score must reach
    /// the threshold for the pair's kind.
    pub fn decide(&self, score: f64, vetoed_by: &[Field], cross_type: bool) -> bool {
        if !vetoed_by.is_empty() {
            return false;
        }
        score >= self.threshold(cross_type)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("same_type_threshold", self.same_type_threshold),
            ("cross_type_threshold", self.cross_type_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if self.same_type_threshold >= self.cross_type_threshold {
            return Err(ConfigError::InvalidThresholds(format!(
                "same_type_threshold ({}) must be below cross_type_threshold ({})",
                self.same_type_threshold, self.cross_type_threshold
            )));
        }

        Ok(())
    }
}
