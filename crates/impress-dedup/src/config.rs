//! Configuration for impress-dedup
//!
//! Bundles the decision thresholds and the type registry so both can be tuned
//! from a single TOML or JSON document. Missing sections fall back to the
//! built-in defaults.

use serde::{Deserialize, Serialize};

use crate::decision::DecisionPolicy;
use crate::error::{ConfigError, Result};
use crate::registry::TypeRegistry;

/// Duplicate detection configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Verdict thresholds
    pub policy: DecisionPolicy,
    /// Per-type field weights
    pub registry: TypeRegistry,
}

impl DedupConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.policy.validate()?;
        self.registry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;
    use crate::error::DedupError;

    #[test]
    fn test_default_config() {
        let config = DedupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy.same_type_threshold, 0.75);
        assert!(config.registry.contains(&EntryType::Article));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DedupConfig::from_toml(
            r#"
            [policy]
            same_type_threshold = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(config.policy.same_type_threshold, 0.8);
        assert_eq!(config.policy.cross_type_threshold, 0.90);
        assert_eq!(config.registry, TypeRegistry::standard());
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let err = DedupConfig::from_toml(
            r#"
            [policy]
            same_type_threshold = 0.95
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DedupError::Config(ConfigError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DedupConfig::from_toml("[policy\nsame = ").unwrap_err();
        assert!(matches!(err, DedupError::TomlParse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DedupConfig::default();
        let toml = config.to_toml().unwrap();
        assert_eq!(DedupConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_json_round_trip() {
        let config = DedupConfig {
            policy: DecisionPolicy::new(0.7, 0.95),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(DedupConfig::from_json(&json).unwrap(), config);
    }
}
