//! Type registry: which fields matter for which entry type, and how much.
//!
//! The registry is plain data (type → field descriptors). Comparison logic
//! looks fields up here instead of dispatching on entry type, so weights stay
//! auditable and can be loaded from configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::compare::Comparator;
use crate::entry::{EntryType, Field};
use crate::error::{ConfigError, DedupError, Result};

/// Comparison semantics for one field of one entry type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub field: Field,
    pub comparator: Comparator,
    pub weight: f64,
    /// A mismatch forces a non-duplicate verdict
    #[serde(default)]
    pub veto: bool,
    /// An exact match alone establishes identity (DOI, ISBN)
    #[serde(default)]
    pub identity: bool,
    /// Similarity below this floor forces a non-duplicate verdict unless an
    /// identity field matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
}

impl FieldDescriptor {
    pub fn new(field: Field, comparator: Comparator, weight: f64) -> Self {
        Self {
            field,
            comparator,
            weight,
            veto: false,
            identity: false,
            floor: None,
        }
    }

    pub fn as_veto(mut self) -> Self {
        self.veto = true;
        self
    }

    pub fn as_identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Whether `score` falls under this field's similarity floor
    pub fn is_below_floor(&self, score: f64) -> bool {
        self.floor.is_some_and(|floor| score < floor)
    }

    /// Descriptor used when two entry types share this field.
    ///
    /// Every rule here is symmetric so the merged table does not depend on
    /// which entry came first.
    fn merged_with(&self, other: &FieldDescriptor) -> FieldDescriptor {
        FieldDescriptor {
            field: self.field,
            comparator: if self.comparator == other.comparator {
                self.comparator
            } else {
                Comparator::Fuzzy
            },
            weight: self.weight.min(other.weight),
            veto: self.veto || other.veto,
            identity: self.identity && other.identity,
            floor: match (self.floor, other.floor) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

/// Field descriptors for one entry type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub entry_type: EntryType,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    pub fn new(entry_type: EntryType, fields: Vec<FieldDescriptor>) -> Self {
        Self { entry_type, fields }
    }

    pub fn descriptor(&self, field: Field) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|d| d.field == field)
    }
}

/// Read-only table mapping entry types to their comparison fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRegistry {
    pub types: Vec<TypeSchema>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeRegistry {
    /// Registry with no types; every lookup fails until types are added
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Built-in table covering every standard entry type
    pub fn standard() -> Self {
        let types = EntryType::standard()
            .iter()
            .map(|t| TypeSchema::new(t.clone(), standard_fields(t)))
            .collect();
        Self { types }
    }

    /// Add or replace the schema for a type
    pub fn with_schema(mut self, schema: TypeSchema) -> Self {
        self.types.retain(|s| s.entry_type != schema.entry_type);
        self.types.push(schema);
        self
    }

    /// Set the tolerance of every numeric comparator on `field`
    pub fn with_numeric_tolerance(mut self, field: Field, tolerance: u32) -> Self {
        for descriptor in self.types.iter_mut().flat_map(|s| s.fields.iter_mut()) {
            if descriptor.field == field {
                if let Comparator::Numeric { .. } = descriptor.comparator {
                    descriptor.comparator = Comparator::Numeric { tolerance };
                }
            }
        }
        self
    }

    pub fn contains(&self, entry_type: &EntryType) -> bool {
        self.types.iter().any(|s| &s.entry_type == entry_type)
    }

    /// Schema for a type, or an error if the registry has no row for it
    pub fn schema(&self, entry_type: &EntryType) -> Result<&TypeSchema> {
        self.types
            .iter()
            .find(|s| &s.entry_type == entry_type)
            .ok_or_else(|| DedupError::UnknownEntryType(entry_type.to_string()))
    }

    /// Fields to compare for a pair of entry types.
    ///
    /// Same type: the type's own table in declaration order. Different types:
    /// the fields both tables declare, merged and ordered by field.
    pub fn select_fields(&self, a: &EntryType, b: &EntryType) -> Result<Vec<FieldDescriptor>> {
        let schema_a = self.schema(a)?;
        let schema_b = self.schema(b)?;

        if a == b {
            return Ok(schema_a.fields.clone());
        }

        let mut merged: Vec<FieldDescriptor> = schema_a
            .fields
            .iter()
            .filter_map(|da| schema_b.descriptor(da.field).map(|db| da.merged_with(db)))
            .collect();
        merged.sort_by_key(|d| d.field);

        Ok(merged)
    }

    /// Load and validate a registry from TOML
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let registry: Self = toml::from_str(toml_str)?;
        registry.validate()?;
        registry.warn_on_empty_types();
        Ok(registry)
    }

    /// Load and validate a registry from JSON
    pub fn from_json(json_str: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(json_str)?;
        registry.validate()?;
        registry.warn_on_empty_types();
        Ok(registry)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate weights, floors and uniqueness
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut seen_types = HashSet::new();

        for schema in &self.types {
            if !seen_types.insert(&schema.entry_type) {
                return Err(ConfigError::DuplicateType(schema.entry_type.to_string()));
            }

            let mut seen_fields = HashSet::new();
            for descriptor in &schema.fields {
                if !seen_fields.insert(descriptor.field) {
                    return Err(ConfigError::DuplicateField {
                        entry_type: schema.entry_type.to_string(),
                        field: descriptor.field.to_string(),
                    });
                }
                if !descriptor.weight.is_finite() || descriptor.weight <= 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        entry_type: schema.entry_type.to_string(),
                        field: descriptor.field.to_string(),
                        weight: descriptor.weight,
                    });
                }
                if let Some(floor) = descriptor.floor {
                    if !(0.0..=1.0).contains(&floor) {
                        return Err(ConfigError::OutOfRange(format!(
                            "floor {} for field '{}' of type '{}' must be between 0 and 1",
                            floor, descriptor.field, schema.entry_type
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn warn_on_empty_types(&self) {
        for schema in self.types.iter().filter(|s| s.fields.is_empty()) {
            tracing::warn!(
                "Entry type '{}' has no comparison fields; its entries never match",
                schema.entry_type
            );
        }
    }
}

// ===== Standard weights =====

/// Titles below 0.8 similarity name different works, whatever the
/// bibliographic metadata says
fn title() -> FieldDescriptor {
    FieldDescriptor::new(Field::Title, Comparator::Fuzzy, 3.0).with_floor(0.8)
}

fn author() -> FieldDescriptor {
    FieldDescriptor::new(Field::Author, Comparator::NameSet, 3.0)
}

fn editor(weight: f64) -> FieldDescriptor {
    FieldDescriptor::new(Field::Editor, Comparator::NameSet, weight)
}

fn year() -> FieldDescriptor {
    FieldDescriptor::new(Field::Year, Comparator::Numeric { tolerance: 0 }, 2.0).as_veto()
}

fn venue(field: Field, weight: f64) -> FieldDescriptor {
    FieldDescriptor::new(field, Comparator::Containment, weight)
}

fn exact(field: Field, weight: f64) -> FieldDescriptor {
    FieldDescriptor::new(field, Comparator::Exact, weight)
}

fn doi() -> FieldDescriptor {
    exact(Field::Doi, 2.0).as_identity()
}

fn isbn() -> FieldDescriptor {
    exact(Field::Isbn, 2.0).as_identity()
}

fn standard_fields(entry_type: &EntryType) -> Vec<FieldDescriptor> {
    let mut fields = vec![title(), author(), year()];

    let specific = match entry_type {
        EntryType::Article => vec![
            venue(Field::Journal, 1.5),
            exact(Field::Volume, 0.5),
            exact(Field::Pages, 0.5),
            doi(),
        ],
        EntryType::Book => vec![
            editor(2.0),
            venue(Field::Publisher, 1.5),
            exact(Field::Edition, 1.0),
            isbn(),
            doi(),
        ],
        EntryType::InBook => vec![
            editor(1.0),
            exact(Field::Chapter, 1.0),
            venue(Field::Publisher, 1.0),
            exact(Field::Pages, 0.5),
            isbn(),
            doi(),
        ],
        EntryType::InCollection => vec![
            editor(1.0),
            venue(Field::BookTitle, 1.5),
            venue(Field::Publisher, 1.0),
            exact(Field::Pages, 0.5),
            doi(),
        ],
        EntryType::InProceedings => vec![
            editor(1.0),
            venue(Field::BookTitle, 1.5),
            exact(Field::Pages, 0.5),
            doi(),
        ],
        EntryType::Proceedings => vec![
            editor(3.0),
            venue(Field::Publisher, 1.0),
            venue(Field::Organization, 1.0),
            isbn(),
            doi(),
        ],
        EntryType::Booklet => vec![FieldDescriptor::new(
            Field::HowPublished,
            Comparator::Fuzzy,
            1.0,
        )],
        EntryType::Manual => vec![venue(Field::Organization, 1.0), exact(Field::Edition, 1.0)],
        EntryType::MastersThesis | EntryType::PhdThesis | EntryType::Thesis => {
            vec![venue(Field::School, 1.5), doi()]
        }
        EntryType::TechReport => vec![
            venue(Field::Institution, 1.5),
            exact(Field::Number, 1.0),
            doi(),
        ],
        EntryType::Unpublished => {
            vec![FieldDescriptor::new(Field::Note, Comparator::Fuzzy, 0.5)]
        }
        EntryType::Misc => vec![
            FieldDescriptor::new(Field::HowPublished, Comparator::Fuzzy, 1.0),
            doi(),
        ],
        EntryType::Online => vec![exact(Field::Url, 2.0).as_identity(), doi()],
        EntryType::Software => vec![
            exact(Field::Version, 1.0),
            exact(Field::Url, 1.5),
            doi(),
        ],
        EntryType::Dataset => vec![venue(Field::Publisher, 1.0), exact(Field::Version, 1.0), doi()],
        EntryType::Other(_) => Vec::new(),
    };

    if *entry_type == EntryType::Proceedings {
        // proceedings are edited volumes
        fields.retain(|d| d.field != Field::Author);
    }

    fields.extend(specific);
    fields
}
