//! Comparison mode (bibliography dialect) and field-name resolution

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::Field;
use crate::error::DedupError;

/// Bibliography dialect in play for a comparison.
///
/// The mode only decides which physical field names carry a logical field;
/// it never changes how values are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum ComparisonMode {
    #[default]
    BibTeX,
    BibLaTeX,
}

impl ComparisonMode {
    /// Physical fields carrying `field`, preferred first.
    ///
    /// BibLaTeX prefers its own names but still reads the legacy BibTeX ones.
    pub fn aliases<'a>(self, field: &'a Field) -> &'a [Field] {
        match (self, field) {
            (Self::BibLaTeX, Field::Journal | Field::JournalTitle) => {
                &[Field::JournalTitle, Field::Journal]
            }
            (Self::BibLaTeX, Field::Year | Field::Date) => &[Field::Year, Field::Date],
            (Self::BibLaTeX, Field::Address | Field::Location) => {
                &[Field::Location, Field::Address]
            }
            (Self::BibLaTeX, Field::School | Field::Institution) => {
                &[Field::Institution, Field::School]
            }
            _ => std::slice::from_ref(field),
        }
    }

    /// Logical field a physical field belongs to under this mode
    pub fn canonical(self, field: Field) -> Field {
        match (self, field) {
            (Self::BibLaTeX, Field::JournalTitle) => Field::Journal,
            (Self::BibLaTeX, Field::Date) => Field::Year,
            (Self::BibLaTeX, Field::Location) => Field::Address,
            (Self::BibLaTeX, Field::Institution) => Field::School,
            (_, field) => field,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BibTeX => "bibtex",
            Self::BibLaTeX => "biblatex",
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bibtex" => Ok(Self::BibTeX),
            "biblatex" => Ok(Self::BibLaTeX),
            other => Err(DedupError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
