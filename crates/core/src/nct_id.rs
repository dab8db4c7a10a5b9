//! ClinicalTrials.gov study identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrialsError;

/// A validated identifier of the form `NCT` followed by 8 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NctId(String);

impl NctId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NctId {
    type Err = TrialsError;

    /// Accepts any letter case and stores the upper-cased form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let valid = upper.len() == 11
            && upper.starts_with("NCT")
            && upper[3..].bytes().all(|b| b.is_ascii_digit());

        if valid {
            Ok(Self(upper))
        } else {
            Err(TrialsError::Validation(format!(
                "NCT ID must be in format NCT12345678, got '{}'",
                s
            )))
        }
    }
}

impl TryFrom<String> for NctId {
    type Error = TrialsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NctId> for String {
    fn from(id: NctId) -> Self {
        id.0
    }
}

impl fmt::Display for NctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lower_case() {
        let id: NctId = "nct01234567".parse().unwrap();
        assert_eq!(id.as_str(), "NCT01234567");
    }

    #[test]
    fn rejects_wrong_shapes() {
        for bad in ["NCT1234567", "NCT123456789", "ABC12345678", "NCT1234567X", ""] {
            let err = bad.parse::<NctId>().unwrap_err();
            assert_eq!(err.code(), crate::ErrorCode::Validation, "{bad}");
        }
    }

    #[test]
    fn deserializes_with_validation() {
        let id: NctId = serde_json::from_str("\"NCT12345678\"").unwrap();
        assert_eq!(id.to_string(), "NCT12345678");
        assert!(serde_json::from_str::<NctId>("\"12345678\"").is_err());
    }
}
