//! DICOM unique identifiers (`UI` value representation).

use crate::{DicomError, DicomResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MAX_UID_LEN: usize = 64;

/// A validated DICOM UID such as a Study Instance UID or an RT Plan SOP Instance UID.
///
/// Rules (PS3.5 §9.1): at most 64 characters, dot-separated numeric components, no empty
/// component, and no leading zero in a multi-digit component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DicomUid(String);

impl DicomUid {
    /// # Errors
    ///
    /// Returns [`DicomError::InvalidUid`] when any rule is violated.
    pub fn parse(raw: &str) -> DicomResult<Self> {
        // DICOM pads odd-length UI values with a trailing NUL.
        let value = raw.trim().trim_end_matches('\0');

        if value.is_empty() {
            return Err(DicomError::InvalidUid("UID cannot be empty".into()));
        }

        if value.len() > MAX_UID_LEN {
            return Err(DicomError::InvalidUid(format!(
                "UID exceeds maximum length of {} characters",
                MAX_UID_LEN
            )));
        }

        for component in value.split('.') {
            if component.is_empty() {
                return Err(DicomError::InvalidUid(format!(
                    "UID '{}' contains an empty component",
                    value
                )));
            }
            if !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DicomError::InvalidUid(format!(
                    "UID '{}' contains non-numeric characters",
                    value
                )));
            }
            if component.len() > 1 && component.starts_with('0') {
                return Err(DicomError::InvalidUid(format!(
                    "UID '{}' has a component with a leading zero",
                    value
                )));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DicomUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DicomUid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DicomUid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_uids() {
        for raw in ["1.2.840.10008.5.1.4.1.1.481.5", "2.25.0", "1.2.3.0.4"] {
            assert_eq!(DicomUid::parse(raw).expect(raw).as_str(), raw);
        }
    }

    #[test]
    fn strips_nul_padding() {
        let uid = DicomUid::parse("1.2.3.4\0").expect("padded uid");
        assert_eq!(uid.as_str(), "1.2.3.4");
    }

    #[test]
    fn rejects_invalid_uids() {
        let long = format!("1.{}", "2".repeat(64));
        for raw in ["", "1..2", "1.2.", "1.02.3", "1.2.a", long.as_str()] {
            assert!(
                matches!(DicomUid::parse(raw), Err(DicomError::InvalidUid(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<DicomUid>("\"1.2.3\"").is_ok());
        let err = serde_json::from_str::<DicomUid>("\"1.2.x\"").expect_err("invalid");
        assert!(err.to_string().contains("non-numeric"));
    }
}
