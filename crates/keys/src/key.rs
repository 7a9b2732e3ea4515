//! Canonical hexadecimal key types.

use crate::{KeyError, KeyResult};
use std::{fmt, str::FromStr};

macro_rules! hex_key {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Number of hexadecimal characters in the canonical form.
            pub const LEN: usize = $len;

            /// Wraps a key received from another system.
            ///
            /// Keys are opaque on ingestion: any non-blank text is kept as given (trimmed), since
            /// the hexadecimal form is only the default for newly drawn keys.
            ///
            /// # Errors
            ///
            /// Returns [`KeyError::InvalidInput`] if `input` is blank.
            pub fn parse(input: &str) -> KeyResult<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Err(KeyError::InvalidInput(format!("{} must not be empty", $label)));
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Wraps a key that must be in canonical form.
            ///
            /// # Errors
            ///
            /// Returns [`KeyError::InvalidInput`] if `input` is not exactly
            #[doc = concat!(stringify!($len), " lowercase hex characters.")]
            /// The rejected value is not echoed, as keys may be stored encrypted.
            pub fn parse_canonical(input: &str) -> KeyResult<Self> {
                if Self::is_canonical(input) {
                    return Ok(Self(input.to_owned()));
                }
                Err(KeyError::InvalidInput(format!(
                    "{} must be {} lowercase hex characters",
                    $label,
                    Self::LEN
                )))
            }

            /// Returns true if `input` is in canonical form.
            pub fn is_canonical(input: &str) -> bool {
                input.len() == Self::LEN
                    && input
                        .bytes()
                        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub(crate) fn from_value(value: u32) -> Self {
                Self(format!("{:0width$x}", value, width = Self::LEN))
            }

            /// Number of distinct canonical keys.
            pub const SPACE: u32 = 1 << (4 * $len);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        /// Accepts a string, or an unsigned integer for sources that store keys as numbers.
        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct KeyVisitor;

                impl serde::de::Visitor<'_> for KeyVisitor {
                    type Value = String;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a {} as a string or unsigned integer", $label)
                    }

                    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
                        Ok(v.to_owned())
                    }

                    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
                        Ok(v.to_string())
                    }
                }

                let raw = deserializer.deserialize_any(KeyVisitor)?;
                Self::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_key!(
    /// Pseudonymised key identifying a patient inside the registry.
    ///
    /// Assigned automatically when either the DICOM or the EPJ dataset for a patient first
    /// arrives. Also used as `record_id` on radiotherapy delivery records.
    PatientKey,
    7,
    "patient key"
);

hex_key!(
    /// Per-release pseudonym for one patient in one data export.
    ExportPseudoKey,
    5,
    "export pseudo key"
);
