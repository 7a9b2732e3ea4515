//! Pseudonymised registry keys.
//!
//! NORPREG never stores a national identifier as a key. Every patient gets an opaque
//! registry key, and every research data release gets a fresh per-patient pseudonym so that
//! two releases cannot be joined on the key.
//!
//! ## Canonical forms
//! - [`PatientKey`]: 7 lowercase hexadecimal characters, for example `a72bf40`.
//! - [`ExportPseudoKey`]: 5 lowercase hexadecimal characters (about 1 M possibilities).
//!
//! New keys are drawn in canonical form with [`KeyGenerator`]. Keys received from other
//! systems are opaque: `parse` (and deserialisation) keeps any non-blank value as given, and
//! `parse_canonical` enforces the hexadecimal form.

mod generator;
mod key;

pub use generator::KeyGenerator;
pub use key::{ExportPseudoKey, PatientKey};

/// Error type for key operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No unused key could be drawn within the attempt budget.
    #[error("no unused key found after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;
