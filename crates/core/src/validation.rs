//! Record validation errors.
//!
//! Deserialisation runs through `serde_path_to_error`, so every failure carries the path of
//! the offending field (for example `Patient.addresses[0].zip_code_aes`). The underlying serde
//! message is classified into a [`Constraint`] so that callers can tell a missing field from a
//! value outside its code list without string matching of their own.

use serde::Serialize;
use std::fmt;

/// The kind of rule a record broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// A required field was absent.
    Required,
    /// A value was outside the field's closed value set.
    ValueSet,
    /// A value had the wrong JSON/YAML type.
    Type,
    /// A value had the right type but a malformed encoding (DICOM date, UID, DVH string, ...).
    Format,
    /// A field not declared by the entity was present.
    UnknownField,
    /// A nested child did not reference its parent.
    Relation,
    /// A number fell outside its documented range.
    Range,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Constraint::Required => "required",
            Constraint::ValueSet => "value set",
            Constraint::Type => "type",
            Constraint::Format => "format",
            Constraint::UnknownField => "unknown field",
            Constraint::Relation => "relation",
            Constraint::Range => "range",
        };
        f.write_str(label)
    }
}

/// A record failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{path}: {constraint} violation: {message}")]
pub struct ValidationError {
    pub path: String,
    pub constraint: Constraint,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, constraint: Constraint, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraint,
            message: message.into(),
        }
    }

    /// A child's foreign key does not point back at its parent.
    pub fn relation(
        path: impl Into<String>,
        expected: impl fmt::Display,
        found: impl fmt::Display,
    ) -> Self {
        Self::new(
            path,
            Constraint::Relation,
            format!("expected parent key {expected}, found {found}"),
        )
    }

    /// Prefix the path with the location of the containing record.
    pub fn within(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else if self.path.starts_with('[') {
            format!("{prefix}{}", self.path)
        } else {
            format!("{prefix}.{}", self.path)
        };
        self
    }

    /// Build from a `serde_path_to_error` failure while deserialising entity `root`.
    pub(crate) fn from_deserialize<E: fmt::Display>(
        root: &str,
        err: serde_path_to_error::Error<E>,
    ) -> Self {
        let path = err.path().to_string();
        let message = err.into_inner().to_string();
        Self::classify(root, &path, message)
    }

    fn classify(root: &str, path: &str, message: String) -> Self {
        let mut full = if path.is_empty() || path == "." {
            root.to_string()
        } else {
            format!("{root}.{path}")
        };

        let constraint = if let Some(field) = backticked_after(&message, "missing field `") {
            push_field(&mut full, field);
            Constraint::Required
        } else if let Some(field) = backticked_after(&message, "unknown field `") {
            push_field(&mut full, field);
            Constraint::UnknownField
        } else if message.contains("unknown variant") || message.contains("expected one of") {
            Constraint::ValueSet
        } else if message.contains("invalid type")
            || message.contains("invalid value")
            || message.contains("invalid length")
        {
            Constraint::Type
        } else {
            Constraint::Format
        };

        tracing::debug!(path = %full, %constraint, "record rejected");
        Self::new(full, constraint, message)
    }
}

/// Check that a fraction documented as lying in `[0, 1]` does.
pub(crate) fn check_unit_interval(
    path: &str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(ValidationError::new(
            path,
            Constraint::Range,
            format!("{v} is outside 0..=1"),
        )),
        _ => Ok(()),
    }
}

fn backticked_after<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let start = message.find(marker)? + marker.len();
    let rest = &message[start..];
    let end = rest.find('`')?;
    Some(&rest[..end])
}

fn push_field(path: &mut String, field: &str) {
    let already_named = path
        .rsplit('.')
        .next()
        .is_some_and(|last| last == field);
    if !already_named {
        path.push('.');
        path.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_names_parent_and_field() {
        let err = ValidationError::classify(
            "Patient",
            "addresses[0]",
            "missing field `zip_code_aes` at line 1 column 40".into(),
        );
        assert_eq!(err.path, "Patient.addresses[0].zip_code_aes");
        assert_eq!(err.constraint, Constraint::Required);
    }

    #[test]
    fn root_level_missing_field() {
        let err = ValidationError::classify("Vitals", ".", "missing field `height_cm`".into());
        assert_eq!(err.path, "Vitals.height_cm");
    }

    #[test]
    fn unknown_field_is_not_duplicated() {
        let err = ValidationError::classify(
            "Consent",
            "surprise",
            "unknown field `surprise`, expected one of `a`, `b`".into(),
        );
        assert_eq!(err.path, "Consent.surprise");
        assert_eq!(err.constraint, Constraint::UnknownField);
    }

    #[test]
    fn classifies_value_set_type_and_format() {
        let value_set = ValidationError::classify(
            "Demographics",
            "sex",
            "unknown variant `annet`, expected `mann` or `kvinne`".into(),
        );
        assert_eq!(value_set.constraint, Constraint::ValueSet);

        let ty = ValidationError::classify(
            "Vitals",
            "height_cm",
            "invalid type: string \"tall\", expected f64".into(),
        );
        assert_eq!(ty.constraint, Constraint::Type);

        let format = ValidationError::classify(
            "DICOM",
            "series_date",
            "invalid DICOM date '2024-13-01' (expected YYYYMMDD)".into(),
        );
        assert_eq!(format.constraint, Constraint::Format);
        assert_eq!(format.path, "DICOM.series_date");
    }

    #[test]
    fn within_prefixes_paths() {
        let err = ValidationError::new("fk_study_id", Constraint::Relation, "x");
        assert_eq!(err.within("exports[1]").path, "exports[1].fk_study_id");

        let err = ValidationError::new("[2].id", Constraint::Relation, "x");
        assert_eq!(err.within("exports").path, "exports[2].id");
    }

    #[test]
    fn unit_interval() {
        assert!(check_unit_interval("x", Some(0.5)).is_ok());
        assert!(check_unit_interval("x", None).is_ok());
        let err = check_unit_interval("fx_completion", Some(1.2)).expect_err("out of range");
        assert_eq!(err.constraint, Constraint::Range);
    }
}
