//! Construction, validation and serialisation of records.

use crate::error::{SchemaError, SchemaResult};
use crate::metadata::EntityMeta;
use crate::validation::{Constraint, ValidationError};
use crate::{clinical, registry, rt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// A record type of the data model.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq {
    /// Field metadata, shared by the validator and the documentation renderer.
    const META: &'static EntityMeta;

    /// Cross-field checks that serde cannot express (parent references, numeric ranges).
    ///
    /// Paths in the returned error are relative to this record.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Input encoding of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Yaml,
}

impl RecordFormat {
    /// Guess the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => RecordFormat::Yaml,
            _ => RecordFormat::Json,
        }
    }
}

/// Parse and validate a JSON record.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the offending field if the text is malformed, a
/// required field is missing, a value falls outside its code list or encoding, an undeclared
/// field is present, or a cross-field check fails.
pub fn parse_json<E: Entity>(text: &str) -> Result<E, ValidationError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let record: E = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| ValidationError::from_deserialize(E::META.name, err))?;
    deserializer
        .end()
        .map_err(|err| ValidationError::new(E::META.name, Constraint::Type, err.to_string()))?;
    finish(record)
}

/// Parse and validate a YAML record.
///
/// # Errors
///
/// See [`parse_json`].
pub fn parse_yaml<E: Entity>(text: &str) -> Result<E, ValidationError> {
    let deserializer = serde_yaml::Deserializer::from_str(text);
    let record: E = serde_path_to_error::deserialize(deserializer)
        .map_err(|err| ValidationError::from_deserialize(E::META.name, err))?;
    finish(record)
}

/// Validate an already-parsed JSON value.
///
/// # Errors
///
/// See [`parse_json`].
pub fn from_value<E: Entity>(value: serde_json::Value) -> Result<E, ValidationError> {
    let record: E = serde_path_to_error::deserialize(value)
        .map_err(|err| ValidationError::from_deserialize(E::META.name, err))?;
    finish(record)
}

pub fn parse<E: Entity>(text: &str, format: RecordFormat) -> Result<E, ValidationError> {
    match format {
        RecordFormat::Json => parse_json(text),
        RecordFormat::Yaml => parse_yaml(text),
    }
}

fn finish<E: Entity>(record: E) -> Result<E, ValidationError> {
    record
        .validate()
        .map_err(|err| err.within(E::META.name))?;
    tracing::debug!(entity = E::META.name, "record accepted");
    Ok(record)
}

pub fn to_json<E: Entity>(record: &E) -> SchemaResult<String> {
    serde_json::to_string_pretty(record).map_err(SchemaError::JsonSerialization)
}

pub fn to_yaml<E: Entity>(record: &E) -> SchemaResult<String> {
    serde_yaml::to_string(record).map_err(SchemaError::YamlSerialization)
}

/// Validate every element of a child list with the child's own rules, prefixing paths with
/// `field[index]`.
pub(crate) fn validate_children<E: Entity>(
    field: &str,
    children: &[E],
) -> Result<(), ValidationError> {
    for (index, child) in children.iter().enumerate() {
        child
            .validate()
            .map_err(|err| err.within(&format!("{field}[{index}]")))?;
    }
    Ok(())
}

/// Check that every child's foreign key equals the parent's key.
pub(crate) fn check_parent<C, K>(
    field: &str,
    fk_name: &str,
    children: &[C],
    parent: &K,
    fk: impl Fn(&C) -> &K,
) -> Result<(), ValidationError>
where
    K: PartialEq + fmt::Display,
{
    for (index, child) in children.iter().enumerate() {
        let found = fk(child);
        if found != parent {
            return Err(ValidationError::relation(
                format!("{field}[{index}].{fk_name}"),
                parent,
                found,
            ));
        }
    }
    Ok(())
}

/// Deserialise an `Option` that must be present on the wire but may be `null`.
pub(crate) fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

struct EntityEntry {
    meta: &'static EntityMeta,
    check: fn(&str, RecordFormat) -> SchemaResult<serde_json::Value>,
}

fn check<E: Entity>(text: &str, format: RecordFormat) -> SchemaResult<serde_json::Value> {
    let record: E = parse(text, format)?;
    serde_json::to_value(&record).map_err(SchemaError::JsonSerialization)
}

macro_rules! entries {
    ($($ty:ty),+ $(,)?) => {
        &[$(EntityEntry { meta: <$ty as Entity>::META, check: check::<$ty> }),+]
    };
}

/// All entities in documentation order.
static ENTITIES: &[EntityEntry] = entries![
    registry::Registry,
    registry::Patient,
    registry::PatientIdentifierHistory,
    registry::Address,
    registry::Course,
    registry::DataStatus,
    registry::MapStudyUid,
    registry::MapSeriesUid,
    registry::MapInstanceUid,
    registry::Study,
    registry::Export,
    registry::PatientExport,
    registry::RegistryExport,
    registry::PvkEvent,
    registry::PvkSync,
    clinical::Metadata,
    clinical::Demographics,
    clinical::Vitals,
    clinical::Social,
    clinical::Stimulantia,
    clinical::FunctionStatus,
    clinical::Comorbidity,
    clinical::PrimaryDiagnosis,
    clinical::Staging,
    clinical::Metastasis,
    clinical::Histology,
    clinical::Genetics,
    clinical::PreviousCancerItem,
    clinical::PreviousCancer,
    clinical::TreatmentRadiotherapy,
    clinical::TreatmentSurgery,
    clinical::TreatmentSystemic,
    clinical::TreatmentSummary,
    clinical::BiologicalSample,
    clinical::Biomarker,
    clinical::Ctcae,
    clinical::VitalStatus,
    clinical::TumorEvent,
    clinical::Consent,
    clinical::ClinicalStudy,
    rt::DicomSeries,
    rt::Plan,
    rt::Fraction,
    rt::Dvh,
    rt::DoseReference,
    rt::Beam,
];

/// Metadata of every entity, in documentation order.
pub fn entities() -> impl Iterator<Item = &'static EntityMeta> {
    ENTITIES.iter().map(|entry| entry.meta)
}

/// Look an entity up by its name (for example `"Patient"` or `"DVH"`).
pub fn entity(name: &str) -> Option<&'static EntityMeta> {
    entities().find(|meta| meta.name == name)
}

/// Validate `text` as a record of the entity called `name`.
///
/// Returns the normalised record (DICOM dates in ISO form, defaults filled in) as JSON.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownEntity`] for an unknown name and
/// [`SchemaError::Validation`] if the record is invalid.
pub fn validate_named(
    name: &str,
    text: &str,
    format: RecordFormat,
) -> SchemaResult<serde_json::Value> {
    let entry = ENTITIES
        .iter()
        .find(|entry| entry.meta.name == name)
        .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))?;
    (entry.check)(text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::Vitals;
    use crate::metadata::{Domain, FieldKind, FieldMeta};
    use dicom::CompressedDvh;
    use serde_json::{json, Map, Value};
    use std::collections::BTreeSet;

    /// A wire value accepted by `field`. Code lists use their first declared code.
    fn sample(field: &FieldMeta, complete: bool) -> Value {
        match field.kind {
            FieldKind::Integer => json!(1),
            FieldKind::Float => json!(0.5),
            FieldKind::Text => json!("tekst"),
            FieldKind::Boolean => json!(true),
            FieldKind::Date => json!("2024-01-15"),
            FieldKind::DateTime => json!("2024-01-15T10:00:00+01:00"),
            FieldKind::DicomDate => json!("20240115"),
            FieldKind::Code => code_value(field.values[0].0),
            FieldKind::Key => json!("a72bf40"),
            FieldKind::Uid => json!("1.2.840.10008.1"),
            FieldKind::CompressedCurve => {
                let curve = CompressedDvh::from_samples(&[100.0, 62.5, 0.0]).expect("curve");
                json!(curve.as_str())
            }
            FieldKind::Entity(name) => record(entity(name).expect(name), complete),
            FieldKind::List(_) => json!([]),
        }
    }

    /// Integer code lists travel as numbers, the others as strings.
    fn code_value(code: &str) -> Value {
        code.parse::<u8>().map_or_else(|_| json!(code), |number| json!(number))
    }

    /// Every required field set, plus every optional one if `complete`.
    fn record(meta: &EntityMeta, complete: bool) -> Value {
        let fields: Map<String, Value> = meta
            .fields
            .iter()
            .filter(|field| complete || field.required)
            .map(|field| (field.name.to_string(), sample(field, complete)))
            .collect();
        Value::Object(fields)
    }

    fn check_entry(entry: &EntityEntry, value: &Value) -> SchemaResult<Value> {
        (entry.check)(&value.to_string(), RecordFormat::Json)
    }

    fn expect_rejection(entry: &EntityEntry, value: &Value, field: &str, constraint: Constraint) {
        let name = entry.meta.name;
        match check_entry(entry, value) {
            Err(SchemaError::Validation(err)) => {
                assert_eq!(err.constraint, constraint, "{name}.{field}");
                assert_eq!(err.path, format!("{name}.{field}"));
            }
            other => panic!("{name}.{field}: expected {constraint} violation, got {other:?}"),
        }
    }

    #[test]
    fn every_entity_round_trips_with_all_fields_set() {
        for entry in ENTITIES {
            let name = entry.meta.name;
            let normalised = check_entry(entry, &record(entry.meta, true))
                .unwrap_or_else(|err| panic!("{name}: {err}"));

            let wire: BTreeSet<&str> =
                normalised.as_object().expect(name).keys().map(String::as_str).collect();
            let declared: BTreeSet<&str> = entry.meta.fields.iter().map(|f| f.name).collect();
            assert_eq!(wire, declared, "{name}");

            let again =
                check_entry(entry, &normalised).unwrap_or_else(|err| panic!("{name}: {err}"));
            assert_eq!(again, normalised, "{name}");
        }
    }

    #[test]
    fn required_fields_match_the_metadata() {
        for entry in ENTITIES {
            let name = entry.meta.name;
            let minimal = record(entry.meta, false);
            check_entry(entry, &minimal).unwrap_or_else(|err| panic!("{name}: {err}"));

            for field in entry.meta.required_fields() {
                let mut value = minimal.clone();
                value.as_object_mut().expect(name).remove(field.name);
                expect_rejection(entry, &value, field.name, Constraint::Required);
            }
        }
    }

    #[test]
    fn every_declared_code_is_accepted_and_others_rejected() {
        for entry in ENTITIES {
            let name = entry.meta.name;
            let codes = entry.meta.fields.iter().filter(|f| f.kind == FieldKind::Code);
            for field in codes {
                for (code, _) in field.values {
                    let mut value = record(entry.meta, false);
                    value[field.name] = code_value(code);
                    check_entry(entry, &value)
                        .unwrap_or_else(|err| panic!("{name}.{} = {code}: {err}", field.name));
                }

                let mut value = record(entry.meta, false);
                value[field.name] = if field.values[0].0.parse::<u8>().is_ok() {
                    json!(99)
                } else {
                    json!("ukjent-kode")
                };
                expect_rejection(entry, &value, field.name, Constraint::ValueSet);
            }
        }
    }

    #[test]
    fn entity_names_are_unique_and_resolvable() {
        let names: Vec<_> = entities().map(|meta| meta.name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());

        for name in &names {
            assert_eq!(entity(name).map(|meta| meta.name), Some(*name));
        }
        assert!(entity("Nope").is_none());
    }

    #[test]
    fn every_domain_has_entities() {
        for domain in Domain::ALL {
            assert!(entities().any(|meta| meta.domain == domain), "{domain:?}");
        }
        assert_eq!(entity("DVH").map(|m| m.domain), Some(Domain::Radiotherapy));
        assert_eq!(entity("PatientID").map(|m| m.domain), Some(Domain::Registry));
    }

    #[test]
    fn field_tables_have_unique_names() {
        for meta in entities() {
            let mut names: Vec<_> = meta.fields.iter().map(|f| f.name).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{}", meta.name);
        }
    }

    #[test]
    fn json_and_yaml_agree() {
        let from_json: Vitals =
            parse_json(r#"{"weight_at_diagnosis_kg": 71.5, "height_cm": 180}"#).expect("json");
        let from_yaml: Vitals =
            parse_yaml("weight_at_diagnosis_kg: 71.5\nheight_cm: 180\n").expect("yaml");
        assert_eq!(from_json, from_yaml);

        let yaml = to_yaml(&from_json).expect("to yaml");
        assert_eq!(parse_yaml::<Vitals>(&yaml).expect("reparse"), from_json);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = parse_json::<Vitals>(r#"{"weight_at_diagnosis_kg": 1, "height_cm": 2} x"#)
            .expect_err("trailing characters");
        assert_eq!(err.path, "Vitals");
    }

    #[test]
    fn from_value_reports_missing_field() {
        let err = from_value::<Vitals>(serde_json::json!({"height_cm": 170.0}))
            .expect_err("missing weight");
        assert_eq!(err.path, "Vitals.weight_at_diagnosis_kg");
        assert_eq!(err.constraint, Constraint::Required);
    }

    #[test]
    fn validate_named_dispatches_by_name() {
        let normalised = validate_named(
            "DICOM",
            r#"{"series_date": "20240115", "files_nb": 3}"#,
            RecordFormat::Json,
        )
        .expect("valid record");
        assert_eq!(normalised["series_date"], "2024-01-15");

        assert!(matches!(
            validate_named("Unknown", "{}", RecordFormat::Json),
            Err(SchemaError::UnknownEntity(_))
        ));
        assert!(matches!(
            validate_named("Vitals", "height_cm: 1\n", RecordFormat::Yaml),
            Err(SchemaError::Validation(_))
        ));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(RecordFormat::from_path(Path::new("a.yml")), RecordFormat::Yaml);
        assert_eq!(RecordFormat::from_path(Path::new("a.yaml")), RecordFormat::Yaml);
        assert_eq!(RecordFormat::from_path(Path::new("a.json")), RecordFormat::Json);
        assert_eq!(RecordFormat::from_path(Path::new("a")), RecordFormat::Json);
    }
}
