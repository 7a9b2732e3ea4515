//! # NORPREG Core
//!
//! The NORPREG radiotherapy registry data model.
//!
//! This crate contains the record types and everything derived from their metadata:
//! - Registry bookkeeping, clinical and radiotherapy entities with typed fields
//! - Parsing and validation of JSON/YAML records with field-level error paths
//! - Documentation rendering (Markdown pages or a JSON schema)
//! - The one-off field-metadata migration for the Python model sources
//!
//! **No transport or storage concerns**: records are passive values. Reading files, encryption
//! of `_aes` fields and persistence belong to the surrounding system.

pub mod clinical;
pub mod codes;
pub mod config;
pub mod constants;
pub mod docs;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod migrate;
pub mod record;
pub mod registry;
pub mod rt;
pub mod timestamp;
pub mod validation;

pub use config::{resolve_docs_config_path, DocsConfig, MemberOrder, OutputFormat};
pub use docs::DocsService;
pub use error::{SchemaError, SchemaResult};
pub use metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
pub use migrate::{migrate_field_metadata, migrate_file, Migration};
pub use record::{
    entities, entity, from_value, parse, parse_json, parse_yaml, to_json, to_yaml,
    validate_named, Entity, RecordFormat,
};
pub use timestamp::Timestamp;
pub use validation::{Constraint, ValidationError};

pub use norpreg_keys::{ExportPseudoKey, PatientKey};
pub use norpreg_types::{Encrypted, NonEmptyText};
