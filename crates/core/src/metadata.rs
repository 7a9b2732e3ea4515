//! Static per-entity field metadata.
//!
//! Every entity carries a `&'static EntityMeta` describing its fields. The tables are plain
//! `const` data built with the `const fn` builders below, so the documentation renderer and
//! the validator read the same value lists.

use serde::Serialize;

/// Wire type of a field, as shown in the documentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    Boolean,
    /// `YYYY-MM-DD`.
    Date,
    /// ISO-8601 date and time, with or without a UTC offset.
    DateTime,
    /// `YYYYMMDD` on input, `YYYY-MM-DD` on output.
    DicomDate,
    /// A member of a closed code list.
    Code,
    /// A pseudonymised registry key.
    Key,
    /// A DICOM unique identifier.
    Uid,
    /// The gzip/base64 packed DVH curve.
    CompressedCurve,
    /// A single nested record.
    Entity(&'static str),
    /// A list of nested records.
    List(&'static str),
}

impl FieldKind {
    /// Short human label used in the rendered field list.
    pub fn label(&self) -> String {
        match self {
            FieldKind::Integer => "heltall".into(),
            FieldKind::Float => "desimaltall".into(),
            FieldKind::Text => "tekst".into(),
            FieldKind::Boolean => "ja/nei".into(),
            FieldKind::Date => "dato".into(),
            FieldKind::DateTime => "dato og tid".into(),
            FieldKind::DicomDate => "DICOM-dato".into(),
            FieldKind::Code => "kode".into(),
            FieldKind::Key => "registernøkkel".into(),
            FieldKind::Uid => "DICOM UID".into(),
            FieldKind::CompressedCurve => "komprimert DVH".into(),
            FieldKind::Entity(name) => format!("`{name}`"),
            FieldKind::List(name) => format!("liste av `{name}`"),
        }
    }
}

/// Which part of the data model an entity belongs to. Each domain renders as one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Registry bookkeeping: patients, courses, data sharing, consent lookups.
    Registry,
    /// Clinical oncology data.
    Clinical,
    /// Radiotherapy delivery data extracted from DICOM.
    Radiotherapy,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Registry, Domain::Clinical, Domain::Radiotherapy];

    pub fn title(self) -> &'static str {
        match self {
            Domain::Registry => "Kodeliste",
            Domain::Clinical => "Kliniske data",
            Domain::Radiotherapy => "Stråleterapidata",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Domain::Registry => "kodeliste",
            Domain::Clinical => "clinical",
            Domain::Radiotherapy => "rt",
        }
    }
}

/// Display and validation metadata for one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "no_values")]
    pub values: &'static [(&'static str, &'static str)],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminology: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dicom: Option<&'static str>,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl FieldMeta {
    /// A required field with no display text yet.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            title: "",
            description: "",
            kind,
            required: true,
            unit: None,
            values: &[],
            terminology: None,
            dicom: None,
            encrypted: false,
            default: None,
        }
    }

    /// A list of child records; optional on input and empty by default.
    pub const fn list(name: &'static str, entity: &'static str) -> Self {
        Self::new(name, FieldKind::List(entity)).optional().default_value("[]")
    }

    pub const fn title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn values(mut self, values: &'static [(&'static str, &'static str)]) -> Self {
        self.values = values;
        self
    }

    pub const fn terminology(mut self, terminology: &'static str) -> Self {
        self.terminology = Some(terminology);
        self
    }

    pub const fn dicom(mut self, tag: &'static str) -> Self {
        self.dicom = Some(tag);
        self
    }

    pub const fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// The title if one is set, otherwise the field name.
    pub fn display_title(&self) -> &'static str {
        if self.title.is_empty() {
            self.name
        } else {
            self.title
        }
    }
}

fn no_values(values: &&'static [(&'static str, &'static str)]) -> bool {
    values.is_empty()
}

/// Metadata for one entity.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EntityMeta {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub domain: Domain,
    pub fields: &'static [FieldMeta],
}

impl EntityMeta {
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter().filter(|f| f.required)
    }
}
