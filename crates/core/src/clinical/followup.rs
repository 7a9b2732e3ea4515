use crate::codes::{
    BiomarkerResult, CtcaeGrade, ProgressionGrade, ProgressionIdentification, ProgressionType,
    SampleType,
};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{required_nullable, Entity};
use chrono::NaiveDate;
use norpreg_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A pathology sample, identified by its requisition number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BiologicalSample {
    pub requisition_remissenr: NonEmptyText,
    #[serde(default)]
    pub sample_laboratory: Option<String>,
    pub conclusion: String,
    pub sample_date: NaiveDate,
    #[serde(default)]
    pub sample_type: Option<SampleType>,
    #[serde(default)]
    pub sample_anatomical_location: Option<String>,
    #[serde(default)]
    pub sample_tumorcells_percentage: Option<f64>,
}

impl Entity for BiologicalSample {
    const META: &'static EntityMeta = &EntityMeta {
        name: "BiologicalSample",
        title: "Biologisk prøve",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("requisition_remissenr", FieldKind::Text).title("Remissenummer"),
            FieldMeta::new("sample_laboratory", FieldKind::Text)
                .title("Laboratorium")
                .optional(),
            FieldMeta::new("conclusion", FieldKind::Text).title("Konklusjon"),
            FieldMeta::new("sample_date", FieldKind::Date)
                .title("Prøvedato")
                .unit("YYYY-MM-DD"),
            FieldMeta::new("sample_type", FieldKind::Code)
                .title("Prøvemateriale")
                .values(SampleType::VALUES)
                .optional(),
            FieldMeta::new("sample_anatomical_location", FieldKind::Text)
                .title("Anatomisk lokalisasjon")
                .optional(),
            FieldMeta::new("sample_tumorcells_percentage", FieldKind::Float)
                .title("Andel tumorceller")
                .unit("%")
                .optional(),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Biomarker {
    pub biomarker_name: NonEmptyText,
    #[serde(default)]
    pub biomarker_value: Option<f64>,
    #[serde(default)]
    pub biomarker_unit: Option<String>,
    #[serde(default)]
    pub biomarker_result: Option<BiomarkerResult>,
    #[serde(default)]
    pub biomarker_method: Option<String>,
}

impl Entity for Biomarker {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Biomarker",
        title: "Biomarkør",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("biomarker_name", FieldKind::Text).title("Biomarkør"),
            FieldMeta::new("biomarker_value", FieldKind::Float)
                .title("Verdi")
                .optional(),
            FieldMeta::new("biomarker_unit", FieldKind::Text)
                .title("Enhet")
                .optional(),
            FieldMeta::new("biomarker_result", FieldKind::Code)
                .title("Resultat")
                .values(BiomarkerResult::VALUES)
                .optional(),
            FieldMeta::new("biomarker_method", FieldKind::Text)
                .title("Metode")
                .optional(),
        ],
    };
}

/// An adverse event graded by CTCAE.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ctcae {
    pub ctcae_date: NaiveDate,
    #[serde(default)]
    pub meddra_category: Option<String>,
    #[serde(default)]
    pub meddra_name: Option<String>,
    pub ctcae_grade: CtcaeGrade,
    #[serde(default)]
    pub ctcae_terminology_version: Option<String>,
    #[serde(default)]
    pub meddra_terminology_version: Option<String>,
}

impl Entity for Ctcae {
    const META: &'static EntityMeta = &EntityMeta {
        name: "CTCAE",
        title: "Bivirkninger (CTCAE)",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("ctcae_date", FieldKind::Date)
                .title("Dato for vurdering")
                .unit("YYYY-MM-DD"),
            FieldMeta::new("meddra_category", FieldKind::Text)
                .title("MedDRA-kategori")
                .terminology("MedDRA")
                .optional(),
            FieldMeta::new("meddra_name", FieldKind::Text)
                .title("MedDRA-term")
                .terminology("MedDRA")
                .optional(),
            FieldMeta::new("ctcae_grade", FieldKind::Code)
                .title("CTCAE-grad")
                .values(CtcaeGrade::VALUES),
            FieldMeta::new("ctcae_terminology_version", FieldKind::Text)
                .title("CTCAE-versjon")
                .optional(),
            FieldMeta::new("meddra_terminology_version", FieldKind::Text)
                .title("MedDRA-versjon")
                .optional(),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalStatus {
    #[serde(default)]
    pub last_followup: Option<NaiveDate>,
    #[serde(default)]
    pub mors_date: Option<NaiveDate>,
}

impl Entity for VitalStatus {
    const META: &'static EntityMeta = &EntityMeta {
        name: "VitalStatus",
        title: "Vitalstatus",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("last_followup", FieldKind::Date)
                .title("Siste oppfølging")
                .description("Siste polikliniske kontakt")
                .unit("YYYY-MM-DD")
                .optional(),
            FieldMeta::new("mors_date", FieldKind::Date)
                .title("Dødsdato")
                .unit("YYYY-MM-DD")
                .optional(),
        ],
    };
}

/// Progression or relapse after treatment. `progression_identification` must be sent, but may
/// be `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TumorEvent {
    pub progression_date: NaiveDate,
    pub progression_type: ProgressionType,
    #[serde(deserialize_with = "required_nullable")]
    pub progression_identification: Option<ProgressionIdentification>,
    pub progression_grade: ProgressionGrade,
}

impl Entity for TumorEvent {
    const META: &'static EntityMeta = &EntityMeta {
        name: "TumorEvent",
        title: "Progresjon og residiv",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("progression_date", FieldKind::Date)
                .title("Dato for progresjon")
                .unit("YYYY-MM-DD"),
            FieldMeta::new("progression_type", FieldKind::Code)
                .title("Type hendelse")
                .values(ProgressionType::VALUES),
            FieldMeta::new("progression_identification", FieldKind::Code)
                .title("Påvist ved")
                .description("Må oppgis, men kan være tom")
                .values(ProgressionIdentification::VALUES),
            FieldMeta::new("progression_grade", FieldKind::Code)
                .title("Utbredelse")
                .values(ProgressionGrade::VALUES),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Consent {
    pub informed_patient_about_rt_registry: bool,
    pub informed_patient_about_broad_consent: bool,
}

impl Entity for Consent {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Consent",
        title: "Samtykke",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("informed_patient_about_rt_registry", FieldKind::Boolean)
                .title("Pasienten er informert om registeret"),
            FieldMeta::new("informed_patient_about_broad_consent", FieldKind::Boolean)
                .title("Pasienten er informert om bredt samtykke"),
        ],
    };
}

/// Participation in a clinical study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicalStudy {
    pub study_name: NonEmptyText,
    #[serde(default)]
    pub study_contact_person: Option<String>,
}

impl Entity for ClinicalStudy {
    const META: &'static EntityMeta = &EntityMeta {
        name: "ClinicalStudy",
        title: "Klinisk studie",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("study_name", FieldKind::Text).title("Studienavn"),
            FieldMeta::new("study_contact_person", FieldKind::Text)
                .title("Kontaktperson")
                .optional(),
        ],
    };
}
