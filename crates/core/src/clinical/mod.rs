//! Clinical oncology domain.
//!
//! Flat records reported by the hospitals' journal systems. Each record stands alone; the
//! surrounding registry links them to a patient and course.

mod diagnosis;
mod followup;
mod treatment;

pub use diagnosis::{
    Genetics, Histology, Metastasis, PreviousCancer, PreviousCancerItem, PrimaryDiagnosis,
    Staging,
};
pub use followup::{
    BiologicalSample, Biomarker, ClinicalStudy, Consent, Ctcae, TumorEvent, VitalStatus,
};
pub use treatment::{
    TreatmentRadiotherapy, TreatmentSummary, TreatmentSurgery, TreatmentSystemic,
};

use crate::codes::{
    AlcoholUse, EcogGrade, EducationLevel, LivingArrangement, MaritalStatus, Sex, SmokingStatus,
    TobaccoStatus, WorkStatus,
};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use crate::timestamp::Timestamp;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_version_major() -> u32 {
    0
}

fn default_version_minor() -> u32 {
    3
}

/// Header of an XML delivery from a journal system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub xml_timestamp: Timestamp,
    #[serde(default = "default_version_major")]
    pub xml_version_major: u32,
    #[serde(default = "default_version_minor")]
    pub xml_version_minor: u32,
}

impl Entity for Metadata {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Metadata",
        title: "Metadata for leveransen",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("xml_timestamp", FieldKind::DateTime)
                .title("Tidspunkt for XML-uttrekk"),
            FieldMeta::new("xml_version_major", FieldKind::Integer)
                .title("XML-versjon (major)")
                .optional()
                .default_value("0"),
            FieldMeta::new("xml_version_minor", FieldKind::Integer)
                .title("XML-versjon (minor)")
                .optional()
                .default_value("3"),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Demographics {
    pub rt_center: String,
    pub referring_hf: String,
    pub birth_year: u16,
    pub sex: Sex,
}

impl Entity for Demographics {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Demographics",
        title: "Demografi",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("rt_center", FieldKind::Text).title("Strålesenter"),
            FieldMeta::new("referring_hf", FieldKind::Text).title("Henvisende helseforetak"),
            FieldMeta::new("birth_year", FieldKind::Integer).title("Fødselsår"),
            FieldMeta::new("sex", FieldKind::Code)
                .title("Kjønn")
                .values(Sex::VALUES),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vitals {
    pub weight_at_diagnosis_kg: f64,
    pub height_cm: f64,
}

impl Entity for Vitals {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Vitals",
        title: "Vitale mål",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("weight_at_diagnosis_kg", FieldKind::Float)
                .title("Vekt ved diagnose")
                .unit("kg"),
            FieldMeta::new("height_cm", FieldKind::Float)
                .title("Høyde")
                .unit("cm"),
        ],
    };
}

/// Social background. `martial_status` is the wire name sources send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Social {
    pub education_level: EducationLevel,
    pub martial_status: MaritalStatus,
    pub living_arrangements: LivingArrangement,
    pub arbeidsstatus: WorkStatus,
}

impl Entity for Social {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Social",
        title: "Sosiale forhold",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("education_level", FieldKind::Code)
                .title("Høyeste fullførte utdanningsnivå")
                .values(EducationLevel::VALUES)
                .terminology("no.utdanningsnivaa"),
            FieldMeta::new("martial_status", FieldKind::Code)
                .title("Samlivsstatus")
                .description(
                    "Det finnes lokale, myndighetspålagte verdisett eller terminologier som for \
                     eksempel SNOMED CT eller lignende",
                )
                .values(MaritalStatus::VALUES)
                .terminology("no.samlivsstatus"),
            FieldMeta::new("living_arrangements", FieldKind::Code)
                .title("Bosituasjon")
                .values(LivingArrangement::VALUES),
            FieldMeta::new("arbeidsstatus", FieldKind::Code)
                .title("Arbeidsstatus")
                .values(WorkStatus::VALUES)
                .terminology("no.arbeidsstatus"),
        ],
    };
}

/// Tobacco and alcohol use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stimulantia {
    pub smoking_status: SmokingStatus,
    pub pack_years: u32,
    #[serde(default)]
    pub month_since_stopping: Option<u32>,
    pub non_smoking_tobacco_status: TobaccoStatus,
    pub alcohol_abuse: AlcoholUse,
}

impl Entity for Stimulantia {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Stimulantia",
        title: "Stimulantia",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("smoking_status", FieldKind::Code)
                .title("Røykestatus")
                .values(SmokingStatus::VALUES),
            FieldMeta::new("pack_years", FieldKind::Integer)
                .title("Pakkeår"),
            FieldMeta::new("month_since_stopping", FieldKind::Integer)
                .title("Måneder siden røykeslutt")
                .unit("måneder")
                .optional(),
            FieldMeta::new("non_smoking_tobacco_status", FieldKind::Code)
                .title("Bruk av røykfri tobakk")
                .values(TobaccoStatus::VALUES),
            FieldMeta::new("alcohol_abuse", FieldKind::Code)
                .title("Alkoholbruk")
                .description("Evaluation.Alkoholanamnese_v1 i CKM")
                .values(AlcoholUse::VALUES),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionStatus {
    pub ecog_grade: EcogGrade,
    pub ecog_date: NaiveDate,
}

impl Entity for FunctionStatus {
    const META: &'static EntityMeta = &EntityMeta {
        name: "FunctionStatus",
        title: "Funksjonsstatus",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("ecog_grade", FieldKind::Code)
                .title("ECOG")
                .description("Funksjonsstatus")
                .values(EcogGrade::VALUES),
            FieldMeta::new("ecog_date", FieldKind::Date)
                .title("Dato for ECOG")
                .description("Dato for pasientbesøk hvor ECOG ble vurdert")
                .unit("YYYY-MM-DD"),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Comorbidity {
    #[serde(default)]
    pub comorbidity_name: Option<String>,
    #[serde(default)]
    pub comorbidity_code: Option<String>,
    #[serde(default)]
    pub comorbidity_term: Option<String>,
    #[serde(default)]
    pub comorbidity_terminology_version: Option<String>,
    #[serde(default)]
    pub comorbidity_category: Option<String>,
    pub comorbidity_date: NaiveDate,
}

impl Entity for Comorbidity {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Comorbidity",
        title: "Komorbiditet",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("comorbidity_name", FieldKind::Text)
                .title("Navn")
                .optional(),
            FieldMeta::new("comorbidity_code", FieldKind::Text)
                .title("Kode")
                .optional(),
            FieldMeta::new("comorbidity_term", FieldKind::Text)
                .title("Term")
                .optional(),
            FieldMeta::new("comorbidity_terminology_version", FieldKind::Text)
                .title("Terminologiversjon")
                .optional(),
            FieldMeta::new("comorbidity_category", FieldKind::Text)
                .title("Kategori")
                .optional(),
            FieldMeta::new("comorbidity_date", FieldKind::Date).title("Dato"),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_yaml, to_json, to_yaml};
    use crate::validation::Constraint;
    use serde_json::json;

    #[test]
    fn metadata_versions_default() {
        let meta: Metadata =
            from_value(json!({"xml_timestamp": "2025-02-01T08:30:00"})).expect("metadata");
        assert_eq!((meta.xml_version_major, meta.xml_version_minor), (0, 3));

        let meta: Metadata = from_value(json!({
            "xml_timestamp": "2025-02-01T08:30:00",
            "xml_version_minor": 4,
        }))
        .expect("metadata");
        assert_eq!(meta.xml_version_minor, 4);
        assert_eq!(Metadata::META.field("xml_version_minor").and_then(|f| f.default), Some("3"));
    }

    #[test]
    fn demographics_sex_value_set() {
        let base = json!({"rt_center": "OUS", "referring_hf": "Vestre Viken", "birth_year": 1956});
        for (code, _) in Sex::VALUES {
            let mut value = base.clone();
            value["sex"] = json!(code);
            let record: Demographics = from_value(value).expect(code);
            assert_eq!(record.sex.as_str(), *code);
        }
        let mut value = base;
        value["sex"] = json!("Mann");
        let err = from_value::<Demographics>(value).expect_err("label is not a code");
        assert_eq!(err.constraint, Constraint::ValueSet);
        assert_eq!(err.path, "Demographics.sex");
    }

    #[test]
    fn social_uses_integer_codes() {
        let social: Social = from_value(json!({
            "education_level": 3,
            "martial_status": 2,
            "living_arrangements": "Samboer/lever i parforhold",
            "arbeidsstatus": 9,
        }))
        .expect("social");
        assert_eq!(social.education_level, EducationLevel::HigherShort);
        assert_eq!(social.martial_status, MaritalStatus::Married);
        assert!(to_json(&social).expect("json").contains("\"martial_status\": 2"));

        let err = from_value::<Social>(json!({
            "education_level": 5,
            "martial_status": 2,
            "living_arrangements": "Ukjent",
            "arbeidsstatus": 9,
        }))
        .expect_err("undeclared education level");
        assert_eq!(err.path, "Social.education_level");

        let meta = Social::META.field("arbeidsstatus").expect("field");
        assert_eq!(meta.terminology, Some("no.arbeidsstatus"));
    }

    #[test]
    fn stimulantia_keeps_source_spelling() {
        let yaml = "smoking_status: Tidligere røyker\npack_years: 20\n\
                    non_smoking_tobacco_status: Aldri brukt\nalcohol_abuse: TIdligere bruker\n";
        let record: Stimulantia = parse_yaml(yaml).expect("stimulantia");
        assert_eq!(record.alcohol_abuse, AlcoholUse::Former);
        assert!(record.month_since_stopping.is_none());

        let back: Stimulantia = parse_yaml(&to_yaml(&record).expect("yaml")).expect("reparse");
        assert_eq!(back, record);
    }

    #[test]
    fn function_status_requires_date() {
        let err = from_value::<FunctionStatus>(json!({"ecog_grade": 1}))
            .expect_err("missing date");
        assert_eq!(err.constraint, Constraint::Required);
        assert_eq!(err.path, "FunctionStatus.ecog_date");

        let err = from_value::<FunctionStatus>(json!({"ecog_grade": 1, "ecog_date": "01.02.2024"}))
            .expect_err("wrong date format");
        assert_eq!(err.path, "FunctionStatus.ecog_date");
    }

    #[test]
    fn comorbidity_optional_fields_and_equality() {
        let first: Comorbidity =
            from_value(json!({"comorbidity_date": "2023-11-02"})).expect("minimal");
        assert!(first.comorbidity_name.is_none());

        let second: Comorbidity = from_value(json!({
            "comorbidity_date": "2023-11-02",
            "comorbidity_name": null,
        }))
        .expect("explicit null");
        assert_eq!(first, second);

        let mut third = second.clone();
        third.comorbidity_code = Some("I10".into());
        assert_ne!(first, third);
    }

    #[test]
    fn vitals_reject_unknown_fields() {
        let err = from_value::<Vitals>(json!({
            "weight_at_diagnosis_kg": 80.0,
            "height_cm": 180.0,
            "bmi": 24.7,
        }))
        .expect_err("unknown field");
        assert_eq!(err.constraint, Constraint::UnknownField);
        assert_eq!(err.path, "Vitals.bmi");
    }
}
