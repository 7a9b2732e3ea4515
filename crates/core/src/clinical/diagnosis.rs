use crate::codes::TnmType;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{required_nullable, validate_children, Entity};
use crate::validation::ValidationError;
use chrono::NaiveDate;
use norpreg_types::NonEmptyText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimaryDiagnosis {
    pub diagnosis_name: String,
    pub diagnosis_code: NonEmptyText,
    pub diagnosis_term: String,
    pub diagnosis_edition: String,
    pub multiple_primaries: bool,
    #[serde(default)]
    pub diagnosis_localisation: Option<String>,
    pub diagnosis_date: NaiveDate,
    pub diagnosis_method: String,
}

impl Entity for PrimaryDiagnosis {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PrimaryDiagnosis",
        title: "Primærdiagnose",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("diagnosis_name", FieldKind::Text).title("Diagnosenavn"),
            FieldMeta::new("diagnosis_code", FieldKind::Text)
                .title("Diagnosekode")
                .terminology("ICD-10"),
            FieldMeta::new("diagnosis_term", FieldKind::Text).title("Diagnoseterm"),
            FieldMeta::new("diagnosis_edition", FieldKind::Text).title("Utgave av kodeverket"),
            FieldMeta::new("multiple_primaries", FieldKind::Boolean)
                .title("Flere primærtumorer"),
            FieldMeta::new("diagnosis_localisation", FieldKind::Text)
                .title("Lokalisasjon")
                .optional(),
            FieldMeta::new("diagnosis_date", FieldKind::Date)
                .title("Diagnosedato")
                .unit("YYYY-MM-DD"),
            FieldMeta::new("diagnosis_method", FieldKind::Text).title("Diagnosemetode"),
        ],
    };
}

/// TNM staging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Staging {
    pub tnm_t: String,
    pub tnm_n: String,
    pub tnm_m: String,
    pub tnm_string: String,
    pub tnm_edition: String,
    #[serde(default)]
    pub tnm_stage: Option<String>,
    pub tnm_type: TnmType,
    #[serde(default)]
    pub other_type: Option<String>,
    #[serde(default)]
    pub other_grade: Option<String>,
    pub is_relapse: bool,
    pub staging_date: NaiveDate,
}

impl Entity for Staging {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Staging",
        title: "Stadieinndeling",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("tnm_t", FieldKind::Text).title("T"),
            FieldMeta::new("tnm_n", FieldKind::Text).title("N"),
            FieldMeta::new("tnm_m", FieldKind::Text).title("M"),
            FieldMeta::new("tnm_string", FieldKind::Text).title("TNM-streng"),
            FieldMeta::new("tnm_edition", FieldKind::Text).title("TNM-utgave"),
            FieldMeta::new("tnm_stage", FieldKind::Text)
                .title("Stadium")
                .optional(),
            FieldMeta::new("tnm_type", FieldKind::Code)
                .title("TNM-type")
                .description("Klinisk, patologisk, ukjent eller etter behandling")
                .values(TnmType::VALUES),
            FieldMeta::new("other_type", FieldKind::Text)
                .title("Annen stadieinndeling")
                .optional(),
            FieldMeta::new("other_grade", FieldKind::Text)
                .title("Annen gradering")
                .optional(),
            FieldMeta::new("is_relapse", FieldKind::Boolean).title("Residiv"),
            FieldMeta::new("staging_date", FieldKind::Date)
                .title("Dato for stadieinndeling")
                .unit("YYYY-MM-DD"),
        ],
    };
}

/// Metastasis status. `metastasis_localisation` must be sent, but may be `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metastasis {
    pub metastasis_diagnosed: bool,
    #[serde(deserialize_with = "required_nullable")]
    pub metastasis_localisation: Option<String>,
}

impl Entity for Metastasis {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Metastasis",
        title: "Metastaser",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("metastasis_diagnosed", FieldKind::Boolean)
                .title("Metastaser påvist"),
            FieldMeta::new("metastasis_localisation", FieldKind::Text)
                .title("Lokalisasjon av metastaser")
                .description("Må oppgis, men kan være tom"),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Histology {
    pub histological_celltype_code: String,
    pub histological_celltype_description: String,
    pub topographical_mapping_code: String,
    pub topographical_mapping_description: String,
}

impl Entity for Histology {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Histology",
        title: "Histologi",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("histological_celltype_code", FieldKind::Text)
                .title("Morfologikode"),
            FieldMeta::new("histological_celltype_description", FieldKind::Text)
                .title("Morfologi"),
            FieldMeta::new("topographical_mapping_code", FieldKind::Text)
                .title("Topografikode"),
            FieldMeta::new("topographical_mapping_description", FieldKind::Text)
                .title("Topografi"),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Genetics {
    pub amino_acid_changes: String,
}

impl Entity for Genetics {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Genetics",
        title: "Genetikk",
        description: "",
        domain: Domain::Clinical,
        fields: &[FieldMeta::new("amino_acid_changes", FieldKind::Text)
            .title("Aminosyreendringer")],
    };
}

/// One earlier cancer diagnosis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviousCancerItem {
    pub previous_cancer_icd10_code: NonEmptyText,
    pub previous_cancer_icd10_description: String,
    #[serde(default)]
    pub previous_cancer_laterality: Option<String>,
    #[serde(default)]
    pub previous_cancer_localisation: Option<String>,
    pub previous_cancer_diagnosis_year: u16,
    pub previous_cancer_rt_given: bool,
}

impl Entity for PreviousCancerItem {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PreviousCancerItem",
        title: "Tidligere kreftdiagnose",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("previous_cancer_icd10_code", FieldKind::Text)
                .title("ICD-10-kode")
                .terminology("ICD-10"),
            FieldMeta::new("previous_cancer_icd10_description", FieldKind::Text)
                .title("ICD-10-beskrivelse"),
            FieldMeta::new("previous_cancer_laterality", FieldKind::Text)
                .title("Lateralitet")
                .optional(),
            FieldMeta::new("previous_cancer_localisation", FieldKind::Text)
                .title("Lokalisasjon")
                .optional(),
            FieldMeta::new("previous_cancer_diagnosis_year", FieldKind::Integer)
                .title("Diagnoseår"),
            FieldMeta::new("previous_cancer_rt_given", FieldKind::Boolean)
                .title("Strålebehandlet"),
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviousCancer {
    pub is_previous_cancer: bool,
    pub previous_cancer: Vec<PreviousCancerItem>,
}

impl Entity for PreviousCancer {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PreviousCancer",
        title: "Tidligere kreft",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("is_previous_cancer", FieldKind::Boolean)
                .title("Tidligere kreft"),
            FieldMeta::new("previous_cancer", FieldKind::List("PreviousCancerItem"))
                .title("Tidligere kreftdiagnoser"),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        validate_children("previous_cancer", &self.previous_cancer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_json, to_json};
    use crate::validation::Constraint;
    use serde_json::json;

    fn staging() -> serde_json::Value {
        json!({
            "tnm_t": "T2",
            "tnm_n": "N1",
            "tnm_m": "M0",
            "tnm_string": "cT2N1M0",
            "tnm_edition": "8",
            "tnm_type": "C",
            "is_relapse": false,
            "staging_date": "2024-02-20",
        })
    }

    #[test]
    fn staging_accepts_each_tnm_type() {
        for (code, _) in TnmType::VALUES {
            let mut value = staging();
            value["tnm_type"] = json!(code);
            let record: Staging = from_value(value).expect(code);
            assert_eq!(record.tnm_type.as_str(), *code);
            assert!(record.tnm_stage.is_none());
        }

        let mut value = staging();
        value["tnm_type"] = json!("YP");
        let err = from_value::<Staging>(value).expect_err("case matters");
        assert_eq!(err.constraint, Constraint::ValueSet);
    }

    #[test]
    fn metastasis_localisation_must_be_present() {
        let record: Metastasis = from_value(json!({
            "metastasis_diagnosed": false,
            "metastasis_localisation": null,
        }))
        .expect("explicit null");
        assert!(record.metastasis_localisation.is_none());

        let err = from_value::<Metastasis>(json!({"metastasis_diagnosed": true}))
            .expect_err("absent");
        assert_eq!(err.constraint, Constraint::Required);
        assert_eq!(err.path, "Metastasis.metastasis_localisation");
    }

    #[test]
    fn diagnosis_code_must_not_be_blank() {
        let value = json!({
            "diagnosis_name": "Lungekreft",
            "diagnosis_code": "  ",
            "diagnosis_term": "Ondartet svulst i bronkie og lunge",
            "diagnosis_edition": "ICD-10 2024",
            "multiple_primaries": false,
            "diagnosis_date": "2024-01-03",
            "diagnosis_method": "Biopsi",
        });
        let err = from_value::<PrimaryDiagnosis>(value.clone()).expect_err("blank code");
        assert_eq!(err.path, "PrimaryDiagnosis.diagnosis_code");

        let mut value = value;
        value["diagnosis_code"] = json!(" C34.1 ");
        let record: PrimaryDiagnosis = from_value(value).expect("trimmed code");
        assert_eq!(record.diagnosis_code.as_str(), "C34.1");
    }

    #[test]
    fn previous_cancer_list_round_trips() {
        let record: PreviousCancer = from_value(json!({
            "is_previous_cancer": true,
            "previous_cancer": [{
                "previous_cancer_icd10_code": "C50",
                "previous_cancer_icd10_description": "Brystkreft",
                "previous_cancer_diagnosis_year": 2009,
                "previous_cancer_rt_given": true,
            }],
        }))
        .expect("previous cancer");
        assert_eq!(record.previous_cancer.len(), 1);

        let back: PreviousCancer = parse_json(&to_json(&record).expect("json")).expect("reparse");
        assert_eq!(back, record);

        let err = from_value::<PreviousCancer>(json!({
            "is_previous_cancer": true,
            "previous_cancer": [{"previous_cancer_icd10_code": "C50"}],
        }))
        .expect_err("incomplete item");
        assert_eq!(
            err.path,
            "PreviousCancer.previous_cancer[0].previous_cancer_icd10_description"
        );
    }

    #[test]
    fn previous_cancer_list_is_required() {
        let err = from_value::<PreviousCancer>(json!({"is_previous_cancer": false}))
            .expect_err("list missing");
        assert_eq!(err.path, "PreviousCancer.previous_cancer");
    }
}
