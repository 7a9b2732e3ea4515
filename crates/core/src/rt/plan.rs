use super::{course_id, plan_uid, RECORD_ID};
use crate::ids::OisCourseId;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use crate::timestamp::Timestamp;
use crate::validation::{check_unit_interval, ValidationError};
use dicom::{DicomDate, DicomUid, PatientPosition};
use norpreg_keys::PatientKey;
use serde::{Deserialize, Serialize};

const fn optional(name: &'static str, kind: FieldKind, title: &'static str) -> FieldMeta {
    FieldMeta::new(name, kind).title(title).optional()
}

/// A treatment plan, combining RT Plan content with delivered totals from the RT Records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub record_id: Option<PatientKey>,
    pub plan_course_id: Option<OisCourseId>,
    pub plan_uid: Option<DicomUid>,
    pub ct_study_date: Option<DicomDate>,
    pub plan_datetime: Option<Timestamp>,
    pub struct_datetime: Option<Timestamp>,
    pub dose_datetime: Option<Timestamp>,
    pub plan_label_raw: Option<String>,
    /// `NN` or `NN.M`; kept as text since labels may carry leading zeros.
    pub plan_number: Option<String>,
    pub plan_name: Option<String>,
    pub total_dose_planned: Option<f64>,
    pub total_dose_delivered: Option<f64>,
    pub fx_dose_planned: Option<f64>,
    pub fxs_planned: Option<u32>,
    pub fxs_delivered: Option<u32>,
    pub fx_delivered_from: Option<u32>,
    pub fx_delivered_to: Option<u32>,
    pub fx_delivered_from_datetime: Option<Timestamp>,
    pub fx_delivered_to_datetime: Option<Timestamp>,
    pub plan_completion: Option<f64>,
    pub beam_count: Option<u32>,
    pub patient_orientation: Option<PatientPosition>,
    pub tps_manufacturer: Option<String>,
    pub tps_software_name: Option<String>,
    pub tps_software_version: Option<String>,
    pub tx_modality: Option<String>,
    pub tx_time: Option<f64>,
    pub total_mu: Option<f64>,
    pub dose_grid_res_x: Option<f64>,
    pub dose_grid_res_y: Option<f64>,
    pub heterogeneity_correction: Option<String>,
    pub complexity: Option<f64>,
}

impl Entity for Plan {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Plan",
        title: "Oversikt over en behandlingsplan",
        description: "Inneholder både informasjon fra RT Plan-filen, men også fra RT Record for \
                      å beregne leverte doser",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("plan_course_id", "FK Plan - Course ID"),
            FieldMeta::new("plan_uid", FieldKind::Uid)
                .title("Plan SOP Instance UID")
                .description("Denne RT Plan filens SOP Instance UID, brukes for å koble mot denne")
                .dicom("(0008,0018)")
                .optional(),
            optional("ct_study_date", FieldKind::DicomDate, "CT Study date")
                .description("Dato for Plan CT")
                .dicom("(0008,0020)"),
            optional("plan_datetime", FieldKind::DateTime, "RT Plan datetime")
                .description("Dato og tid for godkjent behandlingsplan"),
            optional("struct_datetime", FieldKind::DateTime, "RT Structure datetime")
                .description("Dato og tid for inntegnede strukturer"),
            optional("dose_datetime", FieldKind::DateTime, "RT Dose datetime")
                .description("Dato og tid for dosevolum"),
            optional("plan_label_raw", FieldKind::Text, "Plan label raw")
                .description("Plannavn (label) som angitt hos OIS"),
            optional("plan_number", FieldKind::Text, "Plan number").description(
                "Plannummer, NN eller NN.M, som tolket fra OIS. Angir behandlingsserie.replan",
            ),
            optional("plan_name", FieldKind::Text, "Plan name")
                .description("Plannavn uten plannummer"),
            optional("total_dose_planned", FieldKind::Float, "Total dose planned")
                .description("Planlagt dose i Gy i denne behandlingsplanen. Hentet fra RT Plan")
                .unit("Gy"),
            optional("total_dose_delivered", FieldKind::Float, "Total dose delivered")
                .description(
                    "Levert dose i Gy i denne behandlingsplanen. Beregnet som summert dose til \
                     (primært) normeringsvolum i hver behandlingsfraksjon / RT Record",
                )
                .unit("Gy"),
            optional("fx_dose_planned", FieldKind::Float, "Fraction dose planned")
                .description("Planlagt fraksjonsdose")
                .unit("Gy"),
            optional("fxs_planned", FieldKind::Integer, "Number of fractions planned")
                .description("Planlagt antall fraksjoner"),
            optional("fxs_delivered", FieldKind::Integer, "Number of fractions delivered")
                .description(
                    "Levert antall fraksjoner (fra tilhørende identifiserte \
                     behandlingsfraksjoner)",
                ),
            optional("fx_delivered_from", FieldKind::Integer, "Fraction number delivered from")
                .description(
                    "Minste fraksjonsnummer funnet i denne behandlingsplanen. Relevant for \
                     replanlegging",
                ),
            optional("fx_delivered_to", FieldKind::Integer, "Fraction number delivered to")
                .description(
                    "Største fraksjonsnummer funnet i denne behandlingsplanen. Relevant for \
                     replanlegging",
                ),
            optional(
                "fx_delivered_from_datetime",
                FieldKind::DateTime,
                "Fraction datetime delivered from",
            )
            .description("Første fraksjonsdato funnet i denne behandlingsplanen"),
            optional(
                "fx_delivered_to_datetime",
                FieldKind::DateTime,
                "Fraction datetime delivered to",
            )
            .description("Siste fraksjonsdato funnet i denne behandlingsplanen"),
            optional("plan_completion", FieldKind::Float, "Plan completion").description(
                "Hvor mye av dose til normeringsvolum er levert i henhold til planlagt for hele \
                 behandlingsplanen. Angis som tall mellom 0 (ingenting levert) og 1 (levert som \
                 planlagt)",
            ),
            optional("beam_count", FieldKind::Integer, "Beam count")
                .description("Antall behandlingsfelt i denne behandlingsplanen"),
            optional("patient_orientation", FieldKind::Code, "Patient orientation")
                .description("Pasientens leie")
                .values(PatientPosition::VALUES)
                .dicom("(0018,5100)"),
            optional("tps_manufacturer", FieldKind::Text, "TPS manufacturer")
                .description(
                    "Leverandør av programvare for behandlingsplan (TPS, Treatment Planning \
                     System)",
                )
                .dicom("(0008,0070)"),
            optional("tps_software_name", FieldKind::Text, "TPS software name")
                .description(
                    "Navn på programvare for behandlingsplan (TPS, Treatment Planning System)",
                )
                .dicom("(0008,1090)"),
            optional("tps_software_version", FieldKind::Text, "TPS software version")
                .description(
                    "Versjon av programvare for behandlingsplan (TPS, Treatment Planning System)",
                )
                .dicom("(0018,1020)"),
            optional("tx_modality", FieldKind::Text, "Treatment modality")
                .description("Behandlingsmodalitet"),
            optional("tx_time", FieldKind::Float, "Treatment time")
                .description("Behandlingstid, kun relevant for brakyterapi")
                .unit("s"),
            optional("total_mu", FieldKind::Float, "Total MUs")
                .description("Totalt antall Monitor Units (MUs) for hele behandlingsplanen"),
            optional("dose_grid_res_x", FieldKind::Float, "Dose grid resolution X")
                .description("Oppløsning i dosegrid i X-retning, i mm")
                .unit("mm"),
            optional("dose_grid_res_y", FieldKind::Float, "Dose grid resolution Y")
                .description("Oppløsning i dosegrid i Y-retning, i mm")
                .unit("mm"),
            optional("heterogeneity_correction", FieldKind::Text, "Heterogeneity correction")
                .description("Heterogeneitetskorreksjon for doseberegning"),
            optional("complexity", FieldKind::Float, "Plan complexity").description(
                "Young's plankompleksitet, beregnet ved jevn vekting i X- og Y- planet \
                 (c1=c2=1). MU-vektet sum av hver beams kompleksitet, som igjen er en MU-vektet \
                 sum av kontrollpunktenes kompleksitet.",
            ),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_unit_interval("plan_completion", self.plan_completion)
    }
}

/// One delivered treatment fraction, read from an RT Record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fraction {
    pub record_id: Option<PatientKey>,
    pub fx_course_id: Option<OisCourseId>,
    pub fx_plan_uid: Option<DicomUid>,
    pub treatment_machine_name: Option<String>,
    pub treatment_machine_model: Option<String>,
    pub fx_dose_delivered: Option<f64>,
    pub fx_datetime: Option<Timestamp>,
    pub fx_number: Option<u32>,
    pub fx_mu_delivered: Option<f64>,
    pub fx_mu_planned: Option<f64>,
    pub fx_time_delivered: Option<f64>,
    pub cumulative_dose_delivered: Option<f64>,
    pub termination_status: Option<String>,
    pub termination_code: Option<String>,
    pub verification_status: Option<String>,
    pub fx_completion: Option<f64>,
}

impl Entity for Fraction {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Fraction",
        title: "Oversikt over hver behandlingsfraksjon",
        description: "Som hentet fra RT Record",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("fx_course_id", "FK Fraction - Course ID"),
            plan_uid("fx_plan_uid", "FK Fraction - Plan UID"),
            optional("treatment_machine_name", FieldKind::Text, "Treatment machine station name")
                .description("Lokalt definert navn på behandlingsapparat")
                .dicom("(0008,1010)"),
            optional("treatment_machine_model", FieldKind::Text, "Treatment machine model name")
                .description("Modellnavn på behandlingsapparat")
                .dicom("(0008,1090)"),
            optional("fx_dose_delivered", FieldKind::Float, "Fraction dose (delivered)")
                .description("Levert dose i Gy for denne behandlingsfraksjonen.")
                .unit("Gy"),
            optional("fx_datetime", FieldKind::DateTime, "Fraction datetime")
                .description("Dato og tid for behandlingsfraksjon"),
            optional("fx_number", FieldKind::Integer, "Fraction number")
                .description("Fraksjonsnummer (økende per fraksjon)"),
            optional("fx_mu_delivered", FieldKind::Float, "Fraction MUs delivered").description(
                "Antall Monitor Units (MU) levert for denne behandlingsfraksjonen",
            ),
            optional("fx_mu_planned", FieldKind::Float, "Fraction MUs planned").description(
                "Antall Monitor Units (MU) planlagt for denne behandlingsfraksjonen",
            ),
            optional("fx_time_delivered", FieldKind::Float, "Fraction time delivered")
                .description("Lengde i tid i sekunder for denne behandlingsfraksjonen")
                .unit("s"),
            optional("cumulative_dose_delivered", FieldKind::Float, "Cumulative dose delivered")
                .description("Kumulativ dose i Gy så langt for denne behandlingsplanen")
                .unit("Gy"),
            optional("termination_status", FieldKind::Text, "Termination status")
                .description("Termineringsstatus for denne behandlingsfraksjonen"),
            optional("termination_code", FieldKind::Text, "Termination code")
                .description("Termineringskode for denne behandlingsfraksjonen"),
            optional("verification_status", FieldKind::Text, "Verification status")
                .description("Verifikasjonsstatus for denne behandlingsfraksjonen"),
            optional("fx_completion", FieldKind::Float, "Fraction completion").description(
                "Hvor mye av dose til normeringsvolum er levert i henhold til planlagt i denne \
                 fraksjonen. Angis som tall mellom 0 (ingenting levert) og 1 (levert som \
                 planlagt)",
            ),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_unit_interval("fx_completion", self.fx_completion)
    }
}

/// A dose reference: the primary normalisation volume and any supporting ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoseReference {
    pub record_id: Option<PatientKey>,
    pub dr_course_id: Option<OisCourseId>,
    pub dr_plan_uid: Option<DicomUid>,
    pub ref_dr_name: Option<String>,
    pub dr_type: Option<String>,
    pub dr_ref_type: Option<String>,
    pub dr_dose_planned: Option<f64>,
    pub dr_dose_delivered: Option<f64>,
    pub dr_max_dose: Option<f64>,
    pub dr_is_primary: Option<bool>,
}

impl Entity for DoseReference {
    const META: &'static EntityMeta = &EntityMeta {
        name: "DR",
        title: "Oversikt over normeringsvolum",
        description: "Både det primære som brukes som mål på fraksjonsdose og \
                      støtte-normeringsvolum",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("dr_course_id", "FK Dose Reference - Course ID"),
            plan_uid("dr_plan_uid", "FK Dose Reference - Plan UID"),
            optional("ref_dr_name", FieldKind::Text, "Referenced Dose Reference name")
                .description("Navn på normeringsvolum")
                .dicom("(300A,0016)"),
            optional("dr_type", FieldKind::Text, "Dose Reference structure type")
                .description("Strukturtype på normeringsvolum (punkt, volum, ...)")
                .dicom("(300A,0014)"),
            optional("dr_ref_type", FieldKind::Text, "Dose Reference type")
                .description("Kategori av normeringsvolum (målvolum eller risikoorgan)")
                .dicom("(300A,0020)"),
            optional("dr_dose_planned", FieldKind::Float, "Planned dose to Dose Reference")
                .description("Planlagt dose i Gy til normeringsvolum")
                .unit("Gy"),
            optional("dr_dose_delivered", FieldKind::Float, "Delivered dose to Dose Reference")
                .description(
                    "Levert dose i Gy til normeringsvolum, som summert fra behandlingsfraksjonene",
                )
                .unit("Gy"),
            optional("dr_max_dose", FieldKind::Float, "Max dose to Dose Reference")
                .description("Største tillatt dose i Gy til normeringsvolum")
                .unit("Gy"),
            optional("dr_is_primary", FieldKind::Boolean, "Is the Dose Reference primary")
                .description(
                    "Er det primært normeringsvolum? Brukes til beregning av leverte doser",
                ),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_yaml, to_yaml};
    use crate::validation::Constraint;
    use serde_json::json;

    #[test]
    fn plan_round_trips_with_dicom_values() {
        let plan: Plan = from_value(json!({
            "record_id": "a72bf40",
            "plan_course_id": "C1",
            "plan_uid": "1.2.246.352.71.5.1",
            "ct_study_date": "20231130",
            "plan_datetime": "2023-12-04T14:05:00",
            "plan_number": "01.1",
            "total_dose_planned": 60.0,
            "fxs_planned": 30,
            "plan_completion": 1.0,
            "patient_orientation": "HFS",
        }))
        .expect("plan");
        assert_eq!(plan.patient_orientation, Some(PatientPosition::Hfs));
        assert_eq!(plan.plan_number.as_deref(), Some("01.1"));

        let back: Plan = parse_yaml(&to_yaml(&plan).expect("yaml")).expect("reparse");
        assert_eq!(back, plan);
    }

    #[test]
    fn patient_orientation_is_a_closed_set() {
        let err = from_value::<Plan>(json!({"patient_orientation": "HFX"}))
            .expect_err("undeclared position");
        assert_eq!(err.constraint, Constraint::ValueSet);
        assert_eq!(err.path, "Plan.patient_orientation");
    }

    #[test]
    fn completion_must_lie_in_unit_interval() {
        let err = from_value::<Plan>(json!({"plan_completion": 1.2})).expect_err("over 1");
        assert_eq!(err.constraint, Constraint::Range);
        assert_eq!(err.path, "Plan.plan_completion");

        let err = from_value::<Fraction>(json!({"fx_completion": -0.1})).expect_err("under 0");
        assert_eq!(err.path, "Fraction.fx_completion");

        for value in [0.0, 0.5, 1.0] {
            assert!(from_value::<Fraction>(json!({"fx_completion": value})).is_ok());
        }
    }

    #[test]
    fn fraction_number_must_be_a_count() {
        let err = from_value::<Fraction>(json!({"fx_number": 1.5})).expect_err("fractional");
        assert_eq!(err.constraint, Constraint::Type);
        assert_eq!(err.path, "Fraction.fx_number");
    }

    #[test]
    fn dose_reference_equality_tracks_fields() {
        let primary: DoseReference = from_value(json!({
            "ref_dr_name": "PTV",
            "dr_dose_planned": 60.0,
            "dr_is_primary": true,
        }))
        .expect("dose reference");
        let same: DoseReference = from_value(json!({
            "dr_is_primary": true,
            "dr_dose_planned": 60.0,
            "ref_dr_name": "PTV",
        }))
        .expect("reordered");
        assert_eq!(primary, same);

        let mut other = primary.clone();
        other.dr_is_primary = Some(false);
        assert_ne!(other, primary);
    }
}
