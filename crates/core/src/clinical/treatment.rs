use crate::codes::{
    SurgeryTarget, SystemicCategory, TherapeuticIntent, TreatmentIntention, TreatmentType,
};
use crate::ids::OisCourseId;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use crate::validation::{Constraint, ValidationError};
use chrono::NaiveDate;
use norpreg_types::NonEmptyText;
use serde::{Deserialize, Serialize};

const NKPK_CODE: FieldMeta = FieldMeta::new("procedure_nkpk_code", FieldKind::Text)
    .title("Prosedyrekode")
    .terminology("NKPK");

const NKPK_DESCRIPTION: FieldMeta =
    FieldMeta::new("procedure_nkpk_description", FieldKind::Text).title("Prosedyrebeskrivelse");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentRadiotherapy {
    pub course_id: OisCourseId,
    pub procedure_nkpk_code: NonEmptyText,
    pub procedure_nkpk_description: String,
}

impl Entity for TreatmentRadiotherapy {
    const META: &'static EntityMeta = &EntityMeta {
        name: "TreatmentRadiotherapy",
        title: "Strålebehandling",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("course_id", FieldKind::Text)
                .title("Course ID")
                .description("Behandlingsforløpets ID i stråleterapisystemet"),
            NKPK_CODE,
            NKPK_DESCRIPTION,
        ],
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentSurgery {
    pub procedure_nkpk_code: NonEmptyText,
    pub procedure_nkpk_description: String,
    pub surgery_target: SurgeryTarget,
    pub surgery_date: NaiveDate,
}

impl Entity for TreatmentSurgery {
    const META: &'static EntityMeta = &EntityMeta {
        name: "TreatmentSurgery",
        title: "Kirurgi",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            NKPK_CODE,
            NKPK_DESCRIPTION,
            FieldMeta::new("surgery_target", FieldKind::Code)
                .title("Operert område")
                .values(SurgeryTarget::VALUES),
            FieldMeta::new("surgery_date", FieldKind::Date)
                .title("Operasjonsdato")
                .unit("YYYY-MM-DD"),
        ],
    };
}

/// A drug, agent or regimen given systemically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentSystemic {
    pub systemic_name: NonEmptyText,
    pub category: SystemicCategory,
    pub therapeutic_intent: TherapeuticIntent,
    pub total_dosage_value: f64,
    pub total_dosage_unit: String,
    pub dosage_start_date: NaiveDate,
    pub dosage_stop_date: NaiveDate,
}

impl Entity for TreatmentSystemic {
    const META: &'static EntityMeta = &EntityMeta {
        name: "TreatmentSystemic",
        title: "Systemisk behandling",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("systemic_name", FieldKind::Text)
                .title("Legemiddel")
                .description("Navn på legemiddel, virkestoff eller kur"),
            FieldMeta::new("category", FieldKind::Code)
                .title("Kategori")
                .values(SystemicCategory::VALUES),
            FieldMeta::new("therapeutic_intent", FieldKind::Code)
                .title("Tidspunkt")
                .values(TherapeuticIntent::VALUES),
            FieldMeta::new("total_dosage_value", FieldKind::Float).title("Total dose"),
            FieldMeta::new("total_dosage_unit", FieldKind::Text).title("Enhet for total dose"),
            FieldMeta::new("dosage_start_date", FieldKind::Date)
                .title("Startdato")
                .unit("YYYY-MM-DD"),
            FieldMeta::new("dosage_stop_date", FieldKind::Date)
                .title("Sluttdato")
                .unit("YYYY-MM-DD"),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        if self.dosage_stop_date < self.dosage_start_date {
            return Err(ValidationError::new(
                "dosage_stop_date",
                Constraint::Range,
                format!(
                    "stop date {} is before start date {}",
                    self.dosage_stop_date, self.dosage_start_date
                ),
            ));
        }
        Ok(())
    }
}

/// Overall treatment intent, with the modalities given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreatmentSummary {
    pub treatment_intention: TreatmentIntention,
    pub treatment_type: TreatmentType,
    #[serde(default)]
    pub treatment_radiotherapy: Option<TreatmentRadiotherapy>,
    #[serde(default)]
    pub treatment_systemic: Option<TreatmentSystemic>,
    #[serde(default)]
    pub treatment_surgery: Option<TreatmentSurgery>,
}

impl Entity for TreatmentSummary {
    const META: &'static EntityMeta = &EntityMeta {
        name: "TreatmentSummary",
        title: "Behandlingsoversikt",
        description: "",
        domain: Domain::Clinical,
        fields: &[
            FieldMeta::new("treatment_intention", FieldKind::Code)
                .title("Behandlingsintensjon")
                .values(TreatmentIntention::VALUES),
            FieldMeta::new("treatment_type", FieldKind::Code)
                .title("Behandlingstype")
                .values(TreatmentType::VALUES),
            FieldMeta::new(
                "treatment_radiotherapy",
                FieldKind::Entity("TreatmentRadiotherapy"),
            )
            .title("Strålebehandling")
            .optional(),
            FieldMeta::new("treatment_systemic", FieldKind::Entity("TreatmentSystemic"))
                .title("Systemisk behandling")
                .optional(),
            FieldMeta::new("treatment_surgery", FieldKind::Entity("TreatmentSurgery"))
                .title("Kirurgi")
                .optional(),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(systemic) = &self.treatment_systemic {
            systemic
                .validate()
                .map_err(|err| err.within("treatment_systemic"))?;
        }
        Ok(())
    }
}
