use super::FK_PATIENT_KEY;
use crate::codes::ExportMechanism;
use crate::ids::{CourseId, ExportId, PatientExportId, RegistryExportId, RegistryId, StudyId};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{check_parent, validate_children, Entity};
use crate::timestamp::Timestamp;
use crate::validation::ValidationError;
use norpreg_keys::{ExportPseudoKey, PatientKey};
use norpreg_types::Encrypted;
use serde::{Deserialize, Serialize};

const FK_EXPORT_ID: FieldMeta = FieldMeta::new("fk_export_id", FieldKind::Integer)
    .title("FK export ID")
    .description("Koblingsnøkkel til utleveringstabell");

/// A research study or quality project that receives data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Study {
    pub id: StudyId,
    pub conquest_name: String,
    pub description_aes: Encrypted<String>,
    pub contact_person_aes: Encrypted<String>,
    pub institution_aes: Encrypted<String>,
    pub email_aes: Encrypted<String>,
    pub store_until: Timestamp,
    #[serde(default)]
    pub exports: Vec<Export>,
}

impl Entity for Study {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Study",
        title: "Forskningsstudie / kvalitetsprosjekt",
        description: "Mottaker av datautleveringer.",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for studien")
                .description("Dannes automatisk ved opprettelse av ny studie"),
            FieldMeta::new("conquest_name", FieldKind::Text)
                .title("Conquest PACS AES title")
                .description(
                    "Navnet på Conquest-instansen som er knyttet til dette studiet dersom det \
                     finnes",
                ),
            FieldMeta::new("description_aes", FieldKind::Text)
                .title("Studienavn")
                .description("Navn på studien eller kvalitetsprosjektet")
                .encrypted(),
            FieldMeta::new("contact_person_aes", FieldKind::Text)
                .title("Kontaktperson")
                .description("Registerets kontaktperson for denne studien")
                .encrypted(),
            FieldMeta::new("institution_aes", FieldKind::Text)
                .title("Institusjon")
                .description("Hvor ledes studien fra")
                .encrypted(),
            FieldMeta::new("email_aes", FieldKind::Text)
                .title("Epost-adresse")
                .description("Epost-adresse hvor kontaktpersonen kan nås")
                .encrypted(),
            FieldMeta::new("store_until", FieldKind::DateTime)
                .title("Datavarighet")
                .description(
                    "Etter denne datoen slettes de ekstra dataene som er lagret for denne studien",
                ),
            FieldMeta::list("exports", "Export")
                .title("Datautleveringer")
                .description("Hvilke datautleveringer som er knyttet mot denne studien"),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_parent("exports", "fk_study_id", &self.exports, &self.id, |e| {
            &e.fk_study_id
        })?;
        validate_children("exports", &self.exports)
    }
}

/// One data release to a study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Export {
    pub id: ExportId,
    pub fk_study_id: StudyId,
    #[serde(default)]
    pub patient_exports: Vec<PatientExport>,
    #[serde(default)]
    pub registry_exports: Vec<RegistryExport>,
    pub export_date: Timestamp,
    pub contact_person_aes: Encrypted<String>,
    pub institution_aes: Encrypted<String>,
    pub email_aes: Encrypted<String>,
    pub mechanism: ExportMechanism,
    pub is_pseudo: bool,
}

impl Entity for Export {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Export",
        title: "Datautlevering",
        description: "",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for utleveringen")
                .description("Dannes automatisk ved opprettelse av ny utlevering"),
            FieldMeta::new("fk_study_id", FieldKind::Integer)
                .title("FK study ID")
                .description(
                    "Koblingsnøkkel mot forskningsstudie / kvalitetsprosjekt for datautlevering",
                ),
            FieldMeta::list("patient_exports", "PatientExport")
                .title("Pasientutleveringer")
                .description(
                    "Mange-til-mange liste for pasienteksporter med enkeltvise unike \
                     pseudonymiserte nøkler",
                ),
            FieldMeta::list("registry_exports", "RegistryExport")
                .title("Registerutleveringer")
                .description(
                    "Mange-til-mange liste for koblinger mot enkeltvise registre i denne \
                     utleveringen",
                ),
            FieldMeta::new("export_date", FieldKind::DateTime)
                .title("Utleveringsdato")
                .description("Dato denne utleveringen fant sted (ikke søknadsdato)"),
            FieldMeta::new("contact_person_aes", FieldKind::Text)
                .title("Kontaktperson")
                .description("Kontaktperson for denne enkeltvise utleveringen")
                .encrypted(),
            FieldMeta::new("institution_aes", FieldKind::Text)
                .title("Institusjon")
                .description("Institusjon for denne enkeltvise utleveringen")
                .encrypted(),
            FieldMeta::new("email_aes", FieldKind::Text)
                .title("Epost-adresse")
                .description("Epost-adresse for kontaktpersonen")
                .encrypted(),
            FieldMeta::new("mechanism", FieldKind::Code)
                .title("Utleveringsmekanisme")
                .description("Hvilken utleveringsmekanisme som er benyttet")
                .values(ExportMechanism::VALUES),
            FieldMeta::new("is_pseudo", FieldKind::Boolean)
                .title("Pseudonymiserte data")
                .description("Er data pseudonymiserte?"),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_parent("patient_exports", "fk_export_id", &self.patient_exports, &self.id, |e| {
            &e.fk_export_id
        })?;
        check_parent(
            "registry_exports",
            "fk_export_id",
            &self.registry_exports,
            &self.id,
            |e| &e.fk_export_id,
        )
    }
}

/// Link between one patient course and one export, carrying the per-release pseudonym.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientExport {
    pub id: PatientExportId,
    pub fk_patient_key: PatientKey,
    pub fk_course_id: CourseId,
    pub fk_export_id: ExportId,
    pub pseudo_key_aes: Encrypted<ExportPseudoKey>,
}

impl Entity for PatientExport {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PatientExport",
        title: "Pasient-eksport-koblingstabell",
        description: "Mange-til-mange koblingstabell for å håndtere pasientvise utleveringer",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for pasient-utleveringen")
                .description("Dannes automatisk ved opprettelse av ny pasient-utlevering"),
            FK_PATIENT_KEY,
            FieldMeta::new("fk_course_id", FieldKind::Integer)
                .title("FK course ID")
                .description("Koblingsnøkkel for behandlingsforløp"),
            FK_EXPORT_ID,
            FieldMeta::new("pseudo_key_aes", FieldKind::Key)
                .title("Pseudonymisert nøkkel")
                .description(
                    "Pseudonymiseringsnøkkel knyttet til denne pasienten i denne utleveringen. \
                     En 5-hex tilfeldig streng (1 M muligheter), om ikke annet ønskes",
                )
                .encrypted(),
        ],
    };
}

/// Link between one registry and one export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryExport {
    pub id: RegistryExportId,
    pub fk_registry_id: RegistryId,
    pub fk_export_id: ExportId,
}

impl Entity for RegistryExport {
    const META: &'static EntityMeta = &EntityMeta {
        name: "RegistryExport",
        title: "Register-eksport-koblingstabell",
        description: "Mange-til-mange koblingstabell for å håndtere registervise utleveringer",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for register-utlevering")
                .description("Dannes automatisk ved opprettelse av ny register-utlevering."),
            FieldMeta::new("fk_registry_id", FieldKind::Integer)
                .title("FK register ID")
                .description("Koblingsnøkkel mot register ID"),
            FK_EXPORT_ID,
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_yaml, to_yaml};
    use crate::registry::fixtures::PATIENT_KEY;
    use crate::validation::Constraint;
    use serde_json::{json, Value};

    fn export(id: u64, study_id: u64) -> Value {
        json!({
            "id": id,
            "fk_study_id": study_id,
            "export_date": "2025-03-01T12:00:00",
            "contact_person_aes": "enc:Kari",
            "institution_aes": "enc:OUS",
            "email_aes": "enc:kari@example.org",
            "mechanism": "Filsluse",
            "is_pseudo": true,
        })
    }

    fn patient_export(id: u64, export_id: u64) -> Value {
        json!({
            "id": id,
            "fk_patient_key": PATIENT_KEY,
            "fk_course_id": 3,
            "fk_export_id": export_id,
            "pseudo_key_aes": "1f2e3",
        })
    }

    fn study(exports: Vec<Value>) -> Value {
        json!({
            "id": 10,
            "conquest_name": "CQ_STUDY",
            "description_aes": "enc:Lunge",
            "contact_person_aes": "enc:Ola",
            "institution_aes": "enc:HUS",
            "email_aes": "enc:ola@example.org",
            "store_until": "2030-12-31T00:00:00",
            "exports": exports,
        })
    }

    #[test]
    fn study_with_exports_round_trips_through_yaml() {
        let mut first = export(1, 10);
        first["patient_exports"] = json!([patient_export(5, 1)]);
        first["registry_exports"] = json!([{"id": 1, "fk_registry_id": 2, "fk_export_id": 1}]);
        let study: Study = from_value(study(vec![first, export(2, 10)])).expect("valid study");
        assert_eq!(study.exports.len(), 2);
        assert_eq!(
            study.exports[0].patient_exports[0].pseudo_key_aes.expose().as_str(),
            "1f2e3"
        );

        let yaml = to_yaml(&study).expect("serialize");
        let back: Study = parse_yaml(&yaml).expect("reparse");
        assert_eq!(back, study);
    }

    #[test]
    fn export_of_another_study_is_rejected() {
        let err = from_value::<Study>(study(vec![export(1, 10), export(2, 11)]))
            .expect_err("foreign export");
        assert_eq!(err.constraint, Constraint::Relation);
        assert_eq!(err.path, "Study.exports[1].fk_study_id");
    }

    #[test]
    fn nested_links_must_reference_their_export() {
        let mut value = export(1, 10);
        value["patient_exports"] = json!([patient_export(5, 2)]);
        let err = from_value::<Study>(study(vec![value])).expect_err("link to other export");
        assert_eq!(err.path, "Study.exports[0].patient_exports[0].fk_export_id");

        let mut value = export(1, 10);
        value["registry_exports"] = json!([{"id": 1, "fk_registry_id": 2, "fk_export_id": 9}]);
        let err = from_value::<Export>(value).expect_err("registry link to other export");
        assert_eq!(err.path, "Export.registry_exports[0].fk_export_id");
    }

    #[test]
    fn mechanism_value_set() {
        for (code, _) in ExportMechanism::VALUES {
            let mut value = export(1, 10);
            value["mechanism"] = json!(code);
            assert!(from_value::<Export>(value).is_ok(), "{code}");
        }
        let mut value = export(1, 10);
        value["mechanism"] = json!("Email");
        let err = from_value::<Export>(value).expect_err("undeclared mechanism");
        assert_eq!(err.constraint, Constraint::ValueSet);
        assert_eq!(err.path, "Export.mechanism");
    }

    #[test]
    fn pseudo_key_is_any_non_blank_text() {
        let mut value = patient_export(5, 1);
        value["pseudo_key_aes"] = json!("study-0042");
        let link: PatientExport = from_value(value).expect("custom pseudonym");
        assert_eq!(link.pseudo_key_aes.expose().as_str(), "study-0042");
        assert!(!format!("{link:?}").contains("study-0042"));

        let mut value = patient_export(5, 1);
        value["pseudo_key_aes"] = json!("");
        let err = from_value::<PatientExport>(value).expect_err("blank pseudonym");
        assert_eq!(err.constraint, Constraint::Format);
        assert_eq!(err.path, "PatientExport.pseudo_key_aes");
    }
}
