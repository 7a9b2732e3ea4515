//! Registry bookkeeping domain.
//!
//! Patients, their addresses and identifier history, treatment courses with their data
//! status, pseudonymised UID mappings, data-sharing exports and consent (PVK) lookups.
//!
//! Parents own their child lists. A child refers back to its parent by key only, and
//! [`Entity::validate`] checks that every nested child points at the parent that holds it.

mod course;
mod export;
mod pvk;

pub use course::{Course, DataStatus, MapInstanceUid, MapSeriesUid, MapStudyUid};
pub use export::{Export, PatientExport, RegistryExport, Study};
pub use pvk::{PvkEvent, PvkSync};

use crate::codes::{IdType, RegistryName};
use crate::ids::{AddressId, PatientIdHistoryId, RegistryId};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{check_parent, validate_children, Entity};
use crate::timestamp::Timestamp;
use crate::validation::ValidationError;
use norpreg_keys::PatientKey;
use norpreg_types::Encrypted;
use serde::{Deserialize, Serialize};

pub(crate) const FK_PATIENT_KEY: FieldMeta = FieldMeta::new("fk_patient_key", FieldKind::Key)
    .title("Registernøkkel")
    .description("Pseudonymisert nøkkel for pasienten i registeret");

const ID_NUMBER: FieldMeta = FieldMeta::new("id_number_aes", FieldKind::Text)
    .title("Pasientidentifikasjon")
    .description("Kan være av ulik `id_type`")
    .encrypted();

const ID_TYPE: FieldMeta = FieldMeta::new("id_type", FieldKind::Code)
    .title("Type av pasientidentifikasjon")
    .description("Kan være av ulik `id_type`")
    .values(IdType::VALUES);

/// One of the registries sharing this data model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registry {
    pub id: RegistryId,
    pub name: RegistryName,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl Entity for Registry {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Registry",
        title: "De ulike registerne",
        description: "",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer).title("Radindeks for registeret"),
            FieldMeta::new("name", FieldKind::Code)
                .title("Registernavn")
                .description(
                    "Navn på registeret. Ikke alle registerne er formaliserte, så navnene kan \
                     unnvike. Formaliserte registre er markert.",
                )
                .values(RegistryName::VALUES),
            FieldMeta::list("patients", "Patient").title("Tilknyttede pasienter"),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_parent("patients", "fk_registry_id", &self.patients, &self.id, |p| {
            &p.fk_registry_id
        })?;
        validate_children("patients", &self.patients)
    }
}

/// A registered patient. One patient may have several treatment courses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    pub patient_key: PatientKey,
    pub dt_added: Timestamp,
    pub fk_registry_id: RegistryId,
    #[serde(default)]
    pub registry: Option<RegistryName>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub id_history: Vec<PatientIdentifierHistory>,
    #[serde(default)]
    pub patient_exports: Vec<PatientExport>,
    #[serde(default)]
    pub pvk_events: Vec<PvkEvent>,
    pub id_number_aes: Encrypted<String>,
    pub id_type: IdType,
    pub birth_date_aes: Encrypted<String>,
    pub ois_patient_id_aes: Encrypted<String>,
    pub epj_patient_id_aes: Encrypted<String>,
}

impl Entity for Patient {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Patient",
        title: "Pasientobjekt",
        description: "Kan inneholde flere behandlingsforløp. Da benyttes samme pasient, som \
                      inneholder pekere mot flere `courses`.",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("patient_key", FieldKind::Key)
                .title("Registernøkkel")
                .description(
                    "Pseudonymisert nøkkel for pasienten i registeret. Angis automatisk for hver \
                     pasient. Format er 7-karakter heksadesimal (f.eks. a72bf40)",
                ),
            FieldMeta::new("dt_added", FieldKind::DateTime)
                .title("Dato lagt til")
                .description(
                    "Dato for når pasienten ble lagt inn i registeret. Angis når enten \
                     DICOM-datasettet eller EPJ-datasettet ankommer.",
                ),
            FieldMeta::new("fk_registry_id", FieldKind::Integer).title("FK registernøkkel"),
            FieldMeta::new("registry", FieldKind::Code)
                .title("Tilhørende register")
                .description(
                    "Hvilket KREST ligger pasienten i? Dersom det er flere, som i behandling ved \
                     lokalsykehus, gjelder første.",
                )
                .values(RegistryName::VALUES)
                .optional(),
            FieldMeta::list("addresses", "Address")
                .title("Adresser")
                .description("Pasientens tilhørende adresser"),
            FieldMeta::list("courses", "Course")
                .title("Behandlingsforløp")
                .description(
                    "Pasientens tilhørende behandlingsforløp. Knyttet til Course ID i OIS og sak \
                     i DIPS.",
                ),
            FieldMeta::list("id_history", "PatientID")
                .title("ID-historikk")
                .description("Pasientens ID-historikk"),
            FieldMeta::list("patient_exports", "PatientExport")
                .title("Pasientutleveringer")
                .description("Utleveringer der denne pasienten inngår"),
            FieldMeta::list("pvk_events", "PvkEvent")
                .title("PvkEvents")
                .description("Svar fra reservasjonsoppslag for denne pasienten"),
            ID_NUMBER,
            ID_TYPE,
            FieldMeta::new("birth_date_aes", FieldKind::Text)
                .title("Pasientens fødselsdato")
                .unit("YYYY-MM-DD")
                .encrypted(),
            FieldMeta::new("ois_patient_id_aes", FieldKind::Text)
                .title("OIS pasient ID")
                .description("PasientID i stråleterapisystem (f.eks. PatientSer i Aria)")
                .encrypted(),
            FieldMeta::new("epj_patient_id_aes", FieldKind::Text)
                .title("EPJ pasient ID")
                .description("PasientID i journalsystem")
                .encrypted(),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        let key = &self.patient_key;
        check_parent("addresses", "fk_patient_key", &self.addresses, key, |a| {
            &a.fk_patient_key
        })?;
        check_parent("courses", "fk_patient_key", &self.courses, key, |c| {
            &c.fk_patient_key
        })?;
        check_parent("id_history", "fk_patient_key", &self.id_history, key, |h| {
            &h.fk_patient_key
        })?;
        check_parent("patient_exports", "fk_patient_key", &self.patient_exports, key, |e| {
            &e.fk_patient_key
        })?;
        check_parent("pvk_events", "fk_patient_key", &self.pvk_events, key, |e| {
            &e.fk_patient_key
        })?;
        for (index, course) in self.courses.iter().enumerate() {
            check_parent(
                &format!("courses[{index}].patient_exports"),
                "fk_patient_key",
                &course.patient_exports,
                key,
                |e| &e.fk_patient_key,
            )?;
        }
        validate_children("courses", &self.courses)
    }
}

/// History of the national identifiers a patient has had, used to link a patient who is
/// issued a new number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientIdentifierHistory {
    pub id: PatientIdHistoryId,
    pub fk_patient_key: PatientKey,
    pub id_number_aes: Encrypted<String>,
    pub id_type: IdType,
    pub dt_added: Timestamp,
}

impl Entity for PatientIdentifierHistory {
    const META: &'static EntityMeta = &EntityMeta {
        name: "PatientID",
        title: "ID-historikk",
        description: "Historikk over de ulike FNR/DNR/FHNR/HNR pasienten har hatt, til bruk ved \
                      kobling av pasienter som får nytt nummer.",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for ID-historikk")
                .description("Dannes automatisk ved opprettelse av ny ID-historikk"),
            FK_PATIENT_KEY,
            ID_NUMBER,
            ID_TYPE,
            FieldMeta::new("dt_added", FieldKind::DateTime)
                .title("Dato lagt til")
                .description("Dato for når aktuell identifikator ble lagt til"),
        ],
    };
}

/// A patient address. Interpret zip and municipality codes by the standard in force at
/// `dt_added`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub id: AddressId,
    pub dt_added: Timestamp,
    pub fk_patient_key: PatientKey,
    pub zip_code_aes: Encrypted<String>,
    pub bydel_aes: Encrypted<String>,
    pub kommune_nr_aes: Encrypted<String>,
}

impl Entity for Address {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Address",
        title: "Tabell for adresser",
        description: "Benytt `dt_added` for å tolke postnummer, kommunenummer etter da gjeldende \
                      standard.",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for adresse")
                .description("Dannes automatisk ved opprettelse av ny adresse"),
            FieldMeta::new("dt_added", FieldKind::DateTime)
                .title("Dato lagt til")
                .description("Dato for når aktuell adresse ble lagt til"),
            FK_PATIENT_KEY,
            FieldMeta::new("zip_code_aes", FieldKind::Text)
                .title("Postnummer")
                .description("Postnummer da pasienten ble lagt inn")
                .encrypted(),
            FieldMeta::new("bydel_aes", FieldKind::Text)
                .title("Bydel")
                .description("Aktuell for Oslo.")
                .encrypted(),
            FieldMeta::new("kommune_nr_aes", FieldKind::Text)
                .title("Kommunenummer")
                .description("Kommunenummer da pasienten ble lagt inn")
                .encrypted(),
        ],
    };
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::record::{from_value, parse_json, to_json};
    use crate::validation::Constraint;
    use serde_json::json;

    #[test]
    fn patient_with_required_fields_round_trips() {
        let patient: Patient = from_value(patient(PATIENT_KEY, 1)).expect("valid patient");
        assert!(patient.addresses.is_empty());
        assert!(patient.registry.is_none());
        assert_eq!(patient.id_type, IdType::Fnr);

        let json = to_json(&patient).expect("serialize");
        let back: Patient = parse_json(&json).expect("reparse");
        assert_eq!(back, patient);
    }

    #[test]
    fn encrypted_values_do_not_leak_into_debug_output() {
        let patient: Patient = from_value(patient(PATIENT_KEY, 1)).expect("valid patient");
        let debug = format!("{patient:?}");
        assert!(!debug.contains("01010112345"));
        assert!(debug.contains("a72bf40"));
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut value = patient(PATIENT_KEY, 1);
        value.as_object_mut().expect("object").remove("id_type");
        let err = from_value::<Patient>(value).expect_err("id_type missing");
        assert_eq!(err.path, "Patient.id_type");
        assert_eq!(err.constraint, Constraint::Required);
    }

    #[test]
    fn id_type_outside_value_set_fails() {
        let mut value = patient(PATIENT_KEY, 1);
        value["id_type"] = json!("SSN");
        let err = from_value::<Patient>(value).expect_err("unknown id type");
        assert_eq!(err.constraint, Constraint::ValueSet);
        assert_eq!(err.path, "Patient.id_type");

        for (code, _) in IdType::VALUES {
            let mut value = patient(PATIENT_KEY, 1);
            value["id_type"] = json!(code);
            assert!(from_value::<Patient>(value).is_ok(), "{code}");
        }
    }

    #[test]
    fn patient_keys_are_opaque_but_not_blank() {
        let stored: Patient = from_value(patient("A72BF40", 1)).expect("non-canonical key");
        assert_eq!(stored.patient_key.as_str(), "A72BF40");

        let mut value = patient(PATIENT_KEY, 1);
        value["patient_key"] = json!(12345);
        let stored: Patient = from_value(value).expect("numeric key");
        assert_eq!(stored.patient_key.as_str(), "12345");

        let err = from_value::<Patient>(patient(" ", 1)).expect_err("blank key");
        assert_eq!(err.constraint, Constraint::Format);
        assert_eq!(err.path, "Patient.patient_key");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut value = patient(PATIENT_KEY, 1);
        value["patient"] = json!({});
        let err = from_value::<Patient>(value).expect_err("unknown field");
        assert_eq!(err.constraint, Constraint::UnknownField);
        assert_eq!(err.path, "Patient.patient");
    }

    #[test]
    fn children_must_reference_their_patient() {
        let mut value = patient(PATIENT_KEY, 1);
        value["addresses"] = json!([address(1, PATIENT_KEY), address(2, "0000001")]);
        let err = from_value::<Patient>(value).expect_err("foreign address");
        assert_eq!(err.constraint, Constraint::Relation);
        assert_eq!(err.path, "Patient.addresses[1].fk_patient_key");

        let mut value = patient(PATIENT_KEY, 1);
        value["addresses"] = json!([address(1, PATIENT_KEY)]);
        value["courses"] = json!([course(3, PATIENT_KEY)]);
        let patient: Patient = from_value(value).expect("consistent children");
        assert_eq!(patient.courses[0].id.get(), 3);
    }

    #[test]
    fn registry_checks_nested_patients() {
        let mut bad_patient = patient(PATIENT_KEY, 1);
        bad_patient["courses"] = json!([course(3, "bbbbbbb")]);
        let value = json!({"id": 1, "name": "KREST-OUS", "patients": [bad_patient]});
        let err = from_value::<Registry>(value).expect_err("course of another patient");
        assert_eq!(err.path, "Registry.patients[0].courses[0].fk_patient_key");

        let value = json!({"id": 2, "name": "NORPREG", "patients": [patient(PATIENT_KEY, 1)]});
        let err = from_value::<Registry>(value).expect_err("patient of another registry");
        assert_eq!(err.path, "Registry.patients[0].fk_registry_id");
    }

    #[test]
    fn registry_name_value_set() {
        for (code, _) in RegistryName::VALUES {
            let registry: Registry =
                from_value(json!({"id": 1, "name": code})).expect("declared registry");
            assert!(registry.patients.is_empty());
        }
        let err = from_value::<Registry>(json!({"id": 1, "name": "KREST-XYZ"}))
            .expect_err("undeclared registry");
        assert_eq!(err.constraint, Constraint::ValueSet);
    }

    #[test]
    fn equality_follows_field_values() {
        let a: Address = from_value(address(1, PATIENT_KEY)).expect("address");
        let b: Address = from_value(address(1, PATIENT_KEY)).expect("address");
        assert_eq!(a, b);
        let c: Address = from_value(address(2, PATIENT_KEY)).expect("address");
        assert_ne!(a, c);
    }

    #[test]
    fn identifier_history_round_trips() {
        let value = json!({
            "id": 4,
            "fk_patient_key": PATIENT_KEY,
            "id_number_aes": "enc:D",
            "id_type": "DNR",
            "dt_added": "2023-06-01T00:00:00",
        });
        let history: PatientIdentifierHistory = from_value(value).expect("history");
        let back: PatientIdentifierHistory =
            parse_json(&to_json(&history).expect("serialize")).expect("reparse");
        assert_eq!(back, history);
    }
}
