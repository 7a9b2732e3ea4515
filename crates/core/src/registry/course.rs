use super::FK_PATIENT_KEY;
use crate::ids::{CourseId, DataStatusId, MapInstanceUidId, MapSeriesUidId, MapStudyUidId};
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::{check_parent, Entity};
use crate::registry::PatientExport;
use crate::timestamp::Timestamp;
use crate::validation::ValidationError;
use dicom::DicomUid;
use norpreg_keys::PatientKey;
use norpreg_types::Encrypted;
use serde::{Deserialize, Serialize};

const FK_COURSE_ID: FieldMeta = FieldMeta::new("fk_course_id", FieldKind::Integer)
    .title("FK course ID")
    .description("Koblingsnøkkel for behandlingsforløp");

/// One treatment episode for a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Course {
    pub id: CourseId,
    pub dt_added: Timestamp,
    pub fk_patient_key: PatientKey,
    #[serde(default)]
    pub patient_exports: Vec<PatientExport>,
    pub fk_datastatus_id: DataStatusId,
    #[serde(default)]
    pub data_status: Option<DataStatus>,
    pub ois_course_id_aes: Encrypted<String>,
    pub epj_course_id_aes: Encrypted<String>,
}

impl Entity for Course {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Course",
        title: "Tabell for behandlingsforløp",
        description: "",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for behandlingsforløp")
                .description("Dannes automatisk ved opprettelse av nytt behandlingsforløp"),
            FieldMeta::new("dt_added", FieldKind::DateTime)
                .title("Dato lagt til")
                .description("Dato for når aktuelt behandlingsforløp ble lagt til"),
            FK_PATIENT_KEY,
            FieldMeta::list("patient_exports", "PatientExport")
                .title("Pasientutleveringer")
                .description("Utleveringer der dette behandlingsforløpet inngår"),
            FieldMeta::new("fk_datastatus_id", FieldKind::Integer)
                .title("FK datastatus ID")
                .description("Koblingsnøkkel mot datastatus for dette behandlingsforløpet"),
            FieldMeta::new("data_status", FieldKind::Entity("DataStatus"))
                .title("Datastatus")
                .description("Gjeldende datastatus for dette behandlingsforløpet")
                .optional(),
            FieldMeta::new("ois_course_id_aes", FieldKind::Text)
                .title("OIS course ID")
                .description("Koblingsnøkkel for behandlingsforløp / course i stråleterapisystem")
                .encrypted(),
            FieldMeta::new("epj_course_id_aes", FieldKind::Text)
                .title("EPJ course ID")
                .description("Koblingsnøkkel for behandlingsforløp / sak i journalsystem")
                .encrypted(),
        ],
    };

    fn validate(&self) -> Result<(), ValidationError> {
        check_parent("patient_exports", "fk_course_id", &self.patient_exports, &self.id, |e| {
            &e.fk_course_id
        })?;
        if let Some(status) = &self.data_status {
            if status.fk_course_id != self.id {
                return Err(ValidationError::relation(
                    "data_status.fk_course_id",
                    self.id,
                    status.fk_course_id,
                ));
            }
            if status.id != self.fk_datastatus_id {
                return Err(ValidationError::relation(
                    "data_status.id",
                    self.fk_datastatus_id,
                    status.id,
                ));
            }
        }
        Ok(())
    }
}

/// Transfer status of the EPJ, DICOM and PROM pipelines for one course.
///
/// A snapshot only: the codes are opaque integers and no transition rules apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataStatus {
    pub id: DataStatusId,
    pub fk_course_id: CourseId,
    pub epj_status_aes: Encrypted<i64>,
    pub dicom_status_aes: Encrypted<i64>,
    pub prom_status_aes: Encrypted<i64>,
    #[serde(default)]
    pub consent_status_aes: Option<Encrypted<i64>>,
}

impl Entity for DataStatus {
    const META: &'static EntityMeta = &EntityMeta {
        name: "DataStatus",
        title: "Datastatus",
        description: "",
        domain: Domain::Registry,
        fields: &[
            FieldMeta::new("id", FieldKind::Integer)
                .title("Radindeks for datastatus")
                .description("Dannes automatisk ved opprettelse av ny statusmelding"),
            FK_COURSE_ID,
            FieldMeta::new("epj_status_aes", FieldKind::Integer)
                .title("EPJ status")
                .description("Statuskode for dataoverføring EPJ")
                .encrypted(),
            FieldMeta::new("dicom_status_aes", FieldKind::Integer)
                .title("DICOM status")
                .description("Statuskode for dataoverføring DICOM")
                .encrypted(),
            FieldMeta::new("prom_status_aes", FieldKind::Integer)
                .title("PROMs status")
                .description("Statuskode for pasientrapporterte data")
                .encrypted(),
            FieldMeta::new("consent_status_aes", FieldKind::Integer)
                .title("Samtykkestatus")
                .description("Statuskode for innhenting av samtykke")
                .encrypted()
                .optional(),
        ],
    };
}

macro_rules! uid_map {
    (
        $(#[$meta:meta])*
        $name:ident, $id:ty, $entity:literal, $level:literal, $orig:ident, $pseudo:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            pub id: $id,
            pub fk_course_id: CourseId,
            #[serde(default)]
            pub $orig: Option<DicomUid>,
            #[serde(default)]
            pub $pseudo: Option<DicomUid>,
        }

        impl Entity for $name {
            const META: &'static EntityMeta = &EntityMeta {
                name: $entity,
                title: concat!("Kobling av ", $level, " UID"),
                description: "",
                domain: Domain::Registry,
                fields: &[
                    FieldMeta::new("id", FieldKind::Integer)
                        .title(concat!("Radindeks for ", $level, " UID-kobling"))
                        .description("Dannes automatisk ved opprettelse av ny kobling"),
                    FK_COURSE_ID,
                    FieldMeta::new(stringify!($orig), FieldKind::Uid)
                        .title(concat!("Opprinnelig ", $level, " UID"))
                        .description(concat!(
                            "Den opprinnelige verdien av ",
                            $level,
                            " UID fra kildedata"
                        ))
                        .optional(),
                    FieldMeta::new(stringify!($pseudo), FieldKind::Uid)
                        .title(concat!("Pseudonymisert ", $level, " UID"))
                        .description(concat!(
                            "Den pseudonymiserte verdien av ",
                            $level,
                            " UID i NORPREG"
                        ))
                        .optional(),
                ],
            };
        }
    };
}

uid_map!(
    /// Mapping between a source Study Instance UID and its pseudonym.
    MapStudyUid, MapStudyUidId, "MapStudyUID", "Study", study_uid_orig, study_uid_pseudo
);
uid_map!(
    /// Mapping between a source Series Instance UID and its pseudonym.
    MapSeriesUid, MapSeriesUidId, "MapSeriesUID", "Series", series_uid_orig, series_uid_pseudo
);
uid_map!(
    /// Mapping between a source SOP Instance UID and its pseudonym.
    MapInstanceUid, MapInstanceUidId, "MapInstanceUID", "Instance", instance_uid_orig,
    instance_uid_pseudo
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_json, to_json};
    use crate::registry::fixtures::{course, PATIENT_KEY};
    use crate::validation::Constraint;
    use serde_json::json;

    fn data_status(id: u64, course_id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "fk_course_id": course_id,
            "epj_status_aes": 1,
            "dicom_status_aes": 2,
            "prom_status_aes": 0,
        })
    }

    #[test]
    fn course_with_matching_status_round_trips() {
        let mut value = course(3, PATIENT_KEY);
        value["data_status"] = data_status(7, 3);
        let course: Course = from_value(value).expect("valid course");
        let status = course.data_status.as_ref().expect("status present");
        assert_eq!(*status.dicom_status_aes.expose(), 2);
        assert!(status.consent_status_aes.is_none());

        let back: Course = parse_json(&to_json(&course).expect("serialize")).expect("reparse");
        assert_eq!(back, course);
    }

    #[test]
    fn status_of_another_course_is_rejected() {
        let mut value = course(3, PATIENT_KEY);
        value["data_status"] = data_status(7, 4);
        let err = from_value::<Course>(value).expect_err("wrong course");
        assert_eq!(err.constraint, Constraint::Relation);
        assert_eq!(err.path, "Course.data_status.fk_course_id");

        let mut value = course(3, PATIENT_KEY);
        value["data_status"] = data_status(8, 3);
        let err = from_value::<Course>(value).expect_err("wrong status row");
        assert_eq!(err.path, "Course.data_status.id");
    }

    #[test]
    fn status_codes_must_be_integers() {
        let mut value = data_status(1, 1);
        value["epj_status_aes"] = json!("ok");
        let err = from_value::<DataStatus>(value).expect_err("string status");
        assert_eq!(err.constraint, Constraint::Type);
    }

    #[test]
    fn uid_maps_accept_missing_uids() {
        let map: MapStudyUid = from_value(json!({"id": 1, "fk_course_id": 3})).expect("map");
        assert!(map.study_uid_orig.is_none());

        let map: MapSeriesUid = from_value(json!({
            "id": 1,
            "fk_course_id": 3,
            "series_uid_orig": "1.2.840.113619.2.55.3",
            "series_uid_pseudo": "2.25.1234",
        }))
        .expect("map");
        assert_eq!(
            map.series_uid_pseudo.as_ref().map(DicomUid::as_str),
            Some("2.25.1234")
        );
    }

    #[test]
    fn uid_maps_reject_malformed_uids() {
        let err = from_value::<MapInstanceUid>(json!({
            "id": 1,
            "fk_course_id": 3,
            "instance_uid_orig": "1.2.abc",
        }))
        .expect_err("bad uid");
        assert_eq!(err.constraint, Constraint::Format);
        assert_eq!(err.path, "MapInstanceUID.instance_uid_orig");
    }

    #[test]
    fn uid_map_metadata_uses_field_names() {
        let meta = MapInstanceUid::META;
        assert!(meta.field("instance_uid_pseudo").is_some());
        assert_eq!(meta.title, "Kobling av Instance UID");
    }
}
