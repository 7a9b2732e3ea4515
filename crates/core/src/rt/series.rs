use super::{course_id, RECORD_ID};
use crate::ids::OisCourseId;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use crate::timestamp::Timestamp;
use dicom::{DicomDate, DicomUid};
use norpreg_keys::PatientKey;
use serde::{Deserialize, Serialize};

/// One imported DICOM series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DicomSeries {
    pub record_id: Option<PatientKey>,
    pub dcm_course_id: Option<OisCourseId>,
    pub study_instance_uid: Option<DicomUid>,
    pub study_description: Option<String>,
    pub import_datetime: Option<Timestamp>,
    pub series_modality: Option<String>,
    pub series_description: Option<String>,
    pub series_instance_uid: Option<DicomUid>,
    pub files_nb: Option<u32>,
    pub series_date: Option<DicomDate>,
    pub station_name: Option<String>,
}

impl Entity for DicomSeries {
    const META: &'static EntityMeta = &EntityMeta {
        name: "DICOM",
        title: "Oversikt over DICOM-datasett",
        description: "",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("dcm_course_id", "DICOM Course ID"),
            FieldMeta::new("study_instance_uid", FieldKind::Uid)
                .title("Study instance UID")
                .description("Koblingsnøkkel mot DICOM-datasett på Study-nivå")
                .dicom("(0020,000D)")
                .optional(),
            FieldMeta::new("study_description", FieldKind::Text)
                .title("Study description")
                .description("Studiebeskrivelse fra DICOM-datasett på Study-nivå")
                .dicom("(0008,1030)")
                .optional(),
            FieldMeta::new("import_datetime", FieldKind::DateTime)
                .title("Import datetime")
                .description("Dato og tid for import av datasett i NORPREG")
                .optional(),
            FieldMeta::new("series_modality", FieldKind::Text)
                .title("Series modality")
                .description("Modalitet for DICOM-datasett på Series-nivå")
                .dicom("(0008,0060)")
                .optional(),
            FieldMeta::new("series_description", FieldKind::Text)
                .title("Series description")
                .description("Seriebeskrivelse fra DICOM-datasett på Series-nivå")
                .dicom("(0008,103E)")
                .optional(),
            FieldMeta::new("series_instance_uid", FieldKind::Uid)
                .title("Series instance UID")
                .description("Koblingsnøkkel mot DICOM-datasett på Series-nivå")
                .dicom("(0020,000E)")
                .optional(),
            FieldMeta::new("files_nb", FieldKind::Integer)
                .title("Files number")
                .description("Antall filer i DICOM-datasett for enkelt Series")
                .optional(),
            FieldMeta::new("series_date", FieldKind::DicomDate)
                .title("Series date")
                .description("Dato for DICOM-datasett på Series-nivå")
                .dicom("(0008,0021)")
                .optional(),
            FieldMeta::new("station_name", FieldKind::Text)
                .title("Station name")
                .description(
                    "Navn på enkeltmodalitet som har generert DICOM-datasett på Series-nivå",
                )
                .dicom("(0008,1010)")
                .optional(),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{from_value, parse_json, parse_yaml, to_json};
    use crate::validation::Constraint;
    use serde_json::json;

    #[test]
    fn series_date_is_normalised() {
        let series: DicomSeries = parse_yaml(
            "record_id: a72bf40\nseries_date: '20240115'\nseries_modality: CT\nfiles_nb: 154\n",
        )
        .expect("series");
        let json = serde_json::to_value(&series).expect("to value");
        assert_eq!(json["series_date"], "2024-01-15");
        assert_eq!(json["files_nb"], 154);

        let back: DicomSeries = parse_json(&to_json(&series).expect("json")).expect("reparse");
        assert_eq!(back, series);
    }

    #[test]
    fn empty_record_is_valid() {
        let series: DicomSeries = from_value(json!({})).expect("all optional");
        assert_eq!(series, DicomSeries::default());
    }

    #[test]
    fn malformed_values_name_the_field() {
        let err = from_value::<DicomSeries>(json!({"series_date": "2024-13-01"}))
            .expect_err("month 13");
        assert_eq!(err.constraint, Constraint::Format);
        assert_eq!(err.path, "DICOM.series_date");

        let err = from_value::<DicomSeries>(json!({"record_id": ""})).expect_err("blank key");
        assert_eq!(err.path, "DICOM.record_id");

        let err = from_value::<DicomSeries>(json!({"series_instance_uid": "1..2"}))
            .expect_err("empty UID component");
        assert_eq!(err.path, "DICOM.series_instance_uid");
    }

    #[test]
    fn record_id_accepts_other_key_formats() {
        let series: DicomSeries = from_value(json!({"record_id": "12345"})).expect("text key");
        assert_eq!(series.record_id.as_ref().map(PatientKey::as_str), Some("12345"));
        let series: DicomSeries = from_value(json!({"record_id": 12345})).expect("numeric key");
        assert_eq!(series.record_id.as_ref().map(PatientKey::as_str), Some("12345"));
    }

    #[test]
    fn dicom_tags_are_recorded_in_metadata() {
        let field = DicomSeries::META.field("series_date").expect("field");
        assert_eq!(field.dicom, Some("(0008,0021)"));
        assert_eq!(field.kind, FieldKind::DicomDate);
    }
}
