use super::{course_id, plan_uid, RECORD_ID};
use crate::ids::OisCourseId;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use dicom::{DicomUid, RotationDirection};
use norpreg_keys::PatientKey;
use serde::{Deserialize, Serialize};

const fn float(name: &'static str, title: &'static str, description: &'static str) -> FieldMeta {
    FieldMeta::new(name, FieldKind::Float)
        .title(title)
        .description(description)
        .optional()
}

const fn angle(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    tag: &'static str,
) -> FieldMeta {
    float(name, title, description).unit("deg").dicom(tag)
}

const fn rotation(
    name: &'static str,
    title: &'static str,
    description: &'static str,
) -> FieldMeta {
    FieldMeta::new(name, FieldKind::Code)
        .title(title)
        .description(description)
        .values(RotationDirection::VALUES)
}

const COMPLEXITY: &str = "Young's feltkompleksitet, beregnet ved jevn vekting i X- og Y- planet \
                          (c1=c2=1) over alle kontrollpunktene.";

/// One treatment field of a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Beam {
    pub record_id: Option<PatientKey>,
    pub beam_course_id: Option<OisCourseId>,
    pub beam_plan_uid: Option<DicomUid>,
    pub beam_tx_modality: Option<String>,
    pub beam_number: Option<u32>,
    pub beam_name: Option<String>,
    pub fx_grp_number: Option<u32>,
    pub fx_count: Option<u32>,
    pub fx_grp_beam_count: Option<u32>,
    pub beam_dose: Option<f64>,
    pub beam_mu: Option<f64>,
    pub radiation_type: Option<String>,
    pub beam_energy_min: Option<f64>,
    pub beam_energy_max: Option<f64>,
    pub beam_type: Option<String>,
    pub control_point_count: Option<u32>,
    pub gantry_start: Option<f64>,
    pub gantry_end: Option<f64>,
    pub gantry_rot_dir: RotationDirection,
    pub gantry_range: Option<f64>,
    pub gantry_min: Option<f64>,
    pub gantry_max: Option<f64>,
    pub collimator_start: Option<f64>,
    pub collimator_end: Option<f64>,
    pub collimator_rot_dir: Option<RotationDirection>,
    pub collimator_range: Option<f64>,
    pub collimator_min: Option<f64>,
    pub collimator_max: Option<f64>,
    pub couch_start: Option<f64>,
    pub couch_end: Option<f64>,
    pub couch_rot_dir: Option<RotationDirection>,
    pub couch_range: Option<f64>,
    pub couch_min: Option<f64>,
    pub couch_max: Option<f64>,
    pub beam_dose_pt: Option<String>,
    pub isocenter: Option<String>,
    pub ssd: Option<f64>,
    pub treatment_machine: Option<String>,
    pub scan_mode: Option<String>,
    pub scan_spot_count: Option<u32>,
    pub beam_mu_per_deg: Option<f64>,
    pub beam_mu_per_cp: Option<f64>,
    pub area_min: Option<f64>,
    pub area_mean: Option<f64>,
    pub area_median: Option<f64>,
    pub area_max: Option<f64>,
    pub perim_min: Option<f64>,
    pub perim_mean: Option<f64>,
    pub perim_median: Option<f64>,
    pub perim_max: Option<f64>,
    pub x_perim_min: Option<f64>,
    pub x_perim_mean: Option<f64>,
    pub x_perim_median: Option<f64>,
    pub x_perim_max: Option<f64>,
    pub y_perim_min: Option<f64>,
    pub y_perim_mean: Option<f64>,
    pub y_perim_median: Option<f64>,
    pub y_perim_max: Option<f64>,
    pub complexity_min: Option<f64>,
    pub complexity_mean: Option<f64>,
    pub complexity_median: Option<f64>,
    pub complexity_max: Option<f64>,
    pub cp_mu_min: Option<f64>,
    pub cp_mu_mean: Option<f64>,
    pub cp_mu_median: Option<f64>,
    pub cp_mu_max: Option<f64>,
    pub beam_complexity: Option<f64>,
}

impl Entity for Beam {
    const META: &'static EntityMeta = &EntityMeta {
        name: "Beam",
        title: "Informasjon om de ulike behandlingsfeltene",
        description: "",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("beam_course_id", "FK Beam - Course ID"),
            plan_uid("beam_plan_uid", "FK Beam - Plan UID"),
            FieldMeta::new("beam_tx_modality", FieldKind::Text)
                .title("Treatment modality")
                .description(
                    "Behandlingsmodalitet tolket fra RTPlan.RadiationType. PHOTON, ELECTRON, \
                     NEUTRON, PROTON. Får 3D / arc modifikator dersom det er benyttet.",
                )
                .optional(),
            FieldMeta::new("beam_number", FieldKind::Integer)
                .title("Beam number")
                .description("Tallangivelsen for dette feltet")
                .dicom("(300A,00C0)")
                .optional(),
            FieldMeta::new("beam_name", FieldKind::Text)
                .title("Beam name")
                .description("Feltnavn, inneholder ofte vinkelinformasjon")
                .dicom("(300A,00C2) / (300A,00C3)")
                .optional(),
            FieldMeta::new("fx_grp_number", FieldKind::Integer)
                .title("Fraction group number")
                .description("Gruppenummeret til fraksjonen")
                .dicom("(300A,0071)")
                .optional(),
            FieldMeta::new("fx_count", FieldKind::Integer)
                .title("Fraction count")
                .description("Totalt antall fraksjoner for dette feltet")
                .dicom("(300A,0078)")
                .optional(),
            FieldMeta::new("fx_grp_beam_count", FieldKind::Integer)
                .title("Fraction group beam count")
                .description("Antall felt i denne fraksjonsgruppen")
                .optional(),
            float("beam_dose", "Beam dose", "Planlagt dose for dette feltet i Gy")
                .unit("Gy")
                .dicom("(300A,008B)"),
            float(
                "beam_mu",
                "Beam Monitor Units",
                "Antall Monitor Units (MUs) for dette feltet",
            ),
            FieldMeta::new("radiation_type", FieldKind::Text)
                .title("Radiation type")
                .description("Strålingstype for dette feltet (uten 3D modifikator)")
                .dicom("(300A,00C6)")
                .optional(),
            float(
                "beam_energy_min",
                "Min beam energy",
                "Minste energi for strålefeltet. Enhet er MV for fotoner, MeV for protoner",
            )
            .unit("MV / MeV")
            .dicom("(300A,0114)"),
            float(
                "beam_energy_max",
                "Max beam energy",
                "Største energi for strålefeltet. Enhet er MV for fotoner, MeV for protoner",
            )
            .unit("MV / MeV")
            .dicom("(300A,0114)"),
            FieldMeta::new("beam_type", FieldKind::Text)
                .title("Beam type")
                .description("Felttype, STATIC eller DYNAMIC")
                .dicom("(300A,00C4)")
                .optional(),
            FieldMeta::new("control_point_count", FieldKind::Integer)
                .title("Control point count")
                .description("Antall kontrollpunkter for dette feltet")
                .optional(),
            angle("gantry_start", "Gantry start", "Gantry startvinkel i grader", "(300A,011E)"),
            angle("gantry_end", "Gantry end", "Gantry sluttvinkel i grader", "(300A,011E)"),
            rotation(
                "gantry_rot_dir",
                "Gantry rotation direction",
                "Retning til gantryrotasjon",
            )
            .dicom("(300A,011F)"),
            angle(
                "gantry_range",
                "Gantry range",
                "Hvor mange grader gantry roterer",
                "(300A,011E)",
            ),
            angle("gantry_min", "Gantry min", "Minste gantryvinkel i grader", "(300A,011E)"),
            angle("gantry_max", "Gantry max", "Største gantryvinkel i grader", "(300A,011E)"),
            angle(
                "collimator_start",
                "Collimator start",
                "Kollimator startvinkel i grader",
                "(300A,0120)",
            ),
            angle(
                "collimator_end",
                "Collimator end",
                "Kollimator sluttvinkel i grader",
                "(300A,0120)",
            ),
            rotation(
                "collimator_rot_dir",
                "Collimator rotation direction",
                "Retning til kollimatorrotasjon",
            )
            .dicom("(300A,0121)")
            .optional(),
            angle(
                "collimator_range",
                "Collimator range",
                "Hvor mange grader kollimator roterer",
                "(300A,0120)",
            ),
            angle(
                "collimator_min",
                "Collimator min",
                "Minste kollimatorvinkel i grader",
                "(300A,0120)",
            ),
            angle(
                "collimator_max",
                "Collimator max",
                "Største kollimatorvinkel i grader",
                "(300A,0120)",
            ),
            angle("couch_start", "Couch start", "Bord startvinkel i grader", "(300A,0122)"),
            angle("couch_end", "Couch end", "Bord sluttvinkel i grader", "(300A,0122)"),
            rotation("couch_rot_dir", "Couch rotation direction", "Retning til bordrotasjon")
                .dicom("(300A,0123)")
                .optional(),
            angle("couch_range", "Couch range", "Hvor mange grader bord roterer", "(300A,0122)"),
            angle("couch_min", "Couch min", "Minste bordvinkel i grader", "(300A,0122)"),
            angle("couch_max", "Couch max", "Største bordvinkel i grader", "(300A,0122)"),
            FieldMeta::new("beam_dose_pt", FieldKind::Text)
                .title("Beam dose specification point")
                .description("Dose til primært normeringsvolum i Gy for dette feltet")
                .dicom("(300A,0082)")
                .optional(),
            FieldMeta::new("isocenter", FieldKind::Text)
                .title("Isocenter position")
                .description("Isosenterposisjon i x,y,z")
                .unit("cm")
                .dicom("(300A,012C)")
                .optional(),
            float(
                "ssd",
                "Source to surface distance",
                "Avstand mellom kilde og overflate. Gjennomsnitt om det er ARC",
            )
            .unit("cm")
            .dicom("(300A,0130)"),
            FieldMeta::new("treatment_machine", FieldKind::Text)
                .title("Treatment machine name")
                .description("(Lokalt) navn på behandlingsapparat")
                .dicom("(300A,00B2)")
                .optional(),
            FieldMeta::new("scan_mode", FieldKind::Text)
                .title("Scan mode")
                .description(
                    "Hvordan strålen scannes under behandling. NONE / UNIFORM / MODULATED / \
                     MODULATED_SPEC",
                )
                .dicom("(300A,0308)")
                .optional(),
            FieldMeta::new("scan_spot_count", FieldKind::Integer)
                .title("Scan spot count")
                .description("Hvor mange punkter som benyttes under spot scanning")
                .dicom("(300A,0392)")
                .optional(),
            float(
                "beam_mu_per_deg",
                "Beam MUs per degree",
                "Hvor mange monitoreringsenheter per rotasjonsgrad",
            ),
            float(
                "beam_mu_per_cp",
                "Beam MUs per control point",
                "Hvor mange monitoreringsenheter per kontrollpunkt",
            ),
            float("area_min", "Area min", "Minste feltareal").unit("cm2"),
            float("area_mean", "Area mean", "Gjennomsnittlig feltareal").unit("cm2"),
            float("area_median", "Area median", "Median feltareal").unit("cm2"),
            float("area_max", "Area max", "Største feltareal").unit("cm2"),
            float("perim_min", "Beam perimeter min", "Minste feltomkrets").unit("cm"),
            float("perim_mean", "Beam perimeter mean", "Gjennomsnittlig feltomkrets").unit("cm"),
            float("perim_median", "Beam perimeter median", "Median feltomkrets").unit("cm"),
            float("perim_max", "Beam perimeter max", "Største feltomkrets").unit("cm"),
            float("x_perim_min", "Beam perimeter X min", "Minste feltomkrets (X)").unit("cm"),
            float("x_perim_mean", "Beam perimeter X mean", "Gjennomsnittlig feltomkrets (X)")
                .unit("cm"),
            float("x_perim_median", "Beam perimeter X median", "Median feltomkrets (X)")
                .unit("cm"),
            float("x_perim_max", "Beam perimeter X max", "Største feltomkrets (X)").unit("cm"),
            float("y_perim_min", "Beam perimeter Y min", "Minste feltomkrets (Y)").unit("cm"),
            float("y_perim_mean", "Beam perimeter Y mean", "Gjennomsnittlig feltomkrets (Y)")
                .unit("cm"),
            float("y_perim_median", "Beam perimeter Y median", "Median feltomkrets (Y)")
                .unit("cm"),
            float("y_perim_max", "Beam perimeter Y max", "Største feltomkrets (Y)").unit("cm"),
            float("complexity_min", "Field complexity min", COMPLEXITY),
            float("complexity_mean", "Field complexity mean", COMPLEXITY),
            float("complexity_median", "Field complexity median", COMPLEXITY),
            float("complexity_max", "Field complexity max", COMPLEXITY),
            float("cp_mu_min", "Control point MU min", "Lavest MU over alle kontrollpunktene"),
            float(
                "cp_mu_mean",
                "Control point MU mean",
                "Gjennomsnittlig MU over alle kontrollpunktene",
            ),
            float(
                "cp_mu_median",
                "Control point MU median",
                "Median MU over alle kontrollpunktene",
            ),
            float("cp_mu_max", "Control point MU max", "Største MU over alle kontrollpunktene"),
            float(
                "beam_complexity",
                "Beam complexity",
                "Young's feltkompleksitet, beregnet ved jevn vekting i X- og Y- planet \
                 (c1=c2=1). MU-vektet sum av kontrollpunktenes kompleksitet.",
            ),
        ],
    };
}
