use super::{course_id, plan_uid, RECORD_ID};
use crate::ids::OisCourseId;
use crate::metadata::{Domain, EntityMeta, FieldKind, FieldMeta};
use crate::record::Entity;
use dicom::{CompressedDvh, DicomUid};
use norpreg_keys::PatientKey;
use serde::{Deserialize, Serialize};

const fn metric(name: &'static str, title: &'static str, unit: &'static str) -> FieldMeta {
    FieldMeta::new(name, FieldKind::Float)
        .title(title)
        .unit(unit)
        .optional()
}

macro_rules! dose_at_volume {
    ($name:literal, $share:literal) => {
        metric($name, $name, "Gy").description(concat!(
            "Dose i Gy til ",
            $share,
            " av aktuell struktur"
        ))
    };
}

macro_rules! volume_at_dose {
    ($name:literal, $gy:literal) => {
        metric($name, $name, "%").description(concat!(
            "Volumet av aktuell struktur i % som mottar ",
            $gy,
            " Gy"
        ))
    };
}

/// Geometric and dosimetric data for one structure (target or organ at risk).
///
/// Dose and volume metrics keep their clinical names on the wire (`D2`, `V20Gy`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dvh {
    pub record_id: Option<PatientKey>,
    pub struct_course_id: Option<OisCourseId>,
    pub struct_plan_uid: Option<DicomUid>,
    pub struct_uid: Option<DicomUid>,
    pub ct_series_uid: Option<DicomUid>,
    pub is_dvh_plan_sum: Option<bool>,
    pub mapped_roi_name: Option<String>,
    pub roi_name: Option<String>,
    pub roi_type: Option<String>,
    pub origin: Option<String>,
    pub origin_software: Option<String>,
    pub volume: Option<f64>,
    pub min_dose: Option<f64>,
    pub mean_dose: Option<f64>,
    pub max_dose: Option<f64>,
    pub dvh_string: Option<CompressedDvh>,
    pub dist_to_ptv_min: Option<f64>,
    pub dist_to_ptv_mean: Option<f64>,
    pub dist_to_ptv_median: Option<f64>,
    pub dist_to_ptv_max: Option<f64>,
    pub dist_to_ptv_25: Option<f64>,
    pub dist_to_ptv_75: Option<f64>,
    pub scaling_factor: Option<f64>,
    pub surface_area: Option<f64>,
    pub ptv_overlap: Option<f64>,
    /// `x,y,z` in mm.
    pub centroid: Option<String>,
    pub dist_to_ptv_centroids: Option<f64>,
    pub spread_x: Option<f64>,
    pub spread_y: Option<f64>,
    pub spread_z: Option<f64>,
    pub cross_section_max: Option<f64>,
    pub cross_section_median: Option<f64>,
    pub centroid_dist_to_iso_min: Option<f64>,
    pub centroid_dist_to_iso_max: Option<f64>,
    pub integral_dose: Option<f64>,
    pub color: Option<String>,
    #[serde(rename = "D2")]
    pub d2: Option<f64>,
    #[serde(rename = "D10")]
    pub d10: Option<f64>,
    #[serde(rename = "D20")]
    pub d20: Option<f64>,
    #[serde(rename = "D30")]
    pub d30: Option<f64>,
    #[serde(rename = "D40")]
    pub d40: Option<f64>,
    #[serde(rename = "D50")]
    pub d50: Option<f64>,
    #[serde(rename = "D60")]
    pub d60: Option<f64>,
    #[serde(rename = "D70")]
    pub d70: Option<f64>,
    #[serde(rename = "D80")]
    pub d80: Option<f64>,
    #[serde(rename = "D90")]
    pub d90: Option<f64>,
    #[serde(rename = "D98")]
    pub d98: Option<f64>,
    #[serde(rename = "D2cc")]
    pub d2cc: Option<f64>,
    #[serde(rename = "V5Gy")]
    pub v5_gy: Option<f64>,
    #[serde(rename = "V10Gy")]
    pub v10_gy: Option<f64>,
    #[serde(rename = "V15Gy")]
    pub v15_gy: Option<f64>,
    #[serde(rename = "V20Gy")]
    pub v20_gy: Option<f64>,
    #[serde(rename = "V25Gy")]
    pub v25_gy: Option<f64>,
    #[serde(rename = "V30Gy")]
    pub v30_gy: Option<f64>,
    #[serde(rename = "V35Gy")]
    pub v35_gy: Option<f64>,
    #[serde(rename = "V40Gy")]
    pub v40_gy: Option<f64>,
    #[serde(rename = "V45Gy")]
    pub v45_gy: Option<f64>,
    #[serde(rename = "V50Gy")]
    pub v50_gy: Option<f64>,
    #[serde(rename = "V55Gy")]
    pub v55_gy: Option<f64>,
    #[serde(rename = "V60Gy")]
    pub v60_gy: Option<f64>,
    #[serde(rename = "V65Gy")]
    pub v65_gy: Option<f64>,
    #[serde(rename = "V70Gy")]
    pub v70_gy: Option<f64>,
    #[serde(rename = "V95")]
    pub v95: Option<f64>,
}

impl Dvh {
    /// Decode the cumulative curve, if one was stored.
    ///
    /// # Errors
    ///
    /// Never fails for a record built through this crate, since `dvh_string` is checked on
    /// input.
    pub fn curve(&self) -> dicom::DicomResult<Option<Vec<f64>>> {
        self.dvh_string.as_ref().map(CompressedDvh::samples).transpose()
    }
}

impl Entity for Dvh {
    const META: &'static EntityMeta = &EntityMeta {
        name: "DVH",
        title: "Geometriske og dosimetriske data fra målvolum og behandlingsvolum",
        description: "",
        domain: Domain::Radiotherapy,
        fields: &[
            RECORD_ID,
            course_id("struct_course_id", "FK Structure - Course ID"),
            plan_uid("struct_plan_uid", "FK Structure - Plan UID"),
            FieldMeta::new("struct_uid", FieldKind::Uid)
                .title("RT Structure SOP Instance UID")
                .description(
                    "Denne RT Structure filens SOP Instance UID, brukes for å koble mot denne",
                )
                .dicom("(0008,0018)")
                .optional(),
            FieldMeta::new("ct_series_uid", FieldKind::Uid)
                .title("CT Series UID")
                .description("Koblingsnøkkel mot DICOM-datasett på Plan CT Series UID-nivå")
                .dicom("(0020,000E)")
                .optional(),
            FieldMeta::new("is_dvh_plan_sum", FieldKind::Boolean)
                .title("Is the DVH a plan-sum?")
                .description(
                    "Beskriver underliggende struktur en enkelt plan eller hele \
                     behandlingsforløpet (for enkelt målvolum). Spesielt aktuell ved replan og \
                     plan-of-the-day. Aktuelle koblinger kan være Frame of Reference eller \
                     nummerering av plannavn",
                )
                .optional(),
            FieldMeta::new("mapped_roi_name", FieldKind::Text)
                .title("Mapped ROI name")
                .description("Standardisert / mappet navn på struktur")
                .optional(),
            FieldMeta::new("roi_name", FieldKind::Text)
                .title("ROI name")
                .description("Navn på struktur som angitt i TPS")
                .dicom("(3006,0026)")
                .optional(),
            FieldMeta::new("roi_type", FieldKind::Text)
                .title("ROI type")
                .description("Strukturtype")
                .dicom("(3006,00A4)")
                .optional(),
            FieldMeta::new("origin", FieldKind::Text)
                .title("Structure origin")
                .description("Er strukturen inntegnet manuelt eller via AI-metoder?")
                .optional(),
            FieldMeta::new("origin_software", FieldKind::Text)
                .title("Structure delineation software")
                .description("Programvare benyttet for automatisk inntegning")
                .optional(),
            metric("volume", "Structure volume", "cm3")
                .description("Strukturvolum, som beregnet fra struktursettet"),
            metric("min_dose", "Voxelwise min dose", "Gy")
                .description("Minste dose i Gy som beregnet fra struktursettet og RT dose"),
            metric("mean_dose", "Voxelwise mean dose", "Gy").description(
                "Gjennomsnittlig dose i Gy som beregnet fra struktursettet og RT dose",
            ),
            metric("max_dose", "Voxelwise max dose", "Gy")
                .description("Største dose i Gy som beregnet fra struktursettet og RT dose"),
            FieldMeta::new("dvh_string", FieldKind::CompressedCurve)
                .title("DVH string (compressed)")
                .description(
                    "Hele DVH-strengen for strukturen, som beregnet fra struktursettet og RT \
                     dose. Teknisk: Lagret som en b64-kodet gzippet streng av bitpakkede uint16, \
                     hvor 10 000 angir 100 % volum, med statiske 0.1 Gy bins.",
                )
                .optional(),
            metric("dist_to_ptv_min", "Min distance to PTV", "mm").description(
                "Minste avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            metric("dist_to_ptv_mean", "Mean distance to PTV", "mm").description(
                "Gjennomsnittlig avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            metric("dist_to_ptv_median", "Median distance to PTV", "mm").description(
                "Median avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            metric("dist_to_ptv_max", "Max distance to PTV", "mm").description(
                "Største avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            metric("dist_to_ptv_25", "25th percentile distance to PTV", "mm").description(
                "25. persentil for avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            metric("dist_to_ptv_75", "75th percentile distance to PTV", "mm").description(
                "75. persentil for avstand mellom konturene for aktuell struktur og (union) PTV",
            ),
            FieldMeta::new("scaling_factor", FieldKind::Float)
                .title("Dose scaling factor")
                .description("Pålagt skaleringsfaktor for levert DVH-dose")
                .optional(),
            metric("surface_area", "ROI surface area", "cm2")
                .description("Overflatearealet til strukturen"),
            metric("ptv_overlap", "PTV overlap", "cm3")
                .description("Volum for overlapp mellom aktuell struktur og (union) PTV"),
            FieldMeta::new("centroid", FieldKind::Text)
                .title("ROI centroid")
                .description("Sentroiden til aktuell struktur, gitt som 3-vektor streng i mm")
                .unit("mm,mm,mm")
                .optional(),
            metric("dist_to_ptv_centroids", "Distance to PTV centroid", "cm")
                .description("Avstand mellom sentroider for aktuell struktur og (union) PTV"),
            metric("spread_x", "Spread in X", "cm").description(
                "Størrelse i X-retning på rektangulær prisme som dekker aktuell struktur",
            ),
            metric("spread_y", "Spread in Y", "cm").description(
                "Størrelse i Y-retning på rektangulær prisme som dekker aktuell struktur",
            ),
            metric("spread_z", "Spread in Z", "cm").description(
                "Størrelse i Z-retning på rektangulær prisme som dekker aktuell struktur",
            ),
            metric("cross_section_max", "Max cross section", "cm2")
                .description("Største tverrsnitt for aktuell struktur over alle snitt"),
            metric("cross_section_median", "Median cross section", "cm2")
                .description("Median tverrsnitt for aktuell struktur over alle snitt"),
            metric("centroid_dist_to_iso_min", "Centroid distance to isocenter min", "cm")
                .description(
                    "Minste avstand mellom sentroide for aktuell struktur og isosenter (over \
                     alle felt)",
                ),
            metric("centroid_dist_to_iso_max", "Centroid distance to isocenter max", "cm")
                .description(
                    "Største avstand mellom sentroide for aktuell struktur og isosenter (over \
                     alle felt)",
                ),
            metric("integral_dose", "Integral dose", "cm3 Gy").description(
                "Integraldose til aktuell struktur, beregnet som gjennomsnittsdose * volum",
            ),
            FieldMeta::new("color", FieldKind::Text)
                .title("ROI color")
                .description("Farge til ROI som angitt i TPS")
                .dicom("(3006,002A)")
                .optional(),
            dose_at_volume!("D2", "2%"),
            dose_at_volume!("D10", "10%"),
            dose_at_volume!("D20", "20%"),
            dose_at_volume!("D30", "30%"),
            dose_at_volume!("D40", "40%"),
            dose_at_volume!("D50", "50%"),
            dose_at_volume!("D60", "60%"),
            dose_at_volume!("D70", "70%"),
            dose_at_volume!("D80", "80%"),
            dose_at_volume!("D90", "90%"),
            dose_at_volume!("D98", "98%"),
            dose_at_volume!("D2cc", "2cc"),
            volume_at_dose!("V5Gy", "5"),
            volume_at_dose!("V10Gy", "10"),
            volume_at_dose!("V15Gy", "15"),
            volume_at_dose!("V20Gy", "20"),
            volume_at_dose!("V25Gy", "25"),
            volume_at_dose!("V30Gy", "30"),
            volume_at_dose!("V35Gy", "35"),
            volume_at_dose!("V40Gy", "40"),
            volume_at_dose!("V45Gy", "45"),
            volume_at_dose!("V50Gy", "50"),
            volume_at_dose!("V55Gy", "55"),
            volume_at_dose!("V60Gy", "60"),
            volume_at_dose!("V65Gy", "65"),
            volume_at_dose!("V70Gy", "70"),
            metric("V95", "V95%", "%").description(
                "Volumet av aktuell struktur i % som mottar 95% av planlagt dose til målvolum",
            ),
        ],
    };
}
