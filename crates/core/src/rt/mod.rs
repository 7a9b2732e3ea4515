//! Radiotherapy delivery domain.
//!
//! Records extracted from the DICOM RT objects of a course (plan, structure set, dose, treatment
//! record). Every field is optional since extraction depends on what the planning system
//! exported, except the gantry rotation direction of a beam.
//!
//! Records relate by key only: `record_id` (patient key), the OIS course ID and the RT Plan SOP
//! Instance UID.

mod beam;
mod dvh;
mod plan;
mod series;

pub use beam::Beam;
pub use dvh::Dvh;
pub use plan::{DoseReference, Fraction, Plan};
pub use series::DicomSeries;

use crate::metadata::{FieldKind, FieldMeta};

const RECORD_ID: FieldMeta = FieldMeta::new("record_id", FieldKind::Key)
    .title("Koblingsnøkkel i NORPREG")
    .description(
        "Angis automatisk for hver pasient. Foreslått format er 7-karakter heksadesimal \
         (f.eks. a72bf40)",
    )
    .optional();

const fn course_id(name: &'static str, title: &'static str) -> FieldMeta {
    FieldMeta::new(name, FieldKind::Text)
        .title(title)
        .description("Koblingsnøkkel mot Course ID på OIS-nivå")
        .optional()
}

const fn plan_uid(name: &'static str, title: &'static str) -> FieldMeta {
    FieldMeta::new(name, FieldKind::Uid)
        .title(title)
        .description("Koblingsnøkkel mot DICOM-datasett på Plan UID-nivå")
        .optional()
}
