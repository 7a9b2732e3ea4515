//! DICOM wire/boundary support.
//!
//! This crate translates between values as they appear in DICOM-derived source data and the
//! typed values used by the NORPREG data model in `norpreg-core`:
//! - [`DicomDate`] / [`DicomTime`]: `DA`/`TM` values normalised to ISO-8601 on ingestion.
//! - [`DicomUid`]: validated `UI` values (study, series, SOP instance UIDs).
//! - [`PatientPosition`] / [`RotationDirection`]: closed DICOM code sets.
//! - [`CompressedDvh`]: the byte-packed, gzipped, base64-encoded dose-volume curve.
//!
//! Registry meaning lives in `norpreg-core`. This crate handles encodings only.

pub mod codes;
pub mod datetime;
pub mod dvh;
pub mod uid;

pub use codes::{PatientPosition, RotationDirection};
pub use datetime::{DicomDate, DicomTime};
pub use dvh::{decode_curve, encode_curve, CompressedDvh};
pub use uid::DicomUid;

use thiserror::Error;

/// Errors returned by the `dicom` boundary crate.
#[derive(Debug, Error)]
pub enum DicomError {
    #[error("invalid DICOM date '{0}' (expected YYYYMMDD)")]
    InvalidDate(String),

    #[error("invalid DICOM time '{0}' (expected HHMMSS[.ffffff])")]
    InvalidTime(String),

    #[error("invalid DICOM UID: {0}")]
    InvalidUid(String),

    #[error("unknown {kind} code '{code}'")]
    UnknownCode { kind: &'static str, code: String },

    #[error("DVH sample {value} at index {index} is outside 0..=655.35")]
    SampleOutOfRange { index: usize, value: f64 },

    #[error("invalid base64 in DVH string: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("DVH compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("DVH payload has odd length {0}; expected packed 16-bit samples")]
    OddPayload(usize),
}

/// Type alias for Results that can fail with a [`DicomError`].
pub type DicomResult<T> = Result<T, DicomError>;
