//! Closed DICOM code sets used by the radiotherapy records.

use crate::{DicomError, DicomResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient position relative to the imaging/treatment equipment, DICOM (0018,5100).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatientPosition {
    Hfp,
    Hfs,
    Hfdr,
    Hfdl,
    Ffdr,
    Ffdl,
    Ffp,
    Ffs,
    Lfp,
    Lfs,
    Rfp,
    Rfs,
    Afdr,
    Afdl,
    Pfdr,
    Pfdl,
}

impl PatientPosition {
    /// Every defined term with its meaning, in DICOM order.
    pub const VALUES: &'static [(&'static str, &'static str)] = &[
        ("HFP", "Head First-Prone"),
        ("HFS", "Head First-Supine"),
        ("HFDR", "Head First-Decubitus Right"),
        ("HFDL", "Head First-Decubitus Left"),
        ("FFDR", "Feet First-Decubitus Right"),
        ("FFDL", "Feet First-Decubitus Left"),
        ("FFP", "Feet First-Prone"),
        ("FFS", "Feet First-Supine"),
        ("LFP", "Left First-Prone"),
        ("LFS", "Left First-Supine"),
        ("RFP", "Right First-Prone"),
        ("RFS", "Right First-Supine"),
        ("AFDR", "Anterior First-Decubitus Right"),
        ("AFDL", "Anterior First-Decubitus Left"),
        ("PFDR", "Posterior First-Decubitus Right"),
        ("PFDL", "Posterior First-Decubitus Left"),
    ];

    pub const ALL: [PatientPosition; 16] = [
        PatientPosition::Hfp,
        PatientPosition::Hfs,
        PatientPosition::Hfdr,
        PatientPosition::Hfdl,
        PatientPosition::Ffdr,
        PatientPosition::Ffdl,
        PatientPosition::Ffp,
        PatientPosition::Ffs,
        PatientPosition::Lfp,
        PatientPosition::Lfs,
        PatientPosition::Rfp,
        PatientPosition::Rfs,
        PatientPosition::Afdr,
        PatientPosition::Afdl,
        PatientPosition::Pfdr,
        PatientPosition::Pfdl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatientPosition::Hfp => "HFP",
            PatientPosition::Hfs => "HFS",
            PatientPosition::Hfdr => "HFDR",
            PatientPosition::Hfdl => "HFDL",
            PatientPosition::Ffdr => "FFDR",
            PatientPosition::Ffdl => "FFDL",
            PatientPosition::Ffp => "FFP",
            PatientPosition::Ffs => "FFS",
            PatientPosition::Lfp => "LFP",
            PatientPosition::Lfs => "LFS",
            PatientPosition::Rfp => "RFP",
            PatientPosition::Rfs => "RFS",
            PatientPosition::Afdr => "AFDR",
            PatientPosition::Afdl => "AFDL",
            PatientPosition::Pfdr => "PFDR",
            PatientPosition::Pfdl => "PFDL",
        }
    }

    /// Whether the patient lies head first towards the gantry.
    pub fn is_head_first(self) -> bool {
        matches!(
            self,
            PatientPosition::Hfp
                | PatientPosition::Hfs
                | PatientPosition::Hfdr
                | PatientPosition::Hfdl
        )
    }
}

impl fmt::Display for PatientPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientPosition {
    type Err = DicomError;

    fn from_str(s: &str) -> DicomResult<Self> {
        PatientPosition::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DicomError::UnknownCode {
                kind: "patient position",
                code: s.to_string(),
            })
    }
}

/// Rotation direction of gantry, collimator or couch, DICOM (300A,011F)/(300A,0121)/(300A,0123).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    /// Clockwise.
    #[serde(rename = "CW")]
    Clockwise,
    /// Counter-clockwise.
    #[serde(rename = "CC")]
    CounterClockwise,
    /// No rotation.
    #[serde(rename = "NONE")]
    NoRotation,
}

impl RotationDirection {
    pub const VALUES: &'static [(&'static str, &'static str)] = &[
        ("CW", "Med klokken"),
        ("CC", "Mot klokken"),
        ("NONE", "Ingen rotasjon"),
    ];

    pub const ALL: [RotationDirection; 3] = [
        RotationDirection::Clockwise,
        RotationDirection::CounterClockwise,
        RotationDirection::NoRotation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RotationDirection::Clockwise => "CW",
            RotationDirection::CounterClockwise => "CC",
            RotationDirection::NoRotation => "NONE",
        }
    }
}

impl fmt::Display for RotationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationDirection {
    type Err = DicomError;

    fn from_str(s: &str) -> DicomResult<Self> {
        RotationDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DicomError::UnknownCode {
                kind: "rotation direction",
                code: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_position_values_match_serde_names() {
        assert_eq!(PatientPosition::VALUES.len(), PatientPosition::ALL.len());
        for (position, (code, _)) in PatientPosition::ALL.iter().zip(PatientPosition::VALUES) {
            let json = serde_json::to_string(position).expect("serialize");
            assert_eq!(json, format!("\"{code}\""));
            let back: PatientPosition = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(&back, position);
            assert_eq!(code.parse::<PatientPosition>().expect("parse"), *position);
        }
    }

    #[test]
    fn patient_position_rejects_unknown_code() {
        assert!(serde_json::from_str::<PatientPosition>("\"HFX\"").is_err());
        assert!(serde_json::from_str::<PatientPosition>("\"hfs\"").is_err());
        assert!(matches!(
            "SITTING".parse::<PatientPosition>(),
            Err(DicomError::UnknownCode { .. })
        ));
    }

    #[test]
    fn head_first_positions() {
        assert!(PatientPosition::Hfs.is_head_first());
        assert!(!PatientPosition::Ffs.is_head_first());
    }

    #[test]
    fn rotation_direction_codes() {
        for (direction, (code, _)) in RotationDirection::ALL.iter().zip(RotationDirection::VALUES) {
            assert_eq!(direction.as_str(), *code);
            let json = serde_json::to_string(direction).expect("serialize");
            assert_eq!(json, format!("\"{code}\""));
        }
        assert!(serde_json::from_str::<RotationDirection>("\"CCW\"").is_err());
    }
}
