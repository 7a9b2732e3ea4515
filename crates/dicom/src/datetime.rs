//! DICOM `DA` and `TM` values.
//!
//! Source data carries dates as `YYYYMMDD` and times as `HHMMSS[.ffffff]`. Both are normalised
//! to ISO-8601 (`YYYY-MM-DD`, `HH:MM:SS`) when a record is ingested and are always serialised
//! in ISO form. Already-normalised input is accepted as well, so a serialised record parses
//! back to the same value.

use crate::{DicomError, DicomResult};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar date taken from a DICOM `DA` element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DicomDate(NaiveDate);

impl DicomDate {
    /// Parses `YYYYMMDD` (or `YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns [`DicomError::InvalidDate`] for any other shape or an impossible calendar date.
    pub fn parse(raw: &str) -> DicomResult<Self> {
        let trimmed = raw.trim();
        let invalid = || DicomError::InvalidDate(raw.to_string());
        if !trimmed.is_ascii() {
            return Err(invalid());
        }

        let (year, month, day) = match trimmed.len() {
            8 if all_digits(trimmed) => (&trimmed[0..4], &trimmed[4..6], &trimmed[6..8]),
            10 if trimmed.as_bytes()[4] == b'-' && trimmed.as_bytes()[7] == b'-' => {
                (&trimmed[0..4], &trimmed[5..7], &trimmed[8..10])
            }
            _ => return Err(invalid()),
        };

        if !(all_digits(year) && all_digits(month) && all_digits(day)) {
            return Err(invalid());
        }

        let date = NaiveDate::from_ymd_opt(
            year.parse().map_err(|_| invalid())?,
            month.parse().map_err(|_| invalid())?,
            day.parse().map_err(|_| invalid())?,
        )
        .ok_or_else(invalid)?;

        Ok(Self(date))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The DICOM wire form, `YYYYMMDD`.
    pub fn to_dicom_string(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }
}

impl fmt::Display for DicomDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DicomDate {
    type Err = DicomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DicomDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DicomDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A time of day taken from a DICOM `TM` element, truncated to whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DicomTime(NaiveTime);

impl DicomTime {
    /// Parses `HHMMSS[.ffffff]` (or `HH:MM:SS`). Fractional seconds are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DicomError::InvalidTime`] for any other shape or an out-of-range component.
    pub fn parse(raw: &str) -> DicomResult<Self> {
        let trimmed = raw.trim();
        let invalid = || DicomError::InvalidTime(raw.to_string());
        if !trimmed.is_ascii() {
            return Err(invalid());
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };

        if let Some(fraction) = fraction {
            if fraction.is_empty() || fraction.len() > 6 || !all_digits(fraction) {
                return Err(invalid());
            }
        }

        let (hour, minute, second) = match whole.len() {
            6 if all_digits(whole) => (&whole[0..2], &whole[2..4], &whole[4..6]),
            8 if fraction.is_none()
                && whole.as_bytes()[2] == b':'
                && whole.as_bytes()[5] == b':' =>
            {
                (&whole[0..2], &whole[3..5], &whole[6..8])
            }
            _ => return Err(invalid()),
        };

        if !(all_digits(hour) && all_digits(minute) && all_digits(second)) {
            return Err(invalid());
        }

        let time = NaiveTime::from_hms_opt(
            hour.parse().map_err(|_| invalid())?,
            minute.parse().map_err(|_| invalid())?,
            second.parse().map_err(|_| invalid())?,
        )
        .ok_or_else(invalid)?;

        Ok(Self(time))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for DicomTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

impl FromStr for DicomTime {
    type Err = DicomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DicomTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DicomTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_dicom_date() {
        let date = DicomDate::parse("20240115").expect("valid date");
        assert_eq!(date.to_string(), "2024-01-15");
        assert_eq!(date.to_dicom_string(), "20240115");
    }

    #[test]
    fn date_round_trip_is_idempotent() {
        let date = DicomDate::parse("20240115").expect("valid date");
        let again = DicomDate::parse(&date.to_string()).expect("iso date");
        assert_eq!(date, again);
    }

    #[test]
    fn rejects_impossible_or_malformed_dates() {
        for raw in ["20240230", "2024011", "2024-1-15", "2024/01/15", "abcdefgh", ""] {
            assert!(
                matches!(DicomDate::parse(raw), Err(DicomError::InvalidDate(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn normalises_dicom_time_and_drops_fraction() {
        let time = DicomTime::parse("153045.500").expect("valid time");
        assert_eq!(time.to_string(), "15:30:45");

        let time = DicomTime::parse("000000").expect("midnight");
        assert_eq!(time.to_string(), "00:00:00");
    }

    #[test]
    fn time_accepts_iso_form() {
        let time = DicomTime::parse("15:30:45").expect("iso time");
        assert_eq!(time, DicomTime::parse("153045").expect("dicom time"));
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["256000", "1530", "153045.", "153045.1234567", "15:30:45.1", "15-30-45"] {
            assert!(
                matches!(DicomTime::parse(raw), Err(DicomError::InvalidTime(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn serde_uses_iso_form() {
        let date: DicomDate = serde_json::from_str("\"20231231\"").expect("deserialize");
        assert_eq!(serde_json::to_string(&date).expect("serialize"), "\"2023-12-31\"");

        let time: DicomTime = serde_json::from_str("\"083000.000001\"").expect("deserialize");
        assert_eq!(serde_json::to_string(&time).expect("serialize"), "\"08:30:00\"");
    }
}
