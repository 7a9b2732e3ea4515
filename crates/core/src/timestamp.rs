//! ISO-8601 timestamps as received from registry sources and APIs.
//!
//! Accepted forms:
//! - `2024-03-01T10:15:00[.ffffff]` and `2024-03-01T10:15` (no offset)
//! - the same with `Z` or a `±HH:MM` offset, which is kept
//! - a space instead of `T` between date and time
//! - a bare date, read as midnight
//!
//! Serialisation writes the ISO form back, with `Z` for a zero offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{0}' (expected ISO-8601 date and time, optionally with offset)")]
pub struct InvalidTimestamp(String);

/// A point in time, with the UTC offset if the source gave one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Local(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// # Errors
    ///
    /// Returns [`InvalidTimestamp`] if `raw` matches none of the accepted forms.
    pub fn parse(raw: &str) -> Result<Self, InvalidTimestamp> {
        let trimmed = raw.trim();
        let normalised = match trimmed.as_bytes().get(10) {
            Some(b' ') => format!("{}T{}", &trimmed[..10], &trimmed[11..]),
            _ => trimmed.to_string(),
        };

        if let Ok(aware) = DateTime::parse_from_rfc3339(&normalised) {
            return Ok(Timestamp::Offset(aware));
        }
        if let Ok(aware) = DateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Ok(Timestamp::Offset(aware));
        }
        for format in NAIVE_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(&normalised, format) {
                return Ok(Timestamp::Local(local));
            }
        }
        NaiveDate::parse_from_str(&normalised, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Timestamp::Local)
            .ok_or_else(|| InvalidTimestamp(raw.to_string()))
    }

    /// The wall-clock time as given by the source.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Timestamp::Local(local) => *local,
            Timestamp::Offset(aware) => aware.naive_local(),
        }
    }

    /// The instant in UTC. Timestamps without an offset are taken to be UTC already.
    pub fn naive_utc(&self) -> NaiveDateTime {
        match self {
            Timestamp::Local(local) => *local,
            Timestamp::Offset(aware) => aware.naive_utc(),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Timestamp::Local(_) => None,
            Timestamp::Offset(aware) => Some(*aware.offset()),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(local: NaiveDateTime) -> Self {
        Timestamp::Local(local)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(aware: DateTime<FixedOffset>) -> Self {
        Timestamp::Offset(aware)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Local(local) => write!(f, "{}", local.format(NAIVE_FORMATS[0])),
            Timestamp::Offset(aware) => {
                f.write_str(&aware.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl FromStr for Timestamp {
    type Err = InvalidTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").expect("naive datetime")
    }

    #[test]
    fn naive_forms() {
        let expected = Timestamp::Local(local("2024-03-01 10:15:00"));
        for raw in ["2024-03-01T10:15:00", "2024-03-01 10:15:00", "2024-03-01T10:15"] {
            assert_eq!(Timestamp::parse(raw).expect(raw), expected, "{raw}");
        }
        assert_eq!(
            Timestamp::parse("2024-03-01").expect("date only"),
            Timestamp::Local(local("2024-03-01 00:00:00"))
        );
        assert_eq!(expected.to_string(), "2024-03-01T10:15:00");
        assert_eq!(expected.offset(), None);
    }

    #[test]
    fn keeps_the_offset() {
        let utc = Timestamp::parse("2024-03-01T10:15:00Z").expect("zulu");
        assert_eq!(utc.offset(), FixedOffset::east_opt(0));
        assert_eq!(utc.to_string(), "2024-03-01T10:15:00Z");

        let oslo = Timestamp::parse("2024-03-01 11:15:00+01:00").expect("offset");
        assert_eq!(oslo.offset(), FixedOffset::east_opt(3600));
        assert_eq!(oslo.local(), local("2024-03-01 11:15:00"));
        assert_eq!(oslo.naive_utc(), utc.naive_utc());
        assert_eq!(oslo.to_string(), "2024-03-01T11:15:00+01:00");
    }

    #[test]
    fn fractional_seconds_survive_round_trip() {
        let stamp = Timestamp::parse("2024-03-01T10:15:00.250").expect("fraction");
        assert_eq!(stamp.to_string(), "2024-03-01T10:15:00.250");
        assert_eq!(Timestamp::parse(&stamp.to_string()).expect("reparse"), stamp);
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["", "01.03.2024", "2024-13-01T00:00:00", "2024-03-01T25:00:00", "now"] {
            assert!(Timestamp::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn serde_round_trip() {
        let wire = [
            "\"2024-03-01T10:15:00Z\"",
            "\"2024-03-01T10:15:00-05:00\"",
            "\"2024-03-01T10:15:00\"",
        ];
        for raw in wire {
            let stamp: Timestamp = serde_json::from_str(raw).expect(raw);
            assert_eq!(serde_json::to_string(&stamp).expect("serialize"), raw);
        }
        let err = serde_json::from_str::<Timestamp>("\"yesterday\"").expect_err("not a timestamp");
        assert!(err.to_string().contains("invalid timestamp"));
    }
}
