//! Compressed dose-volume histogram curves.
//!
//! A DVH curve is stored as one string per structure:
//!
//! 1. each sample (relative volume in %, static 0.1 Gy dose bins) is multiplied by 100 and
//!    rounded to the nearest integer, so 10 000 means 100 % volume;
//! 2. the integers are packed as big-endian `u16`;
//! 3. the byte string is gzip-compressed;
//! 4. the result is base64-encoded (standard alphabet, padded).
//!
//! Decoding reverses each step. Values therefore survive a round trip up to 0.01 units.

use crate::{DicomError, DicomResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::{Read, Write};

const SCALE: f64 = 100.0;

/// Encode DVH samples into the compressed string form.
///
/// # Errors
///
/// Returns [`DicomError::SampleOutOfRange`] if a sample is not finite or does not fit in
/// `u16` after scaling.
pub fn encode_curve(samples: &[f64]) -> DicomResult<String> {
    let mut packed = Vec::with_capacity(samples.len() * 2);
    for (index, &value) in samples.iter().enumerate() {
        let scaled = (value * SCALE).round();
        if !scaled.is_finite() || scaled < 0.0 || scaled > f64::from(u16::MAX) {
            return Err(DicomError::SampleOutOfRange { index, value });
        }
        packed.extend_from_slice(&(scaled as u16).to_be_bytes());
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&packed)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

/// Decode the compressed string form back into DVH samples.
///
/// ASCII whitespace (line wrapping from spreadsheets or mail) is ignored.
///
/// # Errors
///
/// Returns an error for invalid base64, an invalid gzip stream, or an odd number of bytes.
pub fn decode_curve(encoded: &str) -> DicomResult<Vec<f64>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let compressed = STANDARD.decode(compact.as_bytes())?;

    let mut packed = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut packed)?;

    if packed.len() % 2 != 0 {
        return Err(DicomError::OddPayload(packed.len()));
    }

    Ok(packed
        .chunks_exact(2)
        .map(|pair| f64::from(u16::from_be_bytes([pair[0], pair[1]])) / SCALE)
        .collect())
}

/// A DVH curve held in its compressed string form.
///
/// Deserialisation decodes the payload once to prove it is well formed; the string itself is
/// kept so that re-serialisation is byte-identical to the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedDvh(String);

impl CompressedDvh {
    /// Compress `samples` into a new curve.
    ///
    /// # Errors
    ///
    /// See [`encode_curve`].
    pub fn from_samples(samples: &[f64]) -> DicomResult<Self> {
        encode_curve(samples).map(Self)
    }

    /// Wrap an already-encoded curve after checking that it decodes.
    ///
    /// # Errors
    ///
    /// See [`decode_curve`].
    pub fn parse(encoded: &str) -> DicomResult<Self> {
        decode_curve(encoded)?;
        Ok(Self(encoded.trim().to_string()))
    }

    /// The decoded samples.
    ///
    /// # Errors
    ///
    /// See [`decode_curve`].
    pub fn samples(&self) -> DicomResult<Vec<f64>> {
        decode_curve(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for CompressedDvh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CompressedDvh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
