//! Confidence scores.

use serde::{Deserialize, Serialize};

/// A student's mastery of a topic, always within `0..=100`.
///
/// Every constructor clamps, so an out-of-range value read from storage or
/// produced by a gain can never escape into the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: Confidence = Confidence(0);
    pub const MAX: Confidence = Confidence(100);

    /// Create a confidence value, clamping to `0..=100`.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Raise the confidence by `gain`, saturating at 100.
    pub fn with_gain(self, gain: u32) -> Self {
        Self::new(i64::from(self.0) + i64::from(gain))
    }
}

impl From<i64> for Confidence {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
