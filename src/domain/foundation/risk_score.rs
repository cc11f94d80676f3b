//! Risk score value object (integer 0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// An integer risk score between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    /// No risk.
    pub const ZERO: Self = Self(0);

    /// Maximum risk.
    pub const MAX: Self = Self(100);

    /// Creates a new RiskScore, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a RiskScore, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range("risk_score", 0, 100, value as i32));
        }
        Ok(Self(value))
    }

    /// Rounds a weighted floating-point score to the nearest integer
    /// (halves away from zero) and clamps it into 0..=100.
    ///
    /// Non-finite input collapses to zero.
    pub fn from_weighted(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self::ZERO;
        }
        Self(raw.round().clamp(0.0, 100.0) as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as f64 for weighting.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for RiskScore {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_score_new_clamps_to_100() {
        assert_eq!(RiskScore::new(101).value(), 100);
        assert_eq!(RiskScore::new(255).value(), 100);
        assert_eq!(RiskScore::new(42).value(), 42);
    }

    #[test]
    fn risk_score_try_new_rejects_over_100() {
        match RiskScore::try_new(101) {
            Err(ValidationError::OutOfRange { field, min, max, actual }) => {
                assert_eq!(field, "risk_score");
                assert_eq!(min, 0);
                assert_eq!(max, 100);
                assert_eq!(actual, 101);
            }
            _ => panic!("Expected OutOfRange error"),
        }
    }

    #[test]
    fn from_weighted_rounds_and_clamps() {
        assert_eq!(RiskScore::from_weighted(13.25).value(), 13);
        assert_eq!(RiskScore::from_weighted(13.5).value(), 14);
        assert_eq!(RiskScore::from_weighted(-4.0).value(), 0);
        assert_eq!(RiskScore::from_weighted(140.0).value(), 100);
        assert_eq!(RiskScore::from_weighted(f64::NAN).value(), 0);
    }

    #[test]
    fn risk_score_serializes_as_integer() {
        let json = serde_json::to_string(&RiskScore::new(92)).unwrap();
        assert_eq!(json, "92");
        let back: RiskScore = serde_json::from_str("15").unwrap();
        assert_eq!(back.value(), 15);
    }
}
