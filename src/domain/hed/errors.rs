//! Dose conversion errors.

use thiserror::Error;

use super::Species;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised by [`super::DoseConverter`].
///
/// Each error is fatal only to the single computation that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DoseError {
    #[error("Invalid dose for '{field}': {value} (must be a positive finite number)")]
    InvalidDose { field: &'static str, value: f64 },

    #[error("Invalid parameter '{field}': {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Unsupported dose unit: {0}")]
    UnsupportedUnit(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("No standard body weight defined for {0}")]
    MissingReferenceWeight(Species),

    #[error("No usable NOAEL values for MRSD calculation")]
    NoUsableNoael,
}

impl DoseError {
    pub(crate) fn invalid(field: &'static str, value: f64) -> Self {
        DoseError::InvalidDose { field, value }
    }
}

impl From<DoseError> for DomainError {
    fn from(err: DoseError) -> Self {
        DomainError::new(ErrorCode::InvalidDose, err.to_string())
    }
}

/// Rejects zero, negative and non-finite inputs.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64, DoseError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DoseError::invalid(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_positive_rejects_zero_negative_and_nan() {
        assert!(ensure_positive("dose", 0.0).is_err());
        assert!(ensure_positive("dose", -1.0).is_err());
        assert!(ensure_positive("dose", f64::NAN).is_err());
        assert!(ensure_positive("dose", f64::INFINITY).is_err());
        assert_eq!(ensure_positive("dose", 2.5), Ok(2.5));
    }

    #[test]
    fn invalid_dose_displays_field() {
        let err = DoseError::invalid("animal_dose_mg_kg", -3.0);
        assert!(err.to_string().contains("animal_dose_mg_kg"));
    }

    #[test]
    fn maps_to_invalid_dose_code() {
        let err: DomainError = DoseError::UnsupportedUnit("ppm".to_string()).into();
        assert_eq!(err.code, ErrorCode::InvalidDose);
        assert!(err.message.contains("ppm"));
    }
}
