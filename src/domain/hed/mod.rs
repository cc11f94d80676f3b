//! Human Equivalent Dose (HED) scaling.
//!
//! Pure, deterministic allometric conversions between animal and human
//! doses using body-surface-area normalisation (Km factors). Nothing in
//! this module performs I/O or holds mutable state, so every function is
//! safe to call from any number of concurrent callers.

mod calculator;
mod errors;
mod species;

pub use calculator::{
    DermalSafetyAssessment, DermalSafetyParams, DoseConverter, MethodLimitations, MrsdResult,
    SafetyCategory, ScalingMethod, DEFAULT_HUMAN_WEIGHT_KG, KM_HUMAN, ML_TO_MG_FACTOR,
};
pub use errors::DoseError;
pub use species::Species;
