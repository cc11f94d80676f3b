//! Toxicology module - HED integration and hazard derivation.

mod hazards;
mod integrator;

pub use hazards::{
    derive_hazards, ingredient_key, Hazard, HedAssessmentFields, HedAssessmentNode, Severity,
};
pub use integrator::{
    is_relevant_route, toxicity_priority, CosmeticSafetyAssessment, HedResult,
    IntegrationOutcome, ToxicologyIntegrator, REASON_ALL_FAILED, REASON_NO_DATA,
    REASON_NO_RELEVANT_DATA,
};
