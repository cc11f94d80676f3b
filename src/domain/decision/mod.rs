//! Decision module - personalised ingredient and product risk scoring.
//!
//! Six sub-scores are computed per ingredient (blacklist, HED risk, profile
//! match, medication, preference, environmental). A blacklist hit at or
//! above [`BLACKLIST_OVERRIDE_THRESHOLD`] vetoes the weighted blend of the
//! other five.

mod engine;
mod facts;
mod profile;
mod rules;

pub use engine::{
    DecisionEngine, IngredientAssessment, LevelSummary, ProductDecision, Recommendation,
    RiskLevel, ScoreBreakdown, ScoreWeights,
};
pub use facts::IngredientFacts;
pub use profile::{
    AllergyProfile, CorticosteroidUse, Environment, ExposureLevel, MedicationProfile, Physiology,
    Preferences, SkinProfile, UserProfile,
};
pub use rules::{
    blacklist_score, environmental_score, hed_score, medication_score, preference_score,
    profile_match_score, SubScore, BLACKLIST_OVERRIDE_THRESHOLD,
};
