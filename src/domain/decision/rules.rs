//! Sub-score rules.
//!
//! Each rule yields a score in 0..=100 and, when it fired, a reason. Within
//! a rule family the first matching branch wins.

use super::facts::IngredientFacts;
use super::profile::{ExposureLevel, UserProfile};

/// Blacklist scores at or above this value veto the weighted formula.
pub const BLACKLIST_OVERRIDE_THRESHOLD: u8 = 90;

pub const PROFILE_BASELINE: u8 = 20;
pub const MEDICATION_BASELINE: u8 = 10;
pub const PREFERENCE_BASELINE: u8 = 5;
pub const ENVIRONMENTAL_BASELINE: u8 = 5;
pub const HED_MISSING_SCORE: u8 = 25;

/// A single sub-score and the reason it fired, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubScore {
    pub score: u8,
    pub reason: Option<String>,
}

impl SubScore {
    fn fired(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score,
            reason: Some(reason.into()),
        }
    }

    fn baseline(score: u8) -> Self {
        Self {
            score,
            reason: None,
        }
    }
}

pub fn blacklist_score(profile: &UserProfile, facts: &IngredientFacts) -> SubScore {
    if profile.is_intolerant_to(&facts.inci) {
        SubScore::fired(100, format!("{} is on your intolerance list", facts.inci))
    } else if profile.is_advised_to_avoid(&facts.inci) {
        SubScore::fired(
            95,
            format!("{} is on your dermatologist's avoid list", facts.inci),
        )
    } else {
        SubScore::baseline(0)
    }
}

/// Maps the stored HED risk category onto a score.
///
/// Missing or unrecognised data scores a neutral 25: absence of data is not
/// treated as safe.
pub fn hed_score(facts: &IngredientFacts) -> SubScore {
    let Some(category) = facts.hed_risk_assessment.as_deref() else {
        return SubScore::fired(HED_MISSING_SCORE, "No HED safety data available");
    };

    let score = match category.trim().to_uppercase().as_str() {
        "CRITICAL" | "HIGH_RISK" => 90,
        "HIGH" | "REQUIRES_CAREFUL_FORMULATION" => 70,
        "MODERATE" | "SAFE_WITH_LIMITS" => 45,
        "LOW" | "SAFE_AT_TYPICAL_USE" | "SAFE_AT_ANY_CONCENTRATION" => 15,
        _ => return SubScore::fired(HED_MISSING_SCORE, "Unrecognised HED safety category"),
    };

    if score >= 70 {
        SubScore::fired(score, format!("Low safe concentration ({})", category))
    } else {
        SubScore::baseline(score)
    }
}

pub fn profile_match_score(profile: &UserProfile, facts: &IngredientFacts) -> SubScore {
    let skin = &profile.skin;

    if (skin.sensitive || skin.atopic) && (facts.causes_irritation() || facts.causes_sensitization())
    {
        SubScore::fired(75, "May irritate or sensitize sensitive/atopic skin")
    } else if skin.barrier_dysfunction && facts.has_high_severity_hazard() {
        SubScore::fired(70, "High-severity hazard with impaired skin barrier")
    } else if skin.acne_prone && facts.is_comedogenic() {
        SubScore::fired(60, "Comedogenic ingredient for acne-prone skin")
    } else if (skin.rosacea || skin.sensitive) && facts.is_fragrance() {
        SubScore::fired(65, "Fragrance may trigger rosacea or sensitive skin")
    } else if (skin.eczema || skin.psoriasis) && facts.causes_irritation() {
        SubScore::fired(70, "Irritant for eczema/psoriasis-affected skin")
    } else if profile.allergies.reported() && facts.causes_sensitization() {
        SubScore::fired(55, "Sensitizer with a history of cosmetic allergies")
    } else {
        SubScore::baseline(PROFILE_BASELINE)
    }
}

pub fn medication_score(profile: &UserProfile, facts: &IngredientFacts) -> SubScore {
    let meds = &profile.medications;

    if meds.photosensitizing
        && profile.environment.sun_exposure == ExposureLevel::High
        && facts.causes_photosensitivity()
    {
        SubScore::fired(
            85,
            "Photosensitivity hazard with photosensitizing medication and high sun exposure",
        )
    } else if meds.retinoid_therapy && facts.conflicts_with_retinoids() {
        SubScore::fired(60, "May over-exfoliate alongside retinoid therapy")
    } else if meds.corticosteroids.is_topical() && profile.skin.barrier_dysfunction {
        SubScore::fired(50, "Topical corticosteroid use with impaired skin barrier")
    } else {
        SubScore::baseline(MEDICATION_BASELINE)
    }
}

pub fn preference_score(profile: &UserProfile, facts: &IngredientFacts) -> SubScore {
    let prefs = &profile.preferences;

    if prefs.fragrance_free && facts.is_fragrance() {
        SubScore::fired(40, "Contains fragrance (you prefer fragrance-free)")
    } else if prefs.avoid_parabens && facts.is_paraben() {
        SubScore::fired(35, "Paraben (you avoid parabens)")
    } else if prefs.avoid_sulfates && facts.is_sulfate() {
        SubScore::fired(35, "Sulfate (you avoid sulfates)")
    } else if prefs.avoid_silicones && facts.is_silicone() {
        SubScore::fired(30, "Silicone (you avoid silicones)")
    } else {
        SubScore::baseline(PREFERENCE_BASELINE)
    }
}

pub fn environmental_score(profile: &UserProfile, facts: &IngredientFacts) -> SubScore {
    let env = &profile.environment;

    if env.pollution == ExposureLevel::High && facts.causes_oxidative_stress() {
        SubScore::fired(25, "Oxidative-stress hazard with high pollution exposure")
    } else if env.sun_exposure == ExposureLevel::High && facts.photodegrades() {
        SubScore::fired(30, "Light-sensitive ingredient with high sun exposure")
    } else {
        SubScore::baseline(ENVIRONMENTAL_BASELINE)
    }
}
