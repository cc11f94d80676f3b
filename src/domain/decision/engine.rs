//! Decision engine - weighted per-ingredient risk and product verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::facts::IngredientFacts;
use super::profile::UserProfile;
use super::rules::{
    blacklist_score, environmental_score, hed_score, medication_score, preference_score,
    profile_match_score, SubScore, BLACKLIST_OVERRIDE_THRESHOLD,
};
use crate::domain::foundation::{IngredientKey, RiskScore, ValidationError};

/// Tolerance for the weights summing to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Risk band derived purely from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            86..=100 => RiskLevel::Critical,
            61..=85 => RiskLevel::High,
            31..=60 => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights of the five blended sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub hed: f64,
    pub profile: f64,
    pub medication: f64,
    pub preference: f64,
    pub environmental: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hed: 0.35,
            profile: 0.25,
            medication: 0.20,
            preference: 0.15,
            environmental: 0.05,
        }
    }
}

impl ScoreWeights {
    /// Weights must be non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let all = [
            ("hed", self.hed),
            ("profile", self.profile),
            ("medication", self.medication),
            ("preference", self.preference),
            ("environmental", self.environmental),
        ];
        for (field, weight) in all {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::invalid_format(
                    field,
                    "weight must be a non-negative number",
                ));
            }
        }
        let sum: f64 = all.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::invalid_format(
                "weights",
                format!("weights must sum to 1.0, got {}", sum),
            ));
        }
        Ok(())
    }
}

/// The six sub-scores behind an ingredient's final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub blacklist: u8,
    pub hed: u8,
    pub profile_match: u8,
    pub medication: u8,
    pub preference: u8,
    pub environmental: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientAssessment {
    pub inci: String,
    pub ingredient_key: IngredientKey,
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub score_breakdown: ScoreBreakdown,
    /// True when the blacklist vetoed the weighted formula.
    pub blacklisted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    NotRecommended,
    UseWithCaution,
    PatchTestFirst,
    Suitable,
    InsufficientData,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::NotRecommended => {
                "Not recommended: contains ingredients that are high risk for your profile"
            }
            Recommendation::UseWithCaution => "Use with caution and monitor for reactions",
            Recommendation::PatchTestFirst => "Patch test before regular use",
            Recommendation::Suitable => "Suitable for your profile",
            Recommendation::InsufficientData => {
                "Insufficient data to assess this product for your profile"
            }
        }
    }
}

/// Number of ingredients per risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelSummary {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
}

impl LevelSummary {
    fn count(assessments: &[IngredientAssessment]) -> Self {
        let mut summary = Self::default();
        for assessment in assessments {
            match assessment.risk_level {
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Moderate => summary.moderate += 1,
                RiskLevel::High => summary.high += 1,
                RiskLevel::Critical => summary.critical += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDecision {
    pub overall_risk: RiskLevel,
    pub risk_score: RiskScore,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
    /// Ingredients ordered by descending risk score.
    pub ingredients: Vec<IngredientAssessment>,
    pub summary: LevelSummary,
    pub reasons: Vec<String>,
}

/// Combines sub-scores into ingredient and product verdicts.
///
/// Pure and stateless apart from the weights; safe to share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    weights: ScoreWeights,
}

impl DecisionEngine {
    pub fn new(weights: ScoreWeights) -> Result<Self, ValidationError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Scores a single ingredient against the profile.
    pub fn assess_ingredient(
        &self,
        profile: &UserProfile,
        facts: &IngredientFacts,
    ) -> IngredientAssessment {
        let blacklist = blacklist_score(profile, facts);
        let hed = hed_score(facts);
        let profile_match = profile_match_score(profile, facts);
        let medication = medication_score(profile, facts);
        let preference = preference_score(profile, facts);
        let environmental = environmental_score(profile, facts);

        let score_breakdown = ScoreBreakdown {
            blacklist: blacklist.score,
            hed: hed.score,
            profile_match: profile_match.score,
            medication: medication.score,
            preference: preference.score,
            environmental: environmental.score,
        };

        let blacklisted = blacklist.score >= BLACKLIST_OVERRIDE_THRESHOLD;
        let risk_score = if blacklisted {
            RiskScore::new(blacklist.score)
        } else {
            let w = &self.weights;
            RiskScore::from_weighted(
                f64::from(hed.score) * w.hed
                    + f64::from(profile_match.score) * w.profile
                    + f64::from(medication.score) * w.medication
                    + f64::from(preference.score) * w.preference
                    + f64::from(environmental.score) * w.environmental,
            )
        };

        let reasons = [
            &blacklist,
            &hed,
            &profile_match,
            &medication,
            &preference,
            &environmental,
        ]
        .into_iter()
        .filter_map(|s: &SubScore| s.reason.clone())
        .collect();

        IngredientAssessment {
            inci: facts.inci.clone(),
            ingredient_key: facts.ingredient_key.clone(),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            reasons,
            score_breakdown,
            blacklisted,
        }
    }

    /// Scores every ingredient and aggregates a product verdict.
    ///
    /// An empty ingredient list yields a LOW verdict with insufficient data.
    pub fn decide(&self, profile: &UserProfile, ingredients: &[IngredientFacts]) -> ProductDecision {
        let mut assessments: Vec<IngredientAssessment> = ingredients
            .iter()
            .map(|facts| self.assess_ingredient(profile, facts))
            .collect();
        assessments.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

        let summary = LevelSummary::count(&assessments);

        if assessments.is_empty() {
            return ProductDecision {
                overall_risk: RiskLevel::Low,
                risk_score: RiskScore::ZERO,
                recommendation: Recommendation::InsufficientData,
                recommendation_text: Recommendation::InsufficientData.message().to_string(),
                ingredients: assessments,
                summary,
                reasons: vec!["No ingredient data available for this product".to_string()],
            };
        }

        let mut reasons = Vec::new();
        let risk_score = product_score(&assessments);
        if summary.critical > 0 {
            reasons.push(format!(
                "{} critical ingredient(s); product score follows the worst one",
                summary.critical
            ));
        }
        let overall_risk = RiskLevel::from_score(risk_score);

        let recommendation = if summary.critical > 0 {
            Recommendation::NotRecommended
        } else if summary.high >= 3 {
            reasons.push(format!("{} high-risk ingredients", summary.high));
            Recommendation::NotRecommended
        } else {
            match overall_risk {
                RiskLevel::Critical => Recommendation::NotRecommended,
                RiskLevel::High => Recommendation::UseWithCaution,
                RiskLevel::Moderate => Recommendation::PatchTestFirst,
                RiskLevel::Low if summary.high > 0 => Recommendation::PatchTestFirst,
                RiskLevel::Low => Recommendation::Suitable,
            }
        };

        ProductDecision {
            overall_risk,
            risk_score,
            recommendation,
            recommendation_text: recommendation.message().to_string(),
            ingredients: assessments,
            summary,
            reasons,
        }
    }
}

/// Worst critical score if any ingredient is critical, otherwise a mean
/// weighted toward riskier ingredients (3 for HIGH+, 2 for MODERATE, 1 else).
fn product_score(assessments: &[IngredientAssessment]) -> RiskScore {
    let worst_critical = assessments
        .iter()
        .filter(|a| a.risk_level == RiskLevel::Critical)
        .map(|a| a.risk_score)
        .max();
    if let Some(score) = worst_critical {
        return score;
    }

    let (weighted_sum, weight_total) =
        assessments
            .iter()
            .fold((0.0, 0.0), |(sum, total), assessment| {
                let weight = match assessment.risk_score.value() {
                    61..=100 => 3.0,
                    31..=60 => 2.0,
                    _ => 1.0,
                };
                (sum + assessment.risk_score.as_f64() * weight, total + weight)
            });

    if weight_total == 0.0 {
        RiskScore::ZERO
    } else {
        RiskScore::from_weighted(weighted_sum / weight_total)
    }
}
