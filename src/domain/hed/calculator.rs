//! Dose converter - allometric scaling between animal and human doses.
//!
//! Implements the body-surface-area method (Nair & Jacob, 2016):
//!
//! - weight-based HED: `dose × (W_animal / W_human)^0.33`
//! - Km-based HED: `dose × (Km_animal / Km_human)`
//! - AED, the inverse of the Km conversion
//! - mg/kg ↔ mg/m² via Km
//! - Km adjustment for non-standard animal weights: `Km_ref × (W / W_ref)^(2/3)`
//! - MRSD: most sensitive species' HED divided by a safety factor
//! - dermal safe-concentration estimate for cosmetic use
//!
//! # Known approximations
//!
//! - mL/kg doses are converted with a density of 1 g/mL (`× 1000`).
//! - mg/cm² is converted to % w/w by dividing by 10, which assumes 1 g of
//!   product per cm² of skin.
//!
//! Neither conversion has been validated against measured densities; treat
//! results derived from them as screening values.

use serde::{Deserialize, Serialize};

use super::errors::ensure_positive;
use super::{DoseError, Species};

/// Km factor of an adult human.
pub const KM_HUMAN: f64 = 37.0;

/// Reference adult body weight in kg.
pub const DEFAULT_HUMAN_WEIGHT_KG: f64 = 60.0;

/// mL/kg → mg/kg, assuming unit density (1 mL ≈ 1 g = 1000 mg).
pub const ML_TO_MG_FACTOR: f64 = 1000.0;

/// Exponent of the weight-based HED equation.
const WEIGHT_EXPONENT: f64 = 0.33;

/// Units accepted as already being mg per kg body weight.
const MG_PER_KG_UNITS: &[&str] = &[
    "mg/kg",
    "mg/kg-day",
    "mg/kg/day",
    "mg/kg bw/day",
    "mg/kg-bw/day",
    "mg/kg bw",
    "mg/kg-bw",
];

/// Which HED equation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Km ratio (body surface area).
    #[default]
    Km,
    /// Body weight raised to 0.33.
    Weight,
}

impl ScalingMethod {
    /// Human-readable label stored alongside results.
    pub fn label(&self) -> &'static str {
        match self {
            ScalingMethod::Km => "Km-based (Eq. 2)",
            ScalingMethod::Weight => "Weight-based (Eq. 1)",
        }
    }
}

/// Result of the five-step MRSD procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrsdResult {
    /// HED per species that could be converted, in input order.
    pub hed_values: Vec<(Species, f64)>,
    pub most_sensitive_species: Species,
    pub lowest_hed_mg_kg: f64,
    pub safety_factor: f64,
    pub mrsd_mg_kg: f64,
    pub total_mrsd_mg: f64,
    pub human_weight_kg: f64,
    pub method: ScalingMethod,
}

/// Exposure assumptions for a dermal (leave-on) application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DermalSafetyParams {
    pub application_area_cm2: f64,
    pub skin_penetration_percent: f64,
    pub safety_factor: f64,
}

impl Default for DermalSafetyParams {
    fn default() -> Self {
        Self {
            application_area_cm2: 100.0,
            skin_penetration_percent: 10.0,
            safety_factor: 100.0,
        }
    }
}

/// Safe-concentration band for a cosmetic ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyCategory {
    SafeAtAnyConcentration,
    SafeAtTypicalUse,
    SafeWithLimits,
    RequiresCarefulFormulation,
    HighRisk,
}

impl SafetyCategory {
    /// Classifies a safe concentration (% w/w) into a band.
    pub fn from_percent(percent: f64) -> Self {
        if percent > 100.0 {
            SafetyCategory::SafeAtAnyConcentration
        } else if percent > 10.0 {
            SafetyCategory::SafeAtTypicalUse
        } else if percent > 1.0 {
            SafetyCategory::SafeWithLimits
        } else if percent > 0.1 {
            SafetyCategory::RequiresCarefulFormulation
        } else {
            SafetyCategory::HighRisk
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyCategory::SafeAtAnyConcentration => "SAFE_AT_ANY_CONCENTRATION",
            SafetyCategory::SafeAtTypicalUse => "SAFE_AT_TYPICAL_USE",
            SafetyCategory::SafeWithLimits => "SAFE_WITH_LIMITS",
            SafetyCategory::RequiresCarefulFormulation => "REQUIRES_CAREFUL_FORMULATION",
            SafetyCategory::HighRisk => "HIGH_RISK",
        }
    }

    /// Formulation advice for a concentration in this band.
    pub fn recommendation(&self, percent: f64) -> String {
        match self {
            SafetyCategory::SafeAtAnyConcentration => {
                "No concentration limit needed based on toxicology data".to_string()
            }
            SafetyCategory::SafeAtTypicalUse => {
                format!("Safe at concentrations up to {:.2}%", percent)
            }
            SafetyCategory::SafeWithLimits => {
                format!("Use at concentrations below {:.2}%", percent)
            }
            SafetyCategory::RequiresCarefulFormulation => {
                format!("Limit to {:.2}% or less", percent)
            }
            SafetyCategory::HighRisk => {
                format!("Very low safe concentration: {:.4}%", percent)
            }
        }
    }
}

/// Every intermediate value of a dermal safe-concentration estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DermalSafetyAssessment {
    /// Animal dose the HED was derived from, when computed from one.
    pub animal_dose_mg_kg: Option<f64>,
    pub hed_mg_kg: f64,
    pub safe_systemic_dose_mg: f64,
    pub safety_factor: f64,
    pub safe_dose_with_sf_mg: f64,
    pub skin_penetration_percent: f64,
    pub max_dermal_application_mg: f64,
    pub application_area_cm2: f64,
    pub safe_concentration_mg_cm2: f64,
    pub safe_concentration_percent: f64,
    pub category: SafetyCategory,
    pub recommendation: String,
}

/// Documented exclusions of body-surface-area scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodLimitations {
    pub do_not_use_for_human_scaling: &'static [&'static str],
    pub do_not_use_for_routes: &'static [&'static str],
    pub do_not_use_for_substances: &'static [&'static str],
    pub warnings: &'static [&'static str],
}

/// Converts animal-study doses into human-equivalent values.
///
/// Stateless apart from the reference human body weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseConverter {
    human_weight_kg: f64,
}

impl Default for DoseConverter {
    fn default() -> Self {
        Self {
            human_weight_kg: DEFAULT_HUMAN_WEIGHT_KG,
        }
    }
}

impl DoseConverter {
    /// Creates a converter for the given reference human weight.
    pub fn new(human_weight_kg: f64) -> Result<Self, DoseError> {
        Ok(Self {
            human_weight_kg: ensure_positive("human_weight_kg", human_weight_kg)?,
        })
    }

    pub fn human_weight_kg(&self) -> f64 {
        self.human_weight_kg
    }

    /// True for units in the mg-per-kg family.
    pub fn is_mg_per_kg_unit(unit: &str) -> bool {
        let unit = unit.trim().to_lowercase();
        MG_PER_KG_UNITS.contains(&unit.as_str())
    }

    /// True for mL-per-kg units (converted with the density approximation).
    pub fn is_ml_per_kg_unit(unit: &str) -> bool {
        unit.trim().to_lowercase().starts_with("ml/kg")
    }

    /// Normalises a dose to mg/kg.
    ///
    /// mL/kg is multiplied by [`ML_TO_MG_FACTOR`]; any other unit outside
    /// the mg/kg family is rejected.
    pub fn normalize_dose(value: f64, unit: &str) -> Result<f64, DoseError> {
        let value = ensure_positive("dose", value)?;
        if Self::is_mg_per_kg_unit(unit) {
            Ok(value)
        } else if Self::is_ml_per_kg_unit(unit) {
            Ok(value * ML_TO_MG_FACTOR)
        } else {
            Err(DoseError::UnsupportedUnit(unit.to_string()))
        }
    }

    /// Weight-based HED: `dose × (W_animal / W_human)^0.33`.
    ///
    /// `human_weight_kg` defaults to the converter's reference weight.
    pub fn hed_by_weight(
        &self,
        animal_dose_mg_kg: f64,
        animal_weight_kg: f64,
        human_weight_kg: Option<f64>,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("animal_dose_mg_kg", animal_dose_mg_kg)?;
        let animal_weight = ensure_positive("animal_weight_kg", animal_weight_kg)?;
        let human_weight =
            ensure_positive("human_weight_kg", human_weight_kg.unwrap_or(self.human_weight_kg))?;

        Ok(dose * (animal_weight / human_weight).powf(WEIGHT_EXPONENT))
    }

    /// Km-based HED: `dose × (Km_species / Km_human)`.
    pub fn hed_by_km(
        &self,
        animal_dose_mg_kg: f64,
        species: Species,
        custom_km: Option<f64>,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("animal_dose_mg_kg", animal_dose_mg_kg)?;
        let km = Self::resolve_km(species, custom_km)?;
        Ok(dose * (km / KM_HUMAN))
    }

    /// Animal equivalent dose: `human_dose × (Km_human / Km_species)`.
    pub fn aed(
        &self,
        human_dose_mg_kg: f64,
        species: Species,
        custom_km: Option<f64>,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("human_dose_mg_kg", human_dose_mg_kg)?;
        let km = Self::resolve_km(species, custom_km)?;
        Ok(dose * (KM_HUMAN / km))
    }

    /// mg/kg → mg/m² (`× Km`).
    pub fn mg_kg_to_mg_m2(
        &self,
        dose_mg_kg: f64,
        species: Species,
        custom_km: Option<f64>,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("dose_mg_kg", dose_mg_kg)?;
        Ok(Self::resolve_km(species, custom_km)? * dose)
    }

    /// mg/m² → mg/kg (`÷ Km`).
    pub fn mg_m2_to_mg_kg(
        &self,
        dose_mg_m2: f64,
        species: Species,
        custom_km: Option<f64>,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("dose_mg_m2", dose_mg_m2)?;
        Ok(dose / Self::resolve_km(species, custom_km)?)
    }

    /// Km adjusted for an animal heavier or lighter than the species
    /// reference: `Km_ref × (W / W_ref)^(2/3)`.
    pub fn km_for_weight(
        &self,
        actual_weight_kg: f64,
        reference_species: Species,
    ) -> Result<f64, DoseError> {
        let weight = ensure_positive("actual_weight_kg", actual_weight_kg)?;
        let reference_weight = reference_species
            .standard_weight_kg()
            .ok_or(DoseError::MissingReferenceWeight(reference_species))?;

        Ok(reference_species.km() * (weight / reference_weight).powf(2.0 / 3.0))
    }

    /// Maximum recommended starting dose.
    ///
    /// Converts every NOAEL to an HED, selects the species with the lowest
    /// HED, divides by `safety_factor` and scales to a total dose for the
    /// reference human. With [`ScalingMethod::Weight`], species without a
    /// reference weight are skipped. Ties keep the earliest species.
    pub fn mrsd(
        &self,
        noael_by_species: &[(Species, f64)],
        safety_factor: f64,
        method: ScalingMethod,
    ) -> Result<MrsdResult, DoseError> {
        let safety_factor = ensure_positive("safety_factor", safety_factor)?;

        let mut hed_values = Vec::with_capacity(noael_by_species.len());
        for &(species, noael) in noael_by_species {
            let hed = match method {
                ScalingMethod::Km => self.hed_by_km(noael, species, None)?,
                ScalingMethod::Weight => match species.standard_weight_kg() {
                    Some(weight) => self.hed_by_weight(noael, weight, None)?,
                    None => continue,
                },
            };
            hed_values.push((species, hed));
        }

        let (most_sensitive_species, lowest_hed_mg_kg) = hed_values
            .iter()
            .copied()
            .fold(None, |best: Option<(Species, f64)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .ok_or(DoseError::NoUsableNoael)?;

        let mrsd_mg_kg = lowest_hed_mg_kg / safety_factor;
        let total_mrsd_mg = mrsd_mg_kg * self.human_weight_kg;

        Ok(MrsdResult {
            hed_values,
            most_sensitive_species,
            lowest_hed_mg_kg,
            safety_factor,
            mrsd_mg_kg,
            total_mrsd_mg,
            human_weight_kg: self.human_weight_kg,
            method,
        })
    }

    /// Safe cosmetic concentration derived from an animal dose.
    pub fn dermal_safety(
        &self,
        animal_dose_mg_kg: f64,
        species: Species,
        params: DermalSafetyParams,
    ) -> Result<DermalSafetyAssessment, DoseError> {
        let hed = self.hed_by_km(animal_dose_mg_kg, species, None)?;
        let mut assessment = self.dermal_safety_from_hed(hed, params)?;
        assessment.animal_dose_mg_kg = Some(animal_dose_mg_kg);
        Ok(assessment)
    }

    /// Safe cosmetic concentration derived from an already-scaled HED.
    ///
    /// HED × body weight gives the systemic dose; the safety factor
    /// divides it; dividing by the penetration fraction gives the topical
    /// mass; dividing by area gives mg/cm², and `÷ 10` gives % w/w.
    pub fn dermal_safety_from_hed(
        &self,
        hed_mg_kg: f64,
        params: DermalSafetyParams,
    ) -> Result<DermalSafetyAssessment, DoseError> {
        let hed = ensure_positive("hed_mg_kg", hed_mg_kg)?;
        let area = ensure_positive("application_area_cm2", params.application_area_cm2)?;
        let safety_factor = ensure_positive("safety_factor", params.safety_factor)?;
        let penetration =
            ensure_positive("skin_penetration_percent", params.skin_penetration_percent)?;
        if penetration > 100.0 {
            return Err(DoseError::InvalidParameter {
                field: "skin_penetration_percent",
                value: penetration,
                reason: "must not exceed 100",
            });
        }

        let safe_systemic_dose_mg = hed * self.human_weight_kg;
        let safe_dose_with_sf_mg = safe_systemic_dose_mg / safety_factor;
        let max_dermal_application_mg = safe_dose_with_sf_mg / (penetration / 100.0);
        let safe_concentration_mg_cm2 = max_dermal_application_mg / area;
        let safe_concentration_percent = safe_concentration_mg_cm2 / 10.0;

        let category = SafetyCategory::from_percent(safe_concentration_percent);

        Ok(DermalSafetyAssessment {
            animal_dose_mg_kg: None,
            hed_mg_kg: hed,
            safe_systemic_dose_mg,
            safety_factor,
            safe_dose_with_sf_mg,
            skin_penetration_percent: penetration,
            max_dermal_application_mg,
            application_area_cm2: area,
            safe_concentration_mg_cm2,
            safe_concentration_percent,
            category,
            recommendation: category.recommendation(safe_concentration_percent),
        })
    }

    /// Parenteral injection volume: `(weight × dose) / concentration`.
    pub fn injection_volume_ml(
        &self,
        dose_mg_kg: f64,
        animal_weight_kg: f64,
        concentration_mg_ml: f64,
    ) -> Result<f64, DoseError> {
        let dose = ensure_positive("dose_mg_kg", dose_mg_kg)?;
        let weight = ensure_positive("animal_weight_kg", animal_weight_kg)?;
        let concentration = ensure_positive("concentration_mg_ml", concentration_mg_ml)?;
        Ok(weight * dose / concentration)
    }

    pub fn limitations() -> MethodLimitations {
        MethodLimitations {
            do_not_use_for_human_scaling: &[
                "Adult to pediatric dose conversion",
                "Geriatric dose adjustments",
            ],
            do_not_use_for_routes: &[
                "Topical administration",
                "Nasal administration",
                "Subcutaneous injection",
                "Intramuscular injection",
            ],
            do_not_use_for_substances: &["Large proteins >100,000 Da (parenteral)"],
            warnings: &[
                "Results are approximations",
                "Does not replace full PK/PD evaluation",
                "Species-specific toxicity may differ from allometric predictions",
            ],
        }
    }

    fn resolve_km(species: Species, custom_km: Option<f64>) -> Result<f64, DoseError> {
        match custom_km {
            Some(km) => ensure_positive("custom_km", km),
            None => Ok(species.km()),
        }
    }
}
