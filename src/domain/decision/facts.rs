//! Per-ingredient facts joined from the graph for one product.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::IngredientKey;
use crate::domain::toxicology::{Hazard, Severity};

const FRAGRANCE_MARKERS: &[&str] = &["parfum", "fragrance", "perfume", "aroma"];
const PARABEN_MARKERS: &[&str] = &["paraben"];
const SULFATE_MARKERS: &[&str] = &["sulfate", "sulphate"];
const SILICONE_MARKERS: &[&str] = &["methicone", "siloxane", "silicone", "silane"];
const RETINOID_CONFLICT_MARKERS: &[&str] = &["acid", "ascorbic", "retinol"];

/// Ingredient joined with its route-filtered hazards and stored HED category.
///
/// One row of the product assessment join: product → ingredient → hazard →
/// effect, plus the ingredient's HED assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientFacts {
    pub ingredient_key: IngredientKey,
    pub inci: String,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    /// Stored `risk_assessment`, either a safety category
    /// (e.g. `SAFE_WITH_LIMITS`) or a risk level (e.g. `HIGH`).
    pub hed_risk_assessment: Option<String>,
}

impl IngredientFacts {
    pub fn new(ingredient_key: IngredientKey, inci: impl Into<String>) -> Self {
        Self {
            ingredient_key,
            inci: inci.into(),
            hazards: Vec::new(),
            hed_risk_assessment: None,
        }
    }

    pub fn with_hazard(mut self, hazard: Hazard) -> Self {
        self.hazards.push(hazard);
        self
    }

    pub fn with_hed_risk(mut self, risk_assessment: impl Into<String>) -> Self {
        self.hed_risk_assessment = Some(risk_assessment.into());
        self
    }

    /// True when any hazard causes an effect whose name contains one of
    /// the fragments.
    pub fn has_effect_like(&self, fragments: &[&str]) -> bool {
        self.effects()
            .any(|effect| fragments.iter().any(|f| effect.contains(f)))
    }

    /// Lowercased effect names.
    fn effects(&self) -> impl Iterator<Item = String> + '_ {
        self.hazards
            .iter()
            .filter_map(|h| h.effect.as_deref())
            .map(str::to_lowercase)
    }

    pub fn causes_irritation(&self) -> bool {
        self.has_effect_like(&["irritation"])
    }

    /// Skin sensitization; photosensitization is counted separately.
    pub fn causes_sensitization(&self) -> bool {
        self.effects().any(|effect| {
            !effect.contains("photo")
                && (effect.contains("sensitization") || effect.contains("sensitisation"))
        })
    }

    pub fn is_comedogenic(&self) -> bool {
        self.has_effect_like(&["comedogen"])
            || self
                .hazards
                .iter()
                .any(|h| h.hazard_type.to_lowercase().contains("comedogen"))
    }

    pub fn causes_photosensitivity(&self) -> bool {
        self.has_effect_like(&["photosensit", "phototox"])
    }

    pub fn photodegrades(&self) -> bool {
        self.has_effect_like(&["photodegrad"]) || self.causes_photosensitivity()
    }

    pub fn causes_oxidative_stress(&self) -> bool {
        self.has_effect_like(&["oxidative"])
    }

    pub fn has_high_severity_hazard(&self) -> bool {
        self.hazards.iter().any(|h| h.severity == Severity::High)
    }

    pub fn is_fragrance(&self) -> bool {
        self.name_contains(FRAGRANCE_MARKERS)
    }

    pub fn is_paraben(&self) -> bool {
        self.name_contains(PARABEN_MARKERS)
    }

    pub fn is_sulfate(&self) -> bool {
        self.name_contains(SULFATE_MARKERS)
    }

    pub fn is_silicone(&self) -> bool {
        self.name_contains(SILICONE_MARKERS)
    }

    /// Acids, vitamin C and retinol stack badly with retinoid therapy.
    pub fn conflicts_with_retinoids(&self) -> bool {
        self.name_contains(RETINOID_CONFLICT_MARKERS)
    }

    fn name_contains(&self, markers: &[&str]) -> bool {
        let name = self.inci.to_lowercase();
        markers.iter().any(|m| name.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(name: &str) -> IngredientFacts {
        IngredientFacts::new(IngredientKey::from_inci(name), name)
    }

    #[test]
    fn name_classification() {
        assert!(facts("Parfum").is_fragrance());
        assert!(facts("Methylparaben").is_paraben());
        assert!(facts("Sodium Lauryl Sulfate").is_sulfate());
        assert!(facts("Dimethicone").is_silicone());
        assert!(facts("Cyclopentasiloxane").is_silicone());
        assert!(facts("Ascorbic Acid").conflicts_with_retinoids());
        assert!(!facts("Aqua").is_fragrance());
    }

    #[test]
    fn effect_classification() {
        let f = facts("Bergamot Oil")
            .with_hazard(Hazard::dermal(
                "phototoxicity",
                "positive",
                "photosensitization",
                Severity::High,
            ))
            .with_hazard(Hazard::dermal("irritation", "mild", "Irritation", Severity::Medium));

        assert!(f.causes_photosensitivity());
        assert!(f.photodegrades());
        assert!(f.causes_irritation());
        assert!(!f.causes_sensitization());
        assert!(f.has_high_severity_hazard());
        assert!(!f.causes_oxidative_stress());
    }

    #[test]
    fn comedogenic_by_type_or_effect() {
        let by_effect = facts("Isopropyl Myristate")
            .with_hazard(Hazard::dermal("comedogenicity", "4", "comedogenic", Severity::Medium));
        assert!(by_effect.is_comedogenic());

        let mut hazard = Hazard::dermal("comedogenic_rating", "3", "x", Severity::Low);
        hazard.effect = None;
        let by_type = facts("Coconut Oil").with_hazard(hazard);
        assert!(by_type.is_comedogenic());
    }
}
