//! User profile snapshot consumed by the decision engine.
//!
//! The profile is owned by an external store and read once per decision.
//! Field names follow the store's camelCase JSON document.

use serde::{Deserialize, Serialize};

/// Coarse exposure level used for sun, pollution and stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureLevel {
    #[default]
    Low,
    Moderate,
    High,
}

/// Corticosteroid use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorticosteroidUse {
    #[default]
    None,
    Oral,
    Topical,
    Both,
}

impl CorticosteroidUse {
    /// True when steroids are applied to the skin.
    pub fn is_topical(&self) -> bool {
        matches!(self, CorticosteroidUse::Topical | CorticosteroidUse::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Physiology {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub sex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkinProfile {
    pub skin_type: Option<String>,
    pub sensitive: bool,
    pub atopic: bool,
    pub acne_prone: bool,
    pub barrier_dysfunction: bool,
    pub rosacea: bool,
    pub eczema: bool,
    pub psoriasis: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllergyProfile {
    pub has_allergies: bool,
    pub cosmetic_allergies: Vec<String>,
    pub general_allergies: Vec<String>,
    pub known_intolerances: Vec<String>,
    pub dermatologist_avoid: Vec<String>,
}

impl AllergyProfile {
    /// True when the user reports allergies, by flag or by listing any.
    pub fn reported(&self) -> bool {
        self.has_allergies || !self.cosmetic_allergies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationProfile {
    pub photosensitizing: bool,
    pub retinoid_therapy: bool,
    pub corticosteroids: CorticosteroidUse,
    pub diuretics: bool,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub fragrance_free: bool,
    pub avoid_parabens: bool,
    pub avoid_sulfates: bool,
    pub avoid_silicones: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub sun_exposure: ExposureLevel,
    pub pollution: ExposureLevel,
    pub stress: ExposureLevel,
    pub smoking: bool,
    pub pregnancy: bool,
}

/// Read-only snapshot of a user's health profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub physiology: Physiology,
    pub skin: SkinProfile,
    pub allergies: AllergyProfile,
    pub medications: MedicationProfile,
    pub preferences: Preferences,
    pub environment: Environment,
}

impl UserProfile {
    /// Condition node names linked to the user in the graph.
    pub fn condition_names(&self) -> Vec<&'static str> {
        let flags = [
            (self.skin.sensitive, "sensitive_skin"),
            (self.skin.atopic, "atopic_skin"),
            (self.skin.acne_prone, "acne_prone"),
            (self.skin.barrier_dysfunction, "barrier_dysfunction"),
            (self.skin.rosacea, "rosacea"),
            (self.skin.eczema, "eczema"),
            (self.skin.psoriasis, "psoriasis"),
            (self.allergies.reported(), "allergies"),
            (self.medications.photosensitizing, "photosensitizing_medication"),
            (self.medications.retinoid_therapy, "retinoid_therapy"),
            (self.environment.pregnancy, "pregnancy"),
        ];
        flags
            .iter()
            .filter(|(present, _)| *present)
            .map(|(_, name)| *name)
            .collect()
    }

    /// True when the name is on the personal intolerance list.
    pub fn is_intolerant_to(&self, inci: &str) -> bool {
        contains_ignore_case(&self.allergies.known_intolerances, inci)
    }

    /// True when a dermatologist advised avoiding the name.
    pub fn is_advised_to_avoid(&self, inci: &str) -> bool {
        contains_ignore_case(&self.allergies.dermatologist_avoid, inci)
    }
}

fn contains_ignore_case(list: &[String], name: &str) -> bool {
    let needle = name.trim().to_lowercase();
    !needle.is_empty() && list.iter().any(|item| item.trim().to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_camel_case_document() {
        let json = r#"{
            "skin": { "sensitive": true, "acneProne": true },
            "allergies": { "knownIntolerances": ["Linalool"] },
            "medications": { "corticosteroids": "both" },
            "preferences": { "fragranceFree": true },
            "environment": { "sunExposure": "high" }
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();

        assert!(profile.skin.sensitive);
        assert!(profile.skin.acne_prone);
        assert!(!profile.skin.rosacea);
        assert!(profile.preferences.fragrance_free);
        assert!(profile.medications.corticosteroids.is_topical());
        assert_eq!(profile.environment.sun_exposure, ExposureLevel::High);
        assert_eq!(profile.environment.pollution, ExposureLevel::Low);
    }

    #[test]
    fn intolerance_match_is_case_insensitive() {
        let mut profile = UserProfile::default();
        profile.allergies.known_intolerances = vec!["Linalool".to_string()];
        profile.allergies.dermatologist_avoid = vec![" alcohol denat. ".to_string()];

        assert!(profile.is_intolerant_to("LINALOOL"));
        assert!(!profile.is_intolerant_to("limonene"));
        assert!(profile.is_advised_to_avoid("Alcohol Denat."));
        assert!(!profile.is_intolerant_to(""));
    }

    #[test]
    fn condition_names_follow_flags() {
        let mut profile = UserProfile::default();
        assert!(profile.condition_names().is_empty());

        profile.skin.sensitive = true;
        profile.allergies.cosmetic_allergies = vec!["nickel".to_string()];
        profile.environment.pregnancy = true;
        assert_eq!(
            profile.condition_names(),
            vec!["sensitive_skin", "allergies", "pregnancy"]
        );
    }

    #[test]
    fn only_topical_steroids_count_as_topical() {
        assert!(!CorticosteroidUse::None.is_topical());
        assert!(!CorticosteroidUse::Oral.is_topical());
        assert!(CorticosteroidUse::Topical.is_topical());
    }
}
