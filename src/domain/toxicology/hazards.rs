//! Graph-shaped facts derived from mapping results: ingredient keys,
//! hazards and HED assessment nodes.

use serde::{Deserialize, Serialize};

use super::integrator::IntegrationOutcome;
use crate::domain::foundation::IngredientKey;
use crate::domain::hed::SafetyCategory;
use crate::domain::identity::{IdentityRecord, ToxicologyRecord};

/// Hazard severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A hazard attached to an ingredient, optionally causing a named effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    #[serde(rename = "type")]
    pub hazard_type: String,
    pub value: String,
    pub route: String,
    pub unit: String,
    pub species: String,
    pub effect: Option<String>,
    pub severity: Severity,
    pub source: String,
    pub confidence: f64,
}

impl Hazard {
    /// A dermal hazard with no unit or species.
    pub fn dermal(
        hazard_type: impl Into<String>,
        value: impl Into<String>,
        effect: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            hazard_type: hazard_type.into(),
            value: value.into(),
            route: "dermal".to_string(),
            unit: "-".to_string(),
            species: "-".to_string(),
            effect: Some(effect.into()),
            severity,
            source: String::new(),
            confidence: 0.0,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>, confidence: f64) -> Self {
        self.source = source.into();
        self.confidence = confidence;
        self
    }

    /// Identity used to merge equal hazards on the same ingredient.
    pub fn merge_key(&self) -> (String, String, String, String, String) {
        (
            self.hazard_type.clone(),
            self.route.to_lowercase(),
            self.unit.clone(),
            self.species.clone(),
            self.value.clone(),
        )
    }
}

/// Graph key for an ingredient, from the strongest identifier available.
pub fn ingredient_key(
    identity: Option<&IdentityRecord>,
    toxicology: Option<&ToxicologyRecord>,
    inci_name: &str,
) -> IngredientKey {
    if let Some(inchi_key) = identity.and_then(|i| non_blank(i.inchi_key.as_deref())) {
        return IngredientKey::from_inchi_key(inchi_key);
    }
    if let Some(cas) = identity.and_then(|i| non_blank(i.cas_number.as_deref())) {
        return IngredientKey::from_cas(cas);
    }
    if let Some(dtxsid) = toxicology.and_then(|t| non_blank(t.dtxsid.as_deref())) {
        return IngredientKey::from_dtxsid(dtxsid);
    }
    IngredientKey::from_inci(inci_name)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Hazards implied by a toxicology record. All are dermal.
pub fn derive_hazards(tox: &ToxicologyRecord) -> Vec<Hazard> {
    let mut hazards = Vec::new();
    let source = tox.source.as_str();

    if let Some(status) = non_blank(tox.allergen_status.as_deref()) {
        let severity = if status.to_lowercase().contains("1a") {
            Severity::High
        } else {
            Severity::Medium
        };
        hazards.push(
            Hazard::dermal("allergen_status", status, "sensitization", severity)
                .with_source(source, tox.confidence),
        );
    }

    if let Some(irritation) = non_blank(tox.irritation_potential.as_deref()) {
        hazards.push(
            Hazard::dermal("irritation", irritation, "irritation", Severity::Medium)
                .with_source(source, tox.confidence),
        );
    }

    if tox.allergen_status.is_none() {
        if let Some(risk) = non_blank(tox.sensitization_risk.as_deref()) {
            hazards.push(
                Hazard::dermal("sensitization_risk", risk, "sensitization", Severity::Medium)
                    .with_source(source, tox.confidence),
            );
        }
    }

    if let Some(noael) = tox.noael_value {
        let mut hazard = Hazard::dermal("NOAEL", noael.to_string(), "threshold", Severity::Low)
            .with_source(source, tox.confidence);
        hazard.unit = "mg/kg-day".to_string();
        hazards.push(hazard);
    }

    if let Some(dnel) = tox.safe_concentration.filter(|v| *v != 0.0) {
        let mut hazard = Hazard::dermal("DNEL", dnel.to_string(), "limit", Severity::Low)
            .with_source(source, tox.confidence);
        hazard.species = "Human".to_string();
        hazards.push(hazard);
    }

    if let Some(cancer) = non_blank(tox.carcinogenicity.as_deref()) {
        hazards.push(
            Hazard::dermal("carcinogenicity", cancer, "cancer", Severity::High)
                .with_source(source, tox.confidence),
        );
    }

    hazards
}

/// HED assessment stored against an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hed_available")]
pub enum HedAssessmentNode {
    #[serde(rename = "true")]
    Available(HedAssessmentFields),
    #[serde(rename = "false")]
    Unavailable { inci_name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedAssessmentFields {
    pub inci_name: String,
    pub dtxsid: Option<String>,
    pub hed_mg_kg: f64,
    pub total_safe_dose_mg: f64,
    pub calculation_method: String,
    pub source_toxicity_type: String,
    pub source_animal_species: String,
    pub source_route: String,
    pub source_effect: Option<String>,
    pub source_value_mg_kg: f64,
    pub safe_concentration_percent: f64,
    pub max_dermal_application_mg: f64,
    pub safety_factor: f64,
    pub risk_assessment: SafetyCategory,
    pub recommendation: String,
    pub total_hed_calculations: usize,
    pub relevant_entries: usize,
}

impl HedAssessmentNode {
    pub fn from_outcome(outcome: &IntegrationOutcome, dtxsid: Option<&str>) -> Self {
        match (&outcome.conservative, &outcome.safety) {
            (Some(conservative), Some(safety)) if outcome.calculated => {
                HedAssessmentNode::Available(HedAssessmentFields {
                    inci_name: outcome.inci_name.clone(),
                    dtxsid: dtxsid.map(str::to_string),
                    hed_mg_kg: conservative.hed_mg_kg,
                    total_safe_dose_mg: conservative.total_safe_dose_mg,
                    calculation_method: conservative.calculation_method.clone(),
                    source_toxicity_type: conservative.original_type.clone(),
                    source_animal_species: conservative.animal_species.as_str().to_string(),
                    source_route: conservative.route.clone(),
                    source_effect: conservative.effect.clone(),
                    source_value_mg_kg: conservative.original_value_mg_kg,
                    safe_concentration_percent: safety.safe_concentration_percent,
                    max_dermal_application_mg: safety.max_dermal_application_mg,
                    safety_factor: safety.safety_factor,
                    risk_assessment: safety.category,
                    recommendation: safety.recommendation.clone(),
                    total_hed_calculations: outcome.results.len(),
                    relevant_entries: outcome.relevant_entries,
                })
            }
            _ => HedAssessmentNode::Unavailable {
                inci_name: outcome.inci_name.clone(),
                reason: outcome
                    .reason
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
            },
        }
    }

    /// Stored risk category, `None` when no HED was available.
    pub fn risk_assessment(&self) -> Option<SafetyCategory> {
        match self {
            HedAssessmentNode::Available(fields) => Some(fields.risk_assessment),
            HedAssessmentNode::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::ToxicityEntry;
    use crate::domain::toxicology::ToxicologyIntegrator;

    fn tox() -> ToxicologyRecord {
        ToxicologyRecord {
            inci_name: "linalool".to_string(),
            source: "toxval".to_string(),
            confidence: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn key_prefers_inchi_key_then_cas_then_dtxsid() {
        let mut identity = IdentityRecord {
            inchi_key: Some("CDOSHBSSFJOMGT-UHFFFAOYSA-N".to_string()),
            cas_number: Some("78-70-6".to_string()),
            ..Default::default()
        };
        let mut toxicology = tox();
        toxicology.dtxsid = Some("DTXSID7025502".to_string());

        let key = ingredient_key(Some(&identity), Some(&toxicology), "Linalool");
        assert_eq!(key.as_str(), "cdoshbssfjomgt-uhfffaoysa-n");

        identity.inchi_key = None;
        let key = ingredient_key(Some(&identity), Some(&toxicology), "Linalool");
        assert_eq!(key.as_str(), "cas:78-70-6");

        let key = ingredient_key(None, Some(&toxicology), "Linalool");
        assert_eq!(key.as_str(), "dtxsid:DTXSID7025502");

        let key = ingredient_key(None, None, "Linalool");
        assert_eq!(key.as_str(), "inci:linalool");
    }

    #[test]
    fn allergen_category_1a_is_high_severity() {
        let mut record = tox();
        record.allergen_status = Some("Skin Sens. 1A".to_string());
        record.sensitization_risk = Some("positive".to_string());

        let hazards = derive_hazards(&record);
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].severity, Severity::High);
        assert_eq!(hazards[0].effect.as_deref(), Some("sensitization"));
        assert_eq!(hazards[0].source, "toxval");
    }

    #[test]
    fn sensitization_risk_used_without_allergen_status() {
        let mut record = tox();
        record.sensitization_risk = Some("positive".to_string());
        record.irritation_potential = Some("moderate".to_string());
        record.noael_value = Some(1000.0);
        record.safe_concentration = Some(2.5);
        record.carcinogenicity = Some("Not likely".to_string());

        let hazards = derive_hazards(&record);
        let types: Vec<_> = hazards.iter().map(|h| h.hazard_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["irritation", "sensitization_risk", "NOAEL", "DNEL", "carcinogenicity"]
        );
        assert!(hazards.iter().all(|h| h.route == "dermal"));
        assert_eq!(hazards[2].unit, "mg/kg-day");
        assert_eq!(hazards[3].species, "Human");
        assert_eq!(hazards[4].severity, Severity::High);
    }

    #[test]
    fn empty_record_has_no_hazards() {
        assert!(derive_hazards(&tox()).is_empty());
    }

    #[test]
    fn hed_node_from_calculated_outcome() {
        let entries = vec![ToxicityEntry::new("NOEL", 1000.0, "mg/kg-day", "oral", "rat")];
        let outcome = ToxicologyIntegrator::default().process(&entries, "aqua");

        let node = HedAssessmentNode::from_outcome(&outcome, Some("DTXSID6026296"));
        assert_eq!(
            node.risk_assessment(),
            Some(SafetyCategory::RequiresCarefulFormulation)
        );
        match node {
            HedAssessmentNode::Available(fields) => {
                assert_eq!(fields.source_animal_species, "rat");
                assert_eq!(fields.total_hed_calculations, 1);
                assert_eq!(fields.dtxsid.as_deref(), Some("DTXSID6026296"));
            }
            other => panic!("expected available node, got {:?}", other),
        }
    }

    #[test]
    fn hed_node_from_uncalculated_outcome_keeps_reason() {
        let outcome = ToxicologyIntegrator::default().process(&[], "aqua");
        let node = HedAssessmentNode::from_outcome(&outcome, None);
        assert_eq!(node.risk_assessment(), None);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["hed_available"], "false");
        assert_eq!(json["reason"], "No dermal toxicity data available");
    }
}
