//! Toxicology integrator - turns raw animal-study entries into a HED and a
//! cosmetic safe-concentration estimate.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::hed::{
    DermalSafetyAssessment, DermalSafetyParams, DoseConverter, ScalingMethod, Species,
};
use crate::domain::identity::ToxicityEntry;

/// Endpoint types usable for scaling, with their priority (lower is stricter).
const TOXICITY_PRIORITIES: &[(&str, u8)] = &[
    ("NOAEL", 1),
    ("NOEL", 2),
    ("NEL", 3),
    ("LOAEL", 4),
    ("LOEL", 5),
    ("LEL", 6),
    ("LD50", 7),
];

/// Exposure routes relevant to dermal and cosmetic assessment.
const RELEVANT_ROUTES: &[&str] = &["oral", "dermal", "gavage", "diet", "drinking water"];

pub const REASON_NO_DATA: &str = "No dermal toxicity data available";
pub const REASON_NO_RELEVANT_DATA: &str =
    "No relevant animal toxicity data (oral/dermal routes with mg/kg units)";
pub const REASON_ALL_FAILED: &str = "Failed to calculate HED for any entry";

/// Safety assessment derived from the most conservative HED.
pub type CosmeticSafetyAssessment = DermalSafetyAssessment;

/// Priority of a toxicity endpoint type, `None` when not usable.
pub fn toxicity_priority(toxicity_type: &str) -> Option<u8> {
    let upper = toxicity_type.trim().to_uppercase();
    TOXICITY_PRIORITIES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, priority)| *priority)
}

pub fn is_relevant_route(route: &str) -> bool {
    RELEVANT_ROUTES.contains(&route.trim().to_lowercase().as_str())
}

/// HED computed from one qualifying toxicity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedResult {
    pub animal_species: Species,
    pub original_type: String,
    pub priority: u8,
    pub original_value: f64,
    pub original_unit: String,
    pub route: String,
    pub effect: Option<String>,
    pub original_value_mg_kg: f64,
    pub hed_mg_kg: f64,
    pub total_safe_dose_mg: f64,
    pub calculation_method: String,
}

/// Result of processing all toxicity entries for one ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationOutcome {
    pub inci_name: String,
    pub calculated: bool,
    pub reason: Option<String>,
    pub total_entries: usize,
    pub relevant_entries: usize,
    /// Per-entry results ordered by toxicity priority.
    pub results: Vec<HedResult>,
    pub conservative: Option<HedResult>,
    pub safety: Option<CosmeticSafetyAssessment>,
    /// Warnings for skipped entries.
    pub notes: Vec<String>,
}

impl IntegrationOutcome {
    fn not_calculated(inci_name: &str, reason: &str, total: usize, relevant: usize) -> Self {
        Self {
            inci_name: inci_name.to_string(),
            calculated: false,
            reason: Some(reason.to_string()),
            total_entries: total,
            relevant_entries: relevant,
            results: Vec::new(),
            conservative: None,
            safety: None,
            notes: Vec::new(),
        }
    }
}

/// An entry that passed the relevance filter.
struct RelevantEntry<'a> {
    entry: &'a ToxicityEntry,
    species: Species,
    priority: u8,
}

/// Filters, scales and ranks toxicity entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToxicologyIntegrator {
    converter: DoseConverter,
    params: DermalSafetyParams,
}

impl ToxicologyIntegrator {
    pub fn new(converter: DoseConverter, params: DermalSafetyParams) -> Self {
        Self { converter, params }
    }

    pub fn converter(&self) -> &DoseConverter {
        &self.converter
    }

    /// Processes the entries of one ingredient.
    ///
    /// The conservative basis is the entry with the lowest HED; ties go to
    /// the stricter toxicity type, then to the earlier entry.
    pub fn process(&self, entries: &[ToxicityEntry], inci_name: &str) -> IntegrationOutcome {
        if entries.is_empty() {
            debug!(inci = %inci_name, "no toxicity entries");
            return IntegrationOutcome::not_calculated(inci_name, REASON_NO_DATA, 0, 0);
        }

        let mut notes = Vec::new();
        let relevant: Vec<RelevantEntry<'_>> = entries
            .iter()
            .filter_map(|entry| self.relevance(entry, inci_name, &mut notes))
            .collect();

        if relevant.is_empty() {
            let mut outcome = IntegrationOutcome::not_calculated(
                inci_name,
                REASON_NO_RELEVANT_DATA,
                entries.len(),
                0,
            );
            outcome.notes = notes;
            return outcome;
        }

        let mut results = Vec::with_capacity(relevant.len());
        for candidate in &relevant {
            match self.hed_for_entry(candidate) {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!(inci = %inci_name, error = %err, "skipping toxicity entry");
                    notes.push(format!(
                        "{} {} {}: {}",
                        candidate.entry.toxicity_type,
                        candidate.entry.value,
                        candidate.entry.unit,
                        err
                    ));
                }
            }
        }

        // Stable, so entries of equal priority keep their input order.
        results.sort_by_key(|r| r.priority);

        let conservative = results.iter().fold(None::<&HedResult>, |best, r| match best {
            Some(b) if (b.hed_mg_kg, b.priority) <= (r.hed_mg_kg, r.priority) => Some(b),
            _ => Some(r),
        });

        let Some(conservative) = conservative.cloned() else {
            let mut outcome = IntegrationOutcome::not_calculated(
                inci_name,
                REASON_ALL_FAILED,
                entries.len(),
                relevant.len(),
            );
            outcome.notes = notes;
            return outcome;
        };

        match self
            .converter
            .dermal_safety_from_hed(conservative.hed_mg_kg, self.params)
        {
            Ok(safety) => IntegrationOutcome {
                inci_name: inci_name.to_string(),
                calculated: true,
                reason: None,
                total_entries: entries.len(),
                relevant_entries: relevant.len(),
                results,
                conservative: Some(conservative),
                safety: Some(safety),
                notes,
            },
            Err(err) => {
                warn!(inci = %inci_name, error = %err, "dermal safety assessment failed");
                let mut outcome = IntegrationOutcome::not_calculated(
                    inci_name,
                    REASON_ALL_FAILED,
                    entries.len(),
                    relevant.len(),
                );
                notes.push(err.to_string());
                outcome.notes = notes;
                outcome
            }
        }
    }

    fn relevance<'a>(
        &self,
        entry: &'a ToxicityEntry,
        inci_name: &str,
        notes: &mut Vec<String>,
    ) -> Option<RelevantEntry<'a>> {
        let priority = toxicity_priority(&entry.toxicity_type)?;
        if !is_relevant_route(&entry.route) {
            return None;
        }
        if !DoseConverter::is_mg_per_kg_unit(&entry.unit)
            && !DoseConverter::is_ml_per_kg_unit(&entry.unit)
        {
            return None;
        }

        let species = match entry.species.parse::<Species>() {
            Ok(species) => species,
            Err(err) => {
                warn!(inci = %inci_name, species = %entry.species, "unknown species");
                notes.push(err.to_string());
                return None;
            }
        };
        if species.is_human() {
            return None;
        }

        Some(RelevantEntry {
            entry,
            species,
            priority,
        })
    }

    fn hed_for_entry(
        &self,
        candidate: &RelevantEntry<'_>,
    ) -> Result<HedResult, crate::domain::hed::DoseError> {
        let entry = candidate.entry;
        let normalized = DoseConverter::normalize_dose(entry.value, &entry.unit)?;
        let hed = self.converter.hed_by_km(normalized, candidate.species, None)?;

        Ok(HedResult {
            animal_species: candidate.species,
            original_type: entry.toxicity_type.trim().to_uppercase(),
            priority: candidate.priority,
            original_value: entry.value,
            original_unit: entry.unit.clone(),
            route: entry.route.clone(),
            effect: entry.effect.clone(),
            original_value_mg_kg: normalized,
            hed_mg_kg: hed,
            total_safe_dose_mg: hed * self.converter.human_weight_kg(),
            calculation_method: ScalingMethod::Km.label().to_string(),
        })
    }
}
