//! Per-domain records produced by a single source attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four independent data domains an ingredient is resolved across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDomain {
    Identity,
    Toxicology,
    Regulatory,
    PhysicalChemical,
}

impl SourceDomain {
    pub const ALL: [SourceDomain; 4] = [
        SourceDomain::Identity,
        SourceDomain::Toxicology,
        SourceDomain::Regulatory,
        SourceDomain::PhysicalChemical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDomain::Identity => "identity",
            SourceDomain::Toxicology => "toxicology",
            SourceDomain::Regulatory => "regulatory",
            SourceDomain::PhysicalChemical => "physical_chemical",
        }
    }
}

impl fmt::Display for SourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Basic chemical identifiers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub inci_name: String,
    pub cas_number: Option<String>,
    pub ec_number: Option<String>,
    pub smiles: Option<String>,
    pub inchi: Option<String>,
    pub inchi_key: Option<String>,
    pub systematic_name: Option<String>,
    pub molecular_formula: Option<String>,
    pub molecular_weight: Option<f64>,
    pub source: String,
    pub confidence: f64,
}

/// A raw animal-study observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityEntry {
    /// Endpoint type, e.g. `NOAEL` or `LD50`.
    #[serde(rename = "type")]
    pub toxicity_type: String,
    pub value: f64,
    pub unit: String,
    pub route: String,
    pub species: String,
    pub effect: Option<String>,
}

impl ToxicityEntry {
    pub fn new(
        toxicity_type: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        route: impl Into<String>,
        species: impl Into<String>,
    ) -> Self {
        Self {
            toxicity_type: toxicity_type.into(),
            value,
            unit: unit.into(),
            route: route.into(),
            species: species.into(),
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }
}

/// Toxicology facts for one ingredient.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToxicologyRecord {
    pub inci_name: String,
    pub dtxsid: Option<String>,
    pub allergen_status: Option<String>,
    pub irritation_potential: Option<String>,
    pub sensitization_risk: Option<String>,
    /// NOAEL in mg/kg-day.
    pub noael_value: Option<f64>,
    pub safe_concentration: Option<f64>,
    /// Dermal absorption in percent.
    pub dermal_absorption: Option<f64>,
    pub carcinogenicity: Option<String>,
    #[serde(default)]
    pub dermal_toxicity_entries: Vec<ToxicityEntry>,
    pub source: String,
    pub confidence: f64,
}

/// Regulatory listing for one ingredient.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegulatoryRecord {
    pub inci_name: String,
    pub cas_number: Option<String>,
    pub ec_number: Option<String>,
    /// Annex references (e.g. `III`) found in the listing.
    #[serde(default)]
    pub annexes: Vec<String>,
    pub source: String,
    pub confidence: f64,
}

/// Computed physical-chemical descriptors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalChemicalRecord {
    pub inci_name: String,
    pub molecular_formula: Option<String>,
    pub molecular_weight: Option<f64>,
    pub xlogp: Option<f64>,
    pub tpsa: Option<f64>,
    pub h_bond_donor_count: Option<u32>,
    pub h_bond_acceptor_count: Option<u32>,
    pub source: String,
    pub confidence: f64,
}

/// A record for any one of the four domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DomainRecord {
    Identity(IdentityRecord),
    Toxicology(ToxicologyRecord),
    Regulatory(RegulatoryRecord),
    PhysicalChemical(PhysicalChemicalRecord),
}

impl DomainRecord {
    pub fn domain(&self) -> SourceDomain {
        match self {
            DomainRecord::Identity(_) => SourceDomain::Identity,
            DomainRecord::Toxicology(_) => SourceDomain::Toxicology,
            DomainRecord::Regulatory(_) => SourceDomain::Regulatory,
            DomainRecord::PhysicalChemical(_) => SourceDomain::PhysicalChemical,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            DomainRecord::Identity(r) => &r.source,
            DomainRecord::Toxicology(r) => &r.source,
            DomainRecord::Regulatory(r) => &r.source,
            DomainRecord::PhysicalChemical(r) => &r.source,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            DomainRecord::Identity(r) => r.confidence,
            DomainRecord::Toxicology(r) => r.confidence,
            DomainRecord::Regulatory(r) => r.confidence,
            DomainRecord::PhysicalChemical(r) => r.confidence,
        }
    }
}
