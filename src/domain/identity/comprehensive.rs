//! Aggregation of the four domain records for one ingredient name.

use serde::{Deserialize, Serialize};

use super::records::{
    DomainRecord, IdentityRecord, PhysicalChemicalRecord, RegulatoryRecord, SourceDomain,
    ToxicityEntry, ToxicologyRecord,
};

/// Number of independently resolved domains.
pub const DOMAIN_COUNT: usize = 4;

/// Percentage of domains filled.
pub fn calculate_completeness(filled_domains: usize) -> f64 {
    filled_domains.min(DOMAIN_COUNT) as f64 / DOMAIN_COUNT as f64 * 100.0
}

/// Arithmetic mean of the filled domains' confidences, 0 when none.
pub fn total_confidence(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    confidences.iter().sum::<f64>() / confidences.len() as f64
}

/// Outcome of one domain collector: at most one record, plus what was tried.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainCollection {
    pub domain: SourceDomain,
    pub record: Option<DomainRecord>,
    pub sources_checked: Vec<String>,
    pub errors: Vec<String>,
}

impl DomainCollection {
    pub fn empty(domain: SourceDomain) -> Self {
        Self {
            domain,
            record: None,
            sources_checked: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Everything known about one ingredient name after a mapping call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveRecord {
    pub inci_name: String,
    pub found: bool,
    pub identity: Option<IdentityRecord>,
    pub toxicology: Option<ToxicologyRecord>,
    pub regulatory: Option<RegulatoryRecord>,
    pub physical_chemical: Option<PhysicalChemicalRecord>,
    pub sources_used: Vec<String>,
    pub sources_checked: Vec<String>,
    pub errors: Vec<String>,
    pub data_completeness: f64,
    pub avg_confidence: f64,
}

impl ComprehensiveRecord {
    /// Assembles the record from the domain collectors' outcomes.
    ///
    /// Collections are applied in [`SourceDomain::ALL`] order regardless of
    /// the order they are passed in, so the result is deterministic.
    pub fn assemble(inci_name: impl Into<String>, mut collections: Vec<DomainCollection>) -> Self {
        collections.sort_by_key(|c| c.domain);

        let mut record = Self::empty(inci_name);
        let mut confidences = Vec::with_capacity(DOMAIN_COUNT);

        for collection in collections {
            for source in collection.sources_checked {
                if !record.sources_checked.contains(&source) {
                    record.sources_checked.push(source);
                }
            }
            record.errors.extend(collection.errors);

            let Some(found) = collection.record else {
                continue;
            };
            if found.domain() != collection.domain {
                record.errors.push(format!(
                    "{}: source '{}' returned a {} record",
                    collection.domain,
                    found.source(),
                    found.domain()
                ));
                continue;
            }
            if !record.sources_used.iter().any(|s| s == found.source()) {
                record.sources_used.push(found.source().to_string());
            }
            confidences.push(found.confidence());

            match found {
                DomainRecord::Identity(r) => record.identity = Some(r),
                DomainRecord::Toxicology(r) => record.toxicology = Some(r),
                DomainRecord::Regulatory(r) => record.regulatory = Some(r),
                DomainRecord::PhysicalChemical(r) => record.physical_chemical = Some(r),
            }
        }

        let filled = record.filled_domains();
        record.found = filled > 0;
        record.data_completeness = calculate_completeness(filled);
        record.avg_confidence = total_confidence(&confidences);
        record
    }

    /// A `found = false` record carrying a single error.
    pub fn failed(inci_name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut record = Self::empty(inci_name);
        record.errors.push(error.into());
        record
    }

    fn empty(inci_name: impl Into<String>) -> Self {
        Self {
            inci_name: inci_name.into(),
            found: false,
            identity: None,
            toxicology: None,
            regulatory: None,
            physical_chemical: None,
            sources_used: Vec::new(),
            sources_checked: Vec::new(),
            errors: Vec::new(),
            data_completeness: 0.0,
            avg_confidence: 0.0,
        }
    }

    pub fn filled_domains(&self) -> usize {
        [
            self.identity.is_some(),
            self.toxicology.is_some(),
            self.regulatory.is_some(),
            self.physical_chemical.is_some(),
        ]
        .iter()
        .filter(|filled| **filled)
        .count()
    }

    /// Animal toxicity entries, empty when no toxicology was found.
    pub fn toxicity_entries(&self) -> &[ToxicityEntry] {
        self.toxicology
            .as_ref()
            .map(|t| t.dermal_toxicity_entries.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(source: &str, confidence: f64) -> DomainCollection {
        DomainCollection {
            domain: SourceDomain::Identity,
            record: Some(DomainRecord::Identity(IdentityRecord {
                inci_name: "glycerin".to_string(),
                cas_number: Some("56-81-5".to_string()),
                source: source.to_string(),
                confidence,
                ..Default::default()
            })),
            sources_checked: vec![source.to_string()],
            errors: vec![],
        }
    }

    fn regulatory(confidence: f64) -> DomainCollection {
        DomainCollection {
            domain: SourceDomain::Regulatory,
            record: Some(DomainRecord::Regulatory(RegulatoryRecord {
                inci_name: "glycerin".to_string(),
                source: "cosing".to_string(),
                confidence,
                ..Default::default()
            })),
            sources_checked: vec!["cosing".to_string()],
            errors: vec![],
        }
    }

    #[test]
    fn completeness_is_fraction_of_four() {
        assert_eq!(calculate_completeness(0), 0.0);
        assert_eq!(calculate_completeness(2), 50.0);
        assert_eq!(calculate_completeness(4), 100.0);
    }

    #[test]
    fn total_confidence_is_mean_or_zero() {
        assert_eq!(total_confidence(&[]), 0.0);
        assert!((total_confidence(&[0.8, 0.9]) - 0.85).abs() < 1e-12);
    }

    #[test]
    fn two_of_four_domains_give_fifty_percent() {
        let record = ComprehensiveRecord::assemble(
            "glycerin",
            vec![
                regulatory(0.9),
                identity("pubchem", 0.8),
                DomainCollection::empty(SourceDomain::Toxicology),
                DomainCollection::empty(SourceDomain::PhysicalChemical),
            ],
        );

        assert!(record.found);
        assert_eq!(record.data_completeness, 50.0);
        assert!((record.avg_confidence - 0.85).abs() < 1e-12);
        assert_eq!(record.sources_used, vec!["pubchem", "cosing"]);
    }

    #[test]
    fn no_domains_means_not_found() {
        let mut tox = DomainCollection::empty(SourceDomain::Toxicology);
        tox.sources_checked.push("toxval".to_string());
        tox.errors.push("toxval: connection refused".to_string());

        let record = ComprehensiveRecord::assemble("unobtainium", vec![tox]);
        assert!(!record.found);
        assert_eq!(record.data_completeness, 0.0);
        assert_eq!(record.avg_confidence, 0.0);
        assert!(record.sources_used.is_empty());
        assert_eq!(record.sources_checked, vec!["toxval"]);
        assert_eq!(record.errors.len(), 1);
    }

    #[test]
    fn mismatched_domain_record_is_rejected() {
        let mut wrong = identity("pubchem", 0.8);
        wrong.domain = SourceDomain::Regulatory;

        let record = ComprehensiveRecord::assemble("glycerin", vec![wrong]);
        assert!(!record.found);
        assert_eq!(record.errors.len(), 1);
    }

    #[test]
    fn failed_record_carries_error() {
        let record = ComprehensiveRecord::failed("x", "task panicked");
        assert!(!record.found);
        assert_eq!(record.errors, vec!["task panicked"]);
        assert!(record.toxicity_entries().is_empty());
    }
}
