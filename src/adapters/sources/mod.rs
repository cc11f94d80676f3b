//! Chemical source adapters and the per-domain source registry.
//!
//! - `PubChemSource` - PubChem PUG REST (identity, physical-chemical)
//! - `CosIngSource` - EU CosIng search page (identity, regulatory)
//! - `ToxValSource` - EPA ToxVal in PostgreSQL (toxicology)
//! - `MockChemicalSource` - scripted outcomes for tests

mod cosing;
mod http;
mod mock;
mod pubchem;
mod throttle;
mod toxval;

pub use cosing::{CosIngListing, CosIngSource, COSING_SOURCE, DEFAULT_COSING_URL};
pub use http::{HttpSourceClient, HttpSourceSettings};
pub use mock::MockChemicalSource;
pub use pubchem::{
    cas_from_synonyms, ec_from_synonyms, PubChemSource, DEFAULT_PUBCHEM_URL, PUBCHEM_SOURCE,
};
pub use throttle::RequestThrottle;
pub use toxval::{
    irritation_potential, sensitization_risk, toxicity_entries, SkinEyeRow, ToxValRow,
    ToxValSource, TOXVAL_SOURCE,
};

use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

use crate::config::{SourceKind, SourcesConfig};
use crate::domain::identity::SourceDomain;
use crate::ports::{ChemicalSource, SourceError};

/// Priority-ordered sources for each domain.
///
/// A source serving several domains is registered once per domain and
/// shares its throttle across them.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    chains: BTreeMap<SourceDomain, Vec<Arc<dyn ChemicalSource>>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `source` to the domain's chain (lowest priority so far).
    pub fn register(mut self, domain: SourceDomain, source: Arc<dyn ChemicalSource>) -> Self {
        self.chains.entry(domain).or_default().push(source);
        self
    }

    /// Registers `source` for every domain it serves.
    pub fn register_all(self, source: Arc<dyn ChemicalSource>) -> Self {
        let domains = source.domains().to_vec();
        domains
            .into_iter()
            .fold(self, |registry, domain| registry.register(domain, source.clone()))
    }

    pub fn chain(&self, domain: SourceDomain) -> &[Arc<dyn ChemicalSource>] {
        self.chains.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn source_names(&self, domain: SourceDomain) -> Vec<String> {
        self.chain(domain).iter().map(|s| s.name().to_string()).collect()
    }

    /// Builds the configured chains. ToxVal is skipped unless enabled and
    /// a pool is supplied.
    pub fn from_config(config: &SourcesConfig, pool: Option<PgPool>) -> Result<Self, SourceError> {
        let mut built: HashMap<SourceKind, Arc<dyn ChemicalSource>> = HashMap::new();
        let mut registry = Self::new();

        for domain in SourceDomain::ALL {
            for kind in config.chain(domain) {
                let source = match built.get(kind) {
                    Some(source) => source.clone(),
                    None => {
                        let Some(source) = build_source(*kind, config, pool.as_ref())? else {
                            warn!(source = %kind, domain = %domain, "source disabled, skipping");
                            continue;
                        };
                        built.insert(*kind, source.clone());
                        source
                    }
                };
                registry = registry.register(domain, source);
            }
        }

        Ok(registry)
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (domain, chain) in &self.chains {
            let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
            map.entry(domain, &names);
        }
        map.finish()
    }
}

fn build_source(
    kind: SourceKind,
    config: &SourcesConfig,
    pool: Option<&PgPool>,
) -> Result<Option<Arc<dyn ChemicalSource>>, SourceError> {
    let source: Arc<dyn ChemicalSource> = match kind {
        SourceKind::PubChem => Arc::new(PubChemSource::new(config.pubchem.settings())?),
        SourceKind::CosIng => Arc::new(CosIngSource::new(config.cosing.settings())?),
        SourceKind::ToxVal => match pool {
            Some(pool) if config.toxval_enabled => Arc::new(ToxValSource::new(pool.clone())),
            _ => return Ok(None),
        },
    };
    Ok(Some(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_covers_every_served_domain() {
        let source = Arc::new(MockChemicalSource::new(
            "both",
            &[SourceDomain::Identity, SourceDomain::Regulatory],
        ));
        let registry = SourceRegistry::new().register_all(source);

        assert_eq!(registry.source_names(SourceDomain::Identity), vec!["both"]);
        assert_eq!(registry.source_names(SourceDomain::Regulatory), vec!["both"]);
        assert!(registry.chain(SourceDomain::Toxicology).is_empty());
    }

    #[test]
    fn chains_keep_registration_order() {
        let registry = SourceRegistry::new()
            .register(
                SourceDomain::Identity,
                Arc::new(MockChemicalSource::new("first", &[SourceDomain::Identity])),
            )
            .register(
                SourceDomain::Identity,
                Arc::new(MockChemicalSource::new("second", &[SourceDomain::Identity])),
            );
        assert_eq!(
            registry.source_names(SourceDomain::Identity),
            vec!["first", "second"]
        );
    }

    #[test]
    fn default_config_without_database_skips_toxval() {
        let registry = SourceRegistry::from_config(&SourcesConfig::default(), None).unwrap();

        assert_eq!(
            registry.source_names(SourceDomain::Identity),
            vec!["pubchem", "cosing"]
        );
        assert_eq!(registry.source_names(SourceDomain::Regulatory), vec!["cosing"]);
        assert_eq!(
            registry.source_names(SourceDomain::PhysicalChemical),
            vec!["pubchem"]
        );
        assert!(registry.chain(SourceDomain::Toxicology).is_empty());
    }
}
