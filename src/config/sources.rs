//! Chemical source configuration
//!
//! Each domain carries an ordered list of sources; the mapper tries them in
//! that order and stops at the first hit.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::sources::{HttpSourceSettings, DEFAULT_COSING_URL, DEFAULT_PUBCHEM_URL};
use crate::domain::identity::SourceDomain;

/// The closed set of source implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    PubChem,
    CosIng,
    ToxVal,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::PubChem => "pubchem",
            SourceKind::CosIng => "cosing",
            SourceKind::ToxVal => "toxval",
        }
    }

    /// Domains the implementation can answer.
    pub fn serves(&self, domain: SourceDomain) -> bool {
        match self {
            SourceKind::PubChem => matches!(
                domain,
                SourceDomain::Identity | SourceDomain::PhysicalChemical
            ),
            SourceKind::CosIng => {
                matches!(domain, SourceDomain::Identity | SourceDomain::Regulatory)
            }
            SourceKind::ToxVal => domain == SourceDomain::Toxicology,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection and pacing settings for an HTTP source
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSourceConfig {
    pub base_url: String,

    /// Minimum gap between consecutive requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,

    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpSourceConfig {
    fn with_base_url(base_url: &str, min_interval_ms: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            min_interval_ms,
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn settings(&self) -> HttpSourceSettings {
        HttpSourceSettings::new(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_min_interval(Duration::from_millis(self.min_interval_ms))
            .with_jitter(
                Duration::from_millis(self.jitter_min_ms),
                Duration::from_millis(self.jitter_max_ms),
            )
    }

    fn validate(&self, name: &'static str) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidSourceUrl(name));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout(name));
        }
        Ok(())
    }
}

/// Source chains per domain plus per-source settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_identity_chain")]
    pub identity: Vec<SourceKind>,

    #[serde(default = "default_toxicology_chain")]
    pub toxicology: Vec<SourceKind>,

    #[serde(default = "default_regulatory_chain")]
    pub regulatory: Vec<SourceKind>,

    #[serde(default = "default_physical_chemical_chain")]
    pub physical_chemical: Vec<SourceKind>,

    #[serde(default = "default_pubchem")]
    pub pubchem: HttpSourceConfig,

    #[serde(default = "default_cosing")]
    pub cosing: HttpSourceConfig,

    /// ToxVal needs a database; disabled sources are skipped in every chain
    #[serde(default)]
    pub toxval_enabled: bool,
}

impl SourcesConfig {
    /// Priority-ordered sources for a domain.
    pub fn chain(&self, domain: SourceDomain) -> &[SourceKind] {
        match domain {
            SourceDomain::Identity => &self.identity,
            SourceDomain::Toxicology => &self.toxicology,
            SourceDomain::Regulatory => &self.regulatory,
            SourceDomain::PhysicalChemical => &self.physical_chemical,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for domain in SourceDomain::ALL {
            if let Some(kind) = self.chain(domain).iter().find(|k| !k.serves(domain)) {
                return Err(ValidationError::SourceCannotServe {
                    source_name: kind.as_str(),
                    domain: domain.as_str(),
                });
            }
        }
        self.pubchem.validate("pubchem")?;
        self.cosing.validate("cosing")?;
        Ok(())
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            identity: default_identity_chain(),
            toxicology: default_toxicology_chain(),
            regulatory: default_regulatory_chain(),
            physical_chemical: default_physical_chemical_chain(),
            pubchem: default_pubchem(),
            cosing: default_cosing(),
            toxval_enabled: false,
        }
    }
}

fn default_identity_chain() -> Vec<SourceKind> {
    vec![SourceKind::PubChem, SourceKind::CosIng]
}

fn default_toxicology_chain() -> Vec<SourceKind> {
    vec![SourceKind::ToxVal]
}

fn default_regulatory_chain() -> Vec<SourceKind> {
    vec![SourceKind::CosIng]
}

fn default_physical_chemical_chain() -> Vec<SourceKind> {
    vec![SourceKind::PubChem]
}

fn default_pubchem() -> HttpSourceConfig {
    HttpSourceConfig::with_base_url(DEFAULT_PUBCHEM_URL, default_min_interval_ms())
}

fn default_cosing() -> HttpSourceConfig {
    HttpSourceConfig::with_base_url(DEFAULT_COSING_URL, 2_000)
}

fn default_min_interval_ms() -> u64 {
    1_000
}

fn default_jitter_min_ms() -> u64 {
    100
}

fn default_jitter_max_ms() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chains() {
        let config = SourcesConfig::default();
        assert_eq!(
            config.chain(SourceDomain::Identity),
            &[SourceKind::PubChem, SourceKind::CosIng]
        );
        assert_eq!(config.chain(SourceDomain::Toxicology), &[SourceKind::ToxVal]);
        assert_eq!(config.cosing.min_interval_ms, 2_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_in_wrong_domain_rejected() {
        let config = SourcesConfig {
            regulatory: vec![SourceKind::PubChem],
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SourceCannotServe {
                source_name: "pubchem",
                domain: "regulatory",
            })
        );
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let mut config = SourcesConfig::default();
        config.cosing.base_url = "ftp://ec.europa.eu".to_string();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidSourceUrl("cosing"))
        );
    }

    #[test]
    fn test_http_settings_conversion() {
        let settings = default_cosing().settings();
        assert_eq!(settings.min_interval, Duration::from_secs(2));
        assert_eq!(settings.jitter_max, Duration::from_millis(300));
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_kind_parses_lowercase() {
        let kinds: Vec<SourceKind> = serde_json::from_str(r#"["pubchem","cosing","toxval"]"#).unwrap();
        assert_eq!(kinds, vec![SourceKind::PubChem, SourceKind::CosIng, SourceKind::ToxVal]);
    }
}
