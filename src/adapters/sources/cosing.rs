//! EU CosIng (cosmetic ingredient database) source.
//!
//! CosIng has no JSON API, so the search results page is scanned for the
//! first CAS and EC numbers. A page without a CAS number counts as not
//! found.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::time::Duration;

use super::http::{HttpSourceClient, HttpSourceSettings};
use crate::domain::identity::{DomainRecord, IdentityRecord, RegulatoryRecord, SourceDomain};
use crate::ports::{ChemicalSource, SourceError, SourceOutcome};

pub const COSING_SOURCE: &str = "cosing";
pub const DEFAULT_COSING_URL: &str = "https://ec.europa.eu/growth/tools-databases/cosing/index.cfm";
/// CosIng asks for at most one search every two seconds.
pub const COSING_MIN_INTERVAL: Duration = Duration::from_secs(2);
const COSING_CONFIDENCE: f64 = 0.9;

static CAS_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2,7}-\d{2}-\d\b").expect("static regex is valid"));
static EC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{3}-\d\b").expect("static regex is valid"));
static ANNEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Annex\s+([IVX]+)\b").expect("static regex is valid"));

const DOMAINS: &[SourceDomain] = &[SourceDomain::Identity, SourceDomain::Regulatory];

/// Identifiers scraped from one results page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CosIngListing {
    pub cas_number: Option<String>,
    pub ec_number: Option<String>,
    pub annexes: Vec<String>,
}

impl CosIngListing {
    /// Scans a results page. `None` when it carries no CAS number.
    pub fn parse(html: &str) -> Option<Self> {
        let cas_number = CAS_NUMBER.find(html)?.as_str().to_string();
        let ec_number = EC_NUMBER.find(html).map(|m| m.as_str().to_string());
        let annexes: BTreeSet<String> = ANNEX
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        Some(Self {
            cas_number: Some(cas_number),
            ec_number,
            annexes: annexes.into_iter().collect(),
        })
    }

    fn into_identity(self, name: &str) -> IdentityRecord {
        IdentityRecord {
            inci_name: name.to_string(),
            cas_number: self.cas_number,
            ec_number: self.ec_number,
            source: COSING_SOURCE.to_string(),
            confidence: COSING_CONFIDENCE,
            ..Default::default()
        }
    }

    fn into_regulatory(self, name: &str) -> RegulatoryRecord {
        RegulatoryRecord {
            inci_name: name.to_string(),
            cas_number: self.cas_number,
            ec_number: self.ec_number,
            annexes: self.annexes,
            source: COSING_SOURCE.to_string(),
            confidence: COSING_CONFIDENCE,
        }
    }
}

pub struct CosIngSource {
    http: HttpSourceClient,
}

impl CosIngSource {
    pub fn new(settings: HttpSourceSettings) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpSourceClient::new(settings)?,
        })
    }

    async fn search(&self, name: &str) -> Result<Option<CosIngListing>, SourceError> {
        let url = self.http.url(&[])?;
        let query = [
            ("fuseaction", "search.results"),
            ("search", name.trim()),
            ("dosearch", "1"),
        ];
        let html = self.http.get_text(url, &query).await?;
        Ok(html.as_deref().and_then(CosIngListing::parse))
    }
}

#[async_trait]
impl ChemicalSource for CosIngSource {
    fn name(&self) -> &str {
        COSING_SOURCE
    }

    fn domains(&self) -> &[SourceDomain] {
        DOMAINS
    }

    fn bounds_own_requests(&self) -> bool {
        true
    }

    async fn lookup(&self, domain: SourceDomain, name: &str) -> SourceOutcome {
        if !self.serves(domain) {
            return SourceOutcome::Failed(SourceError::UnsupportedDomain(domain));
        }
        match self.search(name).await {
            Ok(Some(listing)) => SourceOutcome::Found(match domain {
                SourceDomain::Regulatory => DomainRecord::Regulatory(listing.into_regulatory(name)),
                _ => DomainRecord::Identity(listing.into_identity(name)),
            }),
            Ok(None) => SourceOutcome::NotFound,
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <table class="results">
          <tr><td>INCI name</td><td>SALICYLIC ACID</td></tr>
          <tr><td>CAS #</td><td>69-72-7</td></tr>
          <tr><td>EC #</td><td>200-712-3</td></tr>
          <tr><td>Restriction</td><td>Annex III/98, see also Annex V/3</td></tr>
          <tr><td>Updated</td><td>2010-01-12</td></tr>
        </table>
    "#;

    #[test]
    fn parses_first_cas_and_ec_numbers() {
        let listing = CosIngListing::parse(RESULTS_PAGE).unwrap();
        assert_eq!(listing.cas_number.as_deref(), Some("69-72-7"));
        assert_eq!(listing.ec_number.as_deref(), Some("200-712-3"));
    }

    #[test]
    fn collects_distinct_annexes() {
        let html = format!("{} Annex III again", RESULTS_PAGE);
        let listing = CosIngListing::parse(&html).unwrap();
        assert_eq!(listing.annexes, vec!["III".to_string(), "V".to_string()]);
    }

    #[test]
    fn page_without_cas_is_not_found() {
        assert_eq!(CosIngListing::parse("<p>No results found</p>"), None);
    }

    #[test]
    fn listing_converts_to_domain_records() {
        let listing = CosIngListing::parse(RESULTS_PAGE).unwrap();

        let identity = listing.clone().into_identity("Salicylic Acid");
        assert_eq!(identity.source, "cosing");
        assert_eq!(identity.confidence, 0.9);
        assert!(identity.inchi_key.is_none());

        let regulatory = listing.into_regulatory("Salicylic Acid");
        assert_eq!(regulatory.cas_number.as_deref(), Some("69-72-7"));
        assert_eq!(regulatory.annexes.len(), 2);
    }

    #[tokio::test]
    async fn toxicology_is_not_served() {
        let source = CosIngSource::new(HttpSourceSettings::new(DEFAULT_COSING_URL)).unwrap();
        assert!(!source.serves(SourceDomain::Toxicology));
        let outcome = source.lookup(SourceDomain::Toxicology, "aqua").await;
        assert_eq!(
            outcome,
            SourceOutcome::Failed(SourceError::UnsupportedDomain(SourceDomain::Toxicology))
        );
    }
}
