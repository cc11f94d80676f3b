//! PubChem PUG REST source.
//!
//! Resolves a name to a compound id, then reads computed properties and
//! synonyms. Serves identity (identifiers plus CAS/EC from synonyms) and
//! physical-chemical descriptors. Both domains share one compound fetch per
//! name, so a name costs three requests rather than five.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

use super::http::{HttpSourceClient, HttpSourceSettings};
use crate::domain::identity::{
    DomainRecord, IdentityRecord, PhysicalChemicalRecord, SourceDomain,
};
use crate::ports::{ChemicalSource, SourceError, SourceOutcome};

pub const PUBCHEM_SOURCE: &str = "pubchem";
pub const DEFAULT_PUBCHEM_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
const PUBCHEM_CONFIDENCE: f64 = 0.8;

const PROPERTIES: &str = "MolecularFormula,MolecularWeight,CanonicalSMILES,InChI,InChIKey,\
IUPACName,XLogP,TPSA,HBondDonorCount,HBondAcceptorCount";

static CAS_SYNONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,7}-\d{2}-\d$").expect("static regex is valid"));
static EC_SYNONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:EC\s*)?(\d{3}-\d{3}-\d{1,2})$").expect("static regex is valid"));

const DOMAINS: &[SourceDomain] = &[SourceDomain::Identity, SourceDomain::PhysicalChemical];

/// Resolved names kept before the cache is reset.
const COMPOUND_CACHE_LIMIT: usize = 512;

#[derive(Debug, Deserialize)]
struct CidResponse {
    #[serde(rename = "IdentifierList")]
    identifier_list: IdentifierList,
}

#[derive(Debug, Deserialize)]
struct IdentifierList {
    #[serde(rename = "CID", default)]
    cid: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<CompoundProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CompoundProperties {
    molecular_formula: Option<String>,
    /// A string in current responses, a number in older ones.
    molecular_weight: Option<Value>,
    #[serde(rename = "CanonicalSMILES")]
    canonical_smiles: Option<String>,
    #[serde(rename = "InChI")]
    inchi: Option<String>,
    #[serde(rename = "InChIKey")]
    inchi_key: Option<String>,
    #[serde(rename = "IUPACName")]
    iupac_name: Option<String>,
    #[serde(rename = "XLogP")]
    xlogp: Option<f64>,
    #[serde(rename = "TPSA")]
    tpsa: Option<f64>,
    h_bond_donor_count: Option<u32>,
    h_bond_acceptor_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SynonymResponse {
    #[serde(rename = "InformationList")]
    information_list: InformationList,
}

#[derive(Debug, Deserialize)]
struct InformationList {
    #[serde(rename = "Information", default)]
    information: Vec<SynonymInformation>,
}

#[derive(Debug, Deserialize)]
struct SynonymInformation {
    #[serde(rename = "Synonym", default)]
    synonym: Vec<String>,
}

/// A name resolved to its compound id and computed properties.
#[derive(Debug, Clone)]
struct Compound {
    cid: u64,
    properties: CompoundProperties,
}

/// Filled once per name. Failed fetches leave the cell empty for a retry.
type CompoundCell = Arc<OnceCell<Option<Compound>>>;

pub struct PubChemSource {
    http: HttpSourceClient,
    compounds: Mutex<HashMap<String, CompoundCell>>,
}

impl PubChemSource {
    pub fn new(settings: HttpSourceSettings) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpSourceClient::new(settings)?,
            compounds: Mutex::new(HashMap::new()),
        })
    }

    fn compound_cell(&self, name: &str) -> CompoundCell {
        let key = name.trim().to_lowercase();
        let mut compounds = self.compounds.lock().unwrap_or_else(PoisonError::into_inner);
        if compounds.len() >= COMPOUND_CACHE_LIMIT && !compounds.contains_key(&key) {
            compounds.clear();
        }
        compounds.entry(key).or_default().clone()
    }

    /// Name to CID to properties, fetched once for both domains.
    async fn compound(&self, name: &str) -> Result<Option<Compound>, SourceError> {
        let cell = self.compound_cell(name);
        let compound = cell.get_or_try_init(|| self.fetch_compound(name)).await?;
        Ok(compound.clone())
    }

    async fn fetch_compound(&self, name: &str) -> Result<Option<Compound>, SourceError> {
        let Some(cid) = self.find_cid(name).await? else {
            return Ok(None);
        };
        let properties = self.properties(cid).await?;
        Ok(properties.map(|properties| Compound { cid, properties }))
    }

    async fn find_cid(&self, name: &str) -> Result<Option<u64>, SourceError> {
        let url = self.http.url(&["compound", "name", name.trim(), "cids", "JSON"])?;
        let response: Option<CidResponse> = self.http.get_json(url, &[]).await?;
        Ok(response.and_then(|r| r.identifier_list.cid.first().copied()))
    }

    async fn properties(&self, cid: u64) -> Result<Option<CompoundProperties>, SourceError> {
        let cid = cid.to_string();
        let url = self
            .http
            .url(&["compound", "cid", &cid, "property", PROPERTIES, "JSON"])?;
        let response: Option<PropertyResponse> = self.http.get_json(url, &[]).await?;
        Ok(response.and_then(|r| r.property_table.properties.into_iter().next()))
    }

    async fn synonyms(&self, cid: u64) -> Result<Vec<String>, SourceError> {
        let cid = cid.to_string();
        let url = self.http.url(&["compound", "cid", &cid, "synonyms", "JSON"])?;
        let response: Option<SynonymResponse> = self.http.get_json(url, &[]).await?;
        Ok(response
            .and_then(|r| r.information_list.information.into_iter().next())
            .map(|info| info.synonym)
            .unwrap_or_default())
    }

    async fn identity(&self, name: &str) -> Result<Option<DomainRecord>, SourceError> {
        let Some(compound) = self.compound(name).await? else {
            return Ok(None);
        };
        let synonyms = self.synonyms(compound.cid).await?;
        debug!(name, cid = compound.cid, synonyms = synonyms.len(), "pubchem compound resolved");

        Ok(Some(DomainRecord::Identity(identity_record(
            name,
            compound.properties,
            &synonyms,
        ))))
    }

    async fn physical_chemical(&self, name: &str) -> Result<Option<DomainRecord>, SourceError> {
        let Some(compound) = self.compound(name).await? else {
            return Ok(None);
        };
        Ok(Some(DomainRecord::PhysicalChemical(
            physical_chemical_record(name, compound.properties),
        )))
    }
}

#[async_trait]
impl ChemicalSource for PubChemSource {
    fn name(&self) -> &str {
        PUBCHEM_SOURCE
    }

    fn domains(&self) -> &[SourceDomain] {
        DOMAINS
    }

    fn bounds_own_requests(&self) -> bool {
        true
    }

    async fn lookup(&self, domain: SourceDomain, name: &str) -> SourceOutcome {
        let result = match domain {
            SourceDomain::Identity => self.identity(name).await,
            SourceDomain::PhysicalChemical => self.physical_chemical(name).await,
            other => Err(SourceError::UnsupportedDomain(other)),
        };
        match result {
            Ok(Some(record)) => SourceOutcome::Found(record),
            Ok(None) => SourceOutcome::NotFound,
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

fn molecular_weight(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First synonym that looks like a CAS registry number.
pub fn cas_from_synonyms(synonyms: &[String]) -> Option<String> {
    synonyms
        .iter()
        .map(|s| s.trim())
        .find(|s| CAS_SYNONYM.is_match(s))
        .map(str::to_string)
}

/// First synonym that looks like an EC number (optionally `EC`-prefixed).
pub fn ec_from_synonyms(synonyms: &[String]) -> Option<String> {
    synonyms
        .iter()
        .find_map(|s| EC_SYNONYM.captures(s.trim()))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn identity_record(name: &str, props: CompoundProperties, synonyms: &[String]) -> IdentityRecord {
    IdentityRecord {
        inci_name: name.to_string(),
        cas_number: cas_from_synonyms(synonyms),
        ec_number: ec_from_synonyms(synonyms),
        smiles: props.canonical_smiles,
        inchi: props.inchi,
        inchi_key: props.inchi_key,
        systematic_name: props.iupac_name,
        molecular_weight: molecular_weight(props.molecular_weight.as_ref()),
        molecular_formula: props.molecular_formula,
        source: PUBCHEM_SOURCE.to_string(),
        confidence: PUBCHEM_CONFIDENCE,
    }
}

fn physical_chemical_record(name: &str, props: CompoundProperties) -> PhysicalChemicalRecord {
    PhysicalChemicalRecord {
        inci_name: name.to_string(),
        molecular_weight: molecular_weight(props.molecular_weight.as_ref()),
        molecular_formula: props.molecular_formula,
        xlogp: props.xlogp,
        tpsa: props.tpsa,
        h_bond_donor_count: props.h_bond_donor_count,
        h_bond_acceptor_count: props.h_bond_acceptor_count,
        source: PUBCHEM_SOURCE.to_string(),
        confidence: PUBCHEM_CONFIDENCE,
    }
}
