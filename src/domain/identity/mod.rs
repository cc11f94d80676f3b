//! Identity module - chemical identity and toxicology records.
//!
//! An ingredient name is resolved across four independent domains
//! (identity, toxicology, regulatory, physical-chemical). Each domain yields
//! at most one [`DomainRecord`], and the results are assembled into an
//! immutable [`ComprehensiveRecord`].

mod comprehensive;
mod records;

pub use comprehensive::{
    calculate_completeness, total_confidence, ComprehensiveRecord, DomainCollection, DOMAIN_COUNT,
};
pub use records::{
    DomainRecord, IdentityRecord, PhysicalChemicalRecord, RegulatoryRecord, SourceDomain,
    ToxicityEntry, ToxicologyRecord,
};
