//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, risk score, errors)
//! - `identity` - Per-domain chemical records and their aggregation
//! - `hed` - Allometric dose scaling and dermal safe-concentration estimates
//! - `toxicology` - HED integration over raw toxicity entries, hazard derivation
//! - `decision` - Personalised ingredient and product risk scoring
//! - `label` - Ingredient list extraction from label text

pub mod decision;
pub mod foundation;
pub mod hed;
pub mod identity;
pub mod label;
pub mod toxicology;
