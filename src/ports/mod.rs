//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ChemicalSource` - One external chemical database (identity,
//!   toxicology, regulatory or physical-chemical data)
//! - `GraphGateway` - Ingredient/hazard/user property graph
//! - `UserProfileReader` - Read-only user health profiles

mod chemical_source;
mod graph_gateway;
mod profile_reader;

pub use chemical_source::{ChemicalSource, SourceError, SourceOutcome};
pub use graph_gateway::{GraphGateway, IngredientNode};
pub use profile_reader::UserProfileReader;
