//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `sources` - Chemical databases (PubChem, CosIng, ToxVal) and a mock
//! - `graph` - Ingredient graph gateway (in-memory join)
//! - `profile` - User profile readers (in-memory, PostgreSQL)

pub mod graph;
pub mod profile;
pub mod sources;

pub use graph::InMemoryGraphGateway;
pub use profile::{InMemoryProfileReader, PgUserProfileReader};
pub use sources::{
    CosIngSource, MockChemicalSource, PubChemSource, SourceRegistry, ToxValSource,
};
