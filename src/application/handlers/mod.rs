//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod mapping;
pub mod product;

pub use mapping::IdentityMapper;
pub use product::{
    DecideProductCommand, DecideProductHandler, IngestProductCommand, IngestProductHandler,
    IngestProductResult, IngestedIngredient,
};
