//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Ingestion (write) and decisions (read) are separate handlers.

pub mod handlers;

pub use handlers::{
    // Mapping
    IdentityMapper,
    // Product handlers
    DecideProductCommand, DecideProductHandler, IngestProductCommand, IngestProductHandler,
    IngestProductResult, IngestedIngredient,
};
