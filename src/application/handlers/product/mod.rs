//! Product handlers.
//!
//! Ingestion writes mapped ingredients into the graph; decisions read them
//! back joined with a user's profile.

mod decide_product;
mod ingest_product;

pub use decide_product::{DecideProductCommand, DecideProductHandler};
pub use ingest_product::{
    IngestProductCommand, IngestProductHandler, IngestProductResult, IngestedIngredient,
};
