//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the Scanalyze domain.

mod errors;
mod ids;
mod risk_score;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{IngredientKey, ProductId, UserId};
pub use risk_score::RiskScore;
pub use timestamp::Timestamp;
