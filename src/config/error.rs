//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid base URL for source {0}")]
    InvalidSourceUrl(&'static str),

    #[error("Invalid request timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Source {source_name} cannot serve the {domain} domain")]
    SourceCannotServe {
        source_name: &'static str,
        domain: &'static str,
    },

    #[error("Batch size must be between 1 and 10, got {0}")]
    InvalidBatchSize(usize),

    #[error("HED parameter {0} must be positive")]
    InvalidHedParameter(&'static str),

    #[error("Skin penetration must be in (0, 100], got {0}")]
    InvalidSkinPenetration(f64),

    #[error("Score weights must be non-negative and sum to 1.0, got {0}")]
    InvalidWeights(f64),

    #[error("At least one exposure route is required")]
    NoRoutes,
}
