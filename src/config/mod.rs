//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SCANALYZE` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working
//! configuration without a database.
//!
//! # Example
//!
//! ```no_run
//! use scanalyze::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Mapping in chunks of {}", config.mapper.batch_size);
//! ```

mod database;
mod decision;
mod error;
mod hed;
mod logging;
mod mapper;
mod sources;

pub use database::DatabaseConfig;
pub use decision::DecisionConfig;
pub use error::{ConfigError, ValidationError};
pub use hed::HedConfig;
pub use logging::LoggingConfig;
pub use mapper::MapperConfig;
pub use sources::{HttpSourceConfig, SourceKind, SourcesConfig};

use serde::Deserialize;

/// Keys whose values are comma-separated lists in the environment.
const LIST_KEYS: &[&str] = &[
    "sources.identity",
    "sources.toxicology",
    "sources.regulatory",
    "sources.physical_chemical",
    "decision.default_routes",
];

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Source chains per domain and HTTP source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub mapper: MapperConfig,

    #[serde(default)]
    pub hed: HedConfig,

    #[serde(default)]
    pub decision: DecisionConfig,

    /// PostgreSQL for ToxVal and stored profiles; absent means neither is used
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SCANALYZE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits source chains and routes on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `SCANALYZE__MAPPER__BATCH_SIZE=3` -> `mapper.batch_size = 3`
    /// - `SCANALYZE__SOURCES__IDENTITY=cosing,pubchem` -> `sources.identity = [cosing, pubchem]`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = LIST_KEYS.iter().fold(
            config::Environment::default()
                .prefix("SCANALYZE")
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |env, key| env.with_list_parse_key(key),
        );

        let config = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid,
    /// including ToxVal being enabled without a database.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.sources.validate()?;
        self.mapper.validate()?;
        self.hed.validate()?;
        self.decision.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.sources.toxval_enabled => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"));
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::SourceDomain;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SCANALYZE__MAPPER__BATCH_SIZE",
        "SCANALYZE__SOURCES__IDENTITY",
        "SCANALYZE__SOURCES__TOXVAL_ENABLED",
        "SCANALYZE__DATABASE__URL",
        "SCANALYZE__HED__HUMAN_WEIGHT_KG",
        "SCANALYZE__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.mapper.batch_size, 5);
        assert_eq!(config.hed.human_weight_kg, 60.0);
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SCANALYZE__MAPPER__BATCH_SIZE", "3");
        env::set_var("SCANALYZE__SOURCES__IDENTITY", "cosing,pubchem");
        env::set_var("SCANALYZE__HED__HUMAN_WEIGHT_KG", "70");
        env::set_var("SCANALYZE__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.mapper.batch_size, 3);
        assert_eq!(config.hed.human_weight_kg, 70.0);
        assert!(config.logging.json);
        assert_eq!(
            config.sources.chain(SourceDomain::Identity),
            &[SourceKind::CosIng, SourceKind::PubChem]
        );
    }

    #[test]
    fn test_toxval_requires_database() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SCANALYZE__SOURCES__TOXVAL_ENABLED", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        );
    }

    #[test]
    fn test_database_section_loads() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SCANALYZE__SOURCES__TOXVAL_ENABLED", "true");
        env::set_var("SCANALYZE__DATABASE__URL", "postgresql://localhost/toxval");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.database.is_some());
        assert!(config.validate().is_ok());
    }
}
