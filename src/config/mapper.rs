//! Identity mapper configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_BATCH_SIZE: usize = 10;

/// Batch pacing and per-source time budget
#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    /// Ingredients mapped concurrently per chunk
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between chunks
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Upper bound on a single source lookup
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
}

impl MapperConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ValidationError::InvalidBatchSize(self.batch_size));
        }
        if self.source_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("mapper"));
        }
        Ok(())
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            source_timeout_secs: default_source_timeout_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_pause_ms() -> u64 {
    1_000
}

fn default_source_timeout_secs() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.batch_pause(), Duration::from_secs(1));
        assert_eq!(config.source_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_batch_size_bounds() {
        for size in [0, 11] {
            let config = MapperConfig {
                batch_size: size,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidBatchSize(size)));
        }
        let config = MapperConfig {
            batch_size: 10,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
