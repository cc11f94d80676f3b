//! Decision engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::decision::ScoreWeights;

/// Sub-score weights and the exposure routes considered by default
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Hazard routes joined when the caller names none
    #[serde(default = "default_routes")]
    pub default_routes: Vec<String>,
}

impl DecisionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.weights.validate().is_err() {
            let w = &self.weights;
            let sum = w.hed + w.profile + w.medication + w.preference + w.environmental;
            return Err(ValidationError::InvalidWeights(sum));
        }
        if self.default_routes.iter().all(|r| r.trim().is_empty()) {
            return Err(ValidationError::NoRoutes);
        }
        Ok(())
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            default_routes: default_routes(),
        }
    }
}

fn default_routes() -> Vec<String> {
    vec!["dermal".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecisionConfig::default();
        assert_eq!(config.default_routes, vec!["dermal"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = DecisionConfig {
            weights: ScoreWeights {
                hed: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidWeights(sum)) if (sum - 1.15).abs() < 1e-9
        ));
    }

    #[test]
    fn test_empty_routes_rejected() {
        let config = DecisionConfig {
            default_routes: vec![" ".to_string()],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NoRoutes));
    }
}
