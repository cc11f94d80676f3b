//! Dose scaling configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::hed::{
    DermalSafetyParams, DoseConverter, DoseError, DEFAULT_HUMAN_WEIGHT_KG,
};
use crate::domain::toxicology::ToxicologyIntegrator;

/// Human reference weight and dermal exposure assumptions
#[derive(Debug, Clone, Deserialize)]
pub struct HedConfig {
    #[serde(default = "default_human_weight_kg")]
    pub human_weight_kg: f64,

    /// Divisor applied to the safe systemic dose
    #[serde(default = "default_safety_factor")]
    pub safety_factor: f64,

    #[serde(default = "default_skin_penetration_percent")]
    pub skin_penetration_percent: f64,

    #[serde(default = "default_application_area_cm2")]
    pub application_area_cm2: f64,
}

impl HedConfig {
    pub fn dermal_params(&self) -> DermalSafetyParams {
        DermalSafetyParams {
            application_area_cm2: self.application_area_cm2,
            skin_penetration_percent: self.skin_penetration_percent,
            safety_factor: self.safety_factor,
        }
    }

    pub fn integrator(&self) -> Result<ToxicologyIntegrator, DoseError> {
        let converter = DoseConverter::new(self.human_weight_kg)?;
        Ok(ToxicologyIntegrator::new(converter, self.dermal_params()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("human_weight_kg", self.human_weight_kg),
            ("safety_factor", self.safety_factor),
            ("application_area_cm2", self.application_area_cm2),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidHedParameter(field));
            }
        }
        if !(self.skin_penetration_percent > 0.0 && self.skin_penetration_percent <= 100.0) {
            return Err(ValidationError::InvalidSkinPenetration(
                self.skin_penetration_percent,
            ));
        }
        Ok(())
    }
}

impl Default for HedConfig {
    fn default() -> Self {
        Self {
            human_weight_kg: default_human_weight_kg(),
            safety_factor: default_safety_factor(),
            skin_penetration_percent: default_skin_penetration_percent(),
            application_area_cm2: default_application_area_cm2(),
        }
    }
}

fn default_human_weight_kg() -> f64 {
    DEFAULT_HUMAN_WEIGHT_KG
}

fn default_safety_factor() -> f64 {
    100.0
}

fn default_skin_penetration_percent() -> f64 {
    10.0
}

fn default_application_area_cm2() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dermal_params() {
        let config = HedConfig::default();
        assert_eq!(config.dermal_params(), DermalSafetyParams::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.integrator().unwrap().converter().human_weight_kg(), 60.0);
    }

    #[test]
    fn test_zero_weight_rejected() {
        let config = HedConfig {
            human_weight_kg: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidHedParameter("human_weight_kg"))
        );
    }

    #[test]
    fn test_penetration_above_hundred_rejected() {
        let config = HedConfig {
            skin_penetration_percent: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
