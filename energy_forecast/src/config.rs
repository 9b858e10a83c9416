//! Pipeline and training configuration
//!
//! Settings are plain serde records so a run can be reproduced from a JSON
//! file instead of interactive state.

use crate::error::{ForecastError, Result};
use energy_math::DEFAULT_IMBALANCE_PENALTY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Training hyper-parameters passed to [`crate::models::train`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub shuffle: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 1e-3,
            batch_size: 64,
            seed: 42,
            shuffle: true,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(ForecastError::ConfigError(
                "epochs must be greater than zero".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::ConfigError(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::ConfigError(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// End-to-end settings for windowing, forecasting and evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rows per training window
    pub window_len: usize,
    /// Steps per forecast run (48 half hours = one day)
    pub horizon_steps: usize,
    /// Minutes between observations
    pub cadence_minutes: i64,
    /// Quadratic imbalance penalty `k` of the revenue formula
    pub imbalance_penalty: f64,
    /// Tail probability for VaR / CVaR
    pub cvar_alpha: f64,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_len: 32,
            horizon_steps: 48,
            cadence_minutes: 30,
            imbalance_penalty: DEFAULT_IMBALANCE_PENALTY,
            cvar_alpha: 0.05,
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn cadence(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cadence_minutes)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_len == 0 {
            return Err(ForecastError::ConfigError(
                "window_len must be greater than zero".to_string(),
            ));
        }
        if self.horizon_steps == 0 {
            return Err(ForecastError::ConfigError(
                "horizon_steps must be greater than zero".to_string(),
            ));
        }
        if self.cadence_minutes <= 0 {
            return Err(ForecastError::ConfigError(
                "cadence_minutes must be positive".to_string(),
            ));
        }
        if !(self.imbalance_penalty.is_finite() && self.imbalance_penalty >= 0.0) {
            return Err(ForecastError::ConfigError(format!(
                "imbalance_penalty must be non-negative, got {}",
                self.imbalance_penalty
            )));
        }
        if !(self.cvar_alpha > 0.0 && self.cvar_alpha < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "cvar_alpha must be between 0 and 1, got {}",
                self.cvar_alpha
            )));
        }
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon_steps, 48);
        assert_eq!(config.imbalance_penalty, 0.07);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            PipelineConfig::from_json_str(r#"{"window_len": 16, "training": {"epochs": 3}}"#)
                .unwrap();

        assert_eq!(config.window_len, 16);
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.batch_size, 64);
        assert_eq!(config.horizon_steps, 48);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"cvar_alpha": 1.5}"#),
            Err(ForecastError::ConfigError(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"training": {"learning_rate": 0.0}}"#),
            Err(ForecastError::ConfigError(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("not json"),
            Err(ForecastError::JsonError(_))
        ));
    }
}
