//! Named feature layout shared by tables, windows and the forecaster
//!
//! Every position lookup goes through a [`FeatureSchema`], so windowing
//! targets and rollout feedback always agree on which columns hold the
//! predicted quantities, whatever order the columns were loaded in.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const TEMPERATURE: &str = "temperature";
pub const WIND_SPEED: &str = "wind_speed";
pub const WIND_DIRECTION: &str = "wind_direction";
pub const CLOUD_COVER: &str = "cloud_cover";
pub const SOLAR: &str = "solar";
pub const WIND: &str = "wind";
pub const TOTAL_ENERGY: &str = "total_energy";
pub const DAY_AHEAD_PRICE: &str = "day_ahead_price";
pub const IMBALANCE_PRICE: &str = "imbalance_price";

/// How the forecaster treats a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureRole {
    /// Known ahead of time (weather, calendar); always read from the table
    Exogenous,
    /// Predicted by the model and fed back during rollout
    Target,
}

/// A named column of the observation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub role: FeatureRole,
}

impl Feature {
    pub fn exogenous(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FeatureRole::Exogenous,
        }
    }

    pub fn target(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FeatureRole::Target,
        }
    }
}

/// Ordered, validated list of features
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<Feature>,
    target_positions: Vec<usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty, duplicated or target-less layouts
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        if features.is_empty() {
            return Err(ForecastError::SchemaError(
                "Schema needs at least one feature".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for feature in &features {
            if feature.name.is_empty() {
                return Err(ForecastError::SchemaError(
                    "Feature names must not be empty".to_string(),
                ));
            }
            if !seen.insert(feature.name.as_str()) {
                return Err(ForecastError::SchemaError(format!(
                    "Duplicate feature '{}'",
                    feature.name
                )));
            }
        }

        let target_positions: Vec<usize> = features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.role == FeatureRole::Target)
            .map(|(i, _)| i)
            .collect();

        if target_positions.is_empty() {
            return Err(ForecastError::SchemaError(
                "Schema needs at least one target feature".to_string(),
            ));
        }

        Ok(Self {
            features,
            target_positions,
        })
    }

    /// Weather inputs followed by the five predicted energy and price columns
    pub fn energy_default() -> Self {
        Self {
            features: vec![
                Feature::exogenous(TEMPERATURE),
                Feature::exogenous(WIND_SPEED),
                Feature::exogenous(WIND_DIRECTION),
                Feature::exogenous(CLOUD_COVER),
                Feature::target(SOLAR),
                Feature::target(WIND),
                Feature::target(TOTAL_ENERGY),
                Feature::target(DAY_AHEAD_PRICE),
                Feature::target(IMBALANCE_PRICE),
            ],
            target_positions: vec![4, 5, 6, 7, 8],
        }
    }

    /// Append features to the end of the schema
    pub fn extended(&self, extra: Vec<Feature>) -> Result<Self> {
        let mut features = self.features.clone();
        features.extend(extra);
        Self::new(features)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Position of a feature by name
    pub fn position(&self, name: &str) -> Result<usize> {
        self.features
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| ForecastError::SchemaError(format!("Unknown feature '{}'", name)))
    }

    /// Positions of target features, in schema order
    pub fn target_positions(&self) -> &[usize] {
        &self.target_positions
    }

    pub fn target_count(&self) -> usize {
        self.target_positions.len()
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.target_positions
            .iter()
            .map(|&i| self.features[i].name.as_str())
            .collect()
    }

    /// Index of a target feature inside a target vector
    pub fn target_index(&self, name: &str) -> Result<usize> {
        let position = self.position(name)?;
        self.target_positions
            .iter()
            .position(|&p| p == position)
            .ok_or_else(|| {
                ForecastError::SchemaError(format!("Feature '{}' is not a target", name))
            })
    }

    /// Copy the target slice out of a full feature row
    pub fn extract_targets(&self, row: &[f64]) -> Vec<f64> {
        self.target_positions.iter().map(|&i| row[i]).collect()
    }

    /// Overwrite the target positions of a full feature row
    pub fn overwrite_targets(&self, row: &mut [f64], targets: &[f64]) -> Result<()> {
        if row.len() != self.len() {
            return Err(ForecastError::dimension("feature row", self.len(), row.len()));
        }
        if targets.len() != self.target_count() {
            return Err(ForecastError::dimension(
                "target vector",
                self.target_count(),
                targets.len(),
            ));
        }

        for (&position, &value) in self.target_positions.iter().zip(targets) {
            row[position] = value;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_schema_targets() {
        let schema = FeatureSchema::energy_default();

        assert_eq!(schema.len(), 9);
        assert_eq!(
            schema.target_names(),
            vec![SOLAR, WIND, TOTAL_ENERGY, DAY_AHEAD_PRICE, IMBALANCE_PRICE]
        );
        assert_eq!(schema.target_index(TOTAL_ENERGY).unwrap(), 2);
        assert!(schema.target_index(TEMPERATURE).is_err());
    }

    #[test]
    fn test_targets_follow_names_not_order() {
        let schema = FeatureSchema::new(vec![
            Feature::target("b"),
            Feature::exogenous("x"),
            Feature::target("a"),
        ])
        .unwrap();

        let row = [1.0, 2.0, 3.0];
        assert_eq!(schema.extract_targets(&row), vec![1.0, 3.0]);

        let mut row = row;
        schema.overwrite_targets(&mut row, &[9.0, 8.0]).unwrap();
        assert_eq!(row, [9.0, 2.0, 8.0]);
    }

    #[test]
    fn test_invalid_schemas() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(vec![Feature::exogenous("x")]).is_err());
        assert!(FeatureSchema::new(vec![Feature::target("x"), Feature::exogenous("x")]).is_err());
    }

    #[test]
    fn test_overwrite_rejects_wrong_width() {
        let schema = FeatureSchema::energy_default();
        let mut row = vec![0.0; schema.len()];

        let err = schema.overwrite_targets(&mut row, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ForecastError::DimensionMismatch { expected: 5, actual: 2, .. }));
    }
}
