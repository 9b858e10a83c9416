//! Per-feature unit-range standardization
//!
//! The map is fit once (usually on the training rows only) and then applied
//! to every table the model sees. Forecasts leave the model in scaled units
//! and are inverted back through the same map.

use crate::data::ObservationTable;
use crate::error::{ForecastError, Result};
use crate::schema::FeatureSchema;
use energy_math::UnitRangeScaler;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, warn};

/// One fitted [`UnitRangeScaler`] per feature name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationMap {
    transforms: Vec<(String, UnitRangeScaler)>,
}

impl StandardizationMap {
    /// Fit on every row of the table
    pub fn fit(table: &ObservationTable) -> Result<Self> {
        Self::fit_rows(table, 0..table.len())
    }

    /// Fit on a row range, typically the training portion
    pub fn fit_rows(table: &ObservationTable, rows: Range<usize>) -> Result<Self> {
        if rows.start >= rows.end || rows.end > table.len() {
            return Err(ForecastError::InvalidRange(format!(
                "Cannot fit standardization on rows {}..{} of a {} row table",
                rows.start,
                rows.end,
                table.len()
            )));
        }

        let fitted = table.slice(rows)?;
        let mut transforms = Vec::with_capacity(table.schema().len());
        for name in table.schema().names() {
            let scaler = UnitRangeScaler::fit(&fitted.column(name)?)?;
            if scaler.is_constant() {
                warn!(feature = name, value = scaler.min(), "constant feature, scaling by shift only");
            }
            transforms.push((name.to_string(), scaler));
        }

        debug!(features = transforms.len(), rows = fitted.len(), "fitted standardization map");
        Ok(Self { transforms })
    }

    pub fn get(&self, name: &str) -> Option<&UnitRangeScaler> {
        self.transforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, scaler)| scaler)
    }

    fn scaler(&self, name: &str) -> Result<&UnitRangeScaler> {
        self.get(name).ok_or_else(|| {
            ForecastError::SchemaError(format!("No standardization fitted for '{}'", name))
        })
    }

    fn scalers_for(&self, schema: &FeatureSchema) -> Result<Vec<&UnitRangeScaler>> {
        schema.names().into_iter().map(|n| self.scaler(n)).collect()
    }

    /// Standardize every feature of a table
    pub fn apply(&self, table: &ObservationTable) -> Result<ObservationTable> {
        let scalers = self.scalers_for(table.schema())?;
        let rows = table
            .rows()
            .iter()
            .map(|row| row.iter().zip(&scalers).map(|(&v, s)| s.apply(v)).collect())
            .collect();
        table.with_rows(rows)
    }

    /// Bring a standardized table back to original units
    pub fn invert(&self, table: &ObservationTable) -> Result<ObservationTable> {
        let scalers = self.scalers_for(table.schema())?;
        let rows = table
            .rows()
            .iter()
            .map(|row| row.iter().zip(&scalers).map(|(&v, s)| s.invert(v)).collect())
            .collect();
        table.with_rows(rows)
    }

    /// Standardize a single value of a feature
    pub fn apply_value(&self, name: &str, value: f64) -> Result<f64> {
        Ok(self.scaler(name)?.apply(value))
    }

    /// Invert a single standardized value of a feature
    pub fn invert_value(&self, name: &str, value: f64) -> Result<f64> {
        Ok(self.scaler(name)?.invert(value))
    }

    /// Invert a model output laid out as the schema's target vector
    pub fn invert_targets(&self, schema: &FeatureSchema, targets: &[f64]) -> Result<Vec<f64>> {
        if targets.len() != schema.target_count() {
            return Err(ForecastError::dimension(
                "target vector",
                schema.target_count(),
                targets.len(),
            ));
        }

        schema
            .target_names()
            .into_iter()
            .zip(targets)
            .map(|(name, &v)| self.invert_value(name, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Feature;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn table() -> ObservationTable {
        let schema =
            FeatureSchema::new(vec![Feature::exogenous("x"), Feature::target("y")]).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let stamps = (0..5).map(|i| start + Duration::minutes(30 * i)).collect();
        let rows = (0..5)
            .map(|i| vec![i as f64 * 2.0 - 3.0, 100.0 + 25.0 * i as f64])
            .collect();
        ObservationTable::new(schema, stamps, rows).unwrap()
    }

    #[test]
    fn test_apply_to_unit_range() {
        let table = table();
        let map = StandardizationMap::fit(&table).unwrap();
        let scaled = map.apply(&table).unwrap();

        assert_eq!(scaled.row(0).unwrap(), &[0.0, 0.0]);
        assert_eq!(scaled.row(4).unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn test_round_trip_table() {
        let table = table();
        let map = StandardizationMap::fit(&table).unwrap();
        let restored = map.invert(&map.apply(&table).unwrap()).unwrap();

        for (a, b) in table.rows().iter().zip(restored.rows()) {
            for (x, y) in a.iter().zip(b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_fit_on_training_rows_only() {
        let table = table();
        let map = StandardizationMap::fit_rows(&table, 0..3).unwrap();

        // Later rows fall outside the fitted range.
        assert!(map.apply_value("y", table.row(4).unwrap()[1]).unwrap() > 1.0);
        assert_relative_eq!(map.invert_targets(table.schema(), &[1.0]).unwrap()[0], 150.0);
    }

    #[test]
    fn test_missing_feature_is_schema_error() {
        let map = StandardizationMap::fit(&table()).unwrap();
        assert!(matches!(
            map.invert_value("z", 0.5),
            Err(ForecastError::SchemaError(_))
        ));
        assert!(StandardizationMap::fit_rows(&table(), 3..3).is_err());
    }
}
