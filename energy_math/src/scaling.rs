//! Invertible min-max scaling
//!
//! A [`UnitRangeScaler`] is fit once on a column of observations and maps
//! values linearly onto a target range (`[0, 1]` by default). The mapping is
//! kept invertible for every fitted column, including constant ones.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Linear min-max transform fitted on a single feature column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRangeScaler {
    min: f64,
    max: f64,
    low: f64,
    high: f64,
}

impl UnitRangeScaler {
    /// Fit a scaler mapping the observed `[min, max]` of `values` onto `[0, 1]`
    pub fn fit(values: &[f64]) -> Result<Self> {
        Self::fit_to_range(values, 0.0, 1.0)
    }

    /// Fit a scaler mapping the observed `[min, max]` of `values` onto `[low, high]`
    pub fn fit_to_range(values: &[f64], low: f64, high: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty column".to_string(),
            ));
        }

        if !(low.is_finite() && high.is_finite()) || low >= high {
            return Err(MathError::InvalidInput(format!(
                "Target range must be finite with low < high, got [{}, {}]",
                low, high
            )));
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in values {
            if !value.is_finite() {
                return Err(MathError::InvalidInput(format!(
                    "Cannot fit a scaler on non-finite value {}",
                    value
                )));
            }
            min = min.min(value);
            max = max.max(value);
        }

        Ok(Self {
            min,
            max,
            low,
            high,
        })
    }

    /// Smallest value seen while fitting
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value seen while fitting
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether the fitted column had a single distinct value
    pub fn is_constant(&self) -> bool {
        self.max == self.min
    }

    /// Map an original-unit value into the scaled range
    pub fn apply(&self, value: f64) -> f64 {
        // Constant columns are only shifted so that the transform stays invertible.
        if self.is_constant() {
            return self.low + (value - self.min);
        }

        self.low + (value - self.min) * (self.high - self.low) / (self.max - self.min)
    }

    /// Map a scaled value back into original units
    pub fn invert(&self, value: f64) -> f64 {
        if self.is_constant() {
            return self.min + (value - self.low);
        }

        self.min + (value - self.low) * (self.max - self.min) / (self.high - self.low)
    }

    /// Apply the transform to every value of a slice
    pub fn apply_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.apply(v)).collect()
    }

    /// Invert the transform for every value of a slice
    pub fn invert_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.invert(v)).collect()
    }
}
