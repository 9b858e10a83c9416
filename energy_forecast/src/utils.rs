//! Utility functions for the energy_forecast crate

use crate::error::{ForecastError, Result};
use std::ops::Range;

/// Split `len` time-ordered rows into training and test row ranges
pub fn train_test_split(len: usize, test_ratio: f64) -> (Range<usize>, Range<usize>) {
    if len == 0 || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return (0..len, len..len);
    }

    let test_size = (len as f64 * test_ratio).round() as usize;
    let train_size = len - test_size;

    (0..train_size, train_size..len)
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    // Mean Absolute Error
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    // Mean Squared Error
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let rmse = mse.sqrt();

    // Symmetric Mean Absolute Percentage Error; solar output is zero at night
    // so the plain percentage error is not defined for most rows.
    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let abs_a = a.abs();
            let abs_f = f.abs();
            if abs_a + abs_f == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / (abs_a + abs_f)
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
