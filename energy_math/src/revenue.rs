//! Imbalance-penalized trading revenue
//!
//! A producer sells its forecast `P` on the day-ahead market at price `DAP`.
//! The difference between actual production `A` and the sold amount is
//! settled at the imbalance price `SSP`, minus a quadratic penalty.

use crate::{MathError, Result};

/// Imbalance penalty coefficient applied to the squared deviation
pub const DEFAULT_IMBALANCE_PENALTY: f64 = 0.07;

/// Revenue for a single settlement period:
/// `P*DAP + (A - P) * (SSP - k*(A - P))`
pub fn revenue(
    predicted: f64,
    day_ahead_price: f64,
    actual: f64,
    imbalance_price: f64,
    penalty: f64,
) -> f64 {
    let deviation = actual - predicted;
    predicted * day_ahead_price + deviation * (imbalance_price - penalty * deviation)
}

/// Per-period revenue over aligned series
pub fn revenue_series(
    predicted: &[f64],
    day_ahead_price: &[f64],
    actual: &[f64],
    imbalance_price: &[f64],
    penalty: f64,
) -> Result<Vec<f64>> {
    let n = predicted.len();
    if day_ahead_price.len() != n || actual.len() != n || imbalance_price.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Revenue inputs must have equal lengths, got {}, {}, {}, {}",
            n,
            day_ahead_price.len(),
            actual.len(),
            imbalance_price.len()
        )));
    }

    if !penalty.is_finite() || penalty < 0.0 {
        return Err(MathError::InvalidInput(format!(
            "Imbalance penalty must be a non-negative finite number, got {}",
            penalty
        )));
    }

    Ok((0..n)
        .map(|i| {
            revenue(
                predicted[i],
                day_ahead_price[i],
                actual[i],
                imbalance_price[i],
                penalty,
            )
        })
        .collect())
}
