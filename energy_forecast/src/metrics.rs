//! Evaluation of forecasts against ground truth
//!
//! Forecast rows are joined to the observed table by timestamp. Revenue uses
//! the forecast `total_energy` as the day-ahead bid and the observed energy
//! and prices for settlement.

use crate::data::ObservationTable;
use crate::error::{ForecastError, Result};
use crate::forecaster::ForecastTable;
use crate::schema::{DAY_AHEAD_PRICE, IMBALANCE_PRICE, TOTAL_ENERGY};
use crate::utils::{forecast_accuracy, ForecastAccuracy};
use chrono::{DateTime, NaiveDate, Utc};
use energy_math::revenue::revenue_series;
use energy_math::RiskSummary;
use std::collections::BTreeMap;

/// Row indices of the observed table matching each forecast timestamp
fn aligned_rows(forecast: &ForecastTable, actual: &ObservationTable) -> Result<Vec<usize>> {
    forecast
        .timestamps()
        .iter()
        .map(|&t| {
            actual.row_of(t).ok_or_else(|| {
                ForecastError::DataError(format!("No observation at forecast timestamp {}", t))
            })
        })
        .collect()
}

fn observed(actual: &ObservationTable, name: &str, rows: &[usize]) -> Result<Vec<f64>> {
    let column = actual.column(name)?;
    Ok(rows.iter().map(|&i| column[i]).collect())
}

/// Per-period revenue of the forecast bid and of a perfect-information bid
#[derive(Debug, Clone)]
pub struct RevenueEvaluation {
    pub timestamps: Vec<DateTime<Utc>>,
    /// Revenue when bidding the forecast total energy
    pub forecast_revenue: Vec<f64>,
    /// Revenue when bidding the energy actually produced
    pub perfect_revenue: Vec<f64>,
    pub forecast_risk: RiskSummary,
    pub perfect_risk: RiskSummary,
}

impl RevenueEvaluation {
    /// Revenue given up relative to perfect information
    pub fn revenue_loss(&self) -> f64 {
        self.perfect_risk.total - self.forecast_risk.total
    }

    /// Forecast revenue summed per calendar day (UTC)
    pub fn daily_totals(&self) -> Vec<(NaiveDate, f64)> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (t, r) in self.timestamps.iter().zip(&self.forecast_revenue) {
            *totals.entry(t.date_naive()).or_default() += r;
        }
        totals.into_iter().collect()
    }
}

impl std::fmt::Display for RevenueEvaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast bid ({} periods)", self.forecast_revenue.len())?;
        write!(f, "{}", self.forecast_risk)?;
        writeln!(f, "Perfect-information bid")?;
        write!(f, "{}", self.perfect_risk)?;
        writeln!(f, "Revenue loss: {:.2}", self.revenue_loss())?;
        Ok(())
    }
}

/// Settle the forecast total energy against observed production and prices
pub fn evaluate_revenue(
    forecast: &ForecastTable,
    actual: &ObservationTable,
    imbalance_penalty: f64,
    alpha: f64,
) -> Result<RevenueEvaluation> {
    if forecast.is_empty() {
        return Err(ForecastError::InsufficientData(
            "Cannot evaluate an empty forecast".to_string(),
        ));
    }

    let rows = aligned_rows(forecast, actual)?;
    let predicted = forecast.column(TOTAL_ENERGY)?;
    let produced = observed(actual, TOTAL_ENERGY, &rows)?;
    let day_ahead = observed(actual, DAY_AHEAD_PRICE, &rows)?;
    let imbalance = observed(actual, IMBALANCE_PRICE, &rows)?;

    let forecast_revenue =
        revenue_series(&predicted, &day_ahead, &produced, &imbalance, imbalance_penalty)?;
    let perfect_revenue =
        revenue_series(&produced, &day_ahead, &produced, &imbalance, imbalance_penalty)?;

    Ok(RevenueEvaluation {
        timestamps: forecast.timestamps().to_vec(),
        forecast_risk: RiskSummary::from_values(&forecast_revenue, alpha)?,
        perfect_risk: RiskSummary::from_values(&perfect_revenue, alpha)?,
        forecast_revenue,
        perfect_revenue,
    })
}

/// Accuracy of every forecast target against the observed values
pub fn evaluate_accuracy(
    forecast: &ForecastTable,
    actual: &ObservationTable,
) -> Result<Vec<(String, ForecastAccuracy)>> {
    let rows = aligned_rows(forecast, actual)?;

    forecast
        .target_names()
        .iter()
        .map(|name| {
            let predicted = forecast.column(name)?;
            let observed = observed(actual, name, &rows)?;
            Ok((name.clone(), forecast_accuracy(&predicted, &observed)?))
        })
        .collect()
}
