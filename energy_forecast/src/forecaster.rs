//! Iterative multi-step forecasting with prediction feedback
//!
//! A run walks through five phases:
//!
//! 1. **Reset** - take a fresh recurrent state from the model.
//! 2. **Warmup** - replay every true row before the first forecast step,
//!    discarding outputs. May be empty when forecasting from the first row.
//! 3. **Seed** - step the true row at the first forecast timestamp.
//! 4. **Rollout** - for each later step, feed the known exogenous features of
//!    that row together with the previous step's predicted targets.
//! 5. **Finalize** - attach timestamps and invert the standardization.
//!
//! The state is owned by the run and dropped when it ends, so repeated or
//! parallel runs over the same model never see each other's memory.

use crate::data::{timestamp_series, ObservationTable};
use crate::error::{ForecastError, Result};
use crate::models::SequenceModel;
use crate::standardize::StandardizationMap;
use chrono::{DateTime, Duration, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Phase of a forecast run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastPhase {
    Reset,
    Warmup,
    Seed,
    Rollout,
    Finalize,
}

/// Forecasted target values in original units, one row per timestep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    target_names: Vec<String>,
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<Vec<f64>>,
    warmup_steps: usize,
}

impl ForecastTable {
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Rows of target values, in target order
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// True rows replayed before the first forecast step
    pub fn warmup_steps(&self) -> usize {
        self.warmup_steps
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All forecast values of one target
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self
            .target_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ForecastError::SchemaError(format!("Unknown target '{}'", name)))?;
        Ok(self.values.iter().map(|row| row[index]).collect())
    }

    /// Export with a `timestamp` column followed by one column per target
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.target_names.len() + 1);
        columns.push(timestamp_series(&self.timestamps)?);

        for (i, name) in self.target_names.iter().enumerate() {
            let values: Vec<f64> = self.values.iter().map(|r| r[i]).collect();
            columns.push(Series::new(name.as_str(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append the rows of a later run
    fn extend(&mut self, other: ForecastTable) {
        self.timestamps.extend(other.timestamps);
        self.values.extend(other.values);
    }
}

/// Number of rows in one day at the given cadence
///
/// Fails unless the cadence divides a day exactly, since daily runs must
/// start on a row of the table.
pub fn steps_per_day(cadence: Duration) -> Result<usize> {
    let cadence_ms = cadence.num_milliseconds();
    let day_ms = Duration::days(1).num_milliseconds();
    if cadence_ms <= 0 || day_ms % cadence_ms != 0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Cadence of {} ms does not divide a day evenly",
            cadence_ms
        )));
    }
    Ok((day_ms / cadence_ms) as usize)
}

/// Runs feedback forecasts of a trained model over standardized tables
#[derive(Debug)]
pub struct IterativeForecaster<'a, M: SequenceModel> {
    model: &'a M,
    standardization: &'a StandardizationMap,
}

impl<'a, M: SequenceModel> IterativeForecaster<'a, M> {
    pub fn new(model: &'a M, standardization: &'a StandardizationMap) -> Self {
        Self {
            model,
            standardization,
        }
    }

    /// Forecast every timestep in `[first, last]`, both ends inclusive
    ///
    /// `table` must be standardized and contain every row up to `last`; the
    /// exogenous features of the forecast rows are taken as known.
    pub fn forecast(
        &self,
        table: &ObservationTable,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    ) -> Result<ForecastTable> {
        if last < first {
            return Err(ForecastError::InvalidRange(format!(
                "Last forecast step {} precedes first step {}",
                last, first
            )));
        }
        let first_index = table.row_of(first).ok_or_else(|| {
            ForecastError::InvalidRange(format!("First forecast step {} is not in the table", first))
        })?;
        let last_index = table.row_of(last).ok_or_else(|| {
            ForecastError::InvalidRange(format!("Last forecast step {} is not in the table", last))
        })?;

        let schema = table.schema();
        if self.model.input_width() != schema.len() {
            return Err(ForecastError::dimension(
                "model input",
                schema.len(),
                self.model.input_width(),
            ));
        }
        if self.model.output_width() != schema.target_count() {
            return Err(ForecastError::dimension(
                "model output",
                schema.target_count(),
                self.model.output_width(),
            ));
        }

        let rows = table.rows();
        let timestamps = table.timestamps();

        debug!(phase = ?ForecastPhase::Reset, model = self.model.name(), "starting forecast run");
        let mut state = self.model.initial_state();

        debug!(phase = ?ForecastPhase::Warmup, steps = first_index, "replaying history");
        if first_index == 0 {
            warn!(%first, "forecast starts at the first row, warmup is empty");
        }
        for (index, row) in rows[..first_index].iter().enumerate() {
            self.checked_step(
                &mut state,
                row,
                ForecastPhase::Warmup,
                index,
                timestamps[index],
            )?;
        }

        debug!(phase = ?ForecastPhase::Seed, %first, "seeding with observed row");
        let mut predictions = Vec::with_capacity(last_index - first_index + 1);
        let seed = self.checked_step(
            &mut state,
            &rows[first_index],
            ForecastPhase::Seed,
            first_index,
            first,
        )?;
        predictions.push(seed);

        debug!(
            phase = ?ForecastPhase::Rollout,
            steps = last_index - first_index,
            "feeding back predictions"
        );
        for index in first_index + 1..=last_index {
            let mut input = rows[index].clone();
            if let Some(previous) = predictions.last() {
                schema.overwrite_targets(&mut input, previous)?;
            }
            let prediction = self.checked_step(
                &mut state,
                &input,
                ForecastPhase::Rollout,
                index,
                timestamps[index],
            )?;
            predictions.push(prediction);
        }

        debug!(phase = ?ForecastPhase::Finalize, "inverting standardization");
        let values = predictions
            .iter()
            .map(|p| self.standardization.invert_targets(schema, p))
            .collect::<Result<Vec<_>>>()?;

        info!(
            %first,
            %last,
            warmup_steps = first_index,
            forecast_steps = values.len(),
            "forecast run complete"
        );

        Ok(ForecastTable {
            target_names: schema.target_names().into_iter().map(String::from).collect(),
            timestamps: timestamps[first_index..=last_index].to_vec(),
            values,
            warmup_steps: first_index,
        })
    }

    /// Forecast `steps` consecutive timesteps starting at `first`
    pub fn forecast_horizon(
        &self,
        table: &ObservationTable,
        first: DateTime<Utc>,
        steps: usize,
    ) -> Result<ForecastTable> {
        if steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least one step".to_string(),
            ));
        }
        let last = i64::try_from(steps - 1)
            .ok()
            .and_then(|n| table.cadence().num_milliseconds().checked_mul(n))
            .and_then(|ms| first.checked_add_signed(Duration::milliseconds(ms)))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Forecast horizon of {} steps overflows the time range",
                    steps
                ))
            })?;
        self.forecast(table, first, last)
    }

    /// Independent day-long runs for `days` consecutive days from `first`
    ///
    /// Each run starts from a fresh state and replays the true history up to
    /// its own first step, so errors never carry from one day into the next.
    pub fn forecast_days(
        &self,
        table: &ObservationTable,
        first: DateTime<Utc>,
        days: usize,
    ) -> Result<ForecastTable> {
        let steps = steps_per_day(table.cadence())?;
        self.forecast_runs(table, first, days, steps)
    }

    /// `runs` independent back-to-back runs of `steps_per_run` steps each
    pub fn forecast_runs(
        &self,
        table: &ObservationTable,
        first: DateTime<Utc>,
        runs: usize,
        steps_per_run: usize,
    ) -> Result<ForecastTable> {
        if runs == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of runs must be at least one".to_string(),
            ));
        }

        let mut combined = self.forecast_horizon(table, first, steps_per_run)?;
        for _ in 1..runs {
            let start = combined
                .timestamps
                .last()
                .map(|&t| t + table.cadence())
                .ok_or_else(|| ForecastError::InsufficientData("Empty forecast run".to_string()))?;
            combined.extend(self.forecast_horizon(table, start, steps_per_run)?);
        }

        Ok(combined)
    }

    fn checked_step(
        &self,
        state: &mut M::State,
        input: &[f64],
        phase: ForecastPhase,
        step: usize,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<f64>> {
        let output = self.model.step(state, input)?;

        if output.len() != self.model.output_width() {
            return Err(ForecastError::dimension(
                "model output",
                self.model.output_width(),
                output.len(),
            ));
        }
        if output.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NumericalInstability {
                step,
                timestamp: Some(timestamp),
                detail: format!("{} produced {:?} during {:?}", self.model.name(), output, phase),
            });
        }

        Ok(output)
    }
}
