//! Time-ordered observation tables

use crate::error::{ForecastError, Result};
use crate::schema::{Feature, FeatureSchema};
use chrono::{DateTime, Duration, TimeZone, Utc};
use polars::prelude::*;
use std::ops::Range;

/// Name of the timestamp column used when exporting tables
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Cadence of the half-hourly settlement periods
pub const DEFAULT_CADENCE_MINUTES: i64 = 30;

/// Timestamped rows of features laid out according to a [`FeatureSchema`]
///
/// Invariants checked at construction: every row has one finite value per
/// schema feature, timestamps are strictly increasing and consecutive rows
/// are exactly one cadence apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    schema: FeatureSchema,
    timestamps: Vec<DateTime<Utc>>,
    rows: Vec<Vec<f64>>,
    cadence: Duration,
}

impl ObservationTable {
    /// Create a table with the default 30 minute cadence
    pub fn new(
        schema: FeatureSchema,
        timestamps: Vec<DateTime<Utc>>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        Self::with_cadence(
            schema,
            timestamps,
            rows,
            Duration::minutes(DEFAULT_CADENCE_MINUTES),
        )
    }

    /// Create a table with an explicit cadence between rows
    pub fn with_cadence(
        schema: FeatureSchema,
        timestamps: Vec<DateTime<Utc>>,
        rows: Vec<Vec<f64>>,
        cadence: Duration,
    ) -> Result<Self> {
        if cadence <= Duration::zero() {
            return Err(ForecastError::InvalidParameter(
                "Cadence must be positive".to_string(),
            ));
        }

        if timestamps.len() != rows.len() {
            return Err(ForecastError::DataError(format!(
                "Got {} timestamps for {} rows",
                timestamps.len(),
                rows.len()
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(ForecastError::dimension(
                    format!("row {}", i),
                    schema.len(),
                    row.len(),
                ));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(ForecastError::DataError(format!(
                    "Non-finite value in row {} for feature '{}'",
                    i,
                    schema.features()[j].name
                )));
            }
        }

        for pair in timestamps.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ForecastError::DataError(format!(
                    "Timestamps must be unique and increasing, {} follows {}",
                    pair[1], pair[0]
                )));
            }
            if pair[1] - pair[0] != cadence {
                return Err(ForecastError::DataError(format!(
                    "Gap between {} and {} does not match the {} minute cadence",
                    pair[0],
                    pair[1],
                    cadence.num_minutes()
                )));
            }
        }

        Ok(Self {
            schema,
            timestamps,
            rows,
            cadence,
        })
    }

    /// Build a table from a DataFrame holding a time column plus one column per schema feature
    ///
    /// The time column may be a `Datetime` or an `Int64` of epoch milliseconds.
    /// Rows with missing values must be dropped before calling this.
    pub fn from_dataframe(
        df: &DataFrame,
        schema: FeatureSchema,
        time_column: &str,
        cadence: Duration,
    ) -> Result<Self> {
        let time_series = df.column(time_column).map_err(|e| {
            ForecastError::DataError(format!("Time column '{}' not found: {}", time_column, e))
        })?;

        if time_series.null_count() > 0 {
            return Err(ForecastError::DataError(format!(
                "Time column '{}' contains missing values",
                time_column
            )));
        }

        let millis: Vec<i64> = match time_series.dtype() {
            DataType::Datetime(_, tz) => time_series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, tz.clone()))?
                .cast(&DataType::Int64)?
                .i64()?
                .into_no_null_iter()
                .collect(),
            DataType::Int64 => time_series.i64()?.into_no_null_iter().collect(),
            other => {
                return Err(ForecastError::DataError(format!(
                    "Time column '{}' has unsupported type {}",
                    time_column, other
                )))
            }
        };

        let timestamps = millis
            .into_iter()
            .map(|ms| {
                Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
                    ForecastError::DataError(format!("Timestamp {} ms is out of range", ms))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = Vec::with_capacity(schema.len());
        for feature in schema.features() {
            let series = df.column(&feature.name).map_err(|_| {
                ForecastError::SchemaError(format!("Column '{}' not found", feature.name))
            })?;
            let values = series.cast(&DataType::Float64)?;
            if values.null_count() > 0 {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' contains missing or non-numeric values",
                    feature.name
                )));
            }
            columns.push(values.f64()?.into_no_null_iter().collect::<Vec<f64>>());
        }

        let rows = (0..timestamps.len())
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();

        Self::with_cadence(schema, timestamps, rows, cadence)
    }

    /// Export the table as a DataFrame with a millisecond `timestamp` column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.schema.len() + 1);
        columns.push(timestamp_series(&self.timestamps)?);

        for (i, name) in self.schema.names().into_iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|r| r[i]).collect();
            columns.push(Series::new(name, values));
        }

        Ok(DataFrame::new(columns)?)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index of an exact timestamp
    pub fn row_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.timestamps.binary_search(&timestamp).ok()
    }

    /// All values of one feature
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let position = self.schema.position(name)?;
        Ok(self.rows.iter().map(|r| r[position]).collect())
    }

    /// Target slice of a row
    pub fn targets(&self, index: usize) -> Option<Vec<f64>> {
        self.row(index).map(|r| self.schema.extract_targets(r))
    }

    /// Sub-table over a row range
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.len() {
            return Err(ForecastError::InvalidRange(format!(
                "Slice {}..{} out of bounds for {} rows",
                range.start,
                range.end,
                self.len()
            )));
        }

        Ok(Self {
            schema: self.schema.clone(),
            timestamps: self.timestamps[range.clone()].to_vec(),
            rows: self.rows[range].to_vec(),
            cadence: self.cadence,
        })
    }

    /// New table with extra feature columns appended to every row
    pub fn append_features(&self, features: Vec<Feature>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if features.len() != columns.len() {
            return Err(ForecastError::dimension(
                "appended columns",
                features.len(),
                columns.len(),
            ));
        }
        if let Some(column) = columns.iter().find(|c| c.len() != self.len()) {
            return Err(ForecastError::dimension(
                "appended column length",
                self.len(),
                column.len(),
            ));
        }

        let schema = self.schema.extended(features)?;
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut row = row.clone();
                row.extend(columns.iter().map(|c| c[i]));
                row
            })
            .collect();

        Self::with_cadence(schema, self.timestamps.clone(), rows, self.cadence)
    }

    /// Same timestamps and schema with replaced row values
    pub(crate) fn with_rows(&self, rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::with_cadence(
            self.schema.clone(),
            self.timestamps.clone(),
            rows,
            self.cadence,
        )
    }
}

pub(crate) fn timestamp_series(timestamps: &[DateTime<Utc>]) -> Result<Series> {
    let millis: Vec<i64> = timestamps.iter().map(|t| t.timestamp_millis()).collect();
    Ok(Series::new(TIMESTAMP_COLUMN, millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}
