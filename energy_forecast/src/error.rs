//! Error types for the energy_forecast crate

use chrono::{DateTime, Utc};
use energy_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the energy_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Forecast start/end could not be resolved against the table
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Not enough observations for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model widths disagree with the feature schema
    #[error("Dimension mismatch: expected {expected} values for {context}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A model produced a non-finite value
    #[error("Numerical instability at step {step}: {detail}")]
    NumericalInstability {
        step: usize,
        timestamp: Option<DateTime<Utc>>,
        detail: String,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Unknown or duplicated feature names
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid pipeline or training configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from scaling, revenue or risk math
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        ForecastError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}
