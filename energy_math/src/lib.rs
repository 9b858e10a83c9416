//! # Energy Math
//!
//! Numeric building blocks for energy forecasting and trading evaluation.
//! This crate provides the invertible unit-range scaling used to standardize
//! features, the imbalance-penalized revenue formula and tail-risk
//! statistics (VaR / CVaR) over revenue series.

use thiserror::Error;

pub mod revenue;
pub mod risk;
pub mod scaling;

pub use revenue::{revenue, revenue_series, DEFAULT_IMBALANCE_PENALTY};
pub use risk::{conditional_value_at_risk, value_at_risk, RiskSummary};
pub use scaling::UnitRangeScaler;

/// Errors that can occur in scaling, revenue and risk calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for energy math operations
pub type Result<T> = std::result::Result<T, MathError>;
