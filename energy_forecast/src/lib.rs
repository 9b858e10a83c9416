//! # Energy Forecast
//!
//! A Rust library for next-day forecasting of energy production and prices
//! with recurrent sequence models.
//!
//! ## Features
//!
//! - Time-ordered observation tables with an explicit named feature schema
//! - Cyclic time-of-day / day-of-year encoding
//! - Invertible per-feature unit-range standardization
//! - Sliding-window batching for many-to-one training
//! - Iterative forecasting that feeds predictions back as inputs
//! - Revenue and CVaR evaluation of the forecast as a day-ahead bid
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{TimeZone, Utc};
//! use energy_forecast::models::PersistenceModel;
//! use energy_forecast::{build_windows, IterativeForecaster, StandardizationMap};
//!
//! let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
//! let raw = energy_forecast::synthetic::energy_table(start, 480, 1)?;
//!
//! // Fit scaling on the data and build training windows
//! let map = StandardizationMap::fit(&raw)?;
//! let scaled = map.apply(&raw)?;
//! let pairs = build_windows(&scaled, 32)?;
//!
//! // Forecast one day with a baseline model
//! let model = PersistenceModel::new(scaled.schema().clone());
//! let forecaster = IterativeForecaster::new(&model, &map);
//! let forecast = forecaster.forecast_horizon(&scaled, scaled.timestamps()[432], 48)?;
//! # Ok::<(), energy_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod standardize;
pub mod synthetic;
pub mod time_features;
pub mod utils;
pub mod windowing;

// Re-export commonly used types
pub use crate::config::{PipelineConfig, TrainingConfig};
pub use crate::data::ObservationTable;
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{steps_per_day, ForecastPhase, ForecastTable, IterativeForecaster};
pub use crate::models::{SequenceModel, TrainableModel};
pub use crate::schema::{Feature, FeatureRole, FeatureSchema};
pub use crate::standardize::StandardizationMap;
pub use crate::windowing::{build_windows, WindowBatch, WindowPair};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
