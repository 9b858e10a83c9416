//! # Energy Owl
//!
//! Workspace facade bundling the energy forecasting crates.
//!
//! ## Example
//!
//! ```
//! use energy_owl_workspace::forecast::schema::FeatureSchema;
//! use energy_owl_workspace::math::UnitRangeScaler;
//!
//! let schema = FeatureSchema::energy_default();
//! assert_eq!(schema.target_count(), 5);
//!
//! let scaler = UnitRangeScaler::fit(&[10.0, 30.0]).unwrap();
//! assert_eq!(scaler.apply(20.0), 0.5);
//! ```

pub use energy_forecast as forecast;
pub use energy_math as math;

/// Default horizon of a day-ahead forecast in half-hour steps
pub const DAY_AHEAD_STEPS: usize = 48;
