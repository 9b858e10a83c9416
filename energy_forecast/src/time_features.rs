//! Cyclic calendar encoding
//!
//! Time of day and day of year are periodic, so each is encoded as a
//! sine/cosine pair. Midnight and 23:30 end up close together instead of at
//! opposite ends of a linear scale.

use crate::data::ObservationTable;
use crate::error::Result;
use crate::schema::Feature;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::TAU;

pub const HOUR_SIN: &str = "hour_sin";
pub const HOUR_COS: &str = "hour_cos";
pub const DAY_OF_YEAR_SIN: &str = "doy_sin";
pub const DAY_OF_YEAR_COS: &str = "doy_cos";

const MINUTES_PER_DAY: f64 = 1440.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Sine/cosine encoding of a timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclicTime {
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub day_of_year_sin: f64,
    pub day_of_year_cos: f64,
}

impl CyclicTime {
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        let minute_of_day = (timestamp.hour() * 60 + timestamp.minute()) as f64;
        let day_phase = TAU * minute_of_day / MINUTES_PER_DAY;
        let year_phase = TAU * timestamp.ordinal0() as f64 / DAYS_PER_YEAR;

        Self {
            hour_sin: day_phase.sin(),
            hour_cos: day_phase.cos(),
            day_of_year_sin: year_phase.sin(),
            day_of_year_cos: year_phase.cos(),
        }
    }
}

/// Append the four cyclic time features as exogenous columns
pub fn with_cyclic_time(table: &ObservationTable) -> Result<ObservationTable> {
    let encoded: Vec<CyclicTime> = table
        .timestamps()
        .iter()
        .map(|&t| CyclicTime::from_timestamp(t))
        .collect();

    let columns = vec![
        encoded.iter().map(|c| c.hour_sin).collect(),
        encoded.iter().map(|c| c.hour_cos).collect(),
        encoded.iter().map(|c| c.day_of_year_sin).collect(),
        encoded.iter().map(|c| c.day_of_year_cos).collect(),
    ];

    table.append_features(
        vec![
            Feature::exogenous(HOUR_SIN),
            Feature::exogenous(HOUR_COS),
            Feature::exogenous(DAY_OF_YEAR_SIN),
            Feature::exogenous(DAY_OF_YEAR_COS),
        ],
        columns,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn test_midnight_and_noon() {
        let midnight = CyclicTime::from_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_abs_diff_eq!(midnight.hour_sin, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(midnight.hour_cos, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(midnight.day_of_year_sin, 0.0, epsilon = 1e-12);

        let noon = CyclicTime::from_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        assert_abs_diff_eq!(noon.hour_cos, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_late_evening_is_close_to_midnight() {
        let late = CyclicTime::from_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap());
        assert!(late.hour_cos > 0.99);
    }
}
