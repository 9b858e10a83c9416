//! Synthetic half-hourly weather, generation and price data
//!
//! Produces tables in the default energy schema with a daily solar cycle,
//! slowly varying wind and noisy prices. Used by the demo binary and tests.

use crate::data::ObservationTable;
use crate::error::{ForecastError, Result};
use crate::schema::FeatureSchema;
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

const SOLAR_CAPACITY_MW: f64 = 120.0;
const WIND_CAPACITY_MW: f64 = 400.0;

/// Generate `rows` half-hourly observations starting at `start`
pub fn energy_table(start: DateTime<Utc>, rows: usize, seed: u64) -> Result<ObservationTable> {
    energy_table_with_cadence(start, rows, Duration::minutes(30), seed)
}

/// Generate `rows` observations spaced `cadence` apart
pub fn energy_table_with_cadence(
    start: DateTime<Utc>,
    rows: usize,
    cadence: Duration,
    seed: u64,
) -> Result<ObservationTable> {
    if cadence <= Duration::zero() {
        return Err(ForecastError::InvalidParameter(
            "Cadence must be positive".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidParameter(format!("Noise distribution: {}", e)))?;

    let mut timestamps = Vec::with_capacity(rows);
    let mut values = Vec::with_capacity(rows);
    let mut wind_speed: f64 = 8.0;

    for i in 0..rows {
        let timestamp = start + cadence * i as i32;
        let hour = timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0;

        let temperature = 10.0 + 6.0 * (PI * (hour - 9.0) / 12.0).sin() + noise.sample(&mut rng);
        wind_speed = (wind_speed + 0.4 * noise.sample(&mut rng)).clamp(0.0, 25.0);
        let wind_direction = (200.0 + 30.0 * noise.sample(&mut rng)).rem_euclid(360.0);
        let cloud_cover = (50.0 + 25.0 * (i as f64 / 37.0).sin()).clamp(0.0, 100.0);

        let daylight = (PI * (hour - 6.0) / 12.0).sin().max(0.0);
        let solar = SOLAR_CAPACITY_MW * daylight * (1.0 - 0.7 * cloud_cover / 100.0);
        // Cubic power curve between cut-in and rated speed.
        let wind = WIND_CAPACITY_MW * ((wind_speed - 3.0).max(0.0) / 9.0).min(1.0).powi(3);
        let total_energy = solar + wind;

        let day_ahead_price =
            55.0 + 20.0 * (PI * (hour - 12.0) / 12.0).cos().abs() - 0.02 * total_energy
                + 3.0 * noise.sample(&mut rng);
        let imbalance_price = day_ahead_price + 12.0 * noise.sample(&mut rng);

        timestamps.push(timestamp);
        values.push(vec![
            temperature,
            wind_speed,
            wind_direction,
            cloud_cover,
            solar,
            wind,
            total_energy,
            day_ahead_price,
            imbalance_price,
        ]);
    }

    ObservationTable::with_cadence(FeatureSchema::energy_default(), timestamps, values, cadence)
}
