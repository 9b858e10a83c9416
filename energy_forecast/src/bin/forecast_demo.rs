use chrono::{TimeZone, Utc};
use energy_forecast::metrics::{evaluate_accuracy, evaluate_revenue};
use energy_forecast::models::{train, PersistenceModel};
use energy_forecast::time_features::with_cyclic_time;
use energy_forecast::utils::train_test_split;
use energy_forecast::{
    build_windows, steps_per_day, ForecastError, IterativeForecaster, PipelineConfig,
    StandardizationMap,
};
use tracing_subscriber::EnvFilter;

const DAYS: usize = 21;
const TEST_DAYS: usize = 3;

fn main() -> energy_forecast::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional JSON config as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let steps_per_day = steps_per_day(config.cadence())?;
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ForecastError::InvalidParameter("Invalid start date".to_string()))?;
    let raw = energy_forecast::synthetic::energy_table_with_cadence(
        start,
        DAYS * steps_per_day,
        config.cadence(),
        2024,
    )?;
    let observed = with_cyclic_time(&raw)?;

    let (train_rows, test_rows) =
        train_test_split(observed.len(), TEST_DAYS as f64 / DAYS as f64);
    let map = StandardizationMap::fit_rows(&observed, train_rows.clone())?;
    let scaled = map.apply(&observed)?;

    let pairs = build_windows(&scaled.slice(train_rows)?, config.window_len)?;
    let mut model = PersistenceModel::new(scaled.schema().clone());
    let report = train(&mut model, &pairs, &config.training)?;
    println!(
        "Trained on {} windows, final loss {:.6}",
        pairs.len(),
        report.final_loss().unwrap_or_default()
    );

    let forecaster = IterativeForecaster::new(&model, &map);
    let first = scaled.timestamps()[test_rows.start];
    let runs = test_rows.len() / config.horizon_steps;
    if runs == 0 {
        return Err(ForecastError::InsufficientData(format!(
            "Test period of {} rows is shorter than the {} step horizon",
            test_rows.len(),
            config.horizon_steps
        )));
    }
    let forecast = forecaster.forecast_runs(&scaled, first, runs, config.horizon_steps)?;

    for (name, accuracy) in evaluate_accuracy(&forecast, &observed)? {
        println!("{}", name);
        print!("{}", accuracy);
    }

    let evaluation = evaluate_revenue(
        &forecast,
        &observed,
        config.imbalance_penalty,
        config.cvar_alpha,
    )?;
    print!("{}", evaluation);
    for (day, total) in evaluation.daily_totals() {
        println!("  {}: {:.2}", day, total);
    }

    Ok(())
}
