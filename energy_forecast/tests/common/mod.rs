#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use energy_forecast::{ForecastError, ObservationTable, Result, SequenceModel, StandardizationMap};
use std::cell::RefCell;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// Synthetic energy table plus its standardized copy and the fitted map
pub fn scaled_table(rows: usize) -> (ObservationTable, ObservationTable, StandardizationMap) {
    let raw = energy_forecast::synthetic::energy_table(start(), rows, 11).unwrap();
    let map = StandardizationMap::fit(&raw).unwrap();
    let scaled = map.apply(&raw).unwrap();
    (raw, scaled, map)
}

/// Returns a fixed output and records every input it is stepped with
pub struct RecordingModel {
    pub input_width: usize,
    pub output: Vec<f64>,
    pub inputs: RefCell<Vec<Vec<f64>>>,
}

impl RecordingModel {
    pub fn new(input_width: usize, output: Vec<f64>) -> Self {
        Self {
            input_width,
            output,
            inputs: RefCell::new(Vec::new()),
        }
    }
}

impl SequenceModel for RecordingModel {
    type State = ();

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn output_width(&self) -> usize {
        self.output.len()
    }

    fn initial_state(&self) -> Self::State {}

    fn step(&self, _state: &mut Self::State, input: &[f64]) -> Result<Vec<f64>> {
        self.inputs.borrow_mut().push(input.to_vec());
        Ok(self.output.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Outputs a running mean of the first target position, so results depend
/// on the whole history held in the state
pub struct RunningMeanModel {
    pub input_width: usize,
    pub target_position: usize,
    pub outputs: usize,
}

impl SequenceModel for RunningMeanModel {
    type State = (f64, usize);

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn output_width(&self) -> usize {
        self.outputs
    }

    fn initial_state(&self) -> Self::State {
        (0.0, 0)
    }

    fn step(&self, state: &mut Self::State, input: &[f64]) -> Result<Vec<f64>> {
        state.0 += input[self.target_position];
        state.1 += 1;
        Ok(vec![state.0 / state.1 as f64; self.outputs])
    }

    fn name(&self) -> &str {
        "running mean"
    }
}

/// Emits NaN once it has been stepped `healthy_steps` times in a run
pub struct UnstableModel {
    pub input_width: usize,
    pub outputs: usize,
    pub healthy_steps: usize,
}

impl SequenceModel for UnstableModel {
    type State = usize;

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn output_width(&self) -> usize {
        self.outputs
    }

    fn initial_state(&self) -> Self::State {
        0
    }

    fn step(&self, state: &mut Self::State, _input: &[f64]) -> Result<Vec<f64>> {
        *state += 1;
        if *state > self.healthy_steps {
            Ok(vec![f64::NAN; self.outputs])
        } else {
            Ok(vec![0.5; self.outputs])
        }
    }

    fn name(&self) -> &str {
        "unstable"
    }
}

pub fn is_dimension_error(result: &std::result::Result<impl std::fmt::Debug, ForecastError>) -> bool {
    matches!(result, Err(ForecastError::DimensionMismatch { .. }))
}
