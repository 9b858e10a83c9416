//! Sequence model interfaces and the training entry point
//!
//! The network architecture lives outside this crate. A model only has to
//! expose a per-timestep `step` over an explicitly owned recurrent state,
//! which keeps independent runs from sharing memory: parameters are borrowed
//! immutably, state is created fresh per run by [`SequenceModel::initial_state`].

use crate::config::TrainingConfig;
use crate::error::{ForecastError, Result};
use crate::windowing::{batches, shuffled_batches, WindowBatch, WindowPair};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

pub mod persistence;

pub use persistence::PersistenceModel;

/// A recurrent model consuming one feature vector per timestep
pub trait SequenceModel {
    /// Recurrent memory carried between steps of one run
    type State;

    /// Number of features expected per step
    fn input_width(&self) -> usize;

    /// Number of target values produced per step
    fn output_width(&self) -> usize;

    /// A freshly reset recurrent state
    fn initial_state(&self) -> Self::State;

    /// Advance the state by one timestep and return the prediction
    fn step(&self, state: &mut Self::State, input: &[f64]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// A sequence model that can update its parameters from window batches
pub trait TrainableModel: SequenceModel {
    /// Run one optimisation step on a batch and return its mean loss
    fn train_batch(&mut self, batch: &WindowBatch, learning_rate: f64) -> Result<f64>;
}

/// Losses recorded while training
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Mean batch loss of every epoch
    pub epoch_losses: Vec<f64>,
    /// Number of batches in each epoch
    pub batches_per_epoch: usize,
    /// Mean squared error of many-to-one predictions after the last epoch
    pub window_mse: f64,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

fn check_pair_widths<M: SequenceModel + ?Sized>(model: &M, pair: &WindowPair) -> Result<()> {
    if let Some(row) = pair.past.iter().find(|r| r.len() != model.input_width()) {
        return Err(ForecastError::dimension(
            "model input",
            model.input_width(),
            row.len(),
        ));
    }
    if pair.next.len() != model.output_width() {
        return Err(ForecastError::dimension(
            "model output",
            model.output_width(),
            pair.next.len(),
        ));
    }
    Ok(())
}

/// Many-to-one prediction: step a fresh state through the window and keep the last output
pub fn predict_window<M: SequenceModel + ?Sized>(model: &M, past: &[Vec<f64>]) -> Result<Vec<f64>> {
    let mut state = model.initial_state();
    let mut output = None;

    for (step, row) in past.iter().enumerate() {
        if row.len() != model.input_width() {
            return Err(ForecastError::dimension(
                "model input",
                model.input_width(),
                row.len(),
            ));
        }
        let prediction = model.step(&mut state, row)?;
        if prediction.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NumericalInstability {
                step,
                timestamp: None,
                detail: format!("{} produced {:?}", model.name(), prediction),
            });
        }
        output = Some(prediction);
    }

    output.ok_or_else(|| {
        ForecastError::InsufficientData("Cannot predict from an empty window".to_string())
    })
}

/// Mean squared error of [`predict_window`] over all pairs
pub fn window_mse<M: SequenceModel + ?Sized>(model: &M, pairs: &[WindowPair]) -> Result<f64> {
    if pairs.is_empty() {
        return Err(ForecastError::InsufficientData(
            "No window pairs to evaluate".to_string(),
        ));
    }

    let mut total = 0.0;
    let mut count = 0usize;
    for pair in pairs {
        check_pair_widths(model, pair)?;
        let predicted = predict_window(model, &pair.past)?;
        total += predicted
            .iter()
            .zip(&pair.next)
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>();
        count += pair.next.len();
    }

    Ok(total / count as f64)
}

/// Train a model on window pairs with an explicit configuration record
///
/// Aborts as soon as a batch reports a non-finite loss.
pub fn train<M: TrainableModel>(
    model: &mut M,
    pairs: &[WindowPair],
    config: &TrainingConfig,
) -> Result<TrainingReport> {
    config.validate()?;

    if pairs.is_empty() {
        return Err(ForecastError::InsufficientData(
            "No window pairs to train on".to_string(),
        ));
    }
    for pair in pairs {
        check_pair_widths(model, pair)?;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut epoch_losses = Vec::with_capacity(config.epochs);
    let mut batches_per_epoch = 0;

    for epoch in 0..config.epochs {
        let epoch_batches = if config.shuffle {
            shuffled_batches(pairs, config.batch_size, &mut rng)?
        } else {
            batches(pairs, config.batch_size)?
        };
        batches_per_epoch = epoch_batches.len();

        let mut loss_sum = 0.0;
        for (i, batch) in epoch_batches.iter().enumerate() {
            let loss = model.train_batch(batch, config.learning_rate)?;
            if !loss.is_finite() {
                return Err(ForecastError::NumericalInstability {
                    step: epoch * batches_per_epoch + i,
                    timestamp: None,
                    detail: format!("loss {} in epoch {} batch {}", loss, epoch, i),
                });
            }
            loss_sum += loss;
        }

        let mean_loss = loss_sum / batches_per_epoch as f64;
        debug!(epoch, loss = mean_loss, "finished epoch");
        epoch_losses.push(mean_loss);
    }

    let window_mse = window_mse(model, pairs)?;
    info!(
        model = model.name(),
        epochs = config.epochs,
        final_loss = epoch_losses.last().copied().unwrap_or_default(),
        window_mse,
        "training complete"
    );

    Ok(TrainingReport {
        epoch_losses,
        batches_per_epoch,
        window_mse,
    })
}
