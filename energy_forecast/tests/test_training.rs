mod common;

use energy_forecast::models::{predict_window, train, window_mse, PersistenceModel};
use energy_forecast::windowing::build_windows;
use energy_forecast::{
    ForecastError, Result, SequenceModel, TrainableModel, TrainingConfig, WindowBatch,
};

/// Counts batches and reports a NaN loss on a chosen call
struct DivergingModel {
    width: usize,
    outputs: usize,
    calls: usize,
    diverge_on: usize,
}

impl SequenceModel for DivergingModel {
    type State = ();

    fn input_width(&self) -> usize {
        self.width
    }

    fn output_width(&self) -> usize {
        self.outputs
    }

    fn initial_state(&self) -> Self::State {}

    fn step(&self, _state: &mut Self::State, _input: &[f64]) -> Result<Vec<f64>> {
        Ok(vec![0.0; self.outputs])
    }

    fn name(&self) -> &str {
        "diverging"
    }
}

impl TrainableModel for DivergingModel {
    fn train_batch(&mut self, _batch: &WindowBatch, _learning_rate: f64) -> Result<f64> {
        self.calls += 1;
        if self.calls == self.diverge_on {
            Ok(f64::NAN)
        } else {
            Ok(1.0)
        }
    }
}

#[test]
fn test_train_persistence_baseline() {
    let (_, scaled, _) = common::scaled_table(200);
    let pairs = build_windows(&scaled, 16).unwrap();
    let mut model = PersistenceModel::new(scaled.schema().clone());
    let config = TrainingConfig {
        epochs: 3,
        batch_size: 32,
        shuffle: false,
        ..TrainingConfig::default()
    };

    let report = train(&mut model, &pairs, &config).unwrap();

    assert_eq!(report.epoch_losses.len(), 3);
    assert_eq!(report.batches_per_epoch, 6);
    // The baseline has nothing to learn, so every epoch sees the same mean loss.
    let first = report.epoch_losses[0];
    assert!(report.epoch_losses.iter().all(|l| (l - first).abs() < 1e-9));
    assert!(report.window_mse >= 0.0);
}

#[test]
fn test_predict_window_uses_last_step() {
    let (_, scaled, _) = common::scaled_table(40);
    let pairs = build_windows(&scaled, 8).unwrap();
    let model = PersistenceModel::new(scaled.schema().clone());

    let predicted = predict_window(&model, &pairs[5].past).unwrap();
    assert_eq!(predicted, scaled.targets(12).unwrap());
    assert!(window_mse(&model, &pairs).unwrap() >= 0.0);
    assert!(predict_window(&model, &[]).is_err());
}

#[test]
fn test_non_finite_loss_aborts_training() {
    let (_, scaled, _) = common::scaled_table(100);
    let pairs = build_windows(&scaled, 10).unwrap();
    let mut model = DivergingModel {
        width: scaled.schema().len(),
        outputs: scaled.schema().target_count(),
        calls: 0,
        diverge_on: 4,
    };
    let config = TrainingConfig {
        epochs: 5,
        batch_size: 30,
        shuffle: false,
        ..TrainingConfig::default()
    };

    let result = train(&mut model, &pairs, &config);
    assert!(matches!(
        result,
        Err(ForecastError::NumericalInstability { step: 3, .. })
    ));
    assert_eq!(model.calls, 4);
}

#[test]
fn test_training_input_validation() {
    let (_, scaled, _) = common::scaled_table(40);
    let pairs = build_windows(&scaled, 8).unwrap();
    let mut model = PersistenceModel::new(scaled.schema().clone());

    let bad_config = TrainingConfig {
        epochs: 0,
        ..TrainingConfig::default()
    };
    assert!(matches!(
        train(&mut model, &pairs, &bad_config),
        Err(ForecastError::ConfigError(_))
    ));
    assert!(matches!(
        train(&mut model, &[], &TrainingConfig::default()),
        Err(ForecastError::InsufficientData(_))
    ));

    let mut narrow = DivergingModel {
        width: 3,
        outputs: 5,
        calls: 0,
        diverge_on: 0,
    };
    assert!(matches!(
        train(&mut narrow, &pairs, &TrainingConfig::default()),
        Err(ForecastError::DimensionMismatch { .. })
    ));
}
