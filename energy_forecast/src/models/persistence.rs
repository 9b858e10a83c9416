//! Persistence baseline
//!
//! Predicts that every target keeps the value it has in the current input.
//! Has no parameters to learn; `train_batch` only reports the baseline loss
//! of carrying the last window row forward to the next one.

use crate::error::{ForecastError, Result};
use crate::models::{SequenceModel, TrainableModel};
use crate::schema::FeatureSchema;
use crate::windowing::WindowBatch;

/// Identity on the target sub-vector of each input
#[derive(Debug, Clone)]
pub struct PersistenceModel {
    name: String,
    schema: FeatureSchema,
}

impl PersistenceModel {
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            name: "Persistence".to_string(),
            schema,
        }
    }
}

impl SequenceModel for PersistenceModel {
    type State = ();

    fn input_width(&self) -> usize {
        self.schema.len()
    }

    fn output_width(&self) -> usize {
        self.schema.target_count()
    }

    fn initial_state(&self) -> Self::State {}

    fn step(&self, _state: &mut Self::State, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_width() {
            return Err(ForecastError::dimension(
                "persistence input",
                self.input_width(),
                input.len(),
            ));
        }
        Ok(self.schema.extract_targets(input))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainableModel for PersistenceModel {
    fn train_batch(&mut self, batch: &WindowBatch, _learning_rate: f64) -> Result<f64> {
        if batch.is_empty() {
            return Err(ForecastError::InsufficientData("Empty batch".to_string()));
        }

        let mut total = 0.0;
        let mut count = 0usize;
        for pair in batch.pairs() {
            let last = pair.past.last().ok_or_else(|| {
                ForecastError::InsufficientData("Window without rows".to_string())
            })?;
            if last.len() != self.input_width() {
                return Err(ForecastError::dimension(
                    "persistence window row",
                    self.input_width(),
                    last.len(),
                ));
            }
            if pair.next.len() != self.output_width() {
                return Err(ForecastError::dimension(
                    "persistence target",
                    self.output_width(),
                    pair.next.len(),
                ));
            }
            let carried = self.schema.extract_targets(last);
            total += carried
                .iter()
                .zip(&pair.next)
                .map(|(c, t)| (c - t).powi(2))
                .sum::<f64>();
            count += pair.next.len();
        }

        Ok(total / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Feature;
    use crate::windowing::WindowPair;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![Feature::exogenous("x"), Feature::target("y")]).unwrap()
    }

    #[test]
    fn test_step_returns_targets() {
        let model = PersistenceModel::new(schema());
        let mut state = model.initial_state();

        assert_eq!(model.step(&mut state, &[3.0, 4.0]).unwrap(), vec![4.0]);
        assert!(model.step(&mut state, &[3.0]).is_err());
    }

    #[test]
    fn test_batch_loss_is_carry_forward_error() {
        let mut model = PersistenceModel::new(schema());
        let batch = WindowBatch::new(vec![
            WindowPair {
                start: 0,
                past: vec![vec![0.0, 1.0], vec![0.0, 2.0]],
                next: vec![4.0],
            },
            WindowPair {
                start: 1,
                past: vec![vec![0.0, 2.0], vec![0.0, 4.0]],
                next: vec![4.0],
            },
        ]);

        assert_eq!(model.train_batch(&batch, 0.01).unwrap(), 2.0);
    }

    #[test]
    fn test_batch_rejects_short_rows() {
        let mut model = PersistenceModel::new(schema());
        let short_row = WindowBatch::new(vec![WindowPair {
            start: 0,
            past: vec![vec![1.0]],
            next: vec![4.0],
        }]);
        let wide_target = WindowBatch::new(vec![WindowPair {
            start: 0,
            past: vec![vec![0.0, 1.0]],
            next: vec![4.0, 5.0],
        }]);

        assert!(matches!(
            model.train_batch(&short_row, 0.01),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            model.train_batch(&wide_target, 0.01),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
