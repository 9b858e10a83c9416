//! Sliding-window batching for many-to-one sequence training
//!
//! A table of `T` rows yields `T - W` pairs for window length `W`. Pair `i`
//! holds rows `[i, i + W)` as its past and the target slice of row `i + W`
//! as its next value. Windows advance one row at a time, so every row is used
//! as a timestep in up to `W` windows and as the target of exactly one.

use crate::data::ObservationTable;
use crate::error::{ForecastError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// One training sample: a window of past rows and the next row's targets
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPair {
    /// Row index of the first observation in the window
    pub start: usize,
    /// `W` rows of `F` standardized features, oldest first
    pub past: Vec<Vec<f64>>,
    /// Target features of the row right after the window
    pub next: Vec<f64>,
}

impl WindowPair {
    pub fn window_len(&self) -> usize {
        self.past.len()
    }

    /// Index of the row whose targets are in `next`
    pub fn target_row(&self) -> usize {
        self.start + self.past.len()
    }

    /// The window transposed to features × time
    pub fn past_feature_major(&self) -> Vec<Vec<f64>> {
        let width = self.past.first().map_or(0, |r| r.len());
        (0..width)
            .map(|f| self.past.iter().map(|row| row[f]).collect())
            .collect()
    }
}

/// Build every sliding window of length `window_len` over the table
///
/// A table exactly `window_len` rows long produces no pairs because no row
/// is left to serve as a target. Shorter tables are an error.
pub fn build_windows(table: &ObservationTable, window_len: usize) -> Result<Vec<WindowPair>> {
    if window_len == 0 {
        return Err(ForecastError::InvalidParameter(
            "Window length must be greater than zero".to_string(),
        ));
    }

    if table.len() < window_len {
        return Err(ForecastError::InsufficientData(format!(
            "Need at least {} rows for a window of {}, got {}",
            window_len,
            window_len,
            table.len()
        )));
    }

    let count = table.len() - window_len;
    if count == 0 {
        warn!(rows = table.len(), window_len, "table length equals window length, no windows");
    }

    let rows = table.rows();
    let schema = table.schema();
    let pairs: Vec<WindowPair> = (0..count)
        .map(|start| WindowPair {
            start,
            past: rows[start..start + window_len].to_vec(),
            next: schema.extract_targets(&rows[start + window_len]),
        })
        .collect();

    debug!(pairs = pairs.len(), window_len, "built sliding windows");
    Ok(pairs)
}

/// A mini-batch of window pairs
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    pairs: Vec<WindowPair>,
}

impl WindowBatch {
    pub fn new(pairs: Vec<WindowPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[WindowPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pasts of the batch, batch × time × features
    pub fn inputs(&self) -> Vec<&[Vec<f64>]> {
        self.pairs.iter().map(|p| p.past.as_slice()).collect()
    }

    /// Targets of the batch, batch × targets
    pub fn targets(&self) -> Vec<&[f64]> {
        self.pairs.iter().map(|p| p.next.as_slice()).collect()
    }
}

/// Split pairs into consecutive batches; the last batch may be short
pub fn batches(pairs: &[WindowPair], batch_size: usize) -> Result<Vec<WindowBatch>> {
    if batch_size == 0 {
        return Err(ForecastError::InvalidParameter(
            "Batch size must be greater than zero".to_string(),
        ));
    }

    Ok(pairs
        .chunks(batch_size)
        .map(|chunk| WindowBatch::new(chunk.to_vec()))
        .collect())
}

/// Like [`batches`] but with the pair order shuffled by `rng`
pub fn shuffled_batches<R: Rng + ?Sized>(
    pairs: &[WindowPair],
    batch_size: usize,
    rng: &mut R,
) -> Result<Vec<WindowBatch>> {
    let mut shuffled = pairs.to_vec();
    shuffled.shuffle(rng);
    batches(&shuffled, batch_size)
}
