//! Fixed-length prediction windows

use crate::error::{ForecastError, Result};

/// Number of features the predictor consumes per time step
pub const INPUT_DIMS: usize = 6;

/// One model-ready time step, in fixed feature order:
/// `[close, open, high, low, volume, residual]`
pub type FeatureVector = [f64; INPUT_DIMS];

/// A contiguous ordered sequence of feature vectors, the atomic unit the
/// predictor consumes. Length is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    rows: Vec<FeatureVector>,
}

impl Window {
    /// Wrap an already-sliced run of feature vectors
    pub fn from_rows(rows: Vec<FeatureVector>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::InsufficientHistory(
                "a window must contain at least one time step".to_string(),
            ));
        }
        Ok(Self { rows })
    }

    /// The feature vectors in time order
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Number of time steps in the window
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the window has no time steps
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop the oldest row and append a new one, keeping length fixed.
    /// This is the feedback step of recursive forecasting.
    pub(crate) fn slide(&mut self, row: FeatureVector) {
        self.rows.remove(0);
        self.rows.push(row);
    }
}

/// Slice scaled features into overlapping prediction windows.
///
/// For `L` input rows this produces `L - time_steps` windows, window `i`
/// covering rows `i..i + time_steps`. An input that cannot produce at
/// least one window is rejected rather than silently yielding nothing:
/// an empty window set would make every downstream series empty while
/// still looking like success to the caller.
pub fn make_windows(scaled: &[FeatureVector], time_steps: usize) -> Result<Vec<Window>> {
    if scaled.len() <= time_steps {
        return Err(ForecastError::InsufficientHistory(format!(
            "need more than {} rows to build a {}-step window, got {}",
            time_steps,
            time_steps,
            scaled.len()
        )));
    }

    Ok((0..scaled.len() - time_steps)
        .map(|i| Window {
            rows: scaled[i..i + time_steps].to_vec(),
        })
        .collect())
}
