//! Opaque window predictor interface and its ONNX-backed implementation

use crate::error::{ForecastError, Result};
use crate::window::{Window, INPUT_DIMS};
use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Mutex;

/// A trained network mapping fixed-shape numeric windows to scalar scores.
///
/// The architecture behind this trait is opaque to the pipeline; the only
/// contract is one already-scaled score per window, in window order.
/// Implementations must be safe to invoke from concurrent requests.
pub trait WindowPredictor: Debug + Send + Sync {
    /// Score each window, preserving order 1:1
    fn predict(&self, windows: &[Window]) -> Result<Vec<f64>>;

    /// Name of the underlying model
    fn name(&self) -> &str;
}

/// The attention-based CNN-LSTM network, exported to ONNX and executed
/// through ONNX Runtime.
///
/// `Session::run` needs exclusive access, so invocations from concurrent
/// requests are serialized through a mutex.
#[derive(Debug)]
pub struct OnnxPredictor {
    session: Mutex<Session>,
    time_steps: usize,
}

impl OnnxPredictor {
    /// Load the serialized network from disk.
    ///
    /// The weights are bound to a fixed architecture: `INPUT_DIMS` input
    /// features, `time_steps`-step windows, a sigmoid head producing one
    /// score per window.
    pub fn load(model_path: &Path, time_steps: usize) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| {
                ForecastError::ArtifactLoad(format!(
                    "model file {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            time_steps,
        })
    }

    /// Pack windows into a `(n, time_steps, INPUT_DIMS)` input tensor
    fn prepare_input(&self, windows: &[Window]) -> Result<Array3<f32>> {
        let mut batch = Array3::<f32>::zeros((windows.len(), self.time_steps, INPUT_DIMS));

        for (w, window) in windows.iter().enumerate() {
            if window.len() != self.time_steps {
                return Err(ForecastError::Inference(format!(
                    "window has {} time steps, model expects {}",
                    window.len(),
                    self.time_steps
                )));
            }
            for (t, row) in window.rows().iter().enumerate() {
                for (f, value) in row.iter().enumerate() {
                    batch[[w, t, f]] = *value as f32;
                }
            }
        }

        Ok(batch)
    }
}

impl WindowPredictor for OnnxPredictor {
    fn predict(&self, windows: &[Window]) -> Result<Vec<f64>> {
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let batch = self.prepare_input(windows)?;
        let input_tensor = Value::from_array(batch)?;
        let mut session = self.session.lock().map_err(|e| {
            ForecastError::Inference(format!("predictor lock poisoned: {}", e))
        })?;
        let outputs = session.run(ort::inputs![input_tensor])?;

        let (_, data) = outputs[0].try_extract_tensor::<f32>()?;
        if data.len() != windows.len() {
            return Err(ForecastError::Inference(format!(
                "model returned {} scores for {} windows",
                data.len(),
                windows.len()
            )));
        }

        let mut scores = Vec::with_capacity(data.len());
        for value in data {
            if !value.is_finite() {
                return Err(ForecastError::Inference(
                    "model produced a non-finite score".to_string(),
                ));
            }
            scores.push(*value as f64);
        }

        Ok(scores)
    }

    fn name(&self) -> &str {
        "Attention-Based CNN-LSTM"
    }
}
