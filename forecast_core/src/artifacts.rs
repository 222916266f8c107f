//! Loading of frozen model artifacts

use crate::error::{ForecastError, Result};
use crate::predictor::{OnnxPredictor, WindowPredictor};
use crate::scale::MinMaxScaler;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialized network weights
pub const MODEL_FILE: &str = "stock_model.onnx";
/// Serialized fitted scaler parameters
pub const SCALER_FILE: &str = "stock_scaler.json";
/// Serialized training-time configuration
pub const CONFIG_FILE: &str = "model_config.json";

/// Training-time configuration, immutable for the process lifetime.
///
/// Field names mirror the keys the training pipeline wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Window length the network was trained with
    #[serde(rename = "TIME_STEPS")]
    pub time_steps: usize,
    /// Feature dimensionality the network was trained with
    #[serde(rename = "INPUT_DIMS")]
    pub input_dims: usize,
    /// LSTM width of the trained network
    pub lstm_units: usize,
    /// Minimum of the training close series, for inverse scaling
    pub train_min: f64,
    /// Maximum of the training close series, for inverse scaling
    pub train_max: f64,
}

/// All frozen artifacts, loaded once and shared read-only thereafter.
///
/// Nothing here is mutated after load; the whole store can be wrapped in
/// an `Arc` and invoked from concurrent requests.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    predictor: Arc<dyn WindowPredictor>,
    scaler: Arc<MinMaxScaler>,
    config: Arc<ModelConfig>,
}

impl ArtifactStore {
    /// Load predictor, scaler, and config from a models directory.
    ///
    /// Any missing or unreadable artifact fails the whole load; callers
    /// should treat that as fatal for prediction serving (liveness
    /// endpoints are unaffected) and may retry on a later request.
    pub fn load<P: AsRef<Path>>(models_dir: P) -> Result<Self> {
        let models_dir = models_dir.as_ref();

        let config: ModelConfig = read_json(&models_dir.join(CONFIG_FILE))?;
        let scaler: MinMaxScaler = read_json(&models_dir.join(SCALER_FILE))?;
        scaler.validate()?;

        let model_path = models_dir.join(MODEL_FILE);
        if !model_path.exists() {
            return Err(ForecastError::ArtifactLoad(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }
        let predictor = OnnxPredictor::load(&model_path, config.time_steps)?;

        tracing::info!(
            models_dir = %models_dir.display(),
            time_steps = config.time_steps,
            "loaded model artifacts"
        );

        Ok(Self {
            predictor: Arc::new(predictor),
            scaler: Arc::new(scaler),
            config: Arc::new(config),
        })
    }

    /// Assemble a store from already-built parts (tests, alternate backends)
    pub fn from_parts(
        predictor: Arc<dyn WindowPredictor>,
        scaler: Arc<MinMaxScaler>,
        config: Arc<ModelConfig>,
    ) -> Self {
        Self {
            predictor,
            scaler,
            config,
        }
    }

    /// The trained window predictor
    pub fn predictor(&self) -> Arc<dyn WindowPredictor> {
        Arc::clone(&self.predictor)
    }

    /// The frozen feature scaler
    pub fn scaler(&self) -> Arc<MinMaxScaler> {
        Arc::clone(&self.scaler)
    }

    /// The training-time configuration
    pub fn config(&self) -> Arc<ModelConfig> {
        Arc::clone(&self.config)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        ForecastError::ArtifactLoad(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        ForecastError::ArtifactLoad(format!("cannot parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_training_keys() {
        let json = r#"{
            "TIME_STEPS": 6,
            "INPUT_DIMS": 6,
            "lstm_units": 50,
            "train_min": 12.5,
            "train_max": 180.0
        }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.time_steps, 6);
        assert_eq!(config.input_dims, 6);
        assert_eq!(config.lstm_units, 50);
        assert_eq!(config.train_min, 12.5);
        assert_eq!(config.train_max, 180.0);
    }

    #[test]
    fn missing_artifact_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArtifactStore::load(dir.path());
        assert!(matches!(result, Err(ForecastError::ArtifactLoad(_))));
    }
}
