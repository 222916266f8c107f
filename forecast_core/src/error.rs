//! Error types for the forecast_core crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the forecast_core crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Required CSV columns are absent from the upload
    #[error("Missing required columns: {missing:?}")]
    Schema {
        /// The absent column names, in required-column order
        missing: Vec<String>,
    },

    /// Too few rows to fit the residual model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Too few rows to produce a single prediction window
    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    /// Uploaded content is not valid UTF-8 text
    #[error("Invalid file encoding: {0}")]
    Encoding(String),

    /// Predictor, scaler, or config could not be loaded from disk
    #[error("Artifact load failed: {0}")]
    ArtifactLoad(String),

    /// Predictor invocation failed (shape mismatch, NaN output, runtime fault)
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Predictor invocation exceeded the request's wall-clock budget
    #[error("Prediction timed out: {0}")]
    Timeout(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<ort::Error> for ForecastError {
    fn from(err: ort::Error) -> Self {
        ForecastError::Inference(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ArtifactLoad(err.to_string())
    }
}
