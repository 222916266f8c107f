//! # Forecast Core
//!
//! Feature pipeline and recursive forecasting core behind the stock
//! prediction API.
//!
//! ## Features
//!
//! - OHLCV CSV validation with the training pipeline's conventions
//! - ARIMA(0,1,0) residual augmentation as an engineered feature
//! - Frozen min-max scaling and fixed-length windowing
//! - Historical model-fit scoring and recursive multi-step forecasting
//! - Business-day-aligned response assembly
//! - ONNX-backed inference behind an opaque predictor trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_core::artifacts::ArtifactStore;
//! use forecast_core::service::PredictionService;
//!
//! # fn main() -> forecast_core::Result<()> {
//! // Load the trained predictor, scaler, and config once
//! let store = ArtifactStore::load("saved_models")?;
//! let service = PredictionService::from_store(&store);
//!
//! // Score an uploaded CSV and forecast one step ahead
//! let csv = std::fs::read_to_string("prices.csv")?;
//! let response = service.predict_from_csv(&csv, 1)?;
//!
//! println!("next close: {:?}", response.future_predictions.values);
//! # Ok(())
//! # }
//! ```
//!
//! The pipeline stages are also usable individually; see [`data`],
//! [`residual`], [`scale`], [`window`], and [`engine`].

pub mod artifacts;
pub mod assemble;
pub mod data;
pub mod engine;
pub mod error;
pub mod predictor;
pub mod residual;
pub mod scale;
pub mod service;
pub mod window;

// Re-export commonly used types
pub use crate::artifacts::{ArtifactStore, ModelConfig};
pub use crate::assemble::{PredictionResponse, ResponseMetadata, SeriesData};
pub use crate::data::OhlcvFrame;
pub use crate::engine::ForecastEngine;
pub use crate::error::{ForecastError, Result};
pub use crate::predictor::WindowPredictor;
pub use crate::scale::MinMaxScaler;
pub use crate::service::PredictionService;
pub use crate::window::{FeatureVector, Window, INPUT_DIMS};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
