//! End-to-end prediction pipeline

use crate::artifacts::{ArtifactStore, ModelConfig};
use crate::assemble::{assemble, PredictionResponse};
use crate::data::OhlcvFrame;
use crate::engine::ForecastEngine;
use crate::error::Result;
use crate::predictor::WindowPredictor;
use crate::residual::arima_residuals;
use crate::scale::MinMaxScaler;
use crate::window::{make_windows, Window};
use std::sync::Arc;

/// Sequences the whole pipeline for one uploaded CSV:
/// validate, augment, scale, window, score, extrapolate, assemble.
///
/// Holds only shared read-only state; one instance can serve concurrent
/// requests, each running its own sequential pipeline pass.
#[derive(Debug, Clone)]
pub struct PredictionService {
    engine: ForecastEngine,
    scaler: Arc<MinMaxScaler>,
    config: Arc<ModelConfig>,
}

impl PredictionService {
    /// Build a service from its parts
    pub fn new(
        predictor: Arc<dyn WindowPredictor>,
        scaler: Arc<MinMaxScaler>,
        config: Arc<ModelConfig>,
    ) -> Self {
        Self {
            engine: ForecastEngine::new(predictor),
            scaler,
            config,
        }
    }

    /// Build a service over a loaded artifact store
    pub fn from_store(store: &ArtifactStore) -> Self {
        Self::new(store.predictor(), store.scaler(), store.config())
    }

    /// The training-time configuration the service runs with
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Run the full pipeline over CSV text and forecast `periods` steps
    /// ahead.
    pub fn predict_from_csv(&self, content: &str, periods: usize) -> Result<PredictionResponse> {
        let time_steps = self.config.time_steps;

        let frame = OhlcvFrame::from_csv_str(content)?;
        tracing::debug!(rows = frame.len(), "validated upload");

        let residuals = arima_residuals(frame.close())?;
        let scaled = self.scaler.transform(&frame, &residuals)?;

        let windows = make_windows(&scaled, time_steps)?;
        tracing::debug!(windows = windows.len(), "built prediction windows");

        let historical = self.engine.predict_historical(&windows)?;

        // The recursive pass seeds from the last time_steps rows, one step
        // past the final historical window.
        let seed = Window::from_rows(scaled[scaled.len() - time_steps..].to_vec())?;
        let future = self.engine.predict_future(seed, periods)?;
        tracing::debug!(
            historical = historical.len(),
            future = future.len(),
            "scored windows"
        );

        assemble(
            &frame,
            &historical,
            &future,
            time_steps,
            self.config.train_min,
            self.config.train_max,
        )
    }
}
