//! Historical scoring and recursive multi-step forecasting

use crate::error::{ForecastError, Result};
use crate::predictor::WindowPredictor;
use crate::window::{FeatureVector, Window};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default wall-clock budget for one request's predictor invocations.
/// Recursive forecasting cost grows linearly with horizon, so a stuck
/// predictor would otherwise hang the request indefinitely.
pub const DEFAULT_PREDICT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the predictor over historical windows and extrapolates forward
/// with a recursive feedback loop.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    predictor: Arc<dyn WindowPredictor>,
    timeout: Duration,
}

impl ForecastEngine {
    /// Create an engine with the default timeout
    pub fn new(predictor: Arc<dyn WindowPredictor>) -> Self {
        Self {
            predictor,
            timeout: DEFAULT_PREDICT_TIMEOUT,
        }
    }

    /// Override the per-request wall-clock budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying predictor
    pub fn predictor(&self) -> &Arc<dyn WindowPredictor> {
        &self.predictor
    }

    /// Score every historical window, one score per window in window order.
    ///
    /// This reproduces what the model would have predicted at each point of
    /// the input range; it feeds the model-fit visualization, not decisions.
    pub fn predict_historical(&self, windows: &[Window]) -> Result<Vec<f64>> {
        let started = Instant::now();
        let scores = self.predictor.predict(windows)?;
        self.check_deadline(started)?;
        Ok(scores)
    }

    /// Recursive multi-step forecast from the most recent window.
    ///
    /// For each of `horizon` steps: score the current window, synthesize a
    /// new feature vector from the score, slide the window and repeat. Step
    /// k+1 strictly depends on step k's output, so the loop is sequential
    /// by construction. Errors compound with horizon since the synthesized
    /// features are a crude proxy for real observations; that fidelity
    /// limitation is inherited from the trained model's contract.
    pub fn predict_future(&self, seed: Window, horizon: usize) -> Result<Vec<f64>> {
        let started = Instant::now();
        let mut window = seed;
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            self.check_deadline(started)?;

            let scores = self.predictor.predict(std::slice::from_ref(&window))?;
            let next = *scores.first().ok_or_else(|| {
                ForecastError::Inference("predictor returned no score for window".to_string())
            })?;

            window.slide(synthesize_step(next));
            forecasts.push(next);
        }

        Ok(forecasts)
    }

    fn check_deadline(&self, started: Instant) -> Result<()> {
        if started.elapsed() > self.timeout {
            return Err(ForecastError::Timeout(format!(
                "predictor exceeded the {:?} budget",
                self.timeout
            )));
        }
        Ok(())
    }
}

/// Synthesize the feature vector fed back for one forecast step.
///
/// All price and volume fields collapse to the predicted close, and the
/// residual is zero since no new residual information exists beyond the
/// forecast horizon. This collapse is a known approximation preserved for
/// compatibility with the trained model.
fn synthesize_step(prediction: f64) -> FeatureVector {
    [
        prediction, // close
        prediction, // open
        prediction, // high
        prediction, // low
        prediction, // volume
        0.0,        // residual
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::INPUT_DIMS;

    /// Predictor stub that always returns the mean close of each window
    #[derive(Debug)]
    struct MeanClosePredictor;

    impl WindowPredictor for MeanClosePredictor {
        fn predict(&self, windows: &[Window]) -> Result<Vec<f64>> {
            Ok(windows
                .iter()
                .map(|w| w.rows().iter().map(|r| r[0]).sum::<f64>() / w.len() as f64)
                .collect())
        }

        fn name(&self) -> &str {
            "mean-close stub"
        }
    }

    fn seed_window() -> Window {
        let rows: Vec<_> = (1..=6).map(|i| [i as f64; INPUT_DIMS]).collect();
        Window::from_rows(rows).unwrap()
    }

    #[test]
    fn horizon_zero_returns_empty_series() {
        let engine = ForecastEngine::new(Arc::new(MeanClosePredictor));
        let forecasts = engine.predict_future(seed_window(), 0).unwrap();
        assert!(forecasts.is_empty());
    }

    #[test]
    fn horizon_one_equals_single_invocation() {
        let engine = ForecastEngine::new(Arc::new(MeanClosePredictor));
        let window = seed_window();

        let direct = MeanClosePredictor
            .predict(std::slice::from_ref(&window))
            .unwrap();
        let forecasts = engine.predict_future(window, 1).unwrap();

        assert_eq!(forecasts, direct);
    }

    #[test]
    fn horizon_n_produces_n_forecasts() {
        let engine = ForecastEngine::new(Arc::new(MeanClosePredictor));
        let forecasts = engine.predict_future(seed_window(), 5).unwrap();
        assert_eq!(forecasts.len(), 5);
    }

    /// Predictor stub that burns wall-clock time on every invocation
    #[derive(Debug)]
    struct SlowPredictor;

    impl WindowPredictor for SlowPredictor {
        fn predict(&self, windows: &[Window]) -> Result<Vec<f64>> {
            std::thread::sleep(Duration::from_millis(20));
            Ok(vec![0.5; windows.len()])
        }

        fn name(&self) -> &str {
            "slow stub"
        }
    }

    #[test]
    fn exhausted_budget_surfaces_as_timeout() {
        let engine = ForecastEngine::new(Arc::new(SlowPredictor))
            .with_timeout(Duration::from_millis(5));
        let result = engine.predict_future(seed_window(), 3);
        assert!(matches!(result, Err(ForecastError::Timeout(_))));
    }
}
