//! Frozen min-max feature scaling

use crate::data::OhlcvFrame;
use crate::error::{ForecastError, Result};
use crate::window::{FeatureVector, INPUT_DIMS};
use serde::{Deserialize, Serialize};

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// A min-max scaler with parameters frozen at training time.
///
/// Per-feature bounds were fitted once on the training set and are never
/// re-fitted per request. Inputs outside the trained range extrapolate
/// linearly; there is no clipping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Per-feature minimum seen at fit time, in fixed feature order
    pub data_min: Vec<f64>,
    /// Per-feature maximum seen at fit time, in fixed feature order
    pub data_max: Vec<f64>,
    /// Output range of the forward transform
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    /// Check the frozen parameters cover exactly the model's feature count
    pub fn validate(&self) -> Result<()> {
        if self.data_min.len() != INPUT_DIMS || self.data_max.len() != INPUT_DIMS {
            return Err(ForecastError::ArtifactLoad(format!(
                "scaler is fitted for {}/{} features, expected {}",
                self.data_min.len(),
                self.data_max.len(),
                INPUT_DIMS
            )));
        }
        Ok(())
    }

    /// Forward-transform one feature
    fn scale_one(&self, feature: usize, value: f64) -> f64 {
        let (lo, hi) = self.feature_range;
        let range = self.data_max[feature] - self.data_min[feature];
        // A zero-range feature carries no information; map it to the lower
        // bound instead of dividing by zero.
        let denom = if range == 0.0 { 1.0 } else { range };
        (value - self.data_min[feature]) / denom * (hi - lo) + lo
    }

    /// Build scaled feature vectors from a validated frame and its residuals.
    ///
    /// Feature order is fixed: `[close, open, high, low, volume, residual]`,
    /// the order the scaler was fitted on.
    pub fn transform(&self, frame: &OhlcvFrame, residuals: &[f64]) -> Result<Vec<FeatureVector>> {
        self.validate()?;
        if residuals.len() != frame.len() {
            return Err(ForecastError::Data(format!(
                "residual series length {} does not match {} rows",
                residuals.len(),
                frame.len()
            )));
        }

        let mut scaled = Vec::with_capacity(frame.len());
        for i in 0..frame.len() {
            let raw: FeatureVector = [
                frame.close()[i],
                frame.open()[i],
                frame.high()[i],
                frame.low()[i],
                frame.volume()[i],
                residuals[i],
            ];
            let mut row = [0.0; INPUT_DIMS];
            for (feature, value) in raw.iter().enumerate() {
                row[feature] = self.scale_one(feature, *value);
            }
            scaled.push(row);
        }

        Ok(scaled)
    }
}

/// Map scaled predictor outputs back to prices using the frozen training
/// bounds of the close series: `value = scaled * (max - min) + min`.
pub fn inverse_scale_predictions(predictions: &[f64], train_min: f64, train_max: f64) -> Vec<f64> {
    predictions
        .iter()
        .map(|p| p * (train_max - train_min) + train_min)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_scaler() -> MinMaxScaler {
        MinMaxScaler {
            data_min: vec![0.0; INPUT_DIMS],
            data_max: vec![10.0; INPUT_DIMS],
            feature_range: (0.0, 1.0),
        }
    }

    #[test]
    fn forward_transform_maps_bounds_to_range() {
        let scaler = unit_scaler();
        assert_eq!(scaler.scale_one(0, 0.0), 0.0);
        assert_eq!(scaler.scale_one(0, 10.0), 1.0);
        assert_eq!(scaler.scale_one(0, 5.0), 0.5);
    }

    #[test]
    fn out_of_range_inputs_extrapolate() {
        let scaler = unit_scaler();
        assert_eq!(scaler.scale_one(0, 20.0), 2.0);
        assert_eq!(scaler.scale_one(0, -10.0), -1.0);
    }

    #[test]
    fn inverse_is_the_algebraic_inverse() {
        let (min, max) = (37.5, 120.0);
        let scaled = [0.0, 0.25, 1.0];
        let unscaled = inverse_scale_predictions(&scaled, min, max);

        assert_eq!(unscaled[0], 37.5);
        assert_eq!(unscaled[2], 120.0);

        // Round-trip through the matching forward map
        for (s, v) in scaled.iter().zip(unscaled.iter()) {
            let forward = (v - min) / (max - min);
            assert!((forward - s).abs() < 1e-12);
        }
    }

    #[test]
    fn wrong_feature_count_is_an_artifact_error() {
        let scaler = MinMaxScaler {
            data_min: vec![0.0; 4],
            data_max: vec![1.0; 4],
            feature_range: (0.0, 1.0),
        };
        assert!(matches!(
            scaler.validate(),
            Err(ForecastError::ArtifactLoad(_))
        ));
    }
}
