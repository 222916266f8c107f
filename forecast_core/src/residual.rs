//! ARIMA(0,1,0) residuals as an engineered feature

use crate::error::{ForecastError, Result};

/// One-step fit residuals of an ARIMA(0,1,0) model on the close series.
///
/// A single level of differencing with no AR or MA terms reduces to a
/// random walk: the one-step prediction of `close[i]` is `close[i - 1]`,
/// so `residual[i] = close[i] - close[i - 1]`. The first residual is the
/// first observation itself (the fitted value before any history is zero),
/// matching the convention of the statistics package the model was trained
/// against.
///
/// The fit is re-derived per request from the request's own series; it
/// holds no cross-request state.
pub fn arima_residuals(close: &[f64]) -> Result<Vec<f64>> {
    if close.len() < 2 {
        return Err(ForecastError::InsufficientData(format!(
            "ARIMA(0,1,0) residuals need at least 2 observations, got {}",
            close.len()
        )));
    }

    let mut residuals = Vec::with_capacity(close.len());
    residuals.push(close[0]);
    for window in close.windows(2) {
        residuals.push(window[1] - window[0]);
    }

    Ok(residuals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residuals_are_first_differences() {
        let close = [100.0, 103.0, 101.5, 101.5];
        let residuals = arima_residuals(&close).unwrap();

        assert_eq!(residuals.len(), close.len());
        assert_eq!(residuals[0], 100.0);
        assert_eq!(residuals[1], 3.0);
        assert_eq!(residuals[2], -1.5);
        assert_eq!(residuals[3], 0.0);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let result = arima_residuals(&[100.0]);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData(_))
        ));
    }
}
