//! Response assembly: date alignment and inverse scaling

use crate::data::OhlcvFrame;
use crate::error::Result;
use crate::scale::inverse_scale_predictions;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A date-aligned series of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesData {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

/// Request-level metadata echoed back to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub total_input_records: usize,
    pub prediction_periods: usize,
    pub model_time_steps: usize,
}

/// The full prediction response: actuals, historical model fit, and the
/// recursive future forecast, each aligned with its dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub actual_data: SeriesData,
    pub historical_predictions: SeriesData,
    pub future_predictions: SeriesData,
    pub metadata: ResponseMetadata,
}

/// Generate `horizon` business days starting the day after `last`.
///
/// Weekends are skipped; holidays are not accounted for.
pub fn business_days_after(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(horizon);
    let mut current = last;
    while dates.len() < horizon {
        current = current + Duration::days(1);
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
    }
    dates
}

/// Align predictions with dates and package the response.
///
/// The first `time_steps` records have no corresponding prediction (they
/// only ever seed windows), so both the actual and the historical series
/// start at record `time_steps`. No numeric computation happens here
/// beyond inverse scaling.
pub fn assemble(
    frame: &OhlcvFrame,
    historical_scaled: &[f64],
    future_scaled: &[f64],
    time_steps: usize,
    train_min: f64,
    train_max: f64,
) -> Result<PredictionResponse> {
    let historical_dates: Vec<String> = frame.dates()[time_steps..].to_vec();
    let actual_values: Vec<f64> = frame.close()[time_steps..].to_vec();

    let future_dates: Vec<String> = business_days_after(frame.last_date()?, future_scaled.len())
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    Ok(PredictionResponse {
        actual_data: SeriesData {
            dates: historical_dates.clone(),
            values: actual_values,
        },
        historical_predictions: SeriesData {
            dates: historical_dates,
            values: inverse_scale_predictions(historical_scaled, train_min, train_max),
        },
        future_predictions: SeriesData {
            dates: future_dates,
            values: inverse_scale_predictions(future_scaled, train_min, train_max),
        },
        metadata: ResponseMetadata {
            total_input_records: frame.len(),
            prediction_periods: future_scaled.len(),
            model_time_steps: time_steps,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekend_is_skipped() {
        // 2023-06-02 is a Friday
        let friday = NaiveDate::from_ymd_opt(2023, 6, 2).unwrap();
        let dates = business_days_after(friday, 3);

        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2023, 6, 5).unwrap()); // Monday
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2023, 6, 6).unwrap()); // Tuesday
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2023, 6, 7).unwrap()); // Wednesday
    }

    #[test]
    fn midweek_start_is_consecutive() {
        // 2023-06-06 is a Tuesday
        let tuesday = NaiveDate::from_ymd_opt(2023, 6, 6).unwrap();
        let dates = business_days_after(tuesday, 2);

        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2023, 6, 7).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2023, 6, 8).unwrap());
    }

    #[test]
    fn zero_horizon_produces_no_dates() {
        let friday = NaiveDate::from_ymd_opt(2023, 6, 2).unwrap();
        assert!(business_days_after(friday, 0).is_empty());
    }
}
