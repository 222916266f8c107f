//! Stage-level pipeline properties: augment -> scale -> window

use forecast_core::data::OhlcvFrame;
use forecast_core::residual::arima_residuals;
use forecast_core::scale::{inverse_scale_predictions, MinMaxScaler};
use forecast_core::window::{make_windows, INPUT_DIMS};
use pretty_assertions::assert_eq;
use rstest::rstest;

const TIME_STEPS: usize = 6;

fn sample_csv(rows: usize) -> String {
    let mut csv = String::from("date,open,high,low,close,volume\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "2023-01-{:02},{:.1},{:.1},{:.1},{:.1},{}\n",
            i + 1,
            100.0 + i as f64,
            105.0 + i as f64,
            98.0 + i as f64,
            103.0 + i as f64,
            1000 + i
        ));
    }
    csv
}

fn scaler() -> MinMaxScaler {
    MinMaxScaler {
        data_min: vec![90.0, 90.0, 90.0, 90.0, 0.0, -10.0],
        data_max: vec![190.0, 190.0, 190.0, 190.0, 10000.0, 10.0],
        feature_range: (0.0, 1.0),
    }
}

#[rstest]
#[case(10)]
#[case(15)]
#[case(25)]
fn window_count_property(#[case] uploaded_rows: usize) {
    let frame = OhlcvFrame::from_csv_str(&sample_csv(uploaded_rows)).unwrap();
    let rows_after_drop = uploaded_rows - 1;
    assert_eq!(frame.len(), rows_after_drop);

    let residuals = arima_residuals(frame.close()).unwrap();
    let scaled = scaler().transform(&frame, &residuals).unwrap();
    let windows = make_windows(&scaled, TIME_STEPS).unwrap();

    assert_eq!(windows.len(), rows_after_drop - TIME_STEPS);
    for window in &windows {
        assert_eq!(window.len(), TIME_STEPS);
    }
}

#[test]
fn residual_series_aligns_with_frame() {
    let frame = OhlcvFrame::from_csv_str(&sample_csv(10)).unwrap();
    let residuals = arima_residuals(frame.close()).unwrap();

    assert_eq!(residuals.len(), frame.len());
    // Constant +1.0 close increments after the first observation
    for r in &residuals[1..] {
        assert!((r - 1.0).abs() < 1e-12);
    }
}

#[test]
fn scaled_rows_carry_six_features_in_order() {
    let frame = OhlcvFrame::from_csv_str(&sample_csv(10)).unwrap();
    let residuals = arima_residuals(frame.close()).unwrap();
    let scaled = scaler().transform(&frame, &residuals).unwrap();

    assert_eq!(scaled[0].len(), INPUT_DIMS);

    // Feature 0 is close: frame.close()[0] = 104.0 against [90, 190]
    let expected = (104.0 - 90.0) / 100.0;
    assert!((scaled[0][0] - expected).abs() < 1e-12);

    // Feature 4 is volume: 1001 against [0, 10000]
    let expected = 1001.0 / 10000.0;
    assert!((scaled[0][4] - expected).abs() < 1e-12);
}

#[rstest]
#[case(0.0)]
#[case(0.37)]
#[case(1.0)]
#[case(1.2)] // out of nominal range: inverse extrapolates, no clamping
fn inverse_scaling_round_trip(#[case] s: f64) {
    let (min, max) = (42.0, 99.5);
    let unscaled = inverse_scale_predictions(&[s], min, max);
    assert_eq!(unscaled.len(), 1);

    let forward = (unscaled[0] - min) / (max - min);
    assert!((forward - s).abs() < 1e-12);
}
