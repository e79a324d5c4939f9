use approx::assert_relative_eq;
use price_forecast::{ForecastError, TrendEstimator, TrendFallback};
use rstest::rstest;

#[test]
fn test_slope_of_straight_line() {
    let prices: Vec<f64> = (0..30).map(|i| 50.0 + 2.0 * i as f64).collect();
    let slope = TrendEstimator::default().estimate(&prices).unwrap();
    assert_relative_eq!(slope, 2.0, epsilon = 1e-9);
}

#[test]
fn test_uses_last_thirty_only() {
    let mut prices: Vec<f64> = (0..100).map(|i| 500.0 - 4.0 * i as f64).collect();
    prices.extend((0..30).map(|i| 10.0 - 0.5 * i as f64));

    let slope = TrendEstimator::default().estimate(&prices).unwrap();
    assert_relative_eq!(slope, -0.5, epsilon = 1e-9);
}

#[test]
fn test_flat_prices_have_no_trend() {
    let slope = TrendEstimator::default().estimate(&[75.0; 45]).unwrap();
    assert_relative_eq!(slope, 0.0, epsilon = 1e-12);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(29)]
fn test_short_history(#[case] n: usize) {
    let prices = vec![80.0; n];

    let err = TrendEstimator::new(30, TrendFallback::Fail)
        .unwrap()
        .estimate(&prices)
        .unwrap_err();
    match err {
        ForecastError::InsufficientHistory { required, actual } => {
            assert_eq!(required, 30);
            assert_eq!(actual, n);
        }
        other => panic!("expected InsufficientHistory, got {other}"),
    }

    let zero = TrendEstimator::new(30, TrendFallback::Zero)
        .unwrap()
        .estimate(&prices)
        .unwrap();
    assert_eq!(zero, 0.0);
}
