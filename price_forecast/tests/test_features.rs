use approx::assert_relative_eq;
use chrono::NaiveDate;
use price_forecast::data::PriceSeries;
use price_forecast::features::{FeatureBuilder, FeatureColumn};
use price_forecast::FeatureConfig;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn wavy_series(n: usize) -> PriceSeries {
    let prices = (0..n)
        .map(|i| 80.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
        .collect();
    PriceSeries::from_prices(start(), prices).unwrap()
}

fn builder(lags: Vec<usize>, windows: Vec<usize>) -> FeatureBuilder {
    FeatureBuilder::new(FeatureConfig::new(lags, windows).unwrap()).unwrap()
}

#[rstest]
#[case(100, vec![1, 5], vec![5], 95)]
#[case(100, vec![1, 5, 10, 20], vec![5, 10, 20], 80)]
#[case(30, vec![2], vec![25], 5)]
#[case(21, vec![1, 5, 10, 20], vec![5, 10, 20], 1)]
#[case(20, vec![1, 5, 10, 20], vec![5, 10, 20], 0)]
#[case(3, vec![1], vec![7], 0)]
fn test_table_length(
    #[case] n: usize,
    #[case] lags: Vec<usize>,
    #[case] windows: Vec<usize>,
    #[case] expected: usize,
) {
    let table = builder(lags, windows).build(&wavy_series(n)).unwrap();
    assert_eq!(table.len(), expected);
}

#[test]
fn test_hundred_prices_example() {
    let prices: Vec<f64> = (1..=100).map(|i| i as f64).collect();
    let series = PriceSeries::from_prices(start(), prices).unwrap();
    let table = builder(vec![1, 5], vec![5]).build(&series).unwrap();

    assert_eq!(table.len(), 95);
    assert_eq!(table.feature_names(), vec!["lag_1", "lag_5", "ma_5"]);

    let last = table.last_row().unwrap();
    assert_eq!(last.target, 100.0);
    // lag_1 on the last row is the 99th price
    assert_eq!(last.values[0], 99.0);
    assert_eq!(last.values[1], 95.0);
    assert_relative_eq!(last.values[2], 98.0);

    // First kept row is series index 5
    assert_eq!(table.rows()[0].date, start() + chrono::Duration::days(5));
    assert_eq!(table.rows()[0].target, 6.0);
}

#[test]
fn test_lag_and_moving_average_properties() {
    let lags = vec![1, 3, 7];
    let windows = vec![4, 9];
    let series = wavy_series(60);
    let table = builder(lags.clone(), windows.clone()).build(&series).unwrap();
    let prices = series.prices();
    let warmup = 9;

    for (i, row) in table.rows().iter().enumerate() {
        let t = i + warmup;
        assert_eq!(row.target, prices[t]);
        assert_eq!(row.date, series.points()[t].date);

        for &k in &lags {
            assert_eq!(table.value(i, FeatureColumn::Lag(k)), Some(prices[t - k]));
        }
        for &w in &windows {
            let expected = prices[t + 1 - w..=t].iter().sum::<f64>() / w as f64;
            assert_relative_eq!(
                table.value(i, FeatureColumn::MovingAverage(w)).unwrap(),
                expected,
                epsilon = 1e-9
            );
        }
    }

    // Lags expressed through targets: lag_k at row i equals target at row i - k
    for i in 7..table.len() {
        assert_eq!(
            table.value(i, FeatureColumn::Lag(7)),
            Some(table.rows()[i - 7].target)
        );
    }
}

#[test]
fn test_short_series_is_empty_not_error() {
    let table = builder(vec![1, 5, 10, 20], vec![5, 10, 20])
        .build(&wavy_series(5))
        .unwrap();
    assert!(table.is_empty());
    assert!(table.last_row().is_none());
    assert!(table.inputs().is_empty());
}

#[test]
fn test_unsorted_config_is_normalized() {
    let table = builder(vec![5, 1, 5], vec![10, 3])
        .build(&wavy_series(40))
        .unwrap();
    assert_eq!(
        table.feature_names(),
        vec!["lag_1", "lag_5", "ma_3", "ma_10"]
    );
    assert_eq!(table.len(), 30);
}
