//! Helpers shared by training and forecasting

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// Train and test sizes for a chronological split
///
/// The test partition takes `round(n * (1 - train_fraction))` rows from the
/// end; both partitions must be non-empty.
pub fn chronological_split(n: usize, train_fraction: f64) -> Result<(usize, usize)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "train_fraction must be strictly between 0 and 1, got {}",
            train_fraction
        )));
    }

    let test_size = ((n as f64) * (1.0 - train_fraction)).round() as usize;
    let test_size = test_size.min(n);
    let train_size = n - test_size;

    if train_size == 0 || test_size == 0 {
        let required = minimum_rows(train_fraction);
        return Err(ForecastError::insufficient_data(
            "chronological split",
            required,
            n,
        ));
    }

    Ok((train_size, test_size))
}

/// Smallest row count that leaves both partitions non-empty
///
/// With half-away-from-zero rounding the test side is non-empty once
/// `n * (1 - f) >= 0.5` and the train side once `n * f > 0.5`. The estimate is
/// then nudged by a step to absorb floating-point error at the boundary.
fn minimum_rows(train_fraction: f64) -> usize {
    let fits = |n: usize| {
        let test = ((n as f64) * (1.0 - train_fraction)).round() as usize;
        test > 0 && test < n
    };

    let for_test = (0.5 / (1.0 - train_fraction)).ceil() as usize;
    let for_train = (0.5 / train_fraction).floor() as usize + 1;
    let mut n = for_test.max(for_train).max(2);
    while n > 2 && fits(n - 1) {
        n -= 1;
    }
    while !fits(n) {
        n += 1;
    }
    n
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|d| last + Duration::days(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 0.8, (80, 20))]
    #[case(10, 0.75, (7, 3))]
    #[case(2, 0.5, (1, 1))]
    fn split_sizes(#[case] n: usize, #[case] fraction: f64, #[case] expected: (usize, usize)) {
        assert_eq!(chronological_split(n, fraction).unwrap(), expected);
    }

    #[test]
    fn split_needs_both_sides() {
        let err = chronological_split(2, 0.8).unwrap_err();
        match err {
            ForecastError::InsufficientData {
                required, actual, ..
            } => {
                assert_eq!(actual, 2);
                assert_eq!(required, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(chronological_split(0, 0.8).is_err());
    }

    #[rstest]
    #[case(0.8, 3)]
    #[case(0.5, 2)]
    #[case(0.75, 2)]
    #[case(0.25, 3)]
    #[case(0.9, 6)]
    #[case(0.99, 50)]
    #[case(0.01, 51)]
    fn minimum_rows_is_the_tightest_bound(#[case] fraction: f64, #[case] expected: usize) {
        let required = minimum_rows(fraction);
        assert_eq!(required, expected);
        assert!(chronological_split(required, fraction).is_ok());
        assert!(chronological_split(required - 1, fraction).is_err());
    }

    #[test]
    fn future_dates_are_contiguous() {
        let last = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        let dates = future_dates(last, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ]
        );
    }
}
