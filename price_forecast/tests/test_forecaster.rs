use chrono::{Duration, NaiveDate};
use price_forecast::config::{BoosterParams, TrainingConfig};
use price_forecast::data::PriceSeries;
use price_forecast::error::Result;
use price_forecast::features::{FeatureBuilder, FeatureRow};
use price_forecast::{
    FeatureConfig, ForecastError, LagShift, ModelTrainer, RecursiveForecaster, Regressor,
};
use pretty_assertions::assert_eq;
use std::sync::Mutex;

/// Predicts `lag_1 + 1` and records every input it sees
#[derive(Debug)]
struct RecordingModel {
    names: Vec<String>,
    seen: Mutex<Vec<Vec<f64>>>,
    fail_above: Option<f64>,
}

impl RecordingModel {
    fn new(config: &FeatureConfig) -> Self {
        Self {
            names: config.feature_names(),
            seen: Mutex::new(Vec::new()),
            fail_above: None,
        }
    }

    fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().unwrap().clone()
    }
}

impl Regressor for RecordingModel {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64> {
        self.seen.lock().unwrap().push(features.to_vec());
        if let Some(limit) = self.fail_above {
            if features[0] > limit {
                return Err(ForecastError::ValidationError("input out of range".into()));
            }
        }
        Ok(features[0] + 1.0)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn last_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
}

fn gapped_config() -> FeatureConfig {
    FeatureConfig::new(vec![1, 2, 5], vec![2]).unwrap()
}

fn gapped_row() -> FeatureRow {
    FeatureRow {
        date: last_date(),
        target: 10.0,
        values: vec![10.0, 9.0, 6.0, 9.5],
    }
}

fn wavy_series(n: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let prices = (0..n)
        .map(|i| 70.0 + (i as f64 / 6.0).sin() * 4.0 + i as f64 * 0.05)
        .collect();
    PriceSeries::from_prices(start, prices).unwrap()
}

fn quick_training() -> TrainingConfig {
    TrainingConfig {
        train_fraction: 0.8,
        booster: BoosterParams {
            n_estimators: 25,
            max_depth: 3,
            learning_rate: 0.1,
            ..BoosterParams::default()
        },
    }
}

#[test]
fn test_chained_shift_keeps_gap_lag() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let forecaster = RecursiveForecaster::new(&model, &config, LagShift::Chained).unwrap();

    let output = forecaster.forecast_from_row(&gapped_row(), 0.5, 3).unwrap();

    assert_eq!(output.values(), vec![11.5, 13.0, 14.5]);
    assert_eq!(
        model.seen(),
        vec![
            vec![10.0, 9.0, 6.0, 9.5],
            vec![11.5, 10.0, 6.0, 11.5],
            vec![13.0, 11.5, 6.0, 12.25],
        ]
    );
}

#[test]
fn test_fill_with_prediction_overwrites_gap_lag() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let forecaster =
        RecursiveForecaster::new(&model, &config, LagShift::FillWithPrediction).unwrap();

    forecaster.forecast_from_row(&gapped_row(), 0.5, 2).unwrap();

    assert_eq!(model.seen()[1], vec![11.5, 10.0, 11.5, 11.5]);
}

#[test]
fn test_strict_shift_requires_contiguous_lags() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let forecaster =
        RecursiveForecaster::new(&model, &config, LagShift::StrictContiguous).unwrap();

    let err = forecaster
        .forecast_from_row(&gapped_row(), 0.0, 5)
        .unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
    assert!(model.seen().is_empty());

    let contiguous = FeatureConfig::new(vec![1, 2, 3], vec![3]).unwrap();
    let model = RecordingModel::new(&contiguous);
    let row = FeatureRow {
        date: last_date(),
        target: 4.0,
        values: vec![4.0, 3.0, 2.0, 3.0],
    };
    let output = RecursiveForecaster::new(&model, &contiguous, LagShift::StrictContiguous)
        .unwrap()
        .forecast_from_row(&row, 0.0, 2)
        .unwrap();

    assert_eq!(output.values(), vec![5.0, 6.0]);
    assert_eq!(model.seen()[1], vec![5.0, 4.0, 3.0, 5.0]);
}

#[test]
fn test_dates_follow_last_observation() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let output = RecursiveForecaster::new(&model, &config, LagShift::Chained)
        .unwrap()
        .forecast_from_row(&gapped_row(), 0.0, 30)
        .unwrap();

    assert_eq!(output.len(), 30);
    assert_eq!(output.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    for pair in output.dates().windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
}

#[test]
fn test_model_error_aborts_whole_horizon() {
    let config = gapped_config();
    let mut model = RecordingModel::new(&config);
    model.fail_above = Some(12.0);

    let result = RecursiveForecaster::new(&model, &config, LagShift::Chained)
        .unwrap()
        .forecast_from_row(&gapped_row(), 0.5, 10);

    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    assert_eq!(model.seen().len(), 3);
}

#[test]
fn test_feature_names_must_match_model() {
    let model = RecordingModel::new(&FeatureConfig::new(vec![1], vec![2]).unwrap());
    let err = RecursiveForecaster::new(&model, &gapped_config(), LagShift::Chained)
        .unwrap()
        .forecast_from_row(&gapped_row(), 0.0, 3)
        .unwrap_err();

    match err {
        ForecastError::FeatureMismatch { expected, actual } => {
            assert_eq!(expected, vec!["lag_1", "ma_2"]);
            assert_eq!(actual, vec!["lag_1", "lag_2", "lag_5", "ma_2"]);
        }
        other => panic!("expected FeatureMismatch, got {other}"),
    }
}

#[test]
fn test_table_from_other_config_is_rejected() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let table = FeatureBuilder::new(FeatureConfig::new(vec![1, 2], vec![2]).unwrap())
        .unwrap()
        .build(&wavy_series(40))
        .unwrap();

    let err = RecursiveForecaster::new(&model, &config, LagShift::Chained)
        .unwrap()
        .forecast(&table, 0.0, 5)
        .unwrap_err();
    assert!(matches!(err, ForecastError::FeatureMismatch { .. }));
}

#[test]
fn test_invalid_horizon_and_empty_table() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let forecaster = RecursiveForecaster::new(&model, &config, LagShift::Chained).unwrap();

    assert!(matches!(
        forecaster.forecast_from_row(&gapped_row(), 0.0, 0),
        Err(ForecastError::InvalidParameter(_))
    ));

    let empty = FeatureBuilder::new(config.clone())
        .unwrap()
        .build(&wavy_series(4))
        .unwrap();
    assert!(matches!(
        forecaster.forecast(&empty, 0.0, 5),
        Err(ForecastError::InsufficientData { .. })
    ));
}

#[test]
fn test_trained_model_forecast_is_deterministic() {
    let config = FeatureConfig::default();
    let table = FeatureBuilder::new(config.clone())
        .unwrap()
        .build(&wavy_series(200))
        .unwrap();
    let outcome = ModelTrainer::new(quick_training())
        .unwrap()
        .train(&table)
        .unwrap();

    let forecaster =
        RecursiveForecaster::new(&outcome.model, &config, LagShift::Chained).unwrap();
    let first = forecaster.forecast(&table, 0.05, 30).unwrap();
    let second = forecaster.forecast(&table, 0.05, 30).unwrap();

    assert_eq!(first.len(), 30);
    assert!(first.values().iter().all(|v| v.is_finite()));
    assert_eq!(
        first.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        second.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
    assert_eq!(
        first.dates()[0],
        table.last_row().unwrap().date + Duration::days(1)
    );
}

#[test]
fn test_dyn_regressor_is_accepted() {
    let config = gapped_config();
    let model = RecordingModel::new(&config);
    let shared: &dyn Regressor = &model;

    let output = RecursiveForecaster::new(shared, &config, LagShift::Chained)
        .unwrap()
        .forecast_from_row(&gapped_row(), 0.0, 4)
        .unwrap();
    assert_eq!(output.len(), 4);
}
