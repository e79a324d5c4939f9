//! End-to-end helpers: features, training, trend and forecast in one call

use crate::config::PipelineConfig;
use crate::data::PriceSeries;
use crate::error::Result;
use crate::features::FeatureBuilder;
use crate::forecaster::{ForecastOutput, RecursiveForecaster};
use crate::models::{GradientBoostedRegressor, Regressor};
use crate::trainer::{ModelTrainer, TrainingOutcome};
use crate::trend::TrendEstimator;

/// Build features from `series` and train the configured booster
pub fn train_model(
    series: &PriceSeries,
    config: &PipelineConfig,
) -> Result<TrainingOutcome<GradientBoostedRegressor>> {
    let table = FeatureBuilder::new(config.features.clone())?.build(series)?;
    ModelTrainer::new(config.training.clone())?.train(&table)
}

/// Project `config.forecast.horizon` days past the end of `series`
pub fn forecast_prices<M: Regressor + ?Sized>(
    model: &M,
    series: &PriceSeries,
    config: &PipelineConfig,
) -> Result<ForecastOutput> {
    let builder = FeatureBuilder::new(config.features.clone())?;
    let table = builder.build(series)?;

    let trend = TrendEstimator::new(config.forecast.trend_window, config.forecast.trend_fallback)?
        .estimate(&series.prices())?;

    RecursiveForecaster::new(model, builder.config(), config.forecast.lag_shift)?.forecast(
        &table,
        trend,
        config.forecast.horizon,
    )
}
