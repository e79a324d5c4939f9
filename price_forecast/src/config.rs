//! Explicit configuration for every pipeline stage
//!
//! All defaults reproduce the Brent dashboard: ticker `BZ=F` from 2014 to
//! 2024, lags {1, 5, 10, 20}, windows {5, 10, 20}, an 80/20 chronological
//! split, 300 trees and a 30-day horizon.

use crate::error::{ForecastError, Result};
use crate::features::FeatureColumn;
use crate::forecaster::LagShift;
use crate::trend::TrendFallback;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the price history comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Source identifier (a Yahoo Finance ticker)
    pub ticker: String,
    /// First requested date (inclusive)
    pub start: NaiveDate,
    /// Last requested date (inclusive)
    pub end: NaiveDate,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ticker: "BZ=F".to_string(),
            start: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }
}

impl DataConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Ticker must not be empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(ForecastError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Lag offsets and moving-average windows used to build features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Lag offsets in rows
    pub lags: Vec<usize>,
    /// Moving-average window sizes in rows
    pub windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 5, 10, 20],
            windows: vec![5, 10, 20],
        }
    }
}

impl FeatureConfig {
    /// Create a validated configuration with sorted, deduplicated sets
    pub fn new(lags: Vec<usize>, windows: Vec<usize>) -> Result<Self> {
        Self { lags, windows }.normalized()
    }

    /// Validate and return the configuration in canonical order
    pub fn normalized(mut self) -> Result<Self> {
        if self.lags.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one lag is required".to_string(),
            ));
        }
        if self.windows.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one moving-average window is required".to_string(),
            ));
        }
        if self.lags.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "Lags must be positive".to_string(),
            ));
        }
        if self.windows.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "Moving-average windows must be positive".to_string(),
            ));
        }

        self.lags.sort_unstable();
        self.lags.dedup();
        self.windows.sort_unstable();
        self.windows.dedup();
        Ok(self)
    }

    /// Number of leading rows that cannot form a complete feature row
    pub fn warmup(&self) -> usize {
        let max_lag = self.lags.iter().copied().max().unwrap_or(0);
        let max_window = self.windows.iter().copied().max().unwrap_or(0);
        max_lag.max(max_window)
    }

    /// Feature columns in model input order: lags, then windows
    pub fn columns(&self) -> Vec<FeatureColumn> {
        self.lags
            .iter()
            .map(|&k| FeatureColumn::Lag(k))
            .chain(self.windows.iter().map(|&w| FeatureColumn::MovingAverage(w)))
            .collect()
    }

    /// Column names in model input order
    pub fn feature_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name()).collect()
    }

    /// Whether the lags are exactly 1, 2, ..., n
    pub fn has_contiguous_lags(&self) -> bool {
        self.lags.iter().enumerate().all(|(i, &k)| k == i + 1)
    }
}

/// Fixed gradient-boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to each tree's output
    pub learning_rate: f64,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Fraction of training rows sampled per tree
    pub subsample: f64,
    /// Fraction of feature columns sampled per tree
    pub colsample_bytree: f64,
    /// Minimum number of rows on each side of a split
    pub min_samples_leaf: usize,
    /// Seed for row and column sampling
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            learning_rate: 0.03,
            max_depth: 7,
            subsample: 0.8,
            colsample_bytree: 0.8,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Chronological split and booster settings for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows (oldest first) used for training
    pub train_fraction: f64,
    pub booster: BoosterParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            booster: BoosterParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train_fraction must be strictly between 0 and 1, got {}",
                self.train_fraction
            )));
        }
        self.booster.validate()
    }
}

/// Recursive forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future calendar days to project
    pub horizon: usize,
    /// Number of trailing observations used for the trend slope
    pub trend_window: usize,
    pub trend_fallback: TrendFallback,
    pub lag_shift: LagShift,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            trend_window: 30,
            trend_fallback: TrendFallback::Fail,
            lag_shift: LagShift::Chained,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }
        if self.trend_window < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "trend_window must be at least 2, got {}",
                self.trend_window
            )));
        }
        Ok(())
    }
}

/// Complete configuration for loading, training and forecasting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub forecast: ForecastConfig,
}

impl PipelineConfig {
    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: PipelineConfig = toml::from_str(text)?;
        config.features = config.features.normalized()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;
        self.features.clone().normalized()?;
        self.training.validate()?;
        self.forecast.validate()
    }
}
