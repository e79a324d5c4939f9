//! Recursive multi-step forecasting
//!
//! Starting from the last observed feature row, each step predicts one day,
//! adds a fixed trend, and feeds the adjusted value back into the feature
//! state: lags shift by one position and every moving average becomes the
//! mean of the most recent predictions. The state never sees observed prices
//! after the starting row.

use crate::config::FeatureConfig;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureColumn, FeatureRow, FeatureTable};
use crate::models::Regressor;
use crate::utils::future_dates;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use trade_math::moving_averages::mean_of_last;
use tracing::debug;

/// How lag columns are shifted after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagShift {
    /// `lag_1` takes the prediction; `lag_k` takes the previous `lag_(k-1)`
    /// when that column exists and is otherwise left unchanged
    #[default]
    Chained,
    /// As `Chained`, but a missing `lag_(k-1)` makes `lag_k` take the
    /// prediction
    FillWithPrediction,
    /// Lags must be exactly `1..=n`, making every shift exact
    StrictContiguous,
}

/// Feature values carried between forecast steps
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastState {
    columns: Vec<FeatureColumn>,
    values: Vec<f64>,
}

impl ForecastState {
    /// State seeded from a feature row, target excluded
    pub fn from_row(columns: &[FeatureColumn], row: &FeatureRow) -> Result<Self> {
        if row.values.len() != columns.len() {
            return Err(ForecastError::FeatureMismatch {
                expected: columns.iter().map(|c| c.name()).collect(),
                actual: (0..row.values.len()).map(|i| format!("x{}", i)).collect(),
            });
        }
        Ok(Self {
            columns: columns.to_vec(),
            values: row.values.clone(),
        })
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        self.position(column).map(|i| self.values[i])
    }

    fn position(&self, column: FeatureColumn) -> Option<usize> {
        self.columns.iter().position(|&c| c == column)
    }

    /// Fold the latest adjusted prediction into the state
    ///
    /// Every lag read uses the values from before this call.
    pub fn advance(&mut self, adjusted: f64, predictions: &[f64], shift: LagShift) -> Result<()> {
        let previous = self.values.clone();

        for i in 0..self.columns.len() {
            self.values[i] = match self.columns[i] {
                FeatureColumn::Lag(1) => adjusted,
                FeatureColumn::Lag(k) => match self.position(FeatureColumn::Lag(k - 1)) {
                    Some(source) => previous[source],
                    None if shift == LagShift::FillWithPrediction => adjusted,
                    None => previous[i],
                },
                FeatureColumn::MovingAverage(w) => mean_of_last(predictions, w)?,
            };
        }

        Ok(())
    }
}

/// One projected day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Projected prices on consecutive days after the last observation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastOutput {
    points: Vec<ForecastPoint>,
}

impl ForecastOutput {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `date` / `forecast` frame for display or CSV export
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self
            .points
            .iter()
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .collect();

        Ok(DataFrame::new(vec![
            Series::new("date", dates),
            Series::new("forecast", self.values()),
        ])?)
    }

    /// Write the forecast as a `date,forecast` CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        Ok(())
    }
}

/// Projects a fitted regressor forward one day at a time
#[derive(Debug)]
pub struct RecursiveForecaster<'a, M: Regressor + ?Sized> {
    model: &'a M,
    config: FeatureConfig,
    columns: Vec<FeatureColumn>,
    lag_shift: LagShift,
}

impl<'a, M: Regressor + ?Sized> RecursiveForecaster<'a, M> {
    pub fn new(model: &'a M, config: &FeatureConfig, lag_shift: LagShift) -> Result<Self> {
        let config = config.clone().normalized()?;
        Ok(Self {
            model,
            columns: config.columns(),
            config,
            lag_shift,
        })
    }

    pub fn lag_shift(&self) -> LagShift {
        self.lag_shift
    }

    /// Forecast `horizon` days after the last row of `table`
    pub fn forecast(&self, table: &FeatureTable, trend: f64, horizon: usize) -> Result<ForecastOutput> {
        if table.config() != &self.config {
            return Err(ForecastError::FeatureMismatch {
                expected: self.config.feature_names(),
                actual: table.feature_names(),
            });
        }
        let last = table
            .last_row()
            .ok_or_else(|| ForecastError::insufficient_data("recursive forecast", 1, 0))?;
        self.forecast_from_row(last, trend, horizon)
    }

    /// Forecast `horizon` days after `row.date`, seeding the state from `row`
    pub fn forecast_from_row(
        &self,
        row: &FeatureRow,
        trend: f64,
        horizon: usize,
    ) -> Result<ForecastOutput> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }
        if self.lag_shift == LagShift::StrictContiguous && !self.config.has_contiguous_lags() {
            return Err(ForecastError::InvalidParameter(format!(
                "Strict lag shifting needs lags 1..=n, got {:?}",
                self.config.lags
            )));
        }

        let names = self.config.feature_names();
        if self.model.feature_names() != names.as_slice() {
            return Err(ForecastError::FeatureMismatch {
                expected: self.model.feature_names().to_vec(),
                actual: names,
            });
        }

        let mut state = ForecastState::from_row(&self.columns, row)?;
        let mut predictions = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let raw = self.model.predict_row(state.values())?;
            let adjusted = raw + trend;
            predictions.push(adjusted);
            state.advance(adjusted, &predictions, self.lag_shift)?;
        }

        debug!(
            model = self.model.name(),
            horizon,
            trend,
            start = %row.date,
            "recursive forecast complete"
        );

        let points = future_dates(row.date, horizon)
            .into_iter()
            .zip(predictions)
            .map(|(date, price)| ForecastPoint { date, price })
            .collect();

        Ok(ForecastOutput { points })
    }
}
