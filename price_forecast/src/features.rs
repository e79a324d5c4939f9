//! Supervised-learning table built from a price series
//!
//! Every row holds the price at `t` as the target plus one value per
//! configured lag (`lag_k`, the price `k` rows earlier) and window (`ma_w`,
//! the mean of the `w` rows ending at `t`). Rows whose lookback would reach
//! before the start of the series are dropped, so the table begins at series
//! index `max(max(lags), max(windows))`.

use crate::config::FeatureConfig;
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fmt;
use trade_math::moving_averages::rolling_mean;
use tracing::debug;

/// A single model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    /// Price `k` rows before the current one
    Lag(usize),
    /// Trailing mean over `w` rows including the current one
    MovingAverage(usize),
}

impl FeatureColumn {
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureColumn::Lag(k) => write!(f, "lag_{}", k),
            FeatureColumn::MovingAverage(w) => write!(f, "ma_{}", w),
        }
    }
}

/// One dated row of the feature table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Observed price on `date`
    pub target: f64,
    /// Feature values in the owning table's column order
    pub values: Vec<f64>,
}

/// Chronological feature rows sharing one column layout
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    config: FeatureConfig,
    columns: Vec<FeatureColumn>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn last_row(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// Row-major model inputs
    pub fn inputs(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.values.clone()).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.target).collect()
    }

    /// Value of `column` in row `row`
    pub fn value(&self, row: usize, column: FeatureColumn) -> Option<f64> {
        let idx = self.columns.iter().position(|&c| c == column)?;
        self.rows.get(row).and_then(|r| r.values.get(idx)).copied()
    }

    /// Split into `[0, at)` and `[at, len)` keeping chronological order
    pub fn split_at(&self, at: usize) -> (FeatureTable, FeatureTable) {
        let at = at.min(self.rows.len());
        let (head, tail) = self.rows.split_at(at);
        (self.with_rows(head.to_vec()), self.with_rows(tail.to_vec()))
    }

    fn with_rows(&self, rows: Vec<FeatureRow>) -> FeatureTable {
        FeatureTable {
            config: self.config.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derives lag and moving-average columns from a price series
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Result<Self> {
        Ok(Self {
            config: config.normalized()?,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build the feature table; a series no longer than the warm-up gives an
    /// empty table
    pub fn build(&self, series: &PriceSeries) -> Result<FeatureTable> {
        let prices = series.prices();
        let dates = series.dates();
        let columns = self.config.columns();
        let warmup = self.config.warmup();

        let means = self
            .config
            .windows
            .iter()
            .map(|&w| rolling_mean(&prices, w))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(prices.len().saturating_sub(warmup));
        for t in warmup..prices.len() {
            let mut values = Vec::with_capacity(columns.len());
            values.extend(self.config.lags.iter().map(|&k| prices[t - k]));
            for (window, series_means) in self.config.windows.iter().zip(&means) {
                let mean = series_means[t].ok_or_else(|| {
                    ForecastError::DataError(format!("Window {} incomplete at row {}", window, t))
                })?;
                values.push(mean);
            }

            rows.push(FeatureRow {
                date: dates[t],
                target: prices[t],
                values,
            });
        }

        debug!(
            input_rows = prices.len(),
            warmup,
            rows = rows.len(),
            "built feature table"
        );

        Ok(FeatureTable {
            config: self.config.clone(),
            columns,
            rows,
        })
    }
}
