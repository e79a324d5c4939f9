//! Linear trend over the most recent observed prices

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use trade_math::forecasting::LinearRegression;

/// What to return when the history is shorter than the trend window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendFallback {
    /// Fail with `InsufficientHistory`
    #[default]
    Fail,
    /// Use a flat trend of 0.0
    Zero,
}

/// Least-squares slope of the last `window` prices against 0..window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendEstimator {
    window: usize,
    fallback: TrendFallback,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self {
            window: 30,
            fallback: TrendFallback::Fail,
        }
    }
}

impl TrendEstimator {
    pub fn new(window: usize, fallback: TrendFallback) -> Result<Self> {
        if window < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Trend window must be at least 2, got {}",
                window
            )));
        }
        Ok(Self { window, fallback })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn fallback(&self) -> TrendFallback {
        self.fallback
    }

    /// Slope per step of the trailing window of `prices`
    pub fn estimate(&self, prices: &[f64]) -> Result<f64> {
        if prices.len() < self.window {
            return match self.fallback {
                TrendFallback::Fail => Err(ForecastError::InsufficientHistory {
                    required: self.window,
                    actual: prices.len(),
                }),
                TrendFallback::Zero => Ok(0.0),
            };
        }

        let regression = LinearRegression::fit(prices, self.window)?;
        Ok(regression.slope()?)
    }
}
