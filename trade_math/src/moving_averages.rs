//! Moving average calculation implementations
//!
//! Contains the trailing Simple Moving Average (SMA) used for feature
//! columns, plus slice helpers built on top of it.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);

        // Remove oldest value if we have more than period values
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Whether a full window of values has been seen
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        // Summing the window directly keeps the result identical to a fresh
        // mean over the same slice.
        Ok(self.values.iter().sum::<f64>() / self.period as f64)
    }
}

/// Trailing SMA for every position of `values`.
///
/// Entry `i` is `None` until a full window ending at `i` is available.
pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    let mut out = Vec::with_capacity(values.len());

    for &value in values {
        sma.update(value)?;
        out.push(if sma.is_ready() { Some(sma.value()?) } else { None });
    }

    Ok(out)
}

/// Mean of the last `min(period, values.len())` entries.
pub fn mean_of_last(values: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(MathError::InvalidInput(
            "Period must be greater than zero".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot average an empty slice".to_string(),
        ));
    }

    let tail = &values[values.len().saturating_sub(period)..];
    Ok(tail.iter().sum::<f64>() / tail.len() as f64)
}
