//! Least-squares trend fitting
//!
//! Fits `y = slope * x + intercept` where `x` is the position of each value
//! in the window (0, 1, 2, ...).

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Linear Regression implementation for trend forecasting
#[derive(Debug, Clone)]
pub struct LinearRegression {
    period: usize,
    values: VecDeque<f64>,
    slope: Option<f64>,
    intercept: Option<f64>,
}

impl LinearRegression {
    /// Create a new Linear Regression with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period < 2 {
            return Err(MathError::InvalidInput(
                "Period must be at least 2 for linear regression".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            slope: None,
            intercept: None,
        })
    }

    /// Fit a regression over the last `period` entries of `values`.
    pub fn fit(values: &[f64], period: usize) -> Result<Self> {
        if values.len() < period {
            return Err(MathError::InsufficientData(format!(
                "Need {} values for regression, have {}",
                period,
                values.len()
            )));
        }

        let mut lr = Self::new(period)?;
        for &value in &values[values.len() - period..] {
            lr.update(value)?;
        }
        Ok(lr)
    }

    /// Update the Linear Regression with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Regression input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);

        // Keep only the required number of values
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        // Calculate regression if we have enough data
        if self.values.len() >= 2 {
            self.calculate_regression()?;
        }

        Ok(())
    }

    /// Calculate the linear regression parameters (slope and intercept)
    fn calculate_regression(&mut self) -> Result<()> {
        let n = self.values.len() as f64;

        let x_mean = (0..self.values.len()).map(|i| i as f64).sum::<f64>() / n;
        let y_mean = self.values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (i, &y) in self.values.iter().enumerate() {
            let x = i as f64;
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        self.slope = Some(slope);
        self.intercept = Some(intercept);

        Ok(())
    }

    /// Get the current slope (trend direction and strength)
    pub fn slope(&self) -> Result<f64> {
        self.slope.ok_or_else(|| {
            MathError::InsufficientData("Not enough data to calculate slope".to_string())
        })
    }

    /// Get the current intercept
    pub fn intercept(&self) -> Result<f64> {
        self.intercept.ok_or_else(|| {
            MathError::InsufficientData("Not enough data to calculate intercept".to_string())
        })
    }

    /// Number of values currently in the window
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values have been seen
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
