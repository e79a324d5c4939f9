//! # Trade Math
//!
//! Numeric building blocks for price feature engineering.
//! This crate provides the rolling statistics and the least-squares trend
//! fit that the forecasting crate builds on.

use thiserror::Error;

pub mod forecasting;
pub mod moving_averages;

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
