//! Error types for the price_forecast crate

use chrono::NaiveDate;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The price source returned no usable rows for the requested range
    #[error("No data available for {ticker} between {start} and {end}")]
    DataUnavailable {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Too few rows for a split or a windowed computation
    #[error("Insufficient data for {operation}: need at least {required} rows, have {actual}")]
    InsufficientData {
        operation: String,
        required: usize,
        actual: usize,
    },

    /// Too few observations to estimate the trend coefficient
    #[error("Insufficient history for trend estimation: need {required} observations, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Model input shape disagrees with the shape it was trained on
    #[error("Feature mismatch: expected [{}], got [{}]", .expected.join(", "), .actual.join(", "))]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error loading or parsing configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the HTTP client
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error (de)serializing a model artifact
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Error from the numeric building blocks
    #[error("Math error: {0}")]
    MathError(#[from] trade_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl ForecastError {
    /// Shorthand for an [`ForecastError::InsufficientData`] error
    pub fn insufficient_data(operation: &str, required: usize, actual: usize) -> Self {
        ForecastError::InsufficientData {
            operation: operation.to_string(),
            required,
            actual,
        }
    }
}
