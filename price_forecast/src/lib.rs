//! # Price Forecast
//!
//! Daily commodity price forecasting with engineered lag and moving-average
//! features, a gradient-boosted tree ensemble and a recursive multi-step
//! projection corrected by a linear trend.
//!
//! ## Features
//!
//! - Daily closes from Yahoo Finance or a local CSV, gap-filled by linear
//!   interpolation
//! - Lag (`lag_k`) and trailing moving-average (`ma_w`) feature tables
//! - Seeded gradient boosting with a chronological hold-out evaluation
//!   (MAE, RMSE, R², MAPE, MBD, sMAPE)
//! - Recursive forecasting over any horizon with configurable lag shifting
//! - Market event annotations for the price history
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_forecast::config::PipelineConfig;
//! use price_forecast::data::DataLoader;
//! use price_forecast::pipeline::{forecast_prices, train_model};
//!
//! let config = PipelineConfig::default();
//! let series = DataLoader::yahoo()?.load(
//!     &config.data.ticker,
//!     config.data.start,
//!     config.data.end,
//! )?;
//!
//! let outcome = train_model(&series, &config)?;
//! println!("{}", outcome.report);
//!
//! let forecast = forecast_prices(&outcome.model, &series, &config)?;
//! for point in forecast.points() {
//!     println!("{} {:.2}", point.date, point.price);
//! }
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod features;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod trainer;
pub mod trend;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{FeatureConfig, PipelineConfig};
pub use crate::data::{DataLoader, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureTable};
pub use crate::forecaster::{ForecastOutput, LagShift, RecursiveForecaster};
pub use crate::models::{GradientBoostedRegressor, Regressor};
pub use crate::trainer::{HoldoutPoint, ModelTrainer, TrainingOutcome};
pub use crate::trend::{TrendEstimator, TrendFallback};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
