//! Regression models mapping a feature vector to a price

use crate::error::{ForecastError, Result};
use std::fmt::Debug;

/// A fitted, immutable regressor
///
/// Implementors are read-only after fitting, so one instance can serve any
/// number of forecast calls at once.
pub trait Regressor: Debug + Send + Sync {
    /// Feature names in the order the model expects them
    fn feature_names(&self) -> &[String];

    /// Number of input features
    fn n_features(&self) -> usize {
        self.feature_names().len()
    }

    /// Point prediction for one feature vector
    fn predict_row(&self, features: &[f64]) -> Result<f64>;

    /// Point predictions for many feature vectors
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Model that can be fitted on a feature matrix
pub trait Estimator: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: Regressor;

    /// Fit on row-major `inputs` against `targets`
    fn fit(&self, inputs: &[Vec<f64>], targets: &[f64], feature_names: &[String])
        -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Reject an input vector whose width differs from the trained width
pub(crate) fn check_width(expected: &[String], features: &[f64]) -> Result<()> {
    if features.len() == expected.len() {
        return Ok(());
    }
    Err(ForecastError::FeatureMismatch {
        expected: expected.to_vec(),
        actual: (0..features.len()).map(|i| format!("x{}", i)).collect(),
    })
}

pub mod gradient_boosting;
pub mod tree;

pub use gradient_boosting::{GradientBoostedRegressor, GradientBoosting};
pub use tree::{RegressionTree, TreeParams};
