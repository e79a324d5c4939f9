//! Gradient-boosted regression trees with squared-error loss
//!
//! Starts from the mean target and adds one shrunken tree per round, each
//! fitted to the current residuals on a seeded random subsample of rows and
//! columns. A fixed seed makes training reproducible.

use crate::config::BoosterParams;
use crate::error::{ForecastError, Result};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{check_width, Estimator, Regressor};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Unfitted gradient boosting estimator
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    name: String,
    params: BoosterParams,
}

impl GradientBoosting {
    pub fn new(params: BoosterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: format!(
                "Gradient Boosting (trees={}, depth={}, lr={})",
                params.n_estimators, params.max_depth, params.learning_rate
            ),
            params,
        })
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }
}

impl Estimator for GradientBoosting {
    type Fitted = GradientBoostedRegressor;

    fn fit(
        &self,
        inputs: &[Vec<f64>],
        targets: &[f64],
        feature_names: &[String],
    ) -> Result<Self::Fitted> {
        if inputs.is_empty() {
            return Err(ForecastError::insufficient_data("model fitting", 1, 0));
        }
        if inputs.len() != targets.len() {
            return Err(ForecastError::ValidationError(format!(
                "Inputs ({}) and targets ({}) differ in length",
                inputs.len(),
                targets.len()
            )));
        }
        if feature_names.is_empty() {
            return Err(ForecastError::ValidationError(
                "At least one feature is required".to_string(),
            ));
        }
        for row in inputs {
            check_width(feature_names, row)?;
        }

        let n = inputs.len();
        let m = feature_names.len();
        let row_count = ((n as f64 * self.params.subsample).round() as usize).clamp(1, n);
        let col_count = ((m as f64 * self.params.colsample_bytree).round() as usize).clamp(1, m);
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
        };

        let base_score = targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base_score; n];
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(target, prediction)| target - prediction)
                .collect();

            let mut rows = sample(&mut rng, n, row_count).into_vec();
            rows.sort_unstable();
            let mut columns = sample(&mut rng, m, col_count).into_vec();
            columns.sort_unstable();

            let tree = RegressionTree::fit(inputs, &residuals, &rows, &columns, &tree_params);
            for (prediction, row) in predictions.iter_mut().zip(inputs) {
                *prediction += self.params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(GradientBoostedRegressor {
            name: self.name.clone(),
            feature_names: feature_names.to_vec(),
            base_score,
            learning_rate: self.params.learning_rate,
            trees,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    name: String,
    feature_names: Vec<String>,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the model artifact to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a model artifact written by [`GradientBoostedRegressor::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Regressor for GradientBoostedRegressor {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_row(&self, features: &[f64]) -> Result<f64> {
        check_width(&self.feature_names, features)?;
        let boost: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        Ok(self.base_score + self.learning_rate * boost)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
