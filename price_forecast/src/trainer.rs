//! Chronological train/test split, model fitting and held-out evaluation

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::features::FeatureTable;
use crate::metrics::{evaluate, EvaluationReport};
use crate::models::{Estimator, GradientBoostedRegressor, GradientBoosting, Regressor};
use crate::utils::chronological_split;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Actual and predicted price for one test-partition day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// A fitted model together with its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome<M> {
    pub model: M,
    /// Metrics on the test partition
    pub report: EvaluationReport,
    /// Per-day comparison on the test partition, oldest first
    pub holdout: Vec<HoldoutPoint>,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Fits a regressor on the oldest rows and scores it on the newest
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train the gradient-boosted model described by the configuration
    pub fn train(&self, table: &FeatureTable) -> Result<TrainingOutcome<GradientBoostedRegressor>> {
        let estimator = GradientBoosting::new(self.config.booster.clone())?;
        self.train_with(&estimator, table)
    }

    /// Train any estimator using the configured split
    pub fn train_with<E: Estimator>(
        &self,
        estimator: &E,
        table: &FeatureTable,
    ) -> Result<TrainingOutcome<E::Fitted>> {
        let (train_rows, test_rows) = chronological_split(table.len(), self.config.train_fraction)?;
        let (train, test) = table.split_at(train_rows);
        let feature_names = table.feature_names();

        let model = estimator.fit(&train.inputs(), &train.targets(), &feature_names)?;
        let predicted = model.predict(&test.inputs())?;
        let report = evaluate(&test.targets(), &predicted)?;

        let holdout = test
            .rows()
            .iter()
            .zip(predicted)
            .map(|(row, predicted)| HoldoutPoint {
                date: row.date,
                actual: row.target,
                predicted,
            })
            .collect();

        debug!(
            model = estimator.name(),
            train_rows,
            test_rows,
            mae = report.mae,
            rmse = report.rmse,
            r2 = report.r2,
            "model trained"
        );

        Ok(TrainingOutcome {
            model,
            report,
            holdout,
            train_rows,
            test_rows,
        })
    }
}
