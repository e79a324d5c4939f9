//! Error metrics for evaluating a fitted model on held-out rows

use crate::error::{ForecastError, Result};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Evaluate predictions against actual values
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<EvaluationReport> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(format!(
            "Actual ({}) and predicted ({}) values must have the same non-zero length",
            actual.len(),
            predicted.len()
        )));
    }

    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).mean();
    let rmse = errors.iter().map(|e| e.powi(2)).mean().sqrt();

    let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
    let actual_mean = actual.iter().mean();
    let ss_tot: f64 = actual.iter().map(|a| (a - actual_mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    let mape = 100.0
        * actual
            .iter()
            .zip(&errors)
            .map(|(a, e)| (e / a).abs())
            .mean();

    let mbd = 100.0
        * actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (p - a) / a)
            .mean();

    let smape = 100.0
        * actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| {
                let denom = a.abs() + p.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    2.0 * (a - p).abs() / denom
                }
            })
            .mean();

    Ok(EvaluationReport {
        mae,
        rmse,
        r2,
        mape,
        mbd,
        smape,
    })
}

/// Held-out performance of a fitted model
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Mean Bias Deviation, signed percent
    pub mbd: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl EvaluationReport {
    /// Metric name to value
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("MAE", self.mae),
            ("RMSE", self.rmse),
            ("R2", self.r2),
            ("MAPE", self.mape),
            ("MBD", self.mbd),
            ("sMAPE", self.smape),
        ])
    }
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model Evaluation Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  R2:    {:.4}", self.r2)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  MBD:   {:.4}%", self.mbd)?;
        writeln!(f, "  sMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}
