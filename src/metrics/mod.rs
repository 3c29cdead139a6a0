//! Regression metrics for retention predictions.
//!
//! MAE = mean absolute error, RMSE = root mean square error, MPE = mean
//! percentage error, MdAE = median absolute error, MdPE = median
//! percentage error. Percentage errors are relative to the true value.
//!
//! [`Metrics`] renders as the fixed string
//! `"RMSE: <v> MAE: <v> MPE: <v> MdAE: <v> MdPE: <v>"` and parses back by
//! token position, so downstream tooling can treat validation output as
//! an interface.

use std::fmt;

use crate::dataset::{mean, median};
use crate::error::{RetenerError, Result};

/// Root mean square error.
#[must_use]
pub fn rmse(predictions: &[f32], targets: &[f32]) -> f32 {
    let sum: f32 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p) * (t - p))
        .sum();
    (sum / predictions.len() as f32).sqrt()
}

/// Mean absolute error.
#[must_use]
pub fn mae(predictions: &[f32], targets: &[f32]) -> f32 {
    mean(&deviations(predictions, targets))
}

/// Mean absolute percentage error relative to the target.
#[must_use]
pub fn mean_percentage_error(predictions: &[f32], targets: &[f32]) -> f32 {
    mean(&percentage_errors(predictions, targets))
}

/// Median absolute error.
#[must_use]
pub fn median_absolute_error(predictions: &[f32], targets: &[f32]) -> f32 {
    median(&deviations(predictions, targets))
}

/// Median absolute percentage error relative to the target.
#[must_use]
pub fn median_percentage_error(predictions: &[f32], targets: &[f32]) -> f32 {
    median(&percentage_errors(predictions, targets))
}

/// Per-record absolute errors `|target - prediction|`.
#[must_use]
pub fn deviations(predictions: &[f32], targets: &[f32]) -> Vec<f32> {
    predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p).abs())
        .collect()
}

/// Per-record absolute percentage errors `|100 (target - prediction) / target|`.
#[must_use]
pub fn percentage_errors(predictions: &[f32], targets: &[f32]) -> Vec<f32> {
    predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (100.0 * (t - p) / t).abs())
        .collect()
}

/// The five accuracy measures reported by model validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub rmse: f32,
    pub mae: f32,
    pub mpe: f32,
    pub mdae: f32,
    pub mdpe: f32,
}

impl Metrics {
    /// Metrics from already-computed per-record errors. Validation and
    /// cross-validation both funnel through this, so pooling fold errors
    /// and concatenating the raw arrays give identical results.
    #[must_use]
    pub fn from_errors(deviations: &[f32], percentage_errors: &[f32]) -> Self {
        let rmse =
            (deviations.iter().map(|d| d * d).sum::<f32>() / deviations.len() as f32).sqrt();
        Self {
            rmse,
            mae: mean(deviations),
            mpe: mean(percentage_errors),
            mdae: median(deviations),
            mdpe: median(percentage_errors),
        }
    }

    /// Metrics from parallel prediction/target slices.
    ///
    /// # Errors
    /// Fails on empty input or mismatched lengths.
    pub fn compute(predictions: &[f32], targets: &[f32]) -> Result<Self> {
        if predictions.len() != targets.len() {
            return Err(RetenerError::dimension_mismatch(
                "predictions",
                targets.len(),
                predictions.len(),
            ));
        }
        if predictions.is_empty() {
            return Err(RetenerError::empty_input("metrics"));
        }
        Ok(Self::from_errors(
            &deviations(predictions, targets),
            &percentage_errors(predictions, targets),
        ))
    }

    /// Parses the string produced by `Display`, reading values at fixed
    /// whitespace-token positions 1, 3, 5, 7, and 9.
    ///
    /// # Errors
    /// Fails when a position is missing or not a float.
    pub fn parse(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let value = |i: usize| -> Result<f32> {
            tokens
                .get(i)
                .ok_or_else(|| RetenerError::format(format!("metrics string too short: {s:?}")))?
                .parse()
                .map_err(|_| RetenerError::format(format!("bad metrics value at token {i}: {s:?}")))
        };
        Ok(Self {
            rmse: value(1)?,
            mae: value(3)?,
            mpe: value(5)?,
            mdae: value(7)?,
            mdpe: value(9)?,
        })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMSE: {} MAE: {} MPE: {} MdAE: {} MdPE: {}",
            self.rmse, self.mae, self.mpe, self.mdae, self.mdpe
        )
    }
}
