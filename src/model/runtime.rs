//! Pluggable training runtimes behind the leaf models.
//!
//! [`GraphRuntime`] is the seam for iterative graph-style learners fed
//! one mini-batch at a time; [`BoosterRuntime`] is the seam for
//! whole-dataset boosters driven by a hyperparameter set. The built-in
//! implementations are small linear learners, enough to exercise the
//! training loops end to end and to stand in for heavier backends.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RetenerError, Result};
use crate::model::linear::LinearHead;
use crate::train::search::ParamSet;

/// Iteratively trained scalar regressor.
pub trait GraphRuntime: Send {
    /// Runs one optimization step on a mini-batch and returns the
    /// batch loss before the update.
    fn fit_batch(&mut self, inputs: &[Vec<f32>], targets: &[f32]) -> Result<f32>;

    /// Forward pass for one input row.
    fn output(&self, input: &[f32]) -> Result<f32>;

    /// Persists the runtime state to a file.
    fn save(&self, path: &Path) -> Result<()>;

    /// Restores the runtime state from a file.
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Batch-trained scalar regressor configured by a hyperparameter set.
pub trait BoosterRuntime: Send {
    /// Fits the booster from scratch on the full training matrix.
    fn train(&mut self, params: &ParamSet, rows: &[Vec<f32>], targets: &[f32]) -> Result<()>;

    /// Predicts one row; fails when called before training.
    fn predict_row(&self, row: &[f32]) -> Result<f32>;

    fn save(&self, path: &Path) -> Result<()>;

    fn load(&mut self, path: &Path) -> Result<()>;
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), value)
        .map_err(|e| RetenerError::Serialization(e.to_string()))
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| RetenerError::Serialization(e.to_string()))
}

/// Single-layer regressor trained by stochastic gradient descent on
/// squared error. Weights initialize lazily to zero on the first
/// batch, so the input width is fixed by the first call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgdRegressor {
    learning_rate: f32,
    weights: Vec<f32>,
    bias: f32,
}

impl SgdRegressor {
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate, weights: Vec::new(), bias: 0.0 }
    }

    fn forward(&self, input: &[f32]) -> Result<f32> {
        if self.weights.is_empty() {
            return Err(RetenerError::NotFitted { operation: "SgdRegressor::output".into() });
        }
        if input.len() != self.weights.len() {
            return Err(RetenerError::dimension_mismatch(
                "input features",
                self.weights.len(),
                input.len(),
            ));
        }
        let dot: f32 = self.weights.iter().zip(input).map(|(w, x)| w * x).sum();
        Ok(dot + self.bias)
    }
}

impl GraphRuntime for SgdRegressor {
    fn fit_batch(&mut self, inputs: &[Vec<f32>], targets: &[f32]) -> Result<f32> {
        if inputs.is_empty() {
            return Err(RetenerError::empty_input("training batch"));
        }
        if inputs.len() != targets.len() {
            return Err(RetenerError::dimension_mismatch(
                "batch targets",
                inputs.len(),
                targets.len(),
            ));
        }
        if self.weights.is_empty() {
            self.weights = vec![0.0; inputs[0].len()];
        }

        let mut loss = 0.0f32;
        let scale = self.learning_rate / inputs.len() as f32;
        for (input, &target) in inputs.iter().zip(targets) {
            let prediction = self.forward(input)?;
            let residual = prediction - target;
            loss += residual * residual;
            for (w, &x) in self.weights.iter_mut().zip(input) {
                *w -= scale * 2.0 * residual * x;
            }
            self.bias -= scale * 2.0 * residual;
        }
        Ok(loss / inputs.len() as f32)
    }

    fn output(&self, input: &[f32]) -> Result<f32> {
        self.forward(input)
    }

    fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        *self = load_json(path)?;
        Ok(())
    }
}

/// Ridge regression booster. Honors the `lambda` entry of the
/// parameter set as the L2 penalty and ignores tree-shape parameters,
/// which makes tuning runs deterministic and fast in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearBooster {
    head: Option<LinearHead>,
}

impl LinearBooster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoosterRuntime for LinearBooster {
    fn train(&mut self, params: &ParamSet, rows: &[Vec<f32>], targets: &[f32]) -> Result<()> {
        if rows.is_empty() {
            return Err(RetenerError::empty_input("booster training data"));
        }
        let lambda = params
            .get("lambda")
            .and_then(|v| v.as_f32())
            .unwrap_or(0.0);
        if lambda < 0.0 {
            return Err(RetenerError::InvalidHyperparameter {
                param: "lambda".into(),
                value: lambda.to_string(),
                constraint: "must be non-negative".into(),
            });
        }

        // Ridge via target augmentation: one phantom row per feature
        // with value sqrt(lambda) and target zero. The intercept stays
        // unpenalized. A small floor keeps the normal equations
        // well-posed when the rows are wider than the dataset.
        let k = rows[0].len();
        let mut augmented_rows = rows.to_vec();
        let mut augmented_targets = targets.to_vec();
        let strength = lambda.max(1e-6).sqrt();
        for j in 0..k {
            let mut phantom = vec![0.0f32; k];
            phantom[j] = strength;
            augmented_rows.push(phantom);
            augmented_targets.push(0.0);
        }
        self.head = Some(LinearHead::fit(&augmented_rows, &augmented_targets)?);
        Ok(())
    }

    fn predict_row(&self, row: &[f32]) -> Result<f32> {
        let head = self.head.as_ref().ok_or_else(|| RetenerError::NotFitted {
            operation: "LinearBooster::predict_row".into(),
        })?;
        head.predict_row(row)
    }

    fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        *self = load_json(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::search::{gbt_default_params, ParamValue};
    use tempfile::tempdir;

    fn line_data() -> (Vec<Vec<f32>>, Vec<f32>) {
        // y = 3x + 1 over a small grid.
        let rows: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32 / 20.0]).collect();
        let targets = rows.iter().map(|r| 3.0 * r[0] + 1.0).collect();
        (rows, targets)
    }

    #[test]
    fn test_sgd_converges_on_line() {
        let (rows, targets) = line_data();
        let mut runtime = SgdRegressor::new(0.1);
        let first_loss = runtime.fit_batch(&rows, &targets).unwrap();
        let mut last_loss = first_loss;
        for _ in 0..2000 {
            last_loss = runtime.fit_batch(&rows, &targets).unwrap();
        }
        assert!(last_loss < first_loss);
        assert!((runtime.output(&[0.5]).unwrap() - 2.5).abs() < 0.05);
    }

    #[test]
    fn test_sgd_rejects_bad_shapes() {
        let mut runtime = SgdRegressor::new(0.1);
        assert!(runtime.output(&[1.0]).is_err());
        assert!(runtime.fit_batch(&[], &[]).is_err());
        runtime.fit_batch(&[vec![1.0, 2.0]], &[3.0]).unwrap();
        assert!(runtime.output(&[1.0]).is_err());
    }

    #[test]
    fn test_sgd_save_load_round_trip() {
        let (rows, targets) = line_data();
        let mut runtime = SgdRegressor::new(0.1);
        for _ in 0..500 {
            runtime.fit_batch(&rows, &targets).unwrap();
        }
        let dir = tempdir().unwrap();
        let path = dir.path().join("sgd.json");
        runtime.save(&path).unwrap();

        let mut restored = SgdRegressor::new(0.1);
        restored.load(&path).unwrap();
        assert_eq!(
            restored.output(&[0.25]).unwrap(),
            runtime.output(&[0.25]).unwrap()
        );
    }

    #[test]
    fn test_booster_fits_and_persists() {
        let (rows, targets) = line_data();
        let mut booster = LinearBooster::new();
        assert!(booster.predict_row(&[0.5]).is_err());
        booster.train(&gbt_default_params(), &rows, &targets).unwrap();
        assert!((booster.predict_row(&[0.5]).unwrap() - 2.5).abs() < 0.1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("booster.json");
        booster.save(&path).unwrap();
        let mut restored = LinearBooster::new();
        restored.load(&path).unwrap();
        assert_eq!(
            restored.predict_row(&[0.5]).unwrap(),
            booster.predict_row(&[0.5]).unwrap()
        );
    }

    #[test]
    fn test_booster_lambda_shrinks_coefficients() {
        let (rows, targets) = line_data();
        let mut weak = LinearBooster::new();
        let mut strong = LinearBooster::new();
        let mut params = gbt_default_params();
        params.insert("lambda".into(), ParamValue::Float(0.0));
        weak.train(&params, &rows, &targets).unwrap();
        params.insert("lambda".into(), ParamValue::Float(100.0));
        strong.train(&params, &rows, &targets).unwrap();

        let spread = |b: &LinearBooster| {
            b.predict_row(&[1.0]).unwrap() - b.predict_row(&[0.0]).unwrap()
        };
        assert!(spread(&strong).abs() < spread(&weak).abs());
    }

    #[test]
    fn test_booster_rejects_negative_lambda() {
        let (rows, targets) = line_data();
        let mut booster = LinearBooster::new();
        let mut params = gbt_default_params();
        params.insert("lambda".into(), ParamValue::Float(-1.0));
        let err = booster.train(&params, &rows, &targets).unwrap_err();
        assert!(matches!(err, RetenerError::InvalidHyperparameter { .. }));
    }
}
