//! Dense least-squares head used by the stacking meta-learner.
//!
//! Fits coefficients and an intercept by solving the normal equations
//! with a Cholesky factorization. Inputs are tiny here (one column per
//! leaf model), so the direct solve is exact and cheap.

use serde::{Deserialize, Serialize};

use crate::error::{RetenerError, Result};

/// Linear map `y = w · x + b` fitted by ordinary least squares.
///
/// # Examples
///
/// ```
/// use retener::model::linear::LinearHead;
///
/// let rows = vec![
///     vec![0.0, 0.0],
///     vec![1.0, 0.0],
///     vec![0.0, 1.0],
///     vec![1.0, 1.0],
/// ];
/// let targets = vec![3.0, 5.0, 2.0, 4.0];
/// let head = LinearHead::fit(&rows, &targets).unwrap();
/// assert!((head.predict_row(&[1.0, 1.0]).unwrap() - 4.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearHead {
    coefficients: Vec<f32>,
    intercept: f32,
}

impl LinearHead {
    /// Fits the head on feature rows and targets via normal equations.
    ///
    /// # Errors
    /// Fails on empty or ragged input, and with
    /// [`RetenerError::SingularMatrix`] when the features are linearly
    /// dependent.
    pub fn fit(rows: &[Vec<f32>], targets: &[f32]) -> Result<Self> {
        if rows.is_empty() {
            return Err(RetenerError::empty_input("linear head training data"));
        }
        if rows.len() != targets.len() {
            return Err(RetenerError::dimension_mismatch(
                "targets",
                rows.len(),
                targets.len(),
            ));
        }
        let k = rows[0].len();
        for row in rows {
            if row.len() != k {
                return Err(RetenerError::dimension_mismatch("features", k, row.len()));
            }
        }

        // Augmented system with the intercept as the last coordinate:
        // solve (XtX) w = Xt y in f64 for a stable factorization.
        let n = k + 1;
        let mut xtx = vec![vec![0.0f64; n]; n];
        let mut xty = vec![0.0f64; n];
        for (row, &t) in rows.iter().zip(targets) {
            let augmented: Vec<f64> = row
                .iter()
                .map(|&v| f64::from(v))
                .chain(std::iter::once(1.0))
                .collect();
            for i in 0..n {
                for j in 0..n {
                    xtx[i][j] += augmented[i] * augmented[j];
                }
                xty[i] += augmented[i] * f64::from(t);
            }
        }

        let solution = cholesky_solve(&xtx, &xty)?;
        Ok(Self {
            coefficients: solution[..k].iter().map(|&v| v as f32).collect(),
            intercept: solution[k] as f32,
        })
    }

    /// Applies the fitted map to one feature row.
    ///
    /// # Errors
    /// Fails when the row length doesn't match the fitted coefficients.
    pub fn predict_row(&self, row: &[f32]) -> Result<f32> {
        if row.len() != self.coefficients.len() {
            return Err(RetenerError::dimension_mismatch(
                "features",
                self.coefficients.len(),
                row.len(),
            ));
        }
        let dot: f32 = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.intercept)
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }
}

/// Solves `A x = b` for symmetric positive-definite `A` via Cholesky.
fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    let mut l = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 1e-12 {
                    return Err(RetenerError::SingularMatrix { det: sum });
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward then backward substitution.
    let mut y = vec![0.0f64; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }
    let mut x = vec![0.0f64; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in i + 1..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }
    Ok(x)
}
