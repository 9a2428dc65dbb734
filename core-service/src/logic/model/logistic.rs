//! Logistic Regression - L2-regularized, fit by Newton-Raphson
//!
//! Minimizes `C · Σ logloss + ½‖w‖²` (intercept not penalized).
//! Input is expected to be standardized already.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::pipeline::TrainingFailure;

/// Newton step size below which the fit is considered converged
const TOLERANCE: f64 = 1e-8;

/// Keeps the intercept row of the Hessian invertible when predictions saturate
const INTERCEPT_RIDGE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub n_iter: usize,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Gaussian elimination with partial pivoting. `None` if singular.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

impl LogisticRegression {
    pub fn fit(x: ArrayView2<f64>, y: &[u8], c: f64, max_iter: usize) -> Result<Self, TrainingFailure> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(TrainingFailure::EmptyTrainingSet);
        }
        if let Some(only) = single_class(y) {
            return Err(TrainingFailure::SingleClass(only));
        }

        let lambda = 1.0 / c;
        let dim = n_features + 1;

        // Design matrix with a leading intercept column
        let mut design = Array2::<f64>::ones((n_samples, dim));
        design.slice_mut(s![.., 1..]).assign(&x);
        let targets: Array1<f64> = y.iter().map(|&v| f64::from(v)).collect();

        let mut beta = Array1::<f64>::zeros(dim);
        let mut converged = false;
        let mut n_iter = 0;

        while n_iter < max_iter {
            n_iter += 1;

            let probs = design.dot(&beta).mapv(sigmoid);
            let mut gradient = design.t().dot(&(&probs - &targets));
            let weights = probs.mapv(|p| p * (1.0 - p));

            let weighted = &design * &weights.view().insert_axis(ndarray::Axis(1));
            let mut hessian = design.t().dot(&weighted);

            hessian[[0, 0]] += INTERCEPT_RIDGE;
            for j in 1..dim {
                gradient[j] += lambda * beta[j];
                hessian[[j, j]] += lambda;
            }

            let step = solve(hessian, gradient).ok_or_else(|| {
                TrainingFailure::NumericalInstability("singular Hessian".to_string())
            })?;
            beta -= &step;

            if beta.iter().any(|v| !v.is_finite()) {
                return Err(TrainingFailure::NumericalInstability(
                    "non-finite coefficients".to_string(),
                ));
            }
            if step.iter().fold(0.0f64, |m, v| m.max(v.abs())) < TOLERANCE {
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!("Logistic regression did not converge in {} iterations", max_iter);
        }

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.slice(s![1..]).to_vec(),
            n_iter,
        })
    }

    pub fn decision_function(&self, row: ArrayView1<f64>) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }

    pub fn predict(&self, row: ArrayView1<f64>) -> u8 {
        u8::from(self.decision_function(row) > 0.0)
    }
}

/// `Some(label)` when every target is the same label
pub(crate) fn single_class(y: &[u8]) -> Option<u8> {
    let first = *y.first()?;
    y.iter().all(|&v| v == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separates_linear_data() {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = [0, 0, 0, 0, 1, 1, 1, 1];
        let model = LogisticRegression::fit(x.view(), &y, 1.0, 1000).unwrap();

        assert!(model.coefficients[0] > 0.0);
        for (row, &label) in x.rows().into_iter().zip(&y) {
            assert_eq!(model.predict(row), label);
        }
        assert!(sigmoid(model.decision_function(array![3.0].view())) > 0.9);
    }

    #[test]
    fn test_single_class_fails() {
        let x = array![[1.0], [2.0]];
        let result = LogisticRegression::fit(x.view(), &[1, 1], 1.0, 100);
        assert_eq!(result, Err(TrainingFailure::SingleClass(1)));
    }

    #[test]
    fn test_deterministic() {
        let x = array![[0.1, 1.0], [0.4, -1.0], [-0.3, 0.5], [0.9, 0.2], [-1.2, -0.7]];
        let y = [0, 1, 0, 1, 0];
        let a = LogisticRegression::fit(x.view(), &y, 1.0, 1000).unwrap();
        let b = LogisticRegression::fit(x.view(), &y, 1.0, 1000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_solve() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![3.0, 5.0];
        let x = solve(a, b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);

        assert!(solve(array![[1.0, 2.0], [2.0, 4.0]], array![1.0, 2.0]).is_none());
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }
}
