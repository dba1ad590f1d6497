// ============================================================
// Layer 5: Logistic Regression
// ============================================================
// Binary logistic regression with an L2 penalty on the weights
// (not on the intercept), fitted by Newton's method.
//
// Objective minimised, with z_i = w·x_i + b:
//
//   f(w, b) = ½‖w‖² + C · Σ [ softplus(z_i) − y_i z_i ]
//
// Each Newton step solves H Δ = g, where
//
//   g = C · Xᵀ(p − y) + [w, 0]
//   H = C · Xᵀ S X   + diag(1, …, 1, 0),  S = diag(p(1−p))
//
// (X carries a trailing column of ones for the intercept.) The step
// is shortened by backtracking until the objective decreases
// enough (Armijo condition). The penalty keeps H positive definite
// for the weights, so the solve only fails for degenerate input.
//
// Reference: Hastie, Tibshirani & Friedman, ESL §4.4 (IRLS)

use thiserror::Error;

pub const DEFAULT_C:        f64   = 1.0;
pub const DEFAULT_MAX_ITER: usize = 100;
pub const DEFAULT_TOL:      f64   = 1e-8;

const ARMIJO:           f64   = 1e-4;
const MAX_HALVINGS:     usize = 50;
const PIVOT_EPSILON:    f64   = 1e-12;

#[derive(Error, Debug, PartialEq)]
pub enum FitError {
    #[error("cannot fit on an empty design matrix")]
    Empty,

    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("got {rows} rows but {labels} labels")]
    LabelCount { rows: usize, labels: usize },

    #[error("Newton system is singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    pub weights:    Vec<f64>,
    pub intercept:  f64,
    /// Newton iterations actually run
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticRegressionConfig {
    /// Inverse regularisation strength
    pub c:        f64,
    pub max_iter: usize,
    pub tol:      f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self { c: DEFAULT_C, max_iter: DEFAULT_MAX_ITER, tol: DEFAULT_TOL }
    }
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^z) without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

impl LogisticRegressionConfig {
    pub fn fit(&self, x: &[Vec<f64>], y: &[u8]) -> Result<LogisticRegression, FitError> {
        let n = x.len();
        if n == 0 {
            return Err(FitError::Empty);
        }
        if y.len() != n {
            return Err(FitError::LabelCount { rows: n, labels: y.len() });
        }
        let d = x[0].len();
        if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != d) {
            return Err(FitError::RaggedRows { row, expected: d, found: r.len() });
        }

        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();

        // θ = [w_0 .. w_{d-1}, b]
        let mut theta      = vec![0.0; d + 1];
        let mut objective  = self.objective(x, &targets, &theta);
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;

            let (gradient, hessian) = self.gradient_and_hessian(x, &targets, &theta);
            if max_abs(&gradient) < self.tol {
                break;
            }

            let step = solve(hessian, gradient.clone()).ok_or(FitError::Singular)?;
            let slope: f64 = gradient.iter().zip(&step).map(|(g, s)| g * s).sum();

            // Backtracking line search along −step
            let mut t = 1.0;
            let mut candidate = theta.clone();
            let mut accepted  = false;
            for _ in 0..MAX_HALVINGS {
                for ((c, &th), &s) in candidate.iter_mut().zip(&theta).zip(&step) {
                    *c = th - t * s;
                }
                let f = self.objective(x, &targets, &candidate);
                if f <= objective - ARMIJO * t * slope {
                    objective = f;
                    accepted  = true;
                    break;
                }
                t *= 0.5;
            }
            if !accepted {
                break;
            }

            let moved = t * max_abs(&step);
            theta = candidate;
            if moved < self.tol {
                break;
            }
        }

        if iterations == self.max_iter {
            tracing::warn!("Logistic regression stopped at max_iter={}", self.max_iter);
        }

        let intercept = theta.pop().unwrap_or(0.0);
        Ok(LogisticRegression { weights: theta, intercept, iterations })
    }

    fn objective(&self, x: &[Vec<f64>], y: &[f64], theta: &[f64]) -> f64 {
        let (w, b) = theta.split_at(theta.len() - 1);
        let penalty = 0.5 * w.iter().map(|v| v * v).sum::<f64>();
        let loss: f64 = x.iter()
            .zip(y)
            .map(|(row, &yi)| {
                let z = dot(w, row) + b[0];
                softplus(z) - yi * z
            })
            .sum();
        penalty + self.c * loss
    }

    fn gradient_and_hessian(
        &self,
        x:     &[Vec<f64>],
        y:     &[f64],
        theta: &[f64],
    ) -> (Vec<f64>, Vec<Vec<f64>>) {
        let k = theta.len();
        let (w, b) = theta.split_at(k - 1);

        let mut gradient = vec![0.0; k];
        let mut hessian  = vec![vec![0.0; k]; k];

        for (row, &yi) in x.iter().zip(y) {
            let p = sigmoid(dot(w, row) + b[0]);
            let r = self.c * (p - yi);
            let s = self.c * p * (1.0 - p);

            for j in 0..k {
                let xj = if j + 1 == k { 1.0 } else { row[j] };
                gradient[j] += r * xj;
                for l in 0..=j {
                    let xl = if l + 1 == k { 1.0 } else { row[l] };
                    hessian[j][l] += s * xj * xl;
                }
            }
        }

        for j in 0..k {
            for l in 0..j {
                hessian[l][j] = hessian[j][l];
            }
        }

        // L2 term, intercept excluded
        for j in 0..k - 1 {
            gradient[j]   += theta[j];
            hessian[j][j] += 1.0;
        }

        (gradient, hessian)
    }
}

impl LogisticRegression {
    /// w·x + b; positive means class 1
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        dot(&self.weights, features) + self.intercept
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision_function(features))
    }

    pub fn predict(&self, features: &[f64]) -> u8 {
        u8::from(self.decision_function(features) > 0.0)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Gaussian elimination with partial pivoting. None if singular.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
