//! Binary logistic regression
//!
//! Minimises `0.5 * ||w||^2 + C * sum_i s_i * logloss_i` (intercept not
//! penalised) with damped Newton steps. `s_i` is the class weight of sample i.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Armijo sufficient-decrease constant for the line search
const ARMIJO: f64 = 1e-4;
const MAX_HALVINGS: usize = 60;

/// Largest gradient component accepted when the solver stops early because
/// no further progress is possible (round-off floor above `tol`)
const STALL_GRADIENT_TOL: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample counts once
    Uniform,
    /// `n_samples / (2 * n_class)` per sample
    Balanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularisation strength
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the largest gradient component is below this
    pub tol: f64,
    pub class_weight: ClassWeight,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 5000,
            tol: 1e-6,
            class_weight: ClassWeight::Balanced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Convergence details from a fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStats {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Per-sample weights for labels in {0, 1}
pub fn sample_weights(labels: &[u8], class_weight: ClassWeight) -> Result<Array1<f64>, ModelError> {
    let n = labels.len();
    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return Err(ModelError::SingleClass);
    }

    let weights = match class_weight {
        ClassWeight::Uniform => Array1::ones(n),
        ClassWeight::Balanced => {
            let w_pos = n as f64 / (2.0 * positives as f64);
            let w_neg = n as f64 / (2.0 * negatives as f64);
            labels.iter().map(|&y| if y == 1 { w_pos } else { w_neg }).collect()
        }
    };
    Ok(weights)
}

impl LogisticRegression {
    pub fn fit(
        x: &Array2<f64>,
        labels: &[u8],
        params: &LogisticParams,
    ) -> Result<(Self, FitStats), ModelError> {
        let (n, p) = x.dim();
        if n != labels.len() {
            return Err(ModelError::Shape(format!(
                "{} rows but {} labels",
                n,
                labels.len()
            )));
        }
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if let Some(bad) = labels.iter().find(|&&y| y > 1) {
            return Err(ModelError::Shape(format!("label {bad} is not 0 or 1")));
        }
        if !(params.c > 0.0) {
            return Err(ModelError::InvalidParameter(format!("C must be positive, got {}", params.c)));
        }
        if let Some((row, _)) = x
            .rows()
            .into_iter()
            .enumerate()
            .find(|(_, r)| r.iter().any(|v| !v.is_finite()))
        {
            return Err(ModelError::NonFiniteInput(row));
        }

        let weights = sample_weights(labels, params.class_weight)?;
        let y: Array1<f64> = labels.iter().map(|&v| f64::from(v)).collect();

        // Bias column appended as the last coefficient
        let mut xa = Array2::ones((n, p + 1));
        xa.slice_mut(ndarray::s![.., ..p]).assign(x);

        let objective = Objective {
            x: &xa,
            y: &y,
            weights: &weights,
            c: params.c,
        };

        let mut theta = Array1::<f64>::zeros(p + 1);
        let mut loss = objective.loss(theta.view());
        if !loss.is_finite() {
            return Err(ModelError::Diverged);
        }
        let mut stats = FitStats {
            iterations: 0,
            converged: false,
            final_loss: loss,
        };

        for iteration in 1..=params.max_iter {
            let (grad, hessian) = objective.gradient_and_hessian(theta.view());
            if !grad.iter().all(|g| g.is_finite()) {
                return Err(ModelError::Diverged);
            }
            if gradient_within(&grad, params.tol) {
                stats.converged = true;
                break;
            }
            stats.iterations = iteration;

            let step = solve(hessian, -&grad)?;
            let slope = grad.dot(&step);
            if slope >= 0.0 {
                // not a descent direction
                stats.converged = gradient_within(&grad, STALL_GRADIENT_TOL);
                break;
            }

            let mut t = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_HALVINGS {
                let candidate = &theta + &(&step * t);
                let candidate_loss = objective.loss(candidate.view());
                if candidate_loss <= loss + ARMIJO * t * slope {
                    accepted = Some((candidate, candidate_loss));
                    break;
                }
                t *= 0.5;
            }

            match accepted {
                Some((next, next_loss)) => {
                    let improvement = loss - next_loss;
                    theta = next;
                    loss = next_loss;
                    if improvement <= f64::EPSILON * loss.abs().max(1.0) {
                        stats.converged = gradient_within(&grad, STALL_GRADIENT_TOL);
                        break;
                    }
                }
                None => {
                    tracing::debug!(iteration, loss, "line search stalled");
                    stats.converged = gradient_within(&grad, STALL_GRADIENT_TOL);
                    break;
                }
            }
        }

        stats.final_loss = loss;
        if !theta.iter().all(|v| v.is_finite()) {
            return Err(ModelError::Diverged);
        }

        let intercept = theta[p];
        let coefficients = theta.slice(ndarray::s![..p]).to_vec();
        Ok((Self { coefficients, intercept }, stats))
    }

    /// Linear score `x·w + b`
    pub fn decision_function(&self, row: ArrayView1<f64>) -> f64 {
        row.iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept
    }

    /// Positive-class probability for one encoded row
    pub fn predict_proba(&self, row: ArrayView1<f64>) -> f64 {
        sigmoid(self.decision_function(row))
    }

    pub fn predict_proba_matrix(&self, x: &Array2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_proba(row)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Every gradient component is at most `tol` in magnitude
fn gradient_within(grad: &Array1<f64>, tol: f64) -> bool {
    grad.iter().all(|g| g.abs() <= tol)
}

struct Objective<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    weights: &'a Array1<f64>,
    c: f64,
}

impl Objective<'_> {
    fn penalty(theta: ArrayView1<f64>) -> f64 {
        let p = theta.len() - 1;
        0.5 * theta.slice(ndarray::s![..p]).iter().map(|w| w * w).sum::<f64>()
    }

    fn loss(&self, theta: ArrayView1<f64>) -> f64 {
        let z = self.x.dot(&theta);
        let data: f64 = z
            .iter()
            .zip(self.y)
            .zip(self.weights)
            .map(|((&z, &y), &s)| s * (softplus(z) - y * z))
            .sum();
        Self::penalty(theta) + self.c * data
    }

    fn gradient_and_hessian(&self, theta: ArrayView1<f64>) -> (Array1<f64>, Array2<f64>) {
        let p = theta.len() - 1;
        let z = self.x.dot(&theta);
        let prob = z.mapv(sigmoid);

        let residual = (&prob - self.y) * self.weights;
        let mut grad = self.x.t().dot(&residual) * self.c;
        for j in 0..p {
            grad[j] += theta[j];
        }

        let curvature = prob.mapv(|q| q * (1.0 - q)) * self.weights * self.c;
        let weighted = self.x * &curvature.insert_axis(Axis(1));
        let mut hessian = self.x.t().dot(&weighted);
        for j in 0..p {
            hessian[[j, j]] += 1.0;
        }

        (grad, hessian)
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < 1e-300 {
            return Err(ModelError::SingularSystem);
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        let diag = a[[col, col]];
        for row in col + 1..n {
            let factor = a[[row, col]] / diag;
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
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn solve_small_system() {
        let a = array![[0.0, 2.0], [3.0, 1.0]];
        let b = array![4.0, 5.0];
        let x = solve(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn balanced_weights_equalise_class_mass() {
        let labels = [1, 0, 0, 0];
        let w = sample_weights(&labels, ClassWeight::Balanced).unwrap();
        assert_eq!(w[0], 2.0);
        assert!((w[1] - 4.0 / 6.0).abs() < 1e-12);
        let positive_mass = w[0];
        let negative_mass: f64 = w.iter().skip(1).sum();
        assert!((positive_mass - negative_mass).abs() < 1e-12);
    }

    #[test]
    fn single_class_is_rejected() {
        assert!(matches!(
            sample_weights(&[0, 0, 0], ClassWeight::Balanced),
            Err(ModelError::SingleClass)
        ));
    }

    #[test]
    fn learns_a_threshold() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let labels = [0, 0, 0, 1, 0, 1, 1, 1];
        let (model, stats) = LogisticRegression::fit(&x, &labels, &LogisticParams::default()).unwrap();

        assert!(stats.converged);
        assert!(model.coefficients[0] > 0.0);
        assert!(model.predict_proba(array![0.0].view()) < 0.5);
        assert!(model.predict_proba(array![7.0].view()) > 0.5);
    }

    #[test]
    fn gradient_vanishes_at_solution() {
        let x = array![[1.0, 0.5], [2.0, -1.0], [0.5, 0.0], [3.0, 2.0], [-1.0, 1.0], [0.0, 0.0]];
        let labels = [1, 0, 0, 1, 1, 0];
        let params = LogisticParams {
            c: 0.5,
            ..LogisticParams::default()
        };
        let (model, _) = LogisticRegression::fit(&x, &labels, &params).unwrap();

        let weights = sample_weights(&labels, params.class_weight).unwrap();
        let mut grad = vec![model.coefficients[0], model.coefficients[1], 0.0];
        for (i, row) in x.rows().into_iter().enumerate() {
            let r = weights[i] * (model.predict_proba(row) - f64::from(labels[i])) * params.c;
            grad[0] += r * row[0];
            grad[1] += r * row[1];
            grad[2] += r;
        }
        assert!(grad.iter().all(|g| g.abs() < 1e-6), "gradient {grad:?}");
    }

    #[test]
    fn regularisation_keeps_separable_data_finite() {
        let x = array![[-2.0], [-1.0], [1.0], [2.0]];
        let labels = [0, 0, 1, 1];
        let (model, stats) = LogisticRegression::fit(&x, &labels, &LogisticParams::default()).unwrap();
        assert!(stats.converged);
        assert!(model.coefficients[0].is_finite());
        assert!(model.coefficients[0] > 0.0);
    }

    #[test]
    fn iteration_cap_is_not_convergence() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let labels = [0, 0, 0, 1, 0, 1, 1, 1];
        let params = LogisticParams {
            max_iter: 1,
            ..LogisticParams::default()
        };
        let (_, stats) = LogisticRegression::fit(&x, &labels, &params).unwrap();

        assert_eq!(stats.iterations, 1);
        assert!(!stats.converged);
    }

    #[test]
    fn early_stop_needs_small_gradient() {
        assert!(gradient_within(&array![1e-7, -1e-8], 1e-6));
        assert!(!gradient_within(&array![1e-7, 0.5], STALL_GRADIENT_TOL));
        assert!(!gradient_within(&array![f64::NAN], STALL_GRADIENT_TOL));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let x = array![[0.0], [f64::NAN], [2.0], [3.0]];
        assert!(matches!(
            LogisticRegression::fit(&x, &[0, 0, 1, 1], &LogisticParams::default()),
            Err(ModelError::NonFiniteInput(1))
        ));

        let x = array![[0.0], [1.0], [f64::INFINITY], [3.0]];
        assert!(matches!(
            LogisticRegression::fit(&x, &[0, 0, 1, 1], &LogisticParams::default()),
            Err(ModelError::NonFiniteInput(2))
        ));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let x = array![[0.0], [1.0]];
        assert!(matches!(
            LogisticRegression::fit(&x, &[0], &LogisticParams::default()),
            Err(ModelError::Shape(_))
        ));
    }
}
