//! # Logistic Regression by IRLS
//!
//! Fits `logit P(y = 1) = X β` for a binary outcome with iteratively reweighted
//! least squares. Each iteration solves the weighted normal equations
//! `XᵀWX β = XᵀWz` by Cholesky factorization, where `W = diag(μ(1-μ))` and
//! `z = η + (y - μ) / w` is the working response.
//!
//! The loop follows the classic GLM recipe:
//!
//! 1. Start from `β = 0` (all fitted probabilities 0.5).
//! 2. Propose the weighted least squares solution.
//! 3. Halve the step while the deviance is non-finite or has increased.
//! 4. Stop when `|dev - dev_old| / (|dev| + 0.1)` drops below the tolerance.
//!
//! Fitted probabilities are clamped away from 0 and 1 inside the solver only.
//! `LogitFit::predict` returns the exact logistic transform, so callers can see
//! a probability that underflows to zero.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{InverseC, SolveC};
use serde::{Deserialize, Serialize};
use statrs::function::erf::{erf_inv, erfc};
use std::f64::consts::SQRT_2;
use thiserror::Error;

const MIN_WEIGHT: f64 = 1e-6;
const PROB_EPS: f64 = 1e-8;
const MAX_STEP_HALVINGS: usize = 30;
/// Fitted probabilities within this distance of the outcome count as a boundary fit.
const SEPARATION_EPS: f64 = 1e-6;

/// Controls for the IRLS loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

#[derive(Error, Debug)]
pub enum FitError {
    #[error("A linear system solve failed. The information matrix may be singular. Error: {0}")]
    LinearSystemSolveFailed(LinalgError),

    #[error(
        "IRLS did not converge within {max_iterations} iterations. Last relative deviance change was {last_change:.6e}."
    )]
    DidNotConverge {
        max_iterations: usize,
        last_change: f64,
    },

    #[error("IRLS became unstable at iteration {iteration}: no step reduced the deviance.")]
    Unstable { iteration: usize },

    #[error(
        "Perfect separation detected at iteration {iteration}: the covariates predict the outcome exactly and the maximum likelihood estimate does not exist."
    )]
    PerfectSeparation { iteration: usize },

    #[error("Invalid input to the logistic fit: {0}")]
    InvalidInput(String),
}

/// A converged logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitFit {
    pub labels: Vec<String>,
    pub coefficients: Array1<f64>,
    pub standard_errors: Array1<f64>,
    /// Inverse of the Fisher information at the estimate.
    pub covariance: Array2<f64>,
    /// `-2 ×` log-likelihood.
    pub deviance: f64,
    /// Deviance of the model that predicts the sample proportion for everyone.
    pub null_deviance: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub iterations: usize,
    pub n_observations: usize,
    pub df_residual: usize,
    /// Records whose fitted probability is numerically 0 or 1.
    pub boundary_fits: usize,
}

impl LogitFit {
    pub fn z_scores(&self) -> Array1<f64> {
        &self.coefficients / &self.standard_errors
    }

    /// Two-sided p-values against the standard normal reference.
    pub fn p_values(&self) -> Array1<f64> {
        self.z_scores().mapv(two_sided_p_value)
    }

    /// Wald confidence intervals, one `(lower, upper)` row per coefficient.
    pub fn confidence_intervals(&self, level: f64) -> Result<Array2<f64>, FitError> {
        let z = normal_critical_value(level)?;
        let mut intervals = Array2::zeros((self.coefficients.len(), 2));
        Zip::from(intervals.rows_mut())
            .and(&self.coefficients)
            .and(&self.standard_errors)
            .for_each(|mut row, &b, &se| {
                row[0] = b - z * se;
                row[1] = b + z * se;
            });
        Ok(intervals)
    }

    pub fn linear_predictor(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, FitError> {
        if x.ncols() != self.coefficients.len() {
            return Err(FitError::InvalidInput(format!(
                "design has {} columns but the model has {} coefficients",
                x.ncols(),
                self.coefficients.len()
            )));
        }
        Ok(x.dot(&self.coefficients))
    }

    /// Exact fitted probabilities `1 / (1 + exp(-η))`, without clamping.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, FitError> {
        Ok(self
            .linear_predictor(x)?
            .mapv(|eta| 1.0 / (1.0 + (-eta).exp())))
    }
}

/// `P(|Z| ≥ |z|)` for a standard normal `Z`.
pub fn two_sided_p_value(z: f64) -> f64 {
    erfc(z.abs() / SQRT_2)
}

/// The `(1 + level) / 2` quantile of the standard normal.
pub fn normal_critical_value(level: f64) -> Result<f64, FitError> {
    if !(level > 0.0 && level < 1.0) {
        return Err(FitError::InvalidInput(format!(
            "confidence level must lie in (0, 1), got {level}"
        )));
    }
    Ok(SQRT_2 * erf_inv(level))
}

/// Fits a logistic regression of the binary outcome `y` on the columns of `x`.
pub fn fit_logistic(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    labels: &[String],
    options: &FitOptions,
) -> Result<LogitFit, FitError> {
    validate_inputs(x, y, labels, options)?;
    let n = x.nrows();
    let p = x.ncols();

    log::info!("Starting IRLS fit with {n} observations and {p} coefficients");

    let mut beta = Array1::<f64>::zeros(p);
    let mut eta = x.dot(&beta);
    let (mut mu, mut weights, mut z) = update_glm_vectors(y, &eta);
    let mut last_deviance = calculate_deviance(y, &mu);
    let mut last_change = f64::INFINITY;
    let mut converged_at = None;

    for iter in 1..=options.max_iterations {
        let beta_current = beta.clone();
        let deviance_current = last_deviance;

        let mut beta_trial = solve_weighted_least_squares(x, z.view(), weights.view())?;
        if !beta_trial.iter().all(|b| b.is_finite()) {
            log::error!("Non-finite coefficients at iteration {iter}: {beta_trial:?}");
            return Err(FitError::Unstable { iteration: iter });
        }

        let mut eta_trial = x.dot(&beta_trial);
        let (mut mu_trial, _, _) = update_glm_vectors(y, &eta_trial);
        let mut deviance_trial = calculate_deviance(y, &mu_trial);

        // Divergence threshold as in mgcv: tolerate rounding noise near the optimum.
        let threshold = 10.0 * (0.1 + deviance_current.abs()) * f64::EPSILON.sqrt();
        let step_is_bad =
            |dev: f64| !dev.is_finite() || dev - deviance_current > threshold;

        let mut step_halving_count = 0;
        while step_is_bad(deviance_trial) && step_halving_count < MAX_STEP_HALVINGS {
            beta_trial = &beta_current + 0.5 * (&beta_trial - &beta_current);
            eta_trial = x.dot(&beta_trial);
            mu_trial = update_glm_vectors(y, &eta_trial).0;
            deviance_trial = calculate_deviance(y, &mu_trial);
            step_halving_count += 1;
            log::debug!(
                "Step halving #{} | current: {:.8e}, trial: {:.8e}",
                step_halving_count,
                deviance_current,
                deviance_trial
            );
        }

        if step_is_bad(deviance_trial) {
            log::warn!("IRLS failed to find a valid step after {step_halving_count} halvings");
            return Err(FitError::Unstable { iteration: iter });
        }

        beta = beta_trial;
        eta = eta_trial;
        let (mu_next, weights_next, z_next) = update_glm_vectors(y, &eta);
        mu = mu_next;
        weights = weights_next;
        z = z_next;
        last_deviance = deviance_trial;

        if count_boundary_fits(y, &mu) == n {
            log::warn!("All fitted probabilities sit on the outcome at iteration {iter}");
            return Err(FitError::PerfectSeparation { iteration: iter });
        }

        last_change = (last_deviance - deviance_current).abs() / (last_deviance.abs() + 0.1);
        log::debug!(
            "[IRLS Iter #{}] deviance: {:.10e}, relative change: {:.3e}",
            iter,
            last_deviance,
            last_change
        );

        if last_change < options.tolerance {
            converged_at = Some(iter);
            break;
        }
    }

    // A linear predictor that ranks every y = 1 record above every y = 0
    // record means the maximum likelihood estimate does not exist.
    if separates_outcome(y, &eta) {
        let iteration = converged_at.unwrap_or(options.max_iterations);
        log::warn!(
            "The linear predictor separates the outcome completely after {iteration} iterations (deviance {last_deviance:.3e})"
        );
        return Err(FitError::PerfectSeparation { iteration });
    }

    let Some(iterations) = converged_at else {
        return Err(FitError::DidNotConverge {
            max_iterations: options.max_iterations,
            last_change,
        });
    };

    let boundary_fits = count_boundary_fits(y, &mu);
    if boundary_fits > 0 {
        log::warn!(
            "{boundary_fits} fitted probabilities are numerically 0 or 1; the covariates nearly separate the outcome"
        );
    }

    let xw = &x * &weights.view().insert_axis(Axis(1));
    let information = xw.t().dot(&x);
    let covariance = information
        .invc()
        .map_err(FitError::LinearSystemSolveFailed)?;
    let standard_errors = covariance.diag().mapv(|v| v.max(0.0).sqrt());

    let y_mean = y.sum() / n as f64;
    let null_deviance = calculate_deviance(y, &Array1::from_elem(n, y_mean.clamp(PROB_EPS, 1.0 - PROB_EPS)));

    log::info!("IRLS converged in {iterations} iterations with deviance {last_deviance:.6}");

    Ok(LogitFit {
        labels: labels.to_vec(),
        coefficients: beta,
        standard_errors,
        covariance,
        deviance: last_deviance,
        null_deviance,
        log_likelihood: -0.5 * last_deviance,
        aic: last_deviance + 2.0 * p as f64,
        iterations,
        n_observations: n,
        df_residual: n.saturating_sub(p),
        boundary_fits,
    })
}

fn validate_inputs(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    labels: &[String],
    options: &FitOptions,
) -> Result<(), FitError> {
    let invalid = |msg: String| Err(FitError::InvalidInput(msg));

    if x.nrows() == 0 || x.ncols() == 0 {
        return invalid(format!("empty design matrix with shape {:?}", x.shape()));
    }
    if x.nrows() != y.len() {
        return invalid(format!(
            "design has {} rows but the outcome has {} entries",
            x.nrows(),
            y.len()
        ));
    }
    if labels.len() != x.ncols() {
        return invalid(format!(
            "{} labels supplied for {} design columns",
            labels.len(),
            x.ncols()
        ));
    }
    if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
        return invalid(format!("outcome must be 0 or 1, found {bad}"));
    }
    let positives = y.iter().filter(|&&v| v == 1.0).count();
    if positives == 0 || positives == y.len() {
        return invalid(format!(
            "outcome is constant ({positives} of {} records are 1)",
            y.len()
        ));
    }
    if !x.iter().all(|v| v.is_finite()) {
        return invalid("design matrix contains non-finite values".to_string());
    }
    if options.max_iterations == 0 || !(options.tolerance.is_finite() && options.tolerance > 0.0) {
        return invalid(format!(
            "max_iterations must be positive and tolerance a positive finite number, got {options:?}"
        ));
    }
    Ok(())
}

/// Fitted probabilities, IRLS weights and working response for a linear predictor.
pub fn update_glm_vectors(
    y: ArrayView1<f64>,
    eta: &Array1<f64>,
) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    // Clamp eta to prevent overflow in exp
    let eta_clamped = eta.mapv(|e| e.clamp(-700.0, 700.0));
    let mut mu = eta_clamped.mapv(|e| 1.0 / (1.0 + (-e).exp()));
    mu.mapv_inplace(|v| v.clamp(PROB_EPS, 1.0 - PROB_EPS));
    let weights = (&mu * (1.0 - &mu)).mapv(|v| v.max(MIN_WEIGHT));

    let residual = &y - &mu;
    let z = &eta_clamped + &(&residual / &weights);

    (mu, weights, z)
}

/// Binomial deviance for a 0/1 outcome.
pub fn calculate_deviance(y: ArrayView1<f64>, mu: &Array1<f64>) -> f64 {
    let log_likelihood = Zip::from(y).and(mu).fold(0.0, |acc, &yi, &mui| {
        let mui_c = mui.clamp(PROB_EPS, 1.0 - PROB_EPS);
        if yi > 0.5 {
            acc + mui_c.ln()
        } else {
            acc + (1.0 - mui_c).ln()
        }
    });
    -2.0 * log_likelihood
}

/// True when some threshold on `eta` splits the outcomes exactly.
fn separates_outcome(y: ArrayView1<f64>, eta: &Array1<f64>) -> bool {
    let mut max_zero = f64::NEG_INFINITY;
    let mut min_one = f64::INFINITY;
    for (&yi, &e) in y.iter().zip(eta.iter()) {
        if yi > 0.5 {
            min_one = min_one.min(e);
        } else {
            max_zero = max_zero.max(e);
        }
    }
    min_one > max_zero
}

fn count_boundary_fits(y: ArrayView1<f64>, mu: &Array1<f64>) -> usize {
    Zip::from(y)
        .and(mu)
        .fold(0, |acc, &yi, &mui| {
            if (yi - mui).abs() < SEPARATION_EPS {
                acc + 1
            } else {
                acc
            }
        })
}

fn solve_weighted_least_squares(
    x: ArrayView2<f64>,
    z: ArrayView1<f64>,
    weights: ArrayView1<f64>,
) -> Result<Array1<f64>, FitError> {
    let xw = &x * &weights.insert_axis(Axis(1));
    let xtwx = xw.t().dot(&x);
    let xtwz = xw.t().dot(&z);
    xtwx.solvec(&xtwz)
        .map_err(FitError::LinearSystemSolveFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::{Distribution, StandardNormal};

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn logit(p: f64) -> f64 {
        (p / (1.0 - p)).ln()
    }

    #[test]
    fn intercept_only_matches_closed_form() {
        let y = array![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let x = Array2::ones((10, 1));
        let fit = fit_logistic(x.view(), y.view(), &labels(&["Intercept"]), &FitOptions::default())
            .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], logit(0.3), epsilon = 1e-5);
        let expected_se = 1.0 / (10.0 * 0.3 * 0.7_f64).sqrt();
        assert_abs_diff_eq!(fit.standard_errors[0], expected_se, epsilon = 1e-5);
        assert_abs_diff_eq!(fit.deviance, fit.null_deviance, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.log_likelihood, -0.5 * fit.deviance, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.aic, fit.deviance + 2.0, epsilon = 1e-12);
        assert_eq!(fit.df_residual, 9);
        assert_eq!(fit.boundary_fits, 0);
    }

    #[test]
    fn saturated_binary_covariate_recovers_group_proportions() {
        // Group 0: 8 of 10 observed. Group 1: 4 of 10 observed.
        let mut x = Array2::ones((20, 2));
        let mut y = Array1::zeros(20);
        for i in 0..20 {
            let group = if i < 10 { 0.0 } else { 1.0 };
            x[[i, 1]] = group;
            let within = i % 10;
            y[i] = if (group == 0.0 && within < 8) || (group == 1.0 && within < 4) {
                1.0
            } else {
                0.0
            };
        }

        let fit = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "group"]),
            &FitOptions::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], logit(0.8), epsilon = 1e-5);
        assert_abs_diff_eq!(fit.coefficients[1], logit(0.4) - logit(0.8), epsilon = 1e-5);

        let probs = fit.predict(x.view()).unwrap();
        assert_abs_diff_eq!(probs[0], 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(probs[19], 0.4, epsilon = 1e-6);
        assert!(fit.deviance < fit.null_deviance);
    }

    #[test]
    fn recovers_coefficients_from_simulated_data() {
        let n = 5000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut x = Array2::ones((n, 3));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let a: f64 = StandardNormal.sample(&mut rng);
            let b = if rng.r#gen::<f64>() < 0.5 { 1.0 } else { 0.0 };
            x[[i, 1]] = a;
            x[[i, 2]] = b;
            let prob = 1.0 / (1.0 + (-(0.5 + 1.0 * a - 0.8 * b)).exp());
            y[i] = if rng.r#gen::<f64>() < prob { 1.0 } else { 0.0 };
        }

        let fit = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "a", "b"]),
            &FitOptions::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], 0.5, epsilon = 0.2);
        assert_abs_diff_eq!(fit.coefficients[1], 1.0, epsilon = 0.2);
        assert_abs_diff_eq!(fit.coefficients[2], -0.8, epsilon = 0.2);

        let z = fit.z_scores();
        let p = fit.p_values();
        let ci = fit.confidence_intervals(0.95).unwrap();
        for j in 0..3 {
            assert_abs_diff_eq!(z[j], fit.coefficients[j] / fit.standard_errors[j], epsilon = 1e-12);
            assert!(p[j] < 1e-3, "strong effects should be significant, got p = {}", p[j]);
            assert!(ci[[j, 0]] < fit.coefficients[j] && fit.coefficients[j] < ci[[j, 1]]);
        }
        assert!(fit.iterations > 1 && fit.iterations < 25);
    }

    #[test]
    fn rejects_perfect_separation() {
        let n = 20;
        let mut x = Array2::ones((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            x[[i, 1]] = i as f64;
            y[i] = if i >= 10 { 1.0 } else { 0.0 };
        }
        let err = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "x"]),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, FitError::PerfectSeparation { .. }),
            "expected separation, got {err:?}"
        );
    }

    #[test]
    fn rejects_separation_when_the_deviance_settles_first() {
        // At this size the relative deviance change falls below the tolerance
        // while a few records are still away from the boundary.
        let n = 547;
        let mut x = Array2::ones((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            x[[i, 1]] = i as f64 / n as f64 * 10.0;
            y[i] = if i >= n / 10 { 1.0 } else { 0.0 };
        }
        let err = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "x"]),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, FitError::PerfectSeparation { .. }),
            "expected separation, got {err:?}"
        );
    }

    #[test]
    fn quasi_separation_is_reported_as_boundary_fits() {
        // Group 1 is always observed; group 0 half of the time.
        let n = 100;
        let mut x = Array2::ones((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let group = if i < 50 { 0.0 } else { 1.0 };
            x[[i, 1]] = group;
            y[i] = if group == 1.0 || i % 2 == 0 { 1.0 } else { 0.0 };
        }
        let fit = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "group"]),
            &FitOptions::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], 0.0, epsilon = 1e-5);
        assert!(fit.coefficients[1] > 10.0);
        assert_eq!(fit.boundary_fits, 50);
        let probs = fit.predict(x.view()).unwrap();
        assert_abs_diff_eq!(probs[0], 0.5, epsilon = 1e-5);
        assert!(probs[99] > 1.0 - 1e-5);
    }

    #[test]
    fn singular_information_matrix_is_reported() {
        let mut x = Array2::zeros((6, 2));
        x.column_mut(0).fill(1.0);
        let y = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let err = fit_logistic(
            x.view(),
            y.view(),
            &labels(&["Intercept", "empty"]),
            &FitOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FitError::LinearSystemSolveFailed(_)));
    }

    #[test]
    fn iteration_limit_is_reported() {
        let y = array![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![1.0, 0.3, 1.0, -1.2, 1.0, 0.8, 1.0, 2.0, 1.0, -0.4, 1.0, 1.1, 1.0, 0.1, 1.0, -2.0],
        )
        .unwrap();
        let options = FitOptions {
            max_iterations: 1,
            tolerance: 1e-12,
        };
        let err = fit_logistic(x.view(), y.view(), &labels(&["Intercept", "x"]), &options)
            .unwrap_err();
        assert!(matches!(
            err,
            FitError::DidNotConverge {
                max_iterations: 1,
                ..
            }
        ));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let x = Array2::ones((3, 1));
        let opts = FitOptions::default();
        let names = labels(&["Intercept"]);

        let y = array![0.0, 2.0, 1.0];
        assert!(matches!(
            fit_logistic(x.view(), y.view(), &names, &opts),
            Err(FitError::InvalidInput(_))
        ));

        let y = array![0.0, 1.0];
        assert!(matches!(
            fit_logistic(x.view(), y.view(), &names, &opts),
            Err(FitError::InvalidInput(_))
        ));

        let y = array![0.0, 1.0, 1.0];
        assert!(matches!(
            fit_logistic(x.view(), y.view(), &labels(&["a", "b"]), &opts),
            Err(FitError::InvalidInput(_))
        ));

        let y = array![1.0, 1.0, 1.0];
        assert!(matches!(
            fit_logistic(x.view(), y.view(), &names, &opts),
            Err(FitError::InvalidInput(_))
        ));
    }

    #[test]
    fn normal_reference_values() {
        assert_abs_diff_eq!(two_sided_p_value(1.959963984540054), 0.05, epsilon = 1e-9);
        assert_abs_diff_eq!(two_sided_p_value(0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            normal_critical_value(0.95).unwrap(),
            1.959963984540054,
            epsilon = 1e-9
        );
        assert!(normal_critical_value(1.0).is_err());
    }

    #[test]
    fn predict_underflows_to_exact_zero() {
        let fit = LogitFit {
            labels: labels(&["Intercept"]),
            coefficients: array![-800.0],
            standard_errors: array![1.0],
            covariance: Array2::eye(1),
            deviance: 0.0,
            null_deviance: 0.0,
            log_likelihood: 0.0,
            aic: 2.0,
            iterations: 1,
            n_observations: 1,
            df_residual: 0,
            boundary_fits: 0,
        };
        let probs = fit.predict(Array2::ones((2, 1)).view()).unwrap();
        assert_eq!(probs[0], 0.0);
        assert!(fit.predict(Array2::ones((2, 2)).view()).is_err());
    }
}
