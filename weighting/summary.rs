//! Human-readable regression summaries and the reporting hook the estimator
//! calls after each fitted model.

use crate::weighting::estimator::ModelRole;
use crate::weighting::logit::LogitFit;
use itertools::Itertools;
use ndarray::Array2;
use std::fmt;

const RULE_WIDTH: usize = 86;
const CI_LEVEL: f64 = 0.95;

/// Receives every model fitted by `IpmwEstimator::regression_models`.
///
/// Reporting has no effect on the numeric results. Any `FnMut(ModelRole, &LogitFit)`
/// closure is a reporter.
pub trait FitReporter {
    fn report(&mut self, role: ModelRole, fit: &LogitFit);
}

impl<F> FitReporter for F
where
    F: FnMut(ModelRole, &LogitFit),
{
    fn report(&mut self, role: ModelRole, fit: &LogitFit) {
        self(role, fit)
    }
}

/// Prints the summary table to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl FitReporter for ConsoleReporter {
    fn report(&mut self, role: ModelRole, fit: &LogitFit) {
        println!("{}", format_summary(Some(role), fit));
    }
}

/// Emits the summary table through the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl FitReporter for LogReporter {
    fn report(&mut self, role: ModelRole, fit: &LogitFit) {
        for line in format_summary(Some(role), fit).lines() {
            log::debug!("{line}");
        }
    }
}

/// Renders the coefficient table and fit statistics of one model.
pub fn format_summary(role: Option<ModelRole>, fit: &LogitFit) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let label_width = fit
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(12);

    let z = fit.z_scores();
    let p = fit.p_values();
    let ci = fit
        .confidence_intervals(CI_LEVEL)
        .unwrap_or_else(|_| Array2::from_elem((fit.coefficients.len(), 2), f64::NAN));
    let lower_q = (1.0 - CI_LEVEL) / 2.0;
    let upper_q = 1.0 - lower_q;

    let title = match role {
        Some(role) => format!("{role} model: logit P(observed) ~ {}", fit.labels.iter().join(" + ")),
        None => format!("Logit model ~ {}", fit.labels.iter().join(" + ")),
    };

    let mut lines = vec![
        heavy.clone(),
        title,
        light.clone(),
        format!(
            "{:<label_width$} {:>11} {:>10} {:>9} {:>8} {:>11} {:>11}",
            "",
            "coef",
            "std err",
            "z",
            "P>|z|",
            format!("[{lower_q:.3}"),
            format!("{upper_q:.3}]"),
        ),
    ];
    lines.extend(fit.labels.iter().enumerate().map(|(j, label)| {
        format!(
            "{:<label_width$} {:>11.4} {:>10.4} {:>9.3} {:>8.4} {:>11.4} {:>11.4}",
            label,
            fit.coefficients[j],
            fit.standard_errors[j],
            z[j],
            p[j],
            ci[[j, 0]],
            ci[[j, 1]],
        )
    }));
    lines.push(light);
    lines.push(format!(
        "No. observations: {:<12} Df residuals: {}",
        fit.n_observations, fit.df_residual
    ));
    lines.push(format!(
        "Deviance: {:<20.4} Null deviance: {:.4}",
        fit.deviance, fit.null_deviance
    ));
    lines.push(format!(
        "Log-likelihood: {:<14.4} AIC: {:.4}",
        fit.log_likelihood, fit.aic
    ));
    lines.push(format!("IRLS iterations: {}", fit.iterations));
    if fit.boundary_fits > 0 {
        lines.push(format!(
            "Warning: {} fitted probabilities are numerically 0 or 1 (quasi-separation).",
            fit.boundary_fits
        ));
    }
    lines.push(heavy);
    lines.join("\n")
}

impl fmt::Display for LogitFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_summary(None, self))
    }
}
