// weighting/estimator.rs

//! # Inverse Probability of Missing Weights
//!
//! Weights each record by the inverse of its estimated probability of having the
//! missing variable observed, so that observed records also stand in for similar
//! unobserved ones. Under missing-at-random this removes the bias of complete-case
//! summaries of the missing variable.
//!
//! The estimator is used in three steps:
//!
//! 1.  Construction validates the dataset and derives the observation indicator.
//! 2.  `regression_models` fits the denominator model `P(observed | covariates)`
//!     on every record and, for stabilized weights, a numerator model (by default the
//!     marginal probability of observation).
//! 3.  `fit` turns the predicted probabilities into weights,
//!     `1 / p̂` or `q̂ / p̂`, one per record in input order.

use crate::weighting::data::{DataError, Dataset};
use crate::weighting::formula::{DesignMatrix, Formula, FormulaError};
use crate::weighting::logit::{FitError, FitOptions, LogitFit, fit_logistic};
use crate::weighting::summary::FitReporter;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use thiserror::Error;

/// Which of the two observation models a result or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelRole {
    /// `P(observed | denominator covariates)`, the probability in the weight's denominator.
    Denominator,
    /// `P(observed | numerator covariates)`, used only for stabilized weights.
    Numerator,
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRole::Denominator => write!(f, "Denominator"),
            ModelRole::Numerator => write!(f, "Numerator"),
        }
    }
}

/// A comprehensive error type for the weighting workflow.
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Invalid estimator configuration: {0}")]
    Configuration(String),

    #[error("Invalid covariate specification for the {model} model: {source}")]
    Formula {
        model: ModelRole,
        #[source]
        source: FormulaError,
    },

    #[error("Weights were requested before the observation models were fitted. Call regression_models() first.")]
    Sequencing,

    #[error("The {model} model could not be fitted: {source}")]
    FitFailure {
        model: ModelRole,
        #[source]
        source: FitError,
    },

    #[error(
        "Record {record} has a predicted probability of observation of {probability}, giving weight {weight}; weights must be finite and positive."
    )]
    NumericDomain {
        record: usize,
        probability: f64,
        weight: f64,
    },
}

/// The fitted observation models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModels {
    pub missing_variable: String,
    pub stabilized: bool,
    pub denominator_formula: Formula,
    pub denominator: LogitFit,
    pub numerator_formula: Option<Formula>,
    pub numerator: Option<LogitFit>,
}

/// Custom error type for saving and loading fitted models.
#[derive(Error, Debug)]
pub enum ModelIoError {
    #[error("Failed to read or write model file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML model file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize models to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

impl FittedModels {
    /// Saves the fitted models to a TOML file.
    pub fn save(&self, path: &str) -> Result<(), ModelIoError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    /// Loads fitted models from a TOML file.
    pub fn load(path: &str) -> Result<Self, ModelIoError> {
        let toml_string = fs::read_to_string(path)?;
        let models = toml::from_str(&toml_string)?;
        Ok(models)
    }
}

/// IPMW for one variable with missing values.
#[derive(Debug)]
pub struct IpmwEstimator {
    data: Dataset,
    missing_variable: String,
    stabilized: bool,
    observed: Array1<f64>,
    options: FitOptions,
    models: Option<FittedModels>,
    weights: Option<Array1<f64>>,
}

impl IpmwEstimator {
    /// Validates the dataset and builds the observation indicator.
    ///
    /// Fails when the missing variable is absent, or when it is never missing or
    /// always missing: in both cases the observation model has nothing to separate.
    pub fn new(
        data: Dataset,
        missing_variable: &str,
        stabilized: bool,
    ) -> Result<Self, EstimatorError> {
        let observed = data.observation_indicator(missing_variable).map_err(|e| match e {
            DataError::ColumnNotFound(c) => EstimatorError::Configuration(format!(
                "the missing variable '{c}' is not a column of the dataset"
            )),
            other => EstimatorError::Configuration(other.to_string()),
        })?;

        let n = observed.len();
        let n_observed = observed.iter().filter(|&&r| r == 1.0).count();
        if n_observed == n {
            return Err(EstimatorError::Configuration(format!(
                "'{missing_variable}' has no missing values, so there is nothing to weight"
            )));
        }
        if n_observed == 0 {
            return Err(EstimatorError::Configuration(format!(
                "'{missing_variable}' is missing for every record"
            )));
        }

        log::info!(
            "IPMW for '{}': {} of {} records observed ({} missing), {} weights",
            missing_variable,
            n_observed,
            n,
            n - n_observed,
            if stabilized { "stabilized" } else { "unstabilized" }
        );

        Ok(Self {
            data,
            missing_variable: missing_variable.to_string(),
            stabilized,
            observed,
            options: FitOptions::default(),
            models: None,
            weights: None,
        })
    }

    /// Overrides the IRLS settings used by `regression_models`.
    pub fn with_fit_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    /// Fits the denominator model and, for stabilized weights, the numerator model.
    ///
    /// `numerator` defaults to the intercept-only model. It is ignored for
    /// unstabilized weights. `reporter` is invoked once per fitted model.
    pub fn regression_models(
        &mut self,
        denominator: &Formula,
        numerator: Option<&Formula>,
        mut reporter: Option<&mut dyn FitReporter>,
    ) -> Result<&FittedModels, EstimatorError> {
        self.models = None;
        self.weights = None;

        let denominator_fit = self.fit_observation_model(ModelRole::Denominator, denominator)?;
        if let Some(reporter) = reporter.as_deref_mut() {
            reporter.report(ModelRole::Denominator, &denominator_fit);
        }

        let (numerator_formula, numerator_fit) = if self.stabilized {
            let formula = numerator.cloned().unwrap_or_else(Formula::intercept_only);
            let fit = self.fit_observation_model(ModelRole::Numerator, &formula)?;
            if let Some(reporter) = reporter.as_deref_mut() {
                reporter.report(ModelRole::Numerator, &fit);
            }
            (Some(formula), Some(fit))
        } else {
            if let Some(formula) = numerator {
                log::warn!(
                    "Numerator model '{formula}' is ignored because weights are not stabilized"
                );
            }
            (None, None)
        };

        Ok(&*self.models.insert(FittedModels {
            missing_variable: self.missing_variable.clone(),
            stabilized: self.stabilized,
            denominator_formula: denominator.clone(),
            denominator: denominator_fit,
            numerator_formula,
            numerator: numerator_fit,
        }))
    }

    /// Computes one weight per record from the fitted models.
    pub fn fit(&mut self) -> Result<&Array1<f64>, EstimatorError> {
        self.weights = None;
        let models = self.models.as_ref().ok_or(EstimatorError::Sequencing)?;

        let p_hat = self.predict_observation(
            ModelRole::Denominator,
            &models.denominator_formula,
            &models.denominator,
        )?;
        let q_hat = match (&models.numerator_formula, &models.numerator) {
            (Some(formula), Some(fit)) => {
                Some(self.predict_observation(ModelRole::Numerator, formula, fit)?)
            }
            _ => None,
        };

        let weights = inverse_probability_weights(p_hat.view(), q_hat.as_ref().map(|q| q.view()))?;
        log::info!(
            "Computed {} weights; observed-record weight sum {:.4}",
            weights.len(),
            weights
                .iter()
                .zip(self.observed.iter())
                .filter(|&(_, &r)| r == 1.0)
                .map(|(&w, _)| w)
                .sum::<f64>()
        );

        Ok(&*self.weights.insert(weights))
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    /// The weights of observed records only, in input order.
    pub fn observed_weights(&self) -> Option<Array1<f64>> {
        let weights = self.weights.as_ref()?;
        Some(
            weights
                .iter()
                .zip(self.observed.iter())
                .filter(|&(_, &r)| r == 1.0)
                .map(|(&w, _)| w)
                .collect(),
        )
    }

    /// 1.0 where the missing variable is present, 0.0 otherwise.
    pub fn observed(&self) -> &Array1<f64> {
        &self.observed
    }

    pub fn models(&self) -> Option<&FittedModels> {
        self.models.as_ref()
    }

    pub fn missing_variable(&self) -> &str {
        &self.missing_variable
    }

    pub fn is_stabilized(&self) -> bool {
        self.stabilized
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    fn fit_observation_model(
        &self,
        role: ModelRole,
        formula: &Formula,
    ) -> Result<LogitFit, EstimatorError> {
        let design = self.resolve(role, formula)?;
        log::info!("Fitting {role} model: observed ~ {formula}");
        fit_logistic(
            design.x.view(),
            self.observed.view(),
            &design.labels,
            &self.options,
        )
        .map_err(|source| EstimatorError::FitFailure {
            model: role,
            source,
        })
    }

    fn predict_observation(
        &self,
        role: ModelRole,
        formula: &Formula,
        fit: &LogitFit,
    ) -> Result<Array1<f64>, EstimatorError> {
        let design = self.resolve(role, formula)?;
        fit.predict(design.x.view())
            .map_err(|source| EstimatorError::FitFailure {
                model: role,
                source,
            })
    }

    fn resolve(
        &self,
        role: ModelRole,
        formula: &Formula,
    ) -> Result<DesignMatrix, EstimatorError> {
        if formula.references(&self.missing_variable) {
            return Err(EstimatorError::Formula {
                model: role,
                source: FormulaError::MissingVariableAsCovariate(self.missing_variable.clone()),
            });
        }
        formula
            .design_matrix(&self.data)
            .map_err(|source| EstimatorError::Formula {
                model: role,
                source,
            })
    }
}

/// `1 / p̂` or, with a numerator, `q̂ / p̂`. Any weight that is not finite and
/// strictly positive is an error.
fn inverse_probability_weights(
    p_hat: ArrayView1<f64>,
    q_hat: Option<ArrayView1<f64>>,
) -> Result<Array1<f64>, EstimatorError> {
    let mut weights = Array1::zeros(p_hat.len());
    for (record, &p) in p_hat.iter().enumerate() {
        let numerator = match &q_hat {
            Some(q) => q[record],
            None => 1.0,
        };
        let w = numerator / p;
        if p == 0.0 || !w.is_finite() || w <= 0.0 {
            return Err(EstimatorError::NumericDomain {
                record,
                probability: p,
                weight: w,
            });
        }
        weights[record] = w;
    }
    Ok(weights)
}
