//! Covariate specifications and their resolution into design matrices.
//!
//! A `Formula` is built by the caller as a structured list of terms. The
//! estimator only ever sees the resolved `DesignMatrix`; strings are parsed
//! (via `Term::from_str`) at the edges, in the CLI and the run configuration.

use crate::weighting::data::{DataError, Dataset};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label used for the intercept column of every design matrix.
pub const INTERCEPT_LABEL: &str = "Intercept";

/// One predictor of the observation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// The column as-is.
    Column(String),
    /// The column raised to an integer power (`age0^2`).
    Power { column: String, exponent: u32 },
    /// The product of two or more columns (`art:male`).
    Interaction(Vec<String>),
}

impl Term {
    pub fn column(name: impl Into<String>) -> Self {
        Term::Column(name.into())
    }

    pub fn power(name: impl Into<String>, exponent: u32) -> Self {
        Term::Power {
            column: name.into(),
            exponent,
        }
    }

    pub fn interaction<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Term::Interaction(names.into_iter().map(Into::into).collect())
    }

    /// The dataset columns this term reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Term::Column(name) => vec![name.as_str()],
            Term::Power { column, .. } => vec![column.as_str()],
            Term::Interaction(names) => names.iter().map(String::as_str).collect(),
        }
    }

    fn evaluate(&self, data: &Dataset) -> Result<Array1<f64>, FormulaError> {
        let complete = |name: &str| -> Result<Array1<f64>, FormulaError> {
            data.complete_column(name).map_err(|e| match e {
                DataError::ColumnNotFound(c) => FormulaError::UnknownColumn(c),
                DataError::MissingValuesFound(c) => FormulaError::MissingCovariateValues(c),
                other => FormulaError::Data(other),
            })
        };

        match self {
            Term::Column(name) => complete(name),
            Term::Power { column, exponent } => {
                let exponent = i32::try_from(*exponent)
                    .map_err(|_| FormulaError::InvalidTerm(self.to_string()))?;
                Ok(complete(column)?.mapv(|v| v.powi(exponent)))
            }
            Term::Interaction(names) => {
                let mut product = Array1::ones(data.n_records());
                for name in names {
                    product *= &complete(name)?;
                }
                Ok(product)
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Column(name) => write!(f, "{name}"),
            Term::Power { column, exponent } => write!(f, "{column}^{exponent}"),
            Term::Interaction(names) => write!(f, "{}", names.join(":")),
        }
    }
}

impl FromStr for Term {
    type Err = FormulaError;

    /// Accepts `name`, `name^k` and `a:b[:c...]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || FormulaError::InvalidTerm(s.to_string());
        let valid_name = |name: &str| !name.is_empty() && !name.contains(char::is_whitespace);

        if let Some((column, exponent)) = text.split_once('^') {
            let column = column.trim();
            let exponent: u32 = exponent.trim().parse().map_err(|_| invalid())?;
            if !valid_name(column) || exponent == 0 {
                return Err(invalid());
            }
            return Ok(if exponent == 1 {
                Term::column(column)
            } else {
                Term::power(column, exponent)
            });
        }

        if text.contains(':') {
            let names: Vec<&str> = text.split(':').map(str::trim).collect();
            if names.len() < 2 || !names.iter().all(|&n| valid_name(n)) {
                return Err(invalid());
            }
            return Ok(Term::interaction(names));
        }

        if !valid_name(text) {
            return Err(invalid());
        }
        Ok(Term::column(text))
    }
}

/// The covariate specification of one logistic model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub intercept: bool,
    pub terms: Vec<Term>,
}

impl Formula {
    /// `y ~ 1`: the marginal probability of observation.
    pub fn intercept_only() -> Self {
        Self {
            intercept: true,
            terms: Vec::new(),
        }
    }

    pub fn with_terms(terms: Vec<Term>) -> Self {
        Self {
            intercept: true,
            terms,
        }
    }

    pub fn term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn without_intercept(mut self) -> Self {
        self.intercept = false;
        self
    }

    /// Parses each entry with `Term::from_str`.
    pub fn parse_terms<S: AsRef<str>>(terms: &[S]) -> Result<Self, FormulaError> {
        let parsed = terms
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<Result<Vec<Term>, _>>()?;
        Ok(Self::with_terms(parsed))
    }

    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            labels.push(INTERCEPT_LABEL.to_string());
        }
        labels.extend(self.terms.iter().map(Term::to_string));
        labels
    }

    pub fn references(&self, column: &str) -> bool {
        self.terms.iter().any(|t| t.columns().contains(&column))
    }

    /// Resolves the formula against a dataset. Every record contributes a row.
    pub fn design_matrix(&self, data: &Dataset) -> Result<DesignMatrix, FormulaError> {
        let labels = self.labels();
        if labels.is_empty() {
            return Err(FormulaError::EmptyModel);
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(FormulaError::DuplicateTerm(label.clone()));
            }
        }

        let n = data.n_records();
        let mut x = Array2::zeros((n, labels.len()));
        let mut col = 0;
        if self.intercept {
            x.column_mut(col).fill(1.0);
            col += 1;
        }
        for term in &self.terms {
            x.column_mut(col).assign(&term.evaluate(data)?);
            col += 1;
        }

        Ok(DesignMatrix { labels, x })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            parts.push("1".to_string());
        }
        parts.extend(self.terms.iter().map(Term::to_string));
        if parts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", parts.join(" + "))
        }
    }
}

/// A formula resolved against a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub labels: Vec<String>,
    /// Shape: [n_records, labels.len()].
    pub x: Array2<f64>,
}

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("The covariate '{0}' was not found in the dataset.")]
    UnknownColumn(String),
    #[error(
        "The covariate '{0}' has missing values. Every record enters the observation model, so covariates must be complete."
    )]
    MissingCovariateValues(String),
    #[error("The missing variable '{0}' cannot be used as a covariate of its own observation model.")]
    MissingVariableAsCovariate(String),
    #[error("The formula has neither an intercept nor any terms.")]
    EmptyModel,
    #[error("The design column '{0}' appears more than once.")]
    DuplicateTerm(String),
    #[error("Cannot parse covariate term '{0}'. Expected 'name', 'name^k' or 'a:b'.")]
    InvalidTerm(String),
    #[error("Dataset error while building the design matrix: {0}")]
    Data(DataError),
}
