//! Run configuration for the command-line tool, read from TOML.
//!
//! ```toml
//! data = "trial.tsv"
//! missing_variable = "dead"
//! outcome = "dead"
//! stabilized = true
//! denominator = ["art", "male", "age0", "age0^2", "cd40", "cd40^2", "cd40^3"]
//! output = "weights.tsv"
//!
//! [solver]
//! max_iterations = 100
//! tolerance = 1e-8
//! ```

use crate::weighting::formula::{Formula, FormulaError};
use crate::weighting::logit::FitOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Delimited input file with a header row.
    pub data: PathBuf,
    /// Single-character field separator.
    #[serde(default = "default_separator")]
    pub separator: char,
    pub missing_variable: String,
    /// Column whose complete-case and weighted means are reported.
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub stabilized: bool,
    /// Terms of the denominator model, e.g. `age0^2` or `art:male`.
    pub denominator: Vec<String>,
    /// Terms of the numerator model. Empty means intercept-only.
    #[serde(default)]
    pub numerator: Vec<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub models_output: Option<PathBuf>,
    /// Print the regression summaries.
    #[serde(default = "default_print_results")]
    pub print_results: bool,
    #[serde(default)]
    pub solver: FitOptions,
}

fn default_separator() -> char {
    '\t'
}

fn default_output() -> PathBuf {
    PathBuf::from("weights.tsv")
}

fn default_print_results() -> bool {
    true
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Invalid model term in configuration: {0}")]
    InvalidTerm(#[from] FormulaError),
    #[error("The separator {0:?} is not a single-byte character.")]
    InvalidSeparator(char),
}

impl RunConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.separator_byte()?;
        config.denominator_formula()?;
        config.numerator_formula()?;
        Ok(config)
    }

    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.separator)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or(ConfigError::InvalidSeparator(self.separator))
    }

    pub fn denominator_formula(&self) -> Result<Formula, ConfigError> {
        Ok(Formula::parse_terms(&self.denominator)?)
    }

    /// `None` for an intercept-only numerator.
    pub fn numerator_formula(&self) -> Result<Option<Formula>, ConfigError> {
        if self.numerator.is_empty() {
            return Ok(None);
        }
        Ok(Some(Formula::parse_terms(&self.numerator)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighting::formula::Term;

    #[test]
    fn parses_full_configuration() {
        let config = RunConfig::from_toml_str(
            r#"
            data = "trial.csv"
            separator = ","
            missing_variable = "dead"
            outcome = "dead"
            stabilized = true
            denominator = ["art", "age0^2", "art:male"]
            numerator = ["art"]
            models_output = "models.toml"
            print_results = false

            [solver]
            max_iterations = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.separator_byte().unwrap(), b',');
        assert_eq!(config.outcome.as_deref(), Some("dead"));
        assert!(config.stabilized);
        assert!(!config.print_results);
        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.tolerance, FitOptions::default().tolerance);
        assert_eq!(
            config.denominator_formula().unwrap().terms,
            vec![
                Term::column("art"),
                Term::power("age0", 2),
                Term::interaction(["art", "male"])
            ]
        );
        assert_eq!(
            config.numerator_formula().unwrap(),
            Some(Formula::with_terms(vec![Term::column("art")]))
        );
    }

    #[test]
    fn applies_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            data = "trial.tsv"
            missing_variable = "dead"
            denominator = ["art"]
            "#,
        )
        .unwrap();
        assert_eq!(config.separator_byte().unwrap(), b'\t');
        assert_eq!(config.output, PathBuf::from("weights.tsv"));
        assert!(!config.stabilized);
        assert!(config.print_results);
        assert_eq!(config.numerator_formula().unwrap(), None);
        assert_eq!(config.solver, FitOptions::default());
    }

    #[test]
    fn rejects_bad_terms_and_fields() {
        let err = RunConfig::from_toml_str(
            r#"
            data = "trial.tsv"
            missing_variable = "dead"
            denominator = ["age0^"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTerm(_)));

        let err = RunConfig::from_toml_str(
            r#"
            data = "trial.tsv"
            missing_variable = "dead"
            denominator = ["art"]
            weights = "w"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseError(_)));
    }
}
