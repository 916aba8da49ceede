//! # Dataset Container and Loading
//!
//! Holds the tabular input of the estimator: an ordered set of records over a
//! fixed schema of named numeric columns, where any cell may be missing.
//!
//! - Explicit Missingness: cells are `Option<f64>`. A `None` is a missing value;
//!   present values must be finite. NaN is never used as a missing marker.
//! - Record Order: every column keeps the input order, which is the order of the
//!   weight vector produced downstream.
//! - Loading: delimited files are read through the `polars` CSV reader. Empty
//!   fields become missing values; every column must be numeric.

use ndarray::Array1;
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// A single named column of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl DataColumn {
    /// Number of missing cells in the column.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// An ordered, validated collection of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<DataColumn>,
    n_records: usize,
}

/// A comprehensive error type for dataset construction and loading failures.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("The column '{0}' was not found in the dataset. Please check spelling and case.")]
    ColumnNotFound(String),
    #[error(
        "The column '{column_name}' could not be converted to the expected type '{expected_type}'. It contains non-numeric data. (Found type: {found_type})"
    )]
    ColumnWrongType {
        column_name: String,
        expected_type: &'static str,
        found_type: String,
    },
    #[error("Missing values were found in column '{0}', which must be complete.")]
    MissingValuesFound(String),
    #[error(
        "Non-finite values (NaN or Infinity) were found in column '{0}'. Present values must be finite."
    )]
    NonFiniteValuesFound(String),
    #[error("The column name '{0}' appears more than once.")]
    DuplicateColumn(String),
    #[error("Column '{column_name}' has {found} records, but the dataset has {expected}.")]
    RaggedColumn {
        column_name: String,
        found: usize,
        expected: usize,
    },
    #[error("The dataset contains no records.")]
    EmptyDataset,
}

impl Dataset {
    /// Builds a dataset from named columns, validating the schema.
    pub fn from_columns(columns: Vec<(String, Vec<Option<f64>>)>) -> Result<Self, DataError> {
        let n_records = match columns.first() {
            Some((_, values)) => values.len(),
            None => return Err(DataError::EmptyDataset),
        };
        if n_records == 0 {
            return Err(DataError::EmptyDataset);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        let mut validated = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if !seen.insert(name.clone()) {
                return Err(DataError::DuplicateColumn(name));
            }
            if values.len() != n_records {
                return Err(DataError::RaggedColumn {
                    column_name: name,
                    found: values.len(),
                    expected: n_records,
                });
            }
            if values.iter().flatten().any(|v| !v.is_finite()) {
                return Err(DataError::NonFiniteValuesFound(name));
            }
            validated.push(DataColumn { name, values });
        }

        Ok(Self {
            columns: validated,
            n_records,
        })
    }

    /// Convenience constructor for columns without missing values.
    pub fn from_complete_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self, DataError> {
        Self::from_columns(
            columns
                .into_iter()
                .map(|(name, values)| (name, values.into_iter().map(Some).collect()))
                .collect(),
        )
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&DataColumn, DataError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
    }

    /// The raw cells of a column, missing values included.
    pub fn values(&self, name: &str) -> Result<&[Option<f64>], DataError> {
        Ok(&self.column(name)?.values)
    }

    /// A column as a dense vector. Fails if any value is missing.
    pub fn complete_column(&self, name: &str) -> Result<Array1<f64>, DataError> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .map(|v| v.ok_or_else(|| DataError::MissingValuesFound(name.to_string())))
            .collect::<Result<Vec<f64>, DataError>>()
            .map(Array1::from_vec)
    }

    /// 1.0 where the column is present, 0.0 where it is missing.
    pub fn observation_indicator(&self, name: &str) -> Result<Array1<f64>, DataError> {
        let column = self.column(name)?;
        Ok(column
            .values
            .iter()
            .map(|v| if v.is_some() { 1.0 } else { 0.0 })
            .collect())
    }
}

/// Loads a header-bearing delimited file into a `Dataset`.
///
/// Every column is read as numeric. Empty fields are treated as missing values.
pub fn load_dataset(path: &str, separator: u8) -> Result<Dataset, DataError> {
    log::info!("Loading data from '{path}'");

    let df = CsvReader::new(File::open(Path::new(path))?)
        .with_options(
            CsvReadOptions::default()
                .with_has_header(true)
                .with_parse_options(CsvParseOptions::default().with_separator(separator)),
        )
        .finish()?;

    log::info!(
        "Successfully loaded data file with {} rows and {} columns.",
        df.height(),
        df.width()
    );

    dataset_from_frame(&df)
}

/// Converts a polars `DataFrame` into a `Dataset`, preserving row order.
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset, DataError> {
    fn extract_numeric_column(
        df: &DataFrame,
        column_name: &str,
    ) -> Result<Vec<Option<f64>>, DataError> {
        let series = df.column(column_name)?;
        let wrong_type = || DataError::ColumnWrongType {
            column_name: column_name.to_string(),
            expected_type: "f64 (numeric)",
            found_type: format!("{:?}", series.dtype()),
        };

        if matches!(series.dtype(), DataType::String) {
            // A column of nothing but empty fields is read as text; it is simply all-missing.
            if series.null_count() == series.len() {
                return Ok(vec![None; series.len()]);
            }
            return Err(wrong_type());
        }

        let casted = series
            .cast(&DataType::Float64)
            .map_err(|_| wrong_type())?;
        if casted.null_count() > series.null_count() {
            return Err(wrong_type());
        }

        let chunked = casted.f64()?;
        Ok(chunked.into_iter().collect())
    }

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let values = extract_numeric_column(df, &name)?;
        log::debug!(
            "Column '{}': {} missing of {}",
            name,
            values.iter().filter(|v| v.is_none()).count(),
            values.len()
        );
        columns.push((name, values));
    }

    Dataset::from_columns(columns)
}
