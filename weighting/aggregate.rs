//! Weighted summaries of a variable with missing values.
//!
//! Only records where the value is present contribute; their weights are the
//! IPMW weights of the same records.

use ndarray::ArrayView1;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AggregateError {
    #[error("{values} values were supplied with {weights} weights.")]
    LengthMismatch { values: usize, weights: usize },
    #[error("No record has an observed value.")]
    NoObservedRecords,
    #[error("The weights of the observed records sum to {0}, which is not positive.")]
    NonPositiveTotal(f64),
    #[error("Weight {index} is not finite.")]
    NonFiniteWeight { index: usize },
}

/// `Σ y_i w_i / Σ w_i` over records where `y_i` is present.
pub fn weighted_mean(
    values: &[Option<f64>],
    weights: ArrayView1<f64>,
) -> Result<f64, AggregateError> {
    if values.len() != weights.len() {
        return Err(AggregateError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut observed = 0usize;
    for (index, (value, &w)) in values.iter().zip(weights.iter()).enumerate() {
        let Some(y) = value else { continue };
        if !w.is_finite() {
            return Err(AggregateError::NonFiniteWeight { index });
        }
        numerator += y * w;
        denominator += w;
        observed += 1;
    }

    if observed == 0 {
        return Err(AggregateError::NoObservedRecords);
    }
    if denominator <= 0.0 {
        return Err(AggregateError::NonPositiveTotal(denominator));
    }
    Ok(numerator / denominator)
}

/// `Σ I(y_i = 1) w_i / Σ w_i` over records where `y_i` is present.
pub fn weighted_proportion(
    values: &[Option<f64>],
    weights: ArrayView1<f64>,
) -> Result<f64, AggregateError> {
    let indicators: Vec<Option<f64>> = values
        .iter()
        .map(|v| v.map(|y| if y == 1.0 { 1.0 } else { 0.0 }))
        .collect();
    weighted_mean(&indicators, weights)
}

/// Complete-case mean, the estimate IPMW corrects.
pub fn unweighted_mean(values: &[Option<f64>]) -> Result<f64, AggregateError> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return Err(AggregateError::NoObservedRecords);
    }
    Ok(present.iter().sum::<f64>() / present.len() as f64)
}

/// Distribution of a set of weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    /// Kish effective sample size, `(Σw)² / Σw²`.
    pub effective_sample_size: f64,
}

impl WeightSummary {
    pub fn from_weights(weights: ArrayView1<f64>) -> Result<Self, AggregateError> {
        if weights.is_empty() {
            return Err(AggregateError::NoObservedRecords);
        }
        if let Some(index) = weights.iter().position(|w| !w.is_finite()) {
            return Err(AggregateError::NonFiniteWeight { index });
        }

        let count = weights.len();
        let sum = weights.sum();
        let mean = sum / count as f64;
        let std_dev = if count > 1 {
            (weights.mapv(|w| (w - mean).powi(2)).sum() / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
        let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum_sq = weights.dot(&weights);
        let effective_sample_size = if sum_sq > 0.0 { sum * sum / sum_sq } else { 0.0 };

        Ok(Self {
            count,
            mean,
            std_dev,
            min,
            max,
            sum,
            effective_sample_size,
        })
    }
}

impl std::fmt::Display for WeightSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n = {}, mean = {:.4}, sd = {:.4}, min = {:.4}, max = {:.4}, sum = {:.2}, ESS = {:.1}",
            self.count,
            self.mean,
            self.std_dev,
            self.min,
            self.max,
            self.sum,
            self.effective_sample_size
        )
    }
}
