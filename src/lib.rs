#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

#[path = "../weighting/mod.rs"]
pub mod weighting;

pub use weighting::estimator::{EstimatorError, FittedModels, IpmwEstimator, ModelRole};
pub use weighting::formula::{Formula, Term};
