#![deny(dead_code)]
#![deny(unused_imports)]

pub mod aggregate;
pub mod config;
pub mod data;
pub mod estimator;
pub mod formula;
pub mod logit;
pub mod summary;
