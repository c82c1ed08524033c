//! The building blocks of stereo volumetric reconstruction evaluation.

mod common;
pub mod dataset;
pub mod evaluator;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod processor;
