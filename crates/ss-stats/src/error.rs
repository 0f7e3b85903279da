//! Error types for distribution fitting.

use thiserror::Error;

/// Errors from fitting a GEV distribution to one sample.
///
/// A fit failure is scoped to the sample that produced it; callers
/// fitting many samples record the failure and move on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Sample too short for GEV fit: {len} values (minimum {min})")]
    SampleTooShort { len: usize, min: usize },

    #[error("Non-finite value in sample at position {index}")]
    NonFiniteSample { index: usize },

    #[error("Degenerate sample: all values identical ({value})")]
    DegenerateSample { value: f64 },

    #[error("Likelihood maximization did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("Optimizer produced an invalid parameter set: {what}")]
    InvalidParams { what: &'static str },
}

pub type StatsResult<T> = Result<T, FitError>;
