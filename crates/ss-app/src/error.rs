//! Error types for the ss-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and provides a unified interface for front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read input file: {path}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Table error: {0}")]
    Tables(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Results store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ss-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<ss_project::ProjectError> for AppError {
    fn from(err: ss_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<ss_tables::TablesError> for AppError {
    fn from(err: ss_tables::TablesError) -> Self {
        AppError::Tables(err.to_string())
    }
}

impl From<ss_pipeline::PipelineError> for AppError {
    fn from(err: ss_pipeline::PipelineError) -> Self {
        AppError::Pipeline(err.to_string())
    }
}
