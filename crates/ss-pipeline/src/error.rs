//! Error types for the pipeline stages.
//!
//! Structural problems (missing inputs, bad configuration) abort a
//! stage before any per-node work; per-node fit failures are carried in
//! the output tables instead and never appear here.

use ss_core::SsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Run {run_id} is named by the run index but has no surge series")]
    MissingRunData { run_id: String },

    #[error("Invalid return period {value}: must be an integer > 1")]
    InvalidReturnPeriod { value: u32 },

    #[error("No return periods requested")]
    NoReturnPeriods,

    #[error("Run {run_id} has {found} nodes, expected {expected}")]
    RunNodeCount {
        run_id: String,
        expected: usize,
        found: usize,
    },

    #[error("Mesh has {mesh_nodes} nodes but predictions cover {prediction_nodes}")]
    MeshMismatch {
        mesh_nodes: usize,
        prediction_nodes: usize,
    },

    #[error("Run {run_id} has year {year} outside the record [0, {year_num})")]
    YearOutOfRange {
        run_id: String,
        year: u32,
        year_num: u32,
    },

    #[error(transparent)]
    Core(#[from] SsError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
