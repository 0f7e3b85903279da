//! ss-app: service layer tying the pipeline stages to the filesystem.
//!
//! The CLI (and any future front end) talks to this crate only: it
//! loads a project, resolves its paths, runs the stages in order,
//! caches finished runs by content hash and writes every output table.

pub mod error;
pub mod hash;
pub mod paths;
pub mod pipeline_service;
pub mod progress;
pub mod store;

pub use error::{AppError, AppResult};
pub use hash::compute_pipeline_id;
pub use paths::ProjectPaths;
pub use pipeline_service::{RunOptions, RunRequest, RunResponse, collect_peaks, ensure_run, fit_config};
pub use progress::RunStage;
pub use store::{Manifest, OutputStore};

/// Version stamp folded into the pipeline content hash; bump when a
/// stage's numerical behavior changes so stale caches are not reused.
pub const PIPELINE_VERSION: &str = "0.1.0";
