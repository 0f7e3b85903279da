//! ss-pipeline: the statistical extrapolation stages.
//!
//! Five pure transforms over node-indexed tables, applied in order:
//!
//! 1. [`annual`] - per-run peaks reduced to a dense node x year
//!    annual-maximum matrix
//! 2. [`sort`] - each node's annual maxima as an ascending sample
//! 3. [`fit`] - per-node GEV maximum-likelihood fits (parallel)
//! 4. [`predict`] - return-period quantiles from the fitted parameters
//! 5. [`materialize`] - predictions joined with mesh coordinates
//!
//! Nodes are independent throughout; per-node fit failures are values
//! in the output tables, never panics, so one bad node cannot abort its
//! siblings.

pub mod annual;
pub mod error;
pub mod fit;
pub mod materialize;
pub mod predict;
pub mod sort;
pub mod tables;

pub use annual::aggregate_annual_maxima;
pub use error::{PipelineError, PipelineResult};
pub use fit::fit_all_nodes;
pub use materialize::materialize;
pub use predict::predict_return_periods;
pub use sort::sort_samples;
pub use tables::*;
