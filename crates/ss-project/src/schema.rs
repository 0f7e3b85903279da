//! Project schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub record: RecordDef,
    pub return_periods: Vec<u32>,
    pub inputs: InputsDef,
    pub outputs: OutputsDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitDef>,
}

/// The synthetic storm record this project draws runs from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordDef {
    /// Number of synthetic years; every annual-maximum sample has this
    /// length.
    pub year_num: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputsDef {
    /// ADCIRC fort.14 mesh (canonical node order + coordinates).
    pub mesh: PathBuf,
    /// Storm-free astronomical-tide fort.63 reference.
    pub astro_tide: PathBuf,
    /// Run-selection index CSV (`run,track,year`).
    pub run_index: PathBuf,
    /// Directory with one subdirectory per run holding its fort.63,
    /// or per-run peak CSVs once extracted.
    pub runs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputsDef {
    /// Directory receiving every derived table.
    pub dir: PathBuf,
}

/// Optional fit overrides; defaults come from the stats crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FitDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sample: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}
