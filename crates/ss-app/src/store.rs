//! Output storage: derived tables plus a run manifest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Manifest describing one finished pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub pipeline_id: String,
    pub project_name: String,
    pub pipeline_version: String,
    pub created_at: String,
    pub year_num: u32,
    pub node_count: usize,
    pub run_count: usize,
    pub return_periods: Vec<u32>,
    /// 1-based ids of nodes whose GEV fit failed; their predictions are
    /// absent from the materialized tables by design.
    pub failed_nodes: Vec<u32>,
}

/// Filesystem layout of one run's output directory.
#[derive(Clone)]
pub struct OutputStore {
    root_dir: PathBuf,
}

impl OutputStore {
    pub fn new(root_dir: PathBuf) -> AppResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join("manifest.json")
    }

    pub fn max_surge_path(&self) -> PathBuf {
        self.root_dir.join("max_surge.csv")
    }

    pub fn annual_max_path(&self) -> PathBuf {
        self.root_dir.join("annual_max.csv")
    }

    pub fn sorted_path(&self) -> PathBuf {
        self.root_dir.join("sorted.csv")
    }

    pub fn gev_path(&self) -> PathBuf {
        self.root_dir.join("gev_params.csv")
    }

    pub fn return_periods_path(&self) -> PathBuf {
        self.root_dir.join("return_periods.csv")
    }

    pub fn materialized_csv_path(&self, period: u32) -> PathBuf {
        self.root_dir.join(format!("rp_{period:04}.csv"))
    }

    pub fn maxele_path(&self, period: u32) -> PathBuf {
        self.root_dir.join(format!("rp_{period:04}.63"))
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> AppResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> AppResult<Manifest> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(AppError::Store(format!(
                "no manifest at {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Whether a finished run with this pipeline id is already on disk.
    pub fn has_run(&self, pipeline_id: &str) -> bool {
        match self.load_manifest() {
            Ok(manifest) => manifest.pipeline_id == pipeline_id,
            Err(_) => false,
        }
    }
}
