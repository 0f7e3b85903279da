//! Project-relative path resolution.
//!
//! Every path in a project file is interpreted relative to the project
//! file's directory, so a project tree can be moved or mounted anywhere
//! without editing the YAML.

use std::path::{Path, PathBuf};

use ss_project::Project;

#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub mesh: PathBuf,
    pub astro_tide: PathBuf,
    pub run_index: PathBuf,
    pub runs_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(project: &Project, project_path: &Path) -> Self {
        let base = project_path.parent().unwrap_or_else(|| Path::new("."));
        let abs = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        Self {
            mesh: abs(&project.inputs.mesh),
            astro_tide: abs(&project.inputs.astro_tide),
            run_index: abs(&project.inputs.run_index),
            runs_dir: abs(&project.inputs.runs_dir),
            output_dir: abs(&project.outputs.dir),
        }
    }

    /// Solver output for one run: `<runs_dir>/<run_id>/fort.63`.
    pub fn run_fort63(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id).join("fort.63")
    }

    /// Pre-extracted peak series for one run: `<runs_dir>/<run_id>.csv`.
    /// When present it takes precedence over the raw fort.63.
    pub fn run_peaks_csv(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(format!("{run_id}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ss_project::{InputsDef, OutputsDef, RecordDef};

    #[test]
    fn relative_paths_resolve_against_project_dir() {
        let project = Project {
            version: 1,
            name: "x".into(),
            record: RecordDef { year_num: 10 },
            return_periods: vec![10],
            inputs: InputsDef {
                mesh: "prepare/fort.14".into(),
                astro_tide: "/abs/astro/fort.63".into(),
                run_index: "runs.csv".into(),
                runs_dir: "surge".into(),
            },
            outputs: OutputsDef { dir: "out".into() },
            fit: None,
        };
        let paths = ProjectPaths::resolve(&project, Path::new("/data/project.yaml"));
        assert_eq!(paths.mesh, PathBuf::from("/data/prepare/fort.14"));
        assert_eq!(paths.astro_tide, PathBuf::from("/abs/astro/fort.63"));
        assert_eq!(paths.run_fort63("RE00101"), PathBuf::from("/data/surge/RE00101/fort.63"));
        assert_eq!(paths.run_peaks_csv("RE00101"), PathBuf::from("/data/surge/RE00101.csv"));
    }
}
