//! Content-based hashing for pipeline run IDs.

use sha2::{Digest, Sha256};
use ss_project::Project;

/// Hash everything that determines the numerical output: the full
/// project definition and the pipeline version. Two identical hashes
/// mean the cached tables are still valid.
pub fn compute_pipeline_id(project: &Project, pipeline_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());
    hasher.update(pipeline_version.as_bytes());

    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ss_project::{InputsDef, OutputsDef, Project, RecordDef};

    fn project(name: &str, year_num: u32) -> Project {
        Project {
            version: 1,
            name: name.to_string(),
            record: RecordDef { year_num },
            return_periods: vec![10, 100],
            inputs: InputsDef {
                mesh: "fort.14".into(),
                astro_tide: "astro".into(),
                run_index: "runs.csv".into(),
                runs_dir: "runs".into(),
            },
            outputs: OutputsDef { dir: "out".into() },
            fit: None,
        }
    }

    #[test]
    fn hash_stability() {
        let p = project("a", 250);
        assert_eq!(
            compute_pipeline_id(&p, "v1"),
            compute_pipeline_id(&p, "v1")
        );
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = project("a", 250);
        let b = project("a", 100);
        assert_ne!(compute_pipeline_id(&a, "v1"), compute_pipeline_id(&b, "v1"));
        assert_ne!(compute_pipeline_id(&a, "v1"), compute_pipeline_id(&a, "v2"));
    }
}
