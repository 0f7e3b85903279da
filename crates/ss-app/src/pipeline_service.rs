//! Pipeline execution and caching service.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use ss_core::Real;
use tracing::info;

use ss_pipeline::{
    FitOutcome, PeakSet, PipelineError, RunIndex, aggregate_annual_maxima, fit_all_nodes,
    materialize, predict_return_periods, sort_samples,
};
use ss_project::Project;
use ss_stats::FitConfig;
use ss_tables::csvio;
use ss_tables::{ElevationSeries, extract_run_peaks, read_elevation_series, read_mesh,
    write_maxele63};

use crate::error::{AppError, AppResult};
use crate::hash::compute_pipeline_id;
use crate::paths::ProjectPaths;
use crate::progress::RunStage;
use crate::store::{Manifest, OutputStore};

/// Options for running the pipeline.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub pipeline_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            pipeline_version: crate::PIPELINE_VERSION.to_string(),
        }
    }
}

/// Request to execute the pipeline for one project.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

/// Response from a pipeline execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub pipeline_id: String,
    pub loaded_from_cache: bool,
    pub node_count: usize,
    pub failed_nodes: usize,
    pub output_dir: PathBuf,
}

/// Run the full pipeline, or reuse the cached output when the project
/// content hash matches what is already on disk.
pub fn ensure_run(
    request: &RunRequest,
    on_stage: &mut dyn FnMut(&RunStage),
) -> AppResult<RunResponse> {
    on_stage(&RunStage::LoadingProject);
    let project = ss_project::load_yaml(request.project_path)?;
    let paths = ProjectPaths::resolve(&project, request.project_path);
    let pipeline_id = compute_pipeline_id(&project, &request.options.pipeline_version);
    let store = OutputStore::new(paths.output_dir.clone())?;

    on_stage(&RunStage::CheckingCache);
    if request.options.use_cache && store.has_run(&pipeline_id) {
        let manifest = store.load_manifest()?;
        info!(%pipeline_id, "reusing cached pipeline output");
        on_stage(&RunStage::Completed);
        return Ok(RunResponse {
            pipeline_id,
            loaded_from_cache: true,
            node_count: manifest.node_count,
            failed_nodes: manifest.failed_nodes.len(),
            output_dir: paths.output_dir,
        });
    }

    on_stage(&RunStage::ReadingMesh);
    let mesh = read_mesh(buf_open(&paths.mesh)?)?;
    let index = csvio::read_run_index(open(&paths.run_index)?)?;
    info!(
        nodes = mesh.node_count(),
        runs = index.len(),
        years = project.record.year_num,
        "pipeline inputs loaded"
    );

    let peaks = collect_peaks(&index, &paths, mesh.node_count(), on_stage)?;

    on_stage(&RunStage::Aggregating);
    let annual = aggregate_annual_maxima(&index, &peaks, project.record.year_num)?;
    csvio::write_max_surge(create(&store.max_surge_path())?, &index, &peaks)?;
    csvio::write_annual_max(create(&store.annual_max_path())?, &annual)?;

    on_stage(&RunStage::Sorting);
    let sorted = sort_samples(&annual);
    csvio::write_sorted(create(&store.sorted_path())?, &sorted)?;

    on_stage(&RunStage::Fitting);
    let fits = fit_all_nodes(&sorted, &fit_config(&project));
    csvio::write_gev_table(create(&store.gev_path())?, &fits)?;

    on_stage(&RunStage::Predicting);
    let predictions = predict_return_periods(&fits, &project.return_periods)?;
    csvio::write_return_periods(create(&store.return_periods_path())?, &predictions)?;

    on_stage(&RunStage::Materializing);
    let tables = materialize(&predictions, &mesh)?;
    for table in &tables {
        csvio::write_materialized(create(&store.materialized_csv_path(table.period))?, table)?;
        let values: Vec<(u32, Real)> = table
            .records
            .iter()
            .map(|r| (r.node.one_based(), r.surge))
            .collect();
        write_maxele63(create(&store.maxele_path(table.period))?, &values)?;
    }

    on_stage(&RunStage::SavingResults);
    let failed_nodes: Vec<u32> = fits
        .outcomes
        .iter()
        .enumerate()
        .filter_map(|(i, o)| match o {
            FitOutcome::Failed { .. } => Some((i + 1) as u32),
            FitOutcome::Fitted(_) => None,
        })
        .collect();
    let manifest = Manifest {
        pipeline_id: pipeline_id.clone(),
        project_name: project.name.clone(),
        pipeline_version: request.options.pipeline_version.clone(),
        created_at: Utc::now().to_rfc3339(),
        year_num: project.record.year_num,
        node_count: mesh.node_count(),
        run_count: index.len(),
        return_periods: project.return_periods.clone(),
        failed_nodes: failed_nodes.clone(),
    };
    store.save_manifest(&manifest)?;

    info!(
        %pipeline_id,
        nodes = mesh.node_count(),
        failed = failed_nodes.len(),
        "pipeline run complete"
    );
    on_stage(&RunStage::Completed);
    Ok(RunResponse {
        pipeline_id,
        loaded_from_cache: false,
        node_count: mesh.node_count(),
        failed_nodes: failed_nodes.len(),
        output_dir: paths.output_dir,
    })
}

/// Translate project fit overrides onto the stats-crate defaults.
pub fn fit_config(project: &Project) -> FitConfig {
    let mut config = FitConfig::default();
    if let Some(fit) = &project.fit {
        if let Some(min_sample) = fit.min_sample {
            config.min_sample = min_sample;
        }
        if let Some(max_iterations) = fit.max_iterations {
            config.simplex.max_iterations = max_iterations;
        }
    }
    config
}

/// Gather every run's per-node peak series, preferring pre-extracted
/// CSVs and falling back to the raw fort.63 minus the astronomical
/// tide. A run with neither is missing data: the aggregation cannot
/// produce a dense table, so it fails here, before any statistics.
pub fn collect_peaks(
    index: &RunIndex,
    paths: &ProjectPaths,
    node_count: usize,
    on_stage: &mut dyn FnMut(&RunStage),
) -> AppResult<PeakSet> {
    let mut peaks = PeakSet::new(node_count);
    let mut astro: Option<ElevationSeries> = None;

    for record in index.iter() {
        on_stage(&RunStage::ExtractingPeaks {
            run_id: record.run_id.clone(),
        });

        let csv_path = paths.run_peaks_csv(&record.run_id);
        let values = if csv_path.exists() {
            csvio::read_peaks(open(&csv_path)?)?
        } else {
            let fort63_path = paths.run_fort63(&record.run_id);
            if !fort63_path.exists() {
                return Err(PipelineError::MissingRunData {
                    run_id: record.run_id.clone(),
                }
                .into());
            }
            let storm = read_elevation_series(buf_open(&fort63_path)?)?;
            if astro.is_none() {
                astro = Some(read_elevation_series(buf_open(&paths.astro_tide)?)?);
            }
            extract_run_peaks(&storm, astro.as_ref().expect("just set"))?
        };
        peaks.insert(record.run_id.clone(), values)?;
    }
    Ok(peaks)
}

fn open(path: &Path) -> AppResult<File> {
    File::open(path).map_err(|source| AppError::InputRead {
        path: path.to_path_buf(),
        source,
    })
}

fn buf_open(path: &Path) -> AppResult<BufReader<File>> {
    Ok(BufReader::new(open(path)?))
}

fn create(path: &Path) -> AppResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
