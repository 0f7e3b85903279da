use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ss_app::{
    AppResult, OutputStore, ProjectPaths, RunOptions, RunRequest, collect_peaks, ensure_run,
    fit_config,
};
use ss_pipeline::{
    aggregate_annual_maxima, fit_all_nodes, materialize, predict_return_periods, sort_samples,
};
use ss_project::Project;
use ss_tables::{csvio, extract_run_peaks, read_elevation_series, read_mesh, write_maxele63};

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(about = "surgestat CLI - storm surge return-period estimation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run the full pipeline (cached by project content hash)
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Extract per-run peak surge CSVs from raw fort.63 output
    Extract {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Aggregate per-run peaks into the annual-maximum table
    AnnualMax {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Sort each node's annual maxima into ascending samples
    Sort {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Fit a GEV distribution per node
    FitGev {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Predict surge levels for the project's return periods
    ReturnPeriods {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Join predictions with mesh coordinates for mapping handoff
    Materialize {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Show the manifest of the last finished run
    Manifest {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            no_cache,
        } => cmd_run(&project_path, !no_cache),
        Commands::Extract { project_path } => cmd_extract(&project_path),
        Commands::AnnualMax { project_path } => cmd_annual_max(&project_path),
        Commands::Sort { project_path } => cmd_sort(&project_path),
        Commands::FitGev { project_path } => cmd_fit_gev(&project_path),
        Commands::ReturnPeriods { project_path } => cmd_return_periods(&project_path),
        Commands::Materialize { project_path } => cmd_materialize(&project_path),
        Commands::Manifest { project_path } => cmd_manifest(&project_path),
    }
}

/// Load and resolve everything the per-stage commands need.
fn load(project_path: &Path) -> AppResult<(Project, ProjectPaths, OutputStore)> {
    let project = ss_project::load_yaml(project_path)?;
    let paths = ProjectPaths::resolve(&project, project_path);
    let store = OutputStore::new(paths.output_dir.clone())?;
    Ok((project, paths, store))
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = ss_project::load_yaml(project_path)?;
    println!(
        "✓ Project is valid: {} ({} years, {} return periods)",
        project.name,
        project.record.year_num,
        project.return_periods.len()
    );
    Ok(())
}

fn cmd_run(project_path: &Path, use_cache: bool) -> AppResult<()> {
    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            ..Default::default()
        },
    };
    let response = ensure_run(&request, &mut |stage| println!("... {stage}"))?;

    if response.loaded_from_cache {
        println!("Loaded cached run {}", &response.pipeline_id[..12]);
    } else {
        println!("Finished run {}", &response.pipeline_id[..12]);
    }
    println!(
        "{} nodes, {} failed fits, outputs in {}",
        response.node_count,
        response.failed_nodes,
        response.output_dir.display()
    );
    Ok(())
}

fn cmd_extract(project_path: &Path) -> AppResult<()> {
    let (_, paths, _) = load(project_path)?;
    let index = csvio::read_run_index(File::open(&paths.run_index)?)?;

    let mut astro = None;
    let mut extracted = 0_usize;
    for record in index.iter() {
        let csv_path = paths.run_peaks_csv(&record.run_id);
        if csv_path.exists() {
            continue;
        }
        let storm = read_elevation_series(BufReader::new(File::open(
            paths.run_fort63(&record.run_id),
        )?))?;
        if astro.is_none() {
            astro = Some(read_elevation_series(BufReader::new(File::open(
                &paths.astro_tide,
            )?))?);
        }
        let peaks = extract_run_peaks(&storm, astro.as_ref().expect("just set"))?;
        csvio::write_peaks(BufWriter::new(File::create(&csv_path)?), &peaks)?;
        println!("{}", csv_path.display());
        extracted += 1;
    }
    println!("Extracted {extracted} of {} runs", index.len());
    Ok(())
}

fn cmd_annual_max(project_path: &Path) -> AppResult<()> {
    let (project, paths, store) = load(project_path)?;
    let mesh = read_mesh(BufReader::new(File::open(&paths.mesh)?))?;
    let index = csvio::read_run_index(File::open(&paths.run_index)?)?;
    let peaks = collect_peaks(&index, &paths, mesh.node_count(), &mut |_| {})?;

    let annual = aggregate_annual_maxima(&index, &peaks, project.record.year_num)?;
    csvio::write_max_surge(BufWriter::new(File::create(store.max_surge_path())?), &index, &peaks)?;
    csvio::write_annual_max(BufWriter::new(File::create(store.annual_max_path())?), &annual)?;
    println!(
        "Annual maxima for {} nodes x {} years -> {}",
        annual.node_count(),
        annual.year_num(),
        store.annual_max_path().display()
    );
    Ok(())
}

fn cmd_sort(project_path: &Path) -> AppResult<()> {
    let (_, _, store) = load(project_path)?;
    let annual = csvio::read_annual_max(File::open(store.annual_max_path())?)?;
    let sorted = sort_samples(&annual);
    csvio::write_sorted(BufWriter::new(File::create(store.sorted_path())?), &sorted)?;
    println!("Sorted samples -> {}", store.sorted_path().display());
    Ok(())
}

fn cmd_fit_gev(project_path: &Path) -> AppResult<()> {
    let (project, _, store) = load(project_path)?;
    let sorted = csvio::read_sorted(File::open(store.sorted_path())?)?;
    let fits = fit_all_nodes(&sorted, &fit_config(&project));
    csvio::write_gev_table(BufWriter::new(File::create(store.gev_path())?), &fits)?;
    println!(
        "Fitted {} nodes ({} failures) -> {}",
        fits.node_count(),
        fits.failed_count(),
        store.gev_path().display()
    );
    Ok(())
}

fn cmd_return_periods(project_path: &Path) -> AppResult<()> {
    let (project, _, store) = load(project_path)?;
    let fits = csvio::read_gev_table(File::open(store.gev_path())?)?;
    let predictions = predict_return_periods(&fits, &project.return_periods)?;
    csvio::write_return_periods(
        BufWriter::new(File::create(store.return_periods_path())?),
        &predictions,
    )?;
    println!(
        "Predictions for periods {:?} -> {}",
        predictions.periods,
        store.return_periods_path().display()
    );
    Ok(())
}

fn cmd_materialize(project_path: &Path) -> AppResult<()> {
    let (_, paths, store) = load(project_path)?;
    let mesh = read_mesh(BufReader::new(File::open(&paths.mesh)?))?;
    let predictions = csvio::read_return_periods(File::open(store.return_periods_path())?)?;

    let tables = materialize(&predictions, &mesh)?;
    for table in &tables {
        csvio::write_materialized(
            BufWriter::new(File::create(store.materialized_csv_path(table.period))?),
            table,
        )?;
        let values: Vec<(u32, f64)> = table
            .records
            .iter()
            .map(|r| (r.node.one_based(), r.surge))
            .collect();
        write_maxele63(
            BufWriter::new(File::create(store.maxele_path(table.period))?),
            &values,
        )?;
        println!(
            "RP{:04}: {} nodes materialized, {} failed -> {}",
            table.period,
            table.records.len(),
            table.failed_nodes.len(),
            store.materialized_csv_path(table.period).display()
        );
    }
    Ok(())
}

fn cmd_manifest(project_path: &Path) -> AppResult<()> {
    let (_, _, store) = load(project_path)?;
    let manifest = store.load_manifest()?;
    println!("Run:            {}", manifest.pipeline_id);
    println!("Project:        {}", manifest.project_name);
    println!("Version:        {}", manifest.pipeline_version);
    println!("Created:        {}", manifest.created_at);
    println!("Years:          {}", manifest.year_num);
    println!("Nodes:          {}", manifest.node_count);
    println!("Runs:           {}", manifest.run_count);
    println!("Return periods: {:?}", manifest.return_periods);
    if manifest.failed_nodes.is_empty() {
        println!("Failed fits:    none");
    } else {
        println!(
            "Failed fits:    {} nodes {:?}",
            manifest.failed_nodes.len(),
            manifest.failed_nodes
        );
    }
    Ok(())
}
