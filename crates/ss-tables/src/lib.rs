//! ss-tables: tabular boundary I/O for the pipeline.
//!
//! Everything the statistical core exchanges with the outside world is
//! a table: ADCIRC mesh and elevation files on the way in, CSV and
//! maxele.63 tables on the way out. No GIS types cross this boundary.

pub mod csvio;
pub mod elevation;
pub mod maxele;
pub mod mesh;

pub use elevation::{ElevationSeries, extract_run_peaks, read_elevation_series};
pub use maxele::{read_maxele63, write_maxele63};
pub use mesh::read_mesh;

pub type TablesResult<T> = Result<T, TablesError>;

#[derive(thiserror::Error, Debug)]
pub enum TablesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed {what} at line {line}: {detail}")]
    Malformed {
        what: &'static str,
        line: usize,
        detail: String,
    },

    #[error("Node column out of order: found {found} where {expected} was expected")]
    NodeOrder { expected: u32, found: u32 },

    #[error("{what}: expected {expected}, found {found}")]
    SeriesMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Pipeline(#[from] ss_pipeline::PipelineError),
}
