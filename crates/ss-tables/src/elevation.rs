//! ADCIRC fort.63 global-elevation series and per-run surge peaks.
//!
//! A fort.63 holds one elevation record per output interval: a record
//! header line followed by one `id value` line per mesh node. The surge
//! of a run is its elevation minus the storm-free astronomical-tide
//! reference at the same node and output step; the pipeline only keeps
//! each node's peak over the run.

use std::io::BufRead;

use ss_core::{Real, is_dry};
use tracing::debug;

use crate::mesh::parse_field;
use crate::{TablesError, TablesResult};

/// A parsed fort.63: `records[step][node_index]`.
#[derive(Debug, Clone)]
pub struct ElevationSeries {
    node_count: usize,
    records: Vec<Vec<Real>>,
}

impl ElevationSeries {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, step: usize) -> &[Real] {
        &self.records[step]
    }
}

/// Read a full fort.63 elevation series.
pub fn read_elevation_series<R: BufRead>(reader: R) -> TablesResult<ElevationSeries> {
    let mut lines = reader.lines().enumerate();

    let mut next_line = |expect_line: usize| -> TablesResult<String> {
        match lines.next() {
            Some((_, Ok(l))) => Ok(l),
            Some((_, Err(e))) => Err(TablesError::Io(e)),
            None => Err(TablesError::Malformed {
                what: "fort.63",
                line: expect_line,
                detail: "unexpected end of file".into(),
            }),
        }
    };

    // Line 1: run description, unused.
    next_line(1)?;

    let meta = next_line(2)?;
    let mut parts = meta.split_whitespace();
    let record_count: usize = parse_field(parts.next(), "fort.63", 2, "record count")?;
    let node_count: usize = parse_field(parts.next(), "fort.63", 2, "node count")?;

    let mut records = Vec::with_capacity(record_count);
    let mut line_no = 2;
    for _ in 0..record_count {
        // Record header: model time and step, unused.
        line_no += 1;
        next_line(line_no)?;

        let mut values = Vec::with_capacity(node_count);
        for i in 0..node_count {
            line_no += 1;
            let line = next_line(line_no)?;
            let mut parts = line.split_whitespace();
            let id: u32 = parse_field(parts.next(), "fort.63", line_no, "node id")?;
            if id != (i + 1) as u32 {
                return Err(TablesError::NodeOrder {
                    expected: (i + 1) as u32,
                    found: id,
                });
            }
            let value: Real = parse_field(parts.next(), "fort.63", line_no, "elevation")?;
            values.push(value);
        }
        records.push(values);
    }

    debug!(
        nodes = node_count,
        records = records.len(),
        "read elevation series"
    );
    Ok(ElevationSeries {
        node_count,
        records,
    })
}

/// Reduce one run to its per-node peak surge: the maximum over output
/// steps of storm-tide elevation minus the astronomical-tide reference.
///
/// Steps where either side reports the dry sentinel contribute nothing.
/// A node dry for the whole run gets `0.0`, the same value an inactive
/// year carries, so downstream stages need no special case.
pub fn extract_run_peaks(
    storm: &ElevationSeries,
    astro: &ElevationSeries,
) -> TablesResult<Vec<Real>> {
    if storm.node_count != astro.node_count {
        return Err(TablesError::SeriesMismatch {
            what: "astronomical-tide node count",
            expected: storm.node_count,
            found: astro.node_count,
        });
    }
    if storm.record_count() != astro.record_count() {
        return Err(TablesError::SeriesMismatch {
            what: "astronomical-tide record count",
            expected: storm.record_count(),
            found: astro.record_count(),
        });
    }

    let mut peaks = vec![Real::NEG_INFINITY; storm.node_count];
    for (storm_rec, astro_rec) in storm.records.iter().zip(&astro.records) {
        for (node, peak) in peaks.iter_mut().enumerate() {
            let wl = storm_rec[node];
            let at = astro_rec[node];
            if is_dry(wl) || is_dry(at) {
                continue;
            }
            let surge = wl - at;
            if surge > *peak {
                *peak = surge;
            }
        }
    }
    for peak in &mut peaks {
        if !peak.is_finite() {
            *peak = 0.0;
        }
    }
    Ok(peaks)
}
