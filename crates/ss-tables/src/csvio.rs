//! CSV readers and writers for every pipeline table.
//!
//! All tables carry a leading `node` column with the 1-based mesh
//! numbering, in mesh order; readers enforce that ordering so a table
//! edited out of order cannot silently shear the row correspondence.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use ss_core::Real;
use ss_pipeline::{
    AnnualMaxima, FitOutcome, GevParams, GevTable, MaterializedTable, PeakSet, Predictions,
    RunIndex, RunRecord, SortedSamples,
};
use ss_stats::Gev;

use crate::{TablesError, TablesResult};

/// One row of the run-selection index (`runs.csv`).
#[derive(Debug, Serialize, Deserialize)]
struct RunRow {
    run: String,
    track: String,
    year: u32,
}

/// Read the run -> (track, year) index.
pub fn read_run_index<R: Read>(reader: R) -> TablesResult<RunIndex> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv.deserialize() {
        let row: RunRow = row?;
        records.push(RunRecord {
            run_id: row.run,
            track_id: row.track,
            year: row.year,
        });
    }
    Ok(RunIndex::new(records))
}

/// Write one run's per-node peak series (`node,peak`).
pub fn write_peaks<W: Write>(writer: W, peaks: &[Real]) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["node", "peak"])?;
    for (i, peak) in peaks.iter().enumerate() {
        csv.write_record([(i + 1).to_string(), peak.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Read one run's per-node peak series.
pub fn read_peaks<R: Read>(reader: R) -> TablesResult<Vec<Real>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut peaks = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let line = i + 2;
        let node: u32 = field(&row, 0, "peaks", line, "node")?;
        if node != (i + 1) as u32 {
            return Err(TablesError::NodeOrder {
                expected: (i + 1) as u32,
                found: node,
            });
        }
        peaks.push(field(&row, 1, "peaks", line, "peak")?);
    }
    Ok(peaks)
}

/// Write the all-runs peak table: one column per run in selection
/// order, plus the per-node maximum over every run.
pub fn write_max_surge<W: Write>(
    writer: W,
    index: &RunIndex,
    peaks: &PeakSet,
) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["node".to_string()];
    header.extend(index.iter().map(|r| r.run_id.clone()));
    header.push("maxele".into());
    csv.write_record(&header)?;

    let runs: Vec<&[Real]> = index
        .iter()
        .map(|r| {
            peaks
                .get(&r.run_id)
                .ok_or_else(|| ss_pipeline::PipelineError::MissingRunData {
                    run_id: r.run_id.clone(),
                })
        })
        .collect::<Result<_, _>>()?;
    let overall = peaks.overall_max();

    for node in 0..peaks.node_count() {
        let mut record = vec![(node + 1).to_string()];
        record.extend(runs.iter().map(|run| run[node].to_string()));
        record.push(overall[node].to_string());
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the dense node x year annual-maximum matrix (`Y000`...).
pub fn write_annual_max<W: Write>(writer: W, annual: &AnnualMaxima) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["node".to_string()];
    header.extend((0..annual.year_num()).map(|y| format!("Y{y:03}")));
    csv.write_record(&header)?;

    for (node, row) in annual.rows().enumerate() {
        let mut record = vec![(node + 1).to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read an annual-maximum matrix back; the year count comes from the
/// header and every row must be dense.
pub fn read_annual_max<R: Read>(reader: R) -> TablesResult<AnnualMaxima> {
    let (year_num, rows) = read_dense_matrix(reader, "annual_max")?;
    let mut annual = AnnualMaxima::new_zeroed(rows.len(), year_num as u32);
    for (node, row) in rows.iter().enumerate() {
        for (year, &v) in row.iter().enumerate() {
            annual.set(node, year as u32, v);
        }
    }
    Ok(annual)
}

/// Write the per-node ascending samples (`S000`...).
pub fn write_sorted<W: Write>(writer: W, sorted: &SortedSamples) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["node".to_string()];
    header.extend((0..sorted.year_num()).map(|r| format!("S{r:03}")));
    csv.write_record(&header)?;

    for (node, row) in sorted.rows().enumerate() {
        let mut record = vec![(node + 1).to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read sorted samples back, verifying each row is non-decreasing.
pub fn read_sorted<R: Read>(reader: R) -> TablesResult<SortedSamples> {
    let (year_num, rows) = read_dense_matrix(reader, "sorted")?;
    for (node, row) in rows.iter().enumerate() {
        if row.windows(2).any(|w| w[0] > w[1]) {
            return Err(TablesError::Malformed {
                what: "sorted",
                line: node + 2,
                detail: "row is not ascending".into(),
            });
        }
    }
    let values = rows.into_iter().flatten().collect();
    Ok(SortedSamples::from_sorted_values(year_num as u32, values)?)
}

/// Write per-node GEV parameters with the fit status
/// (`node,shape,location,scale,p_value,status`). Failed nodes carry
/// empty parameter cells and the failure reason.
pub fn write_gev_table<W: Write>(writer: W, table: &GevTable) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["node", "shape", "location", "scale", "p_value", "status"])?;
    for (node, outcome) in table.outcomes.iter().enumerate() {
        let id = (node + 1).to_string();
        match outcome {
            FitOutcome::Fitted(params) => csv.write_record([
                id,
                params.gev.shape.to_string(),
                params.gev.location.to_string(),
                params.gev.scale.to_string(),
                params.p_value.to_string(),
                "ok".into(),
            ])?,
            FitOutcome::Failed { reason } => csv.write_record([
                id,
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                reason.clone(),
            ])?,
        }
    }
    csv.flush()?;
    Ok(())
}

/// Read a GEV parameter table back into per-node outcomes.
pub fn read_gev_table<R: Read>(reader: R) -> TablesResult<GevTable> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut outcomes = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let line = i + 2;
        let node: u32 = field(&row, 0, "gev_params", line, "node")?;
        if node != (i + 1) as u32 {
            return Err(TablesError::NodeOrder {
                expected: (i + 1) as u32,
                found: node,
            });
        }
        let status = row.get(5).unwrap_or_default();
        if status == "ok" {
            let shape: Real = field(&row, 1, "gev_params", line, "shape")?;
            let location: Real = field(&row, 2, "gev_params", line, "location")?;
            let scale: Real = field(&row, 3, "gev_params", line, "scale")?;
            let p_value: Real = field(&row, 4, "gev_params", line, "p_value")?;
            let gev = Gev::new(shape, location, scale).map_err(|e| TablesError::Malformed {
                what: "gev_params",
                line,
                detail: e.to_string(),
            })?;
            outcomes.push(FitOutcome::Fitted(GevParams { gev, p_value }));
        } else {
            outcomes.push(FitOutcome::Failed {
                reason: status.to_string(),
            });
        }
    }
    Ok(GevTable { outcomes })
}

/// Write return-period predictions (`node,RP0010,...`), empty cells
/// for nodes whose fit failed.
pub fn write_return_periods<W: Write>(writer: W, predictions: &Predictions) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["node".to_string()];
    header.extend(predictions.periods.iter().map(|t| format!("RP{t:04}")));
    csv.write_record(&header)?;

    for (node, row) in predictions.rows.iter().enumerate() {
        let mut record = vec![(node + 1).to_string()];
        match row {
            Some(values) => record.extend(values.iter().map(|v| v.to_string())),
            None => record.extend(std::iter::repeat_n(
                String::new(),
                predictions.periods.len(),
            )),
        }
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read return-period predictions back; the period list comes from the
/// `RP`-prefixed headers.
pub fn read_return_periods<R: Read>(reader: R) -> TablesResult<Predictions> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let mut periods = Vec::new();
    for h in headers.iter().skip(1) {
        let t: u32 = h
            .strip_prefix("RP")
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| TablesError::Malformed {
                what: "return_periods",
                line: 1,
                detail: format!("bad period column {h:?}"),
            })?;
        periods.push(t);
    }

    let mut rows = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let line = i + 2;
        let node: u32 = field(&row, 0, "return_periods", line, "node")?;
        if node != (i + 1) as u32 {
            return Err(TablesError::NodeOrder {
                expected: (i + 1) as u32,
                found: node,
            });
        }
        let cells: Vec<&str> = (1..=periods.len())
            .map(|c| row.get(c).unwrap_or_default())
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            rows.push(None);
        } else {
            let mut values = Vec::with_capacity(periods.len());
            for c in 1..=periods.len() {
                values.push(field(&row, c, "return_periods", line, "prediction")?);
            }
            rows.push(Some(values));
        }
    }
    Ok(Predictions { periods, rows })
}

/// One materialized handoff row (`node,lon,lat,surge`).
#[derive(Debug, Serialize, Deserialize)]
struct MaterializedRow {
    node: u32,
    lon: Real,
    lat: Real,
    surge: Real,
}

/// Write one return period's materialized records.
pub fn write_materialized<W: Write>(writer: W, table: &MaterializedTable) -> TablesResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in &table.records {
        csv.serialize(MaterializedRow {
            node: record.node.one_based(),
            lon: record.lon,
            lat: record.lat,
            surge: record.surge,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Parse one typed field out of a CSV record.
fn field<T: std::str::FromStr>(
    row: &csv::StringRecord,
    col: usize,
    what: &'static str,
    line: usize,
    name: &str,
) -> TablesResult<T> {
    let raw = row.get(col).ok_or_else(|| TablesError::Malformed {
        what,
        line,
        detail: format!("missing {name}"),
    })?;
    raw.parse().map_err(|_| TablesError::Malformed {
        what,
        line,
        detail: format!("unparseable {name}: {raw:?}"),
    })
}

/// Shared reader for the node-major dense matrices: returns the column
/// count and per-node rows, enforcing node order and density.
fn read_dense_matrix<R: Read>(
    reader: R,
    what: &'static str,
) -> TablesResult<(usize, Vec<Vec<Real>>)> {
    let mut csv = csv::Reader::from_reader(reader);
    let width = csv.headers()?.len().saturating_sub(1);
    let mut rows = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let line = i + 2;
        let node: u32 = field(&row, 0, what, line, "node")?;
        if node != (i + 1) as u32 {
            return Err(TablesError::NodeOrder {
                expected: (i + 1) as u32,
                found: node,
            });
        }
        if row.len() != width + 1 {
            return Err(TablesError::Malformed {
                what,
                line,
                detail: format!("expected {} columns, found {}", width + 1, row.len()),
            });
        }
        let mut values = Vec::with_capacity(width);
        for c in 1..=width {
            values.push(field(&row, c, what, line, "value")?);
        }
        rows.push(values);
    }
    Ok((width, rows))
}
