//! Annual-maximum aggregation.

use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::tables::{AnnualMaxima, PeakSet, RunIndex};

/// Reduce per-run peak series to the dense node x year annual-maximum
/// matrix.
///
/// For each year the maximum is taken over exactly that year's run
/// list; a year with no runs keeps `0.0` for every node. Structural
/// checks (every indexed run present, consistent node counts, years in
/// range) run before any per-node work.
pub fn aggregate_annual_maxima(
    index: &RunIndex,
    peaks: &PeakSet,
    year_num: u32,
) -> PipelineResult<AnnualMaxima> {
    for record in index.iter() {
        if peaks.get(&record.run_id).is_none() {
            return Err(PipelineError::MissingRunData {
                run_id: record.run_id.clone(),
            });
        }
        if record.year >= year_num {
            return Err(PipelineError::YearOutOfRange {
                run_id: record.run_id.clone(),
                year: record.year,
                year_num,
            });
        }
    }

    let node_count = peaks.node_count();
    let mut annual = AnnualMaxima::new_zeroed(node_count, year_num);

    for year in 0..year_num {
        let year_runs: Vec<&[f64]> = index
            .runs_for_year(year)
            .map(|r| peaks.get(&r.run_id).expect("checked above"))
            .collect();
        if year_runs.is_empty() {
            continue;
        }
        for node in 0..node_count {
            let mut max = f64::NEG_INFINITY;
            for run in &year_runs {
                if run[node] > max {
                    max = run[node];
                }
            }
            annual.set(node, year, max);
        }
    }

    debug!(
        nodes = node_count,
        years = year_num,
        runs = index.len(),
        "aggregated annual maxima"
    );
    Ok(annual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RunRecord;

    fn record(run_id: &str, year: u32) -> RunRecord {
        RunRecord {
            run_id: run_id.into(),
            track_id: format!("TC{run_id}"),
            year,
        }
    }

    /// The worked scenario: 3 nodes, 5 years, two runs in year 0.
    #[test]
    fn two_runs_one_year_scenario() {
        let index = RunIndex::new(vec![record("A", 0), record("B", 0)]);
        let mut peaks = PeakSet::new(3);
        peaks.insert("A".into(), vec![2.0, 1.0, 0.0]).unwrap();
        peaks.insert("B".into(), vec![1.5, 3.0, 0.0]).unwrap();

        let annual = aggregate_annual_maxima(&index, &peaks, 5).unwrap();
        assert_eq!(annual.row(0), &[2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(annual.row(1), &[3.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(annual.row(2), &[0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn density_invariant_holds() {
        let index = RunIndex::new(vec![record("A", 3)]);
        let mut peaks = PeakSet::new(4);
        peaks.insert("A".into(), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let annual = aggregate_annual_maxima(&index, &peaks, 7).unwrap();
        assert_eq!(annual.node_count(), 4);
        assert_eq!(annual.year_num(), 7);
        for row in annual.rows() {
            assert_eq!(row.len(), 7);
        }
        assert_eq!(annual.row(2)[3], 3.0);
        // Every other year stays zero, not missing.
        assert_eq!(annual.row(2).iter().filter(|&&v| v == 0.0).count(), 6);
    }

    #[test]
    fn each_year_uses_its_own_run_list() {
        // Distinct peaks per year; year 1 must not see year 0's runs.
        let index = RunIndex::new(vec![record("A", 0), record("B", 1), record("C", 1)]);
        let mut peaks = PeakSet::new(2);
        peaks.insert("A".into(), vec![9.0, 9.0]).unwrap();
        peaks.insert("B".into(), vec![1.0, 4.0]).unwrap();
        peaks.insert("C".into(), vec![2.0, 3.0]).unwrap();

        let annual = aggregate_annual_maxima(&index, &peaks, 3).unwrap();
        assert_eq!(annual.row(0), &[9.0, 2.0, 0.0]);
        assert_eq!(annual.row(1), &[9.0, 4.0, 0.0]);
    }

    #[test]
    fn missing_run_aborts_before_any_work() {
        let index = RunIndex::new(vec![record("A", 0), record("GONE", 1)]);
        let mut peaks = PeakSet::new(2);
        peaks.insert("A".into(), vec![1.0, 2.0]).unwrap();

        let err = aggregate_annual_maxima(&index, &peaks, 5).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRunData { run_id } if run_id == "GONE"
        ));
    }

    #[test]
    fn year_out_of_range_rejected() {
        let index = RunIndex::new(vec![record("A", 5)]);
        let mut peaks = PeakSet::new(1);
        peaks.insert("A".into(), vec![1.0]).unwrap();

        let err = aggregate_annual_maxima(&index, &peaks, 5).unwrap_err();
        assert!(matches!(err, PipelineError::YearOutOfRange { year: 5, .. }));
    }
}
