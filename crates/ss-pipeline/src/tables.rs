//! Node-indexed tables exchanged between pipeline stages.
//!
//! Dense matrices are stored node-major in a single `Vec<Real>`; row
//! order is the canonical mesh node order everywhere, which is what
//! lets downstream consumers join tables row-for-row.

use std::collections::HashMap;

use ss_core::{NodeId, Real, RunId, TrackId, Year};
use ss_stats::Gev;

/// One entry of the run index: a simulated storm scenario and the
/// synthetic-record year it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub run_id: RunId,
    pub track_id: TrackId,
    pub year: Year,
}

/// The run -> (year, track) index, in selection order.
#[derive(Debug, Clone, Default)]
pub struct RunIndex {
    records: Vec<RunRecord>,
}

impl RunIndex {
    pub fn new(records: Vec<RunRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter()
    }

    /// Runs landing in `year`, in selection order.
    pub fn runs_for_year(&self, year: Year) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }
}

/// Per-run peak surge series: one dense node-ordered row per run.
#[derive(Debug, Clone)]
pub struct PeakSet {
    node_count: usize,
    runs: HashMap<RunId, Vec<Real>>,
}

impl PeakSet {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            runs: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Insert a run's peak series. The length must match the mesh and
    /// every value must be finite; a NaN here would silently vanish in
    /// the max-reduction downstream.
    pub fn insert(&mut self, run_id: RunId, peaks: Vec<Real>) -> Result<(), crate::PipelineError> {
        if peaks.len() != self.node_count {
            return Err(crate::PipelineError::RunNodeCount {
                run_id,
                expected: self.node_count,
                found: peaks.len(),
            });
        }
        for &v in &peaks {
            ss_core::ensure_finite(v, "run peak")?;
        }
        self.runs.insert(run_id, peaks);
        Ok(())
    }

    pub fn get(&self, run_id: &str) -> Option<&[Real]> {
        self.runs.get(run_id).map(Vec::as_slice)
    }

    /// Per-node maximum across every run in the set.
    pub fn overall_max(&self) -> Vec<Real> {
        let mut max = vec![Real::NEG_INFINITY; self.node_count];
        for peaks in self.runs.values() {
            for (m, &v) in max.iter_mut().zip(peaks) {
                if v > *m {
                    *m = v;
                }
            }
        }
        if self.runs.is_empty() {
            max.fill(0.0);
        }
        max
    }
}

/// Dense node x year annual-maximum matrix. Years with no runs hold
/// `0.0`, a legitimate sample value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualMaxima {
    node_count: usize,
    year_num: u32,
    values: Vec<Real>,
}

impl AnnualMaxima {
    pub fn new_zeroed(node_count: usize, year_num: u32) -> Self {
        Self {
            node_count,
            year_num,
            values: vec![0.0; node_count * year_num as usize],
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn year_num(&self) -> u32 {
        self.year_num
    }

    pub fn row(&self, node_index: usize) -> &[Real] {
        let w = self.year_num as usize;
        &self.values[node_index * w..(node_index + 1) * w]
    }

    pub fn set(&mut self, node_index: usize, year: Year, value: Real) {
        let w = self.year_num as usize;
        self.values[node_index * w + year as usize] = value;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Real]> {
        self.values.chunks_exact(self.year_num as usize)
    }
}

/// Per-node ascending annual-maximum samples; same dense layout as
/// [`AnnualMaxima`], each row sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedSamples {
    node_count: usize,
    year_num: u32,
    values: Vec<Real>,
}

impl SortedSamples {
    pub(crate) fn from_raw(node_count: usize, year_num: u32, values: Vec<Real>) -> Self {
        debug_assert_eq!(values.len(), node_count * year_num as usize);
        Self {
            node_count,
            year_num,
            values,
        }
    }

    /// Rebuild a table from externally stored rows (node-major, each
    /// row already ascending). The caller vouches for sortedness; only
    /// the shape is checked here.
    pub fn from_sorted_values(
        year_num: u32,
        values: Vec<Real>,
    ) -> Result<Self, crate::PipelineError> {
        let w = year_num as usize;
        if w == 0 || values.len() % w != 0 {
            return Err(ss_core::SsError::Invariant {
                what: "sorted-sample length must be a multiple of the year count",
            }
            .into());
        }
        Ok(Self {
            node_count: values.len() / w,
            year_num,
            values,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn year_num(&self) -> u32 {
        self.year_num
    }

    pub fn row(&self, node_index: usize) -> &[Real] {
        let w = self.year_num as usize;
        &self.values[node_index * w..(node_index + 1) * w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Real]> {
        self.values.chunks_exact(self.year_num as usize)
    }
}

/// Fitted GEV parameters for one node plus the K-S goodness-of-fit
/// p-value, recorded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct GevParams {
    pub gev: Gev,
    pub p_value: Real,
}

/// Per-node fit result: parameters or an explicit failure marker.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Fitted(GevParams),
    Failed { reason: String },
}

impl FitOutcome {
    pub fn fitted(&self) -> Option<&GevParams> {
        match self {
            FitOutcome::Fitted(params) => Some(params),
            FitOutcome::Failed { .. } => None,
        }
    }
}

/// GEV parameters for every node, in mesh order.
#[derive(Debug, Clone)]
pub struct GevTable {
    pub outcomes: Vec<FitOutcome>,
}

impl GevTable {
    pub fn node_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.fitted().is_none())
            .count()
    }
}

/// Return-period predictions: one row per node, one value per requested
/// period. `None` marks a node whose fit failed; it is never conflated
/// with a zero surge level.
#[derive(Debug, Clone)]
pub struct Predictions {
    pub periods: Vec<u32>,
    pub rows: Vec<Option<Vec<Real>>>,
}

impl Predictions {
    pub fn node_count(&self) -> usize {
        self.rows.len()
    }
}

/// One mesh node's horizontal position (and still-water depth, carried
/// through from the mesh file).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeCoord {
    pub lon: Real,
    pub lat: Real,
    pub depth: Real,
}

/// The solver mesh: canonical node ordering plus coordinates.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub coords: Vec<NodeCoord>,
}

impl Mesh {
    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    pub fn node_id(&self, node_index: usize) -> NodeId {
        NodeId::from_index(node_index as u32)
    }
}

/// Final handoff record for one node at one return period.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedRecord {
    pub node: NodeId,
    pub lon: Real,
    pub lat: Real,
    pub surge: Real,
}

/// Materialized predictions for one return period, plus the nodes whose
/// fits failed (explicitly absent from `records`).
#[derive(Debug, Clone)]
pub struct MaterializedTable {
    pub period: u32,
    pub records: Vec<MaterializedRecord>,
    pub failed_nodes: Vec<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annual_maxima_rows_are_dense() {
        let mut am = AnnualMaxima::new_zeroed(3, 5);
        am.set(1, 2, 4.5);
        assert_eq!(am.row(0), &[0.0; 5]);
        assert_eq!(am.row(1), &[0.0, 0.0, 4.5, 0.0, 0.0]);
        assert_eq!(am.rows().count(), 3);
        for row in am.rows() {
            assert_eq!(row.len(), 5);
        }
    }

    #[test]
    fn peak_set_rejects_wrong_length() {
        let mut peaks = PeakSet::new(3);
        assert!(peaks.insert("RE00101".into(), vec![1.0, 2.0]).is_err());
        assert!(peaks.insert("RE00101".into(), vec![1.0, 2.0, 3.0]).is_ok());
    }

    #[test]
    fn peak_set_rejects_non_finite_values() {
        let mut peaks = PeakSet::new(2);
        assert!(peaks.insert("a".into(), vec![1.0, f64::NAN]).is_err());
        assert!(peaks.insert("b".into(), vec![1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn overall_max_across_runs() {
        let mut peaks = PeakSet::new(2);
        peaks.insert("a".into(), vec![1.0, 5.0]).unwrap();
        peaks.insert("b".into(), vec![2.0, 3.0]).unwrap();
        assert_eq!(peaks.overall_max(), vec![2.0, 5.0]);
    }

    #[test]
    fn runs_for_year_filters_in_order() {
        let index = RunIndex::new(vec![
            RunRecord {
                run_id: "a".into(),
                track_id: "t1".into(),
                year: 0,
            },
            RunRecord {
                run_id: "b".into(),
                track_id: "t2".into(),
                year: 1,
            },
            RunRecord {
                run_id: "c".into(),
                track_id: "t3".into(),
                year: 0,
            },
        ]);
        let year0: Vec<&str> = index.runs_for_year(0).map(|r| r.run_id.as_str()).collect();
        assert_eq!(year0, vec!["a", "c"]);
        assert_eq!(index.runs_for_year(3).count(), 0);
    }
}
