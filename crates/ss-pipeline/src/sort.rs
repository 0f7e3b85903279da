//! Per-node ascending sort of the annual-maximum samples.

use rayon::prelude::*;

use crate::tables::{AnnualMaxima, SortedSamples};

/// Sort each node's annual maxima ascending. Row order (the mesh node
/// order) is preserved exactly; only values within a row move.
pub fn sort_samples(annual: &AnnualMaxima) -> SortedSamples {
    let year_num = annual.year_num() as usize;
    // Indexed parallel iteration keeps collect order identical to the
    // input row order.
    let rows: Vec<&[f64]> = annual.rows().collect();
    let values: Vec<f64> = rows
        .par_iter()
        .map(|row| {
            let mut sorted = row.to_vec();
            sorted.sort_by(f64::total_cmp);
            sorted
        })
        .collect::<Vec<Vec<f64>>>()
        .into_iter()
        .flatten()
        .collect();
    debug_assert_eq!(values.len(), annual.node_count() * year_num);
    SortedSamples::from_raw(annual.node_count(), annual.year_num(), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn annual_from_rows(rows: &[Vec<f64>]) -> AnnualMaxima {
        let year_num = rows[0].len() as u32;
        let mut annual = AnnualMaxima::new_zeroed(rows.len(), year_num);
        for (i, row) in rows.iter().enumerate() {
            for (year, &v) in row.iter().enumerate() {
                annual.set(i, year as u32, v);
            }
        }
        annual
    }

    /// Scenario continuation: node 0's maxima [2,0,0,0,0] sort to
    /// [0,0,0,0,2].
    #[test]
    fn scenario_row_sorts_ascending() {
        let annual = annual_from_rows(&[vec![2.0, 0.0, 0.0, 0.0, 0.0]]);
        let sorted = sort_samples(&annual);
        assert_eq!(sorted.row(0), &[0.0, 0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn row_order_matches_input_order() {
        let annual = annual_from_rows(&[
            vec![3.0, 1.0, 2.0],
            vec![6.0, 4.0, 5.0],
            vec![9.0, 7.0, 8.0],
        ]);
        let sorted = sort_samples(&annual);
        assert_eq!(sorted.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(sorted.row(2), &[7.0, 8.0, 9.0]);
    }

    proptest! {
        /// Each output row is a non-decreasing permutation of its input.
        #[test]
        fn sorted_rows_are_permutations(
            rows in proptest::collection::vec(
                proptest::collection::vec(-1e6_f64..1e6, 8..=8),
                1..6,
            )
        ) {
            let annual = annual_from_rows(&rows);
            let sorted = sort_samples(&annual);
            prop_assert_eq!(sorted.node_count(), rows.len());
            for (i, input) in rows.iter().enumerate() {
                let out = sorted.row(i);
                prop_assert!(out.windows(2).all(|w| w[0] <= w[1]));
                let mut expected = input.clone();
                expected.sort_by(f64::total_cmp);
                prop_assert_eq!(out, expected.as_slice());
            }
        }
    }
}
