//! Return-period quantile prediction from fitted GEV parameters.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::tables::{FitOutcome, GevTable, Predictions};

/// Predict the surge level for each node and requested return period.
///
/// For return period `T` the quantile is evaluated at non-exceedance
/// probability `p = 1 - 1/T`, with the exact fitted parameters. The
/// request is validated up front: an empty list or any `T <= 1` rejects
/// the whole call before per-node work starts. Nodes whose fit failed
/// carry a `None` row, never zeros.
pub fn predict_return_periods(
    fits: &GevTable,
    periods: &[u32],
) -> PipelineResult<Predictions> {
    if periods.is_empty() {
        return Err(PipelineError::NoReturnPeriods);
    }
    for &t in periods {
        if t <= 1 {
            return Err(PipelineError::InvalidReturnPeriod { value: t });
        }
    }

    let probs: Vec<f64> = periods.iter().map(|&t| 1.0 - 1.0 / t as f64).collect();

    let rows: Vec<Option<Vec<f64>>> = fits
        .outcomes
        .par_iter()
        .map(|outcome| match outcome {
            FitOutcome::Fitted(params) => {
                Some(probs.iter().map(|&p| params.gev.quantile(p)).collect())
            }
            FitOutcome::Failed { .. } => None,
        })
        .collect();

    debug!(
        nodes = rows.len(),
        periods = periods.len(),
        "predicted return-period surge levels"
    );
    Ok(Predictions {
        periods: periods.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::GevParams;
    use proptest::prelude::*;
    use ss_stats::Gev;

    fn fitted(gev: Gev) -> FitOutcome {
        FitOutcome::Fitted(GevParams { gev, p_value: 1.0 })
    }

    #[test]
    fn probabilities_follow_one_minus_one_over_t() {
        // T=10 -> p=0.9, T=100 -> p=0.99, checked through the Gumbel
        // closed form mu - sigma*ln(-ln p).
        let gev = Gev::new(0.0, 0.0, 1.0).unwrap();
        let table = GevTable {
            outcomes: vec![fitted(gev)],
        };
        let predictions = predict_return_periods(&table, &[10, 100]).unwrap();
        let row = predictions.rows[0].as_ref().unwrap();

        let expected_10 = -((-(0.9_f64.ln())).ln());
        let expected_100 = -((-(0.99_f64.ln())).ln());
        assert!((row[0] - expected_10).abs() < 1e-12);
        assert!((row[1] - expected_100).abs() < 1e-12);
    }

    #[test]
    fn longer_period_never_predicts_less() {
        for shape in [-0.3, 0.0, 0.25] {
            let table = GevTable {
                outcomes: vec![fitted(Gev::new(shape, 2.0, 0.7).unwrap())],
            };
            let predictions = predict_return_periods(&table, &[10, 20, 50, 100]).unwrap();
            let row = predictions.rows[0].as_ref().unwrap();
            assert!(
                row.windows(2).all(|w| w[1] >= w[0]),
                "shape={shape}, row={row:?}"
            );
        }
    }

    #[test]
    fn failed_fit_rows_are_marked_invalid() {
        let table = GevTable {
            outcomes: vec![
                fitted(Gev::new(0.0, 1.0, 1.0).unwrap()),
                FitOutcome::Failed {
                    reason: "degenerate sample".into(),
                },
            ],
        };
        let predictions = predict_return_periods(&table, &[10]).unwrap();
        assert!(predictions.rows[0].is_some());
        assert!(predictions.rows[1].is_none());
    }

    #[test]
    fn invalid_return_period_fails_fast() {
        let table = GevTable {
            outcomes: vec![fitted(Gev::new(0.0, 1.0, 1.0).unwrap())],
        };
        let err = predict_return_periods(&table, &[10, 1]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidReturnPeriod { value: 1 }
        ));
        let err = predict_return_periods(&table, &[0]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidReturnPeriod { value: 0 }
        ));
        assert!(matches!(
            predict_return_periods(&table, &[]).unwrap_err(),
            PipelineError::NoReturnPeriods
        ));
    }

    proptest! {
        /// Quantile monotonicity for arbitrary period pairs T1 < T2.
        #[test]
        fn prediction_monotonic_in_period(
            shape in -0.4_f64..0.4,
            location in -10.0_f64..10.0,
            scale in 0.1_f64..5.0,
            t1 in 2_u32..1000,
            dt in 1_u32..1000,
        ) {
            let t2 = t1 + dt;
            let table = GevTable {
                outcomes: vec![fitted(Gev::new(shape, location, scale).unwrap())],
            };
            let predictions = predict_return_periods(&table, &[t1, t2]).unwrap();
            let row = predictions.rows[0].as_ref().unwrap();
            prop_assert!(row[1] >= row[0] - 1e-12);
        }
    }
}
