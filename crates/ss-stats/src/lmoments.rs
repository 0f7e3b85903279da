//! Sample L-moments and the Hosking closed-form GEV estimates.
//!
//! The L-moment estimates are not the final answer; they give the
//! likelihood search a starting point already in the right basin, which
//! is what makes the per-node fits deterministic and fast.

use ss_core::Real;
use statrs::function::gamma::gamma;

use crate::gev::Gev;

const EULER_GAMMA: Real = 0.577_215_664_901_532_9;
const LN_2: Real = core::f64::consts::LN_2;
const LN_3: Real = 1.098_612_288_668_109_8;

/// First two L-moments and the L-skewness of a sample.
#[derive(Debug, Clone, Copy)]
pub struct LMoments {
    /// L-location (the sample mean).
    pub l1: Real,
    /// L-scale; zero exactly when all sample values are identical.
    pub l2: Real,
    /// L-skewness `tau3 = l3 / l2`; zero when `l2` is zero.
    pub t3: Real,
}

/// Compute sample L-moments from an ascending-sorted sample via
/// probability-weighted moments.
///
/// The caller guarantees sorted order; order statistics are the whole
/// point of the estimator.
pub fn sample_l_moments(sorted: &[Real]) -> LMoments {
    let n = sorted.len();
    debug_assert!(n >= 3, "L-moments need at least 3 values");
    let nf = n as Real;

    let mut b0 = 0.0;
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for (i, &x) in sorted.iter().enumerate() {
        let w1 = i as Real / (nf - 1.0);
        let w2 = if i >= 2 {
            w1 * (i as Real - 1.0) / (nf - 2.0)
        } else {
            0.0
        };
        b0 += x;
        b1 += w1 * x;
        b2 += w2 * x;
    }
    b0 /= nf;
    b1 /= nf;
    b2 /= nf;

    let l1 = b0;
    let l2 = 2.0 * b1 - b0;
    let l3 = 6.0 * b2 - 6.0 * b1 + b0;
    let t3 = if l2 > 0.0 { l3 / l2 } else { 0.0 };

    LMoments { l1, l2, t3 }
}

/// Hosking's closed-form GEV parameter estimates from sample L-moments,
/// converted to the Coles shape convention (`shape = -k`).
///
/// Returns `None` for a degenerate sample (`l2 <= 0`) or when the
/// estimates come out non-finite; the caller decides the failure policy.
/// Falls back to the Gumbel solution when the shape solve lands on zero.
pub fn gev_starting_point(lm: &LMoments) -> Option<Gev> {
    if !(lm.l2 > 0.0) || !lm.l1.is_finite() || !lm.t3.is_finite() {
        return None;
    }

    let c = 2.0 / (3.0 + lm.t3) - LN_2 / LN_3;
    let k = 7.8590 * c + 2.9554 * c * c;

    let (shape, location, scale) = if k.abs() < 1e-9 {
        let scale = lm.l2 / LN_2;
        (0.0, lm.l1 - EULER_GAMMA * scale, scale)
    } else {
        let g = gamma(1.0 + k);
        let scale = lm.l2 * k / ((1.0 - (-k * LN_2).exp()) * g);
        let location = lm.l1 - scale * (1.0 - g) / k;
        (-k, location, scale)
    };

    Gev::new(shape, location, scale).ok()
}
