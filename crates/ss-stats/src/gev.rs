//! Generalized Extreme Value distribution.
//!
//! Parameterized in the Coles convention:
//!
//! `F(x) = exp(-(1 + xi * (x - mu) / sigma)^(-1/xi))`  for `xi != 0`,
//! `F(x) = exp(-exp(-(x - mu) / sigma))`               in the Gumbel limit.
//!
//! `xi > 0` gives a heavy upper tail (Frechet type), `xi < 0` a bounded
//! upper tail (Weibull type).

use ss_core::Real;

use crate::error::FitError;

/// Shapes closer to zero than this are evaluated with the Gumbel-limit
/// formulas to avoid catastrophic cancellation in `(.)^(-1/xi)`.
pub const GUMBEL_SHAPE_EPS: Real = 1e-6;

/// A fitted (or assumed) GEV distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gev {
    /// Shape `xi`.
    pub shape: Real,
    /// Location `mu`.
    pub location: Real,
    /// Scale `sigma`, strictly positive.
    pub scale: Real,
}

impl Gev {
    /// Construct a GEV, rejecting non-finite parameters and `sigma <= 0`.
    pub fn new(shape: Real, location: Real, scale: Real) -> Result<Self, FitError> {
        if !shape.is_finite() || !location.is_finite() || !scale.is_finite() {
            return Err(FitError::InvalidParams {
                what: "non-finite parameter",
            });
        }
        if scale <= 0.0 {
            return Err(FitError::InvalidParams {
                what: "non-positive scale",
            });
        }
        Ok(Self {
            shape,
            location,
            scale,
        })
    }

    /// Cumulative distribution function.
    ///
    /// Outside the support this saturates to 0 (below a Frechet lower
    /// bound) or 1 (above a Weibull upper bound).
    pub fn cdf(&self, x: Real) -> Real {
        let z = (x - self.location) / self.scale;
        if self.shape.abs() < GUMBEL_SHAPE_EPS {
            return (-(-z).exp()).exp();
        }
        let t = 1.0 + self.shape * z;
        if t <= 0.0 {
            // x is off the end of the support
            return if self.shape > 0.0 { 0.0 } else { 1.0 };
        }
        (-t.powf(-1.0 / self.shape)).exp()
    }

    /// Quantile function (inverse CDF) at non-exceedance probability `p`.
    ///
    /// Requires `0 < p < 1`; this is the return-level formula
    /// `mu + sigma/xi * ((-ln p)^(-xi) - 1)`.
    pub fn quantile(&self, p: Real) -> Real {
        debug_assert!(p > 0.0 && p < 1.0, "quantile needs p in (0,1), got {p}");
        let y = -p.ln();
        if self.shape.abs() < GUMBEL_SHAPE_EPS {
            self.location - self.scale * y.ln()
        } else {
            self.location + self.scale / self.shape * (y.powf(-self.shape) - 1.0)
        }
    }

    /// Log-likelihood of an i.i.d. sample under this distribution.
    ///
    /// Returns `-inf` when any sample point falls outside the support,
    /// which makes the negative log-likelihood a clean objective for a
    /// direct-search optimizer: infeasible parameter sets are simply
    /// never the best vertex.
    pub fn log_likelihood(&self, sample: &[Real]) -> Real {
        let n = sample.len() as Real;
        let mut ll = -n * self.scale.ln();

        if self.shape.abs() < GUMBEL_SHAPE_EPS {
            for &x in sample {
                let z = (x - self.location) / self.scale;
                ll -= z + (-z).exp();
            }
            return ll;
        }

        let inv_shape = 1.0 / self.shape;
        for &x in sample {
            let z = (x - self.location) / self.scale;
            let t = 1.0 + self.shape * z;
            if t <= 0.0 {
                return Real::NEG_INFINITY;
            }
            ll -= (1.0 + inv_shape) * t.ln() + t.powf(-inv_shape);
        }
        ll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_quantile_round_trip() {
        let tol = ss_core::Tolerances::default();
        let gev = Gev::new(0.2, 1.5, 0.8).unwrap();
        for p in [0.01, 0.1, 0.5, 0.9, 0.99] {
            let x = gev.quantile(p);
            assert!(ss_core::nearly_equal(gev.cdf(x), p, tol), "p={p}");
        }
    }

    #[test]
    fn gumbel_limit_matches_small_shape() {
        // xi -> 0 must approach the Gumbel formulas smoothly.
        let gumbel = Gev::new(0.0, 2.0, 1.0).unwrap();
        let near = Gev::new(1e-8, 2.0, 1.0).unwrap();
        for p in [0.1, 0.5, 0.9, 0.99] {
            assert!((gumbel.quantile(p) - near.quantile(p)).abs() < 1e-4);
        }
        for x in [0.0, 1.0, 2.0, 5.0] {
            assert!((gumbel.cdf(x) - near.cdf(x)).abs() < 1e-6);
        }
    }

    #[test]
    fn quantile_is_monotonic_in_p() {
        for shape in [-0.3, 0.0, 0.3] {
            let gev = Gev::new(shape, 0.0, 1.0).unwrap();
            let mut prev = Real::NEG_INFINITY;
            for i in 1..100 {
                let p = i as Real / 100.0;
                let q = gev.quantile(p);
                assert!(q >= prev, "shape={shape}, p={p}");
                prev = q;
            }
        }
    }

    #[test]
    fn cdf_saturates_outside_support() {
        // Frechet type: lower endpoint at mu - sigma/xi.
        let frechet = Gev::new(0.5, 0.0, 1.0).unwrap();
        assert_eq!(frechet.cdf(-3.0), 0.0);
        // Weibull type: upper endpoint at mu - sigma/xi.
        let weibull = Gev::new(-0.5, 0.0, 1.0).unwrap();
        assert_eq!(weibull.cdf(3.0), 1.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(Gev::new(0.1, 0.0, 0.0).is_err());
        assert!(Gev::new(0.1, 0.0, -1.0).is_err());
        assert!(Gev::new(Real::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn log_likelihood_rejects_off_support_sample() {
        let weibull = Gev::new(-0.5, 0.0, 1.0).unwrap();
        // Upper endpoint is 2.0; a sample beyond it has zero density.
        let ll = weibull.log_likelihood(&[0.5, 1.0, 3.0]);
        assert_eq!(ll, Real::NEG_INFINITY);
    }
}
