//! One-sample Kolmogorov-Smirnov goodness-of-fit test.

use ss_core::Real;

/// K-S statistic `D`: the largest gap between the empirical CDF of an
/// ascending-sorted sample and a reference CDF.
pub fn ks_statistic<F>(sorted: &[Real], cdf: F) -> Real
where
    F: Fn(Real) -> Real,
{
    let n = sorted.len() as Real;
    let mut d = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let f = cdf(x);
        // Empirical CDF steps from i/n to (i+1)/n at x.
        let below = f - i as Real / n;
        let above = (i as Real + 1.0) / n - f;
        d = d.max(below).max(above);
    }
    d
}

/// Two-sided asymptotic p-value for statistic `d` at sample size `n`,
/// using Stephens' finite-sample scaling of the Kolmogorov distribution.
pub fn ks_p_value(d: Real, n: usize) -> Real {
    let sqrt_n = (n as Real).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    kolmogorov_survival(lambda)
}

/// Convenience: statistic and p-value in one call.
pub fn ks_test<F>(sorted: &[Real], cdf: F) -> (Real, Real)
where
    F: Fn(Real) -> Real,
{
    let d = ks_statistic(sorted, cdf);
    (d, ks_p_value(d, sorted.len()))
}

/// `Q(lambda) = 2 * sum_{j>=1} (-1)^(j-1) exp(-2 j^2 lambda^2)`.
///
/// The alternating series converges fast for moderate `lambda`; when it
/// has not settled within 100 terms (tiny `lambda`) the survival
/// probability is 1 to working precision.
fn kolmogorov_survival(lambda: Real) -> Real {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0_f64;
    let mut sum = 0.0_f64;
    let mut prev_term = 0.0_f64;
    for j in 1..=100 {
        let term = fac * (a2 * (j * j) as Real).exp();
        sum += term;
        if term.abs() <= 1e-3 * prev_term || term.abs() <= 1e-8 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        prev_term = term.abs();
    }
    1.0
}
