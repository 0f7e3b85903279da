//! Derivative-free Nelder-Mead minimization.
//!
//! The GEV log-likelihood has an infeasible region (sample points off
//! the support) where the objective is `+inf`, so a direct search that
//! only compares function values is the right tool: infeasible vertices
//! lose every comparison and get contracted away without any gradient
//! bookkeeping.

use nalgebra::DVector;

/// Nelder-Mead configuration.
pub struct SimplexConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance on the objective spread across the simplex
    pub f_tol: f64,
    /// Convergence tolerance on the simplex diameter
    pub x_tol: f64,
    /// Initial step added per coordinate to build the starting simplex
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            f_tol: 1e-10,
            x_tol: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Nelder-Mead result.
pub struct SimplexResult {
    /// Best vertex found
    pub x: DVector<f64>,
    /// Objective value at the best vertex
    pub fx: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Minimize `f` starting from `x0` with the standard reflection /
/// expansion / contraction / shrink coefficients (1, 2, 1/2, 1/2).
///
/// Fully deterministic: the starting simplex is `x0` plus a fixed step
/// along each coordinate axis, and ties never depend on iteration
/// order. `f` may return `+inf` for infeasible points.
pub fn simplex_minimize<F>(x0: DVector<f64>, f: F, config: &SimplexConfig) -> SimplexResult
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x0.len();

    // Starting simplex: x0 plus one axis step per dimension.
    let mut vertices: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    vertices.push(x0.clone());
    for j in 0..n {
        let mut v = x0.clone();
        let step = if v[j].abs() > 1.0 {
            config.initial_step * v[j].abs()
        } else {
            config.initial_step
        };
        v[j] += step;
        vertices.push(v);
    }
    let mut values: Vec<f64> = vertices.iter().map(&f).collect();

    let mut iterations = 0;
    while iterations < config.max_iterations {
        iterations += 1;

        // Order vertices best..worst (stable: equal values keep order).
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        // Convergence: objective spread and simplex diameter.
        let f_spread = values[worst] - values[best];
        let diameter = vertices
            .iter()
            .map(|v| (v - &vertices[best]).norm())
            .fold(0.0_f64, f64::max);
        if (f_spread.is_finite() && f_spread <= config.f_tol) || diameter <= config.x_tol {
            return SimplexResult {
                x: vertices[best].clone(),
                fx: values[best],
                iterations,
                converged: true,
            };
        }

        // Centroid of all vertices except the worst.
        let mut centroid = DVector::zeros(n);
        for (i, v) in vertices.iter().enumerate() {
            if i != worst {
                centroid += v;
            }
        }
        centroid /= n as f64;

        // Reflection.
        let reflected = &centroid + (&centroid - &vertices[worst]);
        let f_reflected = f(&reflected);

        if f_reflected < values[best] {
            // Expansion.
            let expanded = &centroid + 2.0 * (&centroid - &vertices[worst]);
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                vertices[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                vertices[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            vertices[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        // Contraction, outside or inside of the worst vertex.
        let contracted = if f_reflected < values[worst] {
            &centroid + 0.5 * (&reflected - &centroid)
        } else {
            &centroid + 0.5 * (&vertices[worst] - &centroid)
        };
        let f_contracted = f(&contracted);
        if f_contracted < values[worst].min(f_reflected) {
            vertices[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // Shrink toward the best vertex.
        let best_vertex = vertices[best].clone();
        for (i, v) in vertices.iter_mut().enumerate() {
            if i != best {
                *v = &best_vertex + 0.5 * (&*v - &best_vertex);
                values[i] = f(v);
            }
        }
    }

    // Out of iterations: report the best vertex seen, not converged.
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] < values[best] {
            best = i;
        }
    }
    SimplexResult {
        x: vertices[best].clone(),
        fx: values[best],
        iterations,
        converged: false,
    }
}
