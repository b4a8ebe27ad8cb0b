//! Derivative-free simplex minimizer for coefficient estimation.
//!
//! The search region is unbounded: the model deliberately does not clamp
//! coefficients to a stationary or invertible region.

/// Configuration for the simplex search.
#[derive(Debug, Clone)]
pub struct SimplexConfig {
    /// Iteration cap before the search is declared non-convergent.
    pub max_iter: usize,
    /// Relative tolerance on the objective spread across the simplex.
    pub tolerance: f64,
    /// Relative tolerance on the simplex diameter, scaled by the
    /// magnitude of the current parameter vector.
    pub point_tolerance: f64,
    /// Step used to build the initial simplex around the starting point.
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-8,
            point_tolerance: 1e-6,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a simplex minimization.
#[derive(Debug, Clone)]
pub struct SimplexOutcome {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at the best point.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the objective-spread or simplex-collapse criterion was
    /// met before the cap.
    pub converged: bool,
}

// Standard Nelder-Mead coefficients.
const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` starting from `initial` with the Nelder-Mead
/// simplex method. Fully deterministic: the same starting point and
/// configuration always walk the same path.
pub fn minimize<F>(objective: F, initial: &[f64], config: &SimplexConfig) -> SimplexOutcome
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return SimplexOutcome {
            point: Vec::new(),
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let best = order[0];
        let second_worst = order[n - 1];
        let worst = order[n];

        let spread = values[worst] - values[best];
        if spread <= config.tolerance * (1.0 + values[best].abs()) {
            converged = true;
            break;
        }

        let centroid = centroid_excluding(&simplex, worst);
        let scale = 1.0 + centroid.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        if simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max)
            < config.point_tolerance * scale
        {
            converged = true;
            break;
        }

        let reflected = blend(&centroid, &simplex[worst], -REFLECT);
        let reflected_value = objective(&reflected);

        if reflected_value < values[best] {
            let expanded = blend(&centroid, &reflected, EXPAND);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        let anchor = if reflected_value < values[worst] {
            &reflected
        } else {
            &simplex[worst]
        };
        let contracted = blend(&centroid, anchor, CONTRACT);
        let contracted_value = objective(&contracted);
        if contracted_value < values[worst].min(reflected_value) {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink everything toward the best vertex.
        let best_vertex = simplex[best].clone();
        for (i, vertex) in simplex.iter_mut().enumerate() {
            if i == best {
                continue;
            }
            for (x, b) in vertex.iter_mut().zip(best_vertex.iter()) {
                *x = b + SHRINK * (*x - b);
            }
            values[i] = objective(vertex);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    SimplexOutcome {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

/// Point at `centroid + factor * (target - centroid)`.
fn blend(centroid: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(target.iter())
        .map(|(c, t)| c + factor * (t - c))
        .collect()
}

fn centroid_excluding(simplex: &[Vec<f64>], excluded: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; n];
    for (i, vertex) in simplex.iter().enumerate() {
        if i == excluded {
            continue;
        }
        for (c, x) in centroid.iter_mut().zip(vertex.iter()) {
            *c += x;
        }
    }
    for c in &mut centroid {
        *c /= count;
    }
    centroid
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
