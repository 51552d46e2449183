//! Bounded Nelder-Mead simplex minimization for parameter estimation.

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Configuration for the simplex search.
#[derive(Debug, Clone)]
pub struct MinimizeConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the objective spread across the simplex.
    pub tolerance: f64,
    /// Relative step used to seed the initial simplex.
    pub initial_step: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at the best point.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the objective spread fell below the tolerance.
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`, keeping every candidate
/// inside `bounds` (one `(min, max)` pair per dimension).
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &MinimizeConfig,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return Minimum {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        point
            .into_iter()
            .zip(bounds)
            .map(|(x, &(lo, hi))| x.max(lo).min(hi))
            .collect()
    };

    // Simplex of (point, value) pairs, seeded by perturbing one dimension
    // per vertex.
    let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    let start = clamp(initial.to_vec());
    vertices.push((start.clone(), objective(&start)));
    for i in 0..dim {
        let mut vertex = start.clone();
        let step = if vertex[i].abs() > 1e-10 {
            config.initial_step * vertex[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        let vertex = clamp(vertex);
        let value = objective(&vertex);
        vertices.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let best = vertices[0].1;
        let second_worst = vertices[dim - 1].1;
        let worst = vertices[dim].1;
        if (worst - best).abs() < config.tolerance {
            converged = true;
            break;
        }

        // Centroid of everything but the worst vertex.
        let mut centroid = vec![0.0; dim];
        for (point, _) in &vertices[..dim] {
            for (c, x) in centroid.iter_mut().zip(point) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= dim as f64;
        }

        let towards = |from: &[f64], coefficient: f64| -> Vec<f64> {
            clamp(
                centroid
                    .iter()
                    .zip(from)
                    .map(|(c, x)| c + coefficient * (c - x))
                    .collect(),
            )
        };

        let reflected = towards(&vertices[dim].0, REFLECT);
        let reflected_value = objective(&reflected);

        if reflected_value < best {
            // Keep pushing in the same direction.
            let expanded = towards(&vertices[dim].0, REFLECT * EXPAND);
            let expanded_value = objective(&expanded);
            vertices[dim] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst {
            vertices[dim] = (reflected, reflected_value);
            continue;
        }

        // Contract towards the better of the worst vertex and its reflection.
        let contracted = if reflected_value < worst {
            towards(&vertices[dim].0, REFLECT * CONTRACT)
        } else {
            towards(&vertices[dim].0, -CONTRACT)
        };
        let contracted_value = objective(&contracted);
        if contracted_value < worst.min(reflected_value) {
            vertices[dim] = (contracted, contracted_value);
            continue;
        }

        // Shrink everything towards the best vertex.
        let anchor = vertices[0].0.clone();
        for (point, value) in vertices.iter_mut().skip(1) {
            for (x, a) in point.iter_mut().zip(&anchor) {
                *x = a + SHRINK * (*x - a);
            }
            *point = clamp(point.clone());
            *value = objective(point);
        }
    }

    vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let (point, value) = vertices.swap_remove(0);
    Minimum {
        point,
        value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FREE: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);

    #[test]
    fn quadratic_2d() {
        let result = minimize(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            &[FREE, FREE],
            &MinimizeConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        // Minimum of (x-5)^2 constrained to [0, 3] sits on the boundary.
        let result = minimize(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            &[(0.0, 3.0)],
            &MinimizeConfig::default(),
        );

        assert_relative_eq!(result.point[0], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn starts_at_optimum() {
        let result = minimize(
            |x| (x[0] - 2.0).powi(2),
            &[2.0],
            &[FREE],
            &MinimizeConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 2.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_initial_point() {
        let result = minimize(|_| 0.0, &[], &[], &MinimizeConfig::default());

        assert!(!result.converged);
        assert!(result.value.is_nan());
    }
}
