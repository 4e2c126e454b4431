//! Symmetric Bruggeman effective-medium approximation.
//!
//! Both phases are treated on an equal footing, which suits co-continuous
//! (bicontinuous) lattices where neither phase is a dilute inclusion. The
//! effective permittivity is the root of
//!
//! $$F(\epsilon) = f_v \frac{\epsilon_v - \epsilon}{\epsilon_v + 2\epsilon}
//!   + f_s \frac{\epsilon_s - \epsilon}{\epsilon_s + 2\epsilon} = 0$$
//!
//! with derivative
//!
//! $$F'(\epsilon) = -\frac{3 f_v \epsilon_v}{(\epsilon_v + 2\epsilon)^2}
//!   - \frac{3 f_s \epsilon_s}{(\epsilon_s + 2\epsilon)^2}$$
//!
//! $F$ is strictly decreasing for positive permittivities, so the physical
//! root is unique and lies between the two phase permittivities. It is found
//! by Newton-Raphson, seeded at the volume-average permittivity. At high
//! index contrast a plain Newton step can overshoot onto the negative root
//! of the underlying quadratic, so every iterate is kept inside a bracket
//! around the root and a step that would leave it is replaced by bisection.

use log::debug;

use crate::error::{EmtError, EmtResult};
use crate::types::{CompositeSpec, Estimate, MixingModel};

use super::volume_average::volume_average_eps;
use super::MixingRule;

/// Default convergence tolerance on the Newton step $|\Delta\epsilon|$.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Bruggeman solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct Bruggeman {
    /// Convergence threshold on $|\Delta\epsilon|$ between iterations.
    pub tolerance: f64,
    /// Iterations allowed before giving up. Zero always fails.
    pub max_iterations: usize,
}

impl Default for Bruggeman {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Bruggeman {
    /// Solve for the effective permittivity.
    ///
    /// # Errors
    /// - [`EmtError::InvalidParameter`] for a non-positive tolerance.
    /// - [`EmtError::ConvergenceFailure`] when `max_iterations` steps do not
    ///   bring the step size under `tolerance`.
    /// - [`EmtError::Divergence`] when the residual becomes non-finite.
    pub fn solve_permittivity(&self, spec: &CompositeSpec) -> EmtResult<f64> {
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(EmtError::InvalidParameter(format!(
                "Bruggeman tolerance must be positive, got {}",
                self.tolerance
            )));
        }

        let f_v = spec.void_fraction();
        let f_s = spec.solid_fraction();
        let eps_v = spec.eps_void();
        let eps_s = spec.eps_solid();
        let lower = eps_v.min(eps_s);
        let upper = eps_v.max(eps_s);

        // F(lower) >= 0 >= F(upper), and F is strictly decreasing between them,
        // so [lo, hi] always brackets the physical root.
        let mut lo = lower;
        let mut hi = upper;
        let mut eps = volume_average_eps(spec);
        let mut last_step = f64::INFINITY;

        for iter in 0..self.max_iterations {
            let dv = eps_v + 2.0 * eps;
            let ds = eps_s + 2.0 * eps;
            let residual = f_v * (eps_v - eps) / dv + f_s * (eps_s - eps) / ds;
            let derivative = -3.0 * f_v * eps_v / (dv * dv) - 3.0 * f_s * eps_s / (ds * ds);

            if !residual.is_finite() {
                return Err(EmtError::Divergence { epsilon: eps, lower, upper });
            }
            if residual > 0.0 {
                lo = eps;
            } else if residual < 0.0 {
                hi = eps;
            } else {
                return Ok(eps);
            }

            // Newton step, or bisection when it would leave the bracket.
            let newton = eps - residual / derivative;
            let (next, method) = if newton.is_finite() && newton >= lo && newton <= hi {
                (newton, "newton")
            } else {
                (0.5 * (lo + hi), "bisect")
            };
            let step = next - eps;
            eps = next;
            last_step = step.abs();

            debug!(
                "Bruggeman iter {} ({}): eps = {:.12}, residual = {:.3e}, step = {:.3e}",
                iter + 1,
                method,
                eps,
                residual,
                step
            );

            if last_step < self.tolerance {
                return Ok(eps.clamp(lower, upper));
            }
        }

        Err(EmtError::ConvergenceFailure {
            max_iter: self.max_iterations,
            last_step,
        })
    }
}

impl MixingRule for Bruggeman {
    fn model(&self) -> MixingModel {
        MixingModel::Bruggeman
    }

    fn effective_index(&self, spec: &CompositeSpec) -> EmtResult<Estimate> {
        self.solve_permittivity(spec).map(|eps| Estimate::exact(eps.sqrt()))
    }
}

/// Bruggeman effective index with explicit solver settings.
///
/// # Errors
/// Input validation errors, or the solver errors of
/// [`Bruggeman::solve_permittivity`]. No fallback value is ever returned.
pub fn bruggeman(
    f_solid: f64,
    n_solid: f64,
    n_void: f64,
    tolerance: f64,
    max_iterations: usize,
) -> EmtResult<f64> {
    let spec = CompositeSpec::new(f_solid, n_solid, n_void)?;
    let solver = Bruggeman { tolerance, max_iterations };
    solver.effective_index(&spec).map(|e| e.n_eff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_bruggeman(f: f64) -> EmtResult<f64> {
        bruggeman(f, 1.45, 1.0, DEFAULT_TOLERANCE, DEFAULT_MAX_ITERATIONS)
    }

    #[test]
    fn test_root_satisfies_the_bruggeman_equation() {
        let spec = CompositeSpec::silica_air(0.42).unwrap();
        let eps = Bruggeman::default().solve_permittivity(&spec).unwrap();
        let (f_v, f_s) = (spec.void_fraction(), spec.solid_fraction());
        let (eps_v, eps_s) = (spec.eps_void(), spec.eps_solid());
        let residual = f_v * (eps_v - eps) / (eps_v + 2.0 * eps) + f_s * (eps_s - eps) / (eps_s + 2.0 * eps);
        assert!(residual.abs() < 1e-12, "residual {residual:.3e}");
    }

    #[test]
    fn test_thirty_percent_solid_reference() {
        assert_relative_eq!(default_bruggeman(0.3).unwrap(), 1.127_650, epsilon = 1e-5);
    }

    #[test]
    fn test_pure_phases_converge_immediately() {
        assert_relative_eq!(default_bruggeman(0.0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(default_bruggeman(1.0).unwrap(), 1.45, epsilon = 1e-12);
        // Index-matched phases: every fraction gives the common index.
        assert_relative_eq!(bruggeman(0.37, 1.2, 1.2, 1e-9, 1).unwrap(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_iterations_fails_closed() {
        let err = bruggeman(0.306, 1.45, 1.0, 1e-9, 0).unwrap_err();
        assert_eq!(
            err,
            EmtError::ConvergenceFailure { max_iter: 0, last_step: f64::INFINITY }
        );
    }

    #[test]
    fn test_single_iteration_is_not_enough_for_silica() {
        let err = bruggeman(0.5, 1.45, 1.0, 1e-12, 1).unwrap_err();
        assert!(matches!(err, EmtError::ConvergenceFailure { max_iter: 1, .. }));
    }

    #[test]
    fn test_non_positive_tolerance_is_rejected() {
        assert!(matches!(
            bruggeman(0.5, 1.45, 1.0, 0.0, 100),
            Err(EmtError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_high_contrast_silicon_converges_inside_envelope() {
        let n = bruggeman(0.5, 3.48, 1.0, 1e-10, 100).unwrap();
        assert!(n > 1.0 && n < 3.48);
        assert_relative_eq!(n, 2.143_664, epsilon = 1e-5);
    }

    #[test]
    fn test_high_contrast_step_stays_on_physical_root() {
        // An unguarded Newton step from the volume-average seed lands on eps = -5 here.
        let n = bruggeman(0.25, 5.0, 1.0, DEFAULT_TOLERANCE, DEFAULT_MAX_ITERATIONS).unwrap();
        assert_relative_eq!(n, 2.5_f64.sqrt(), epsilon = 1e-9);
    }
}
