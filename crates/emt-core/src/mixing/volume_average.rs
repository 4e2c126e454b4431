//! Volume-average (Wiener upper bound) mixing rule.
//!
//! Permittivities add in proportion to volume fraction:
//!
//! $$\epsilon_{\text{eff}} = f_v \epsilon_v + f_s \epsilon_s$$
//!
//! This is the upper bound on the effective index of any two-phase
//! composite with the given fractions, reached for layers parallel to the
//! field.

use crate::error::EmtResult;
use crate::types::{CompositeSpec, Estimate, MixingModel};

use super::MixingRule;

/// Volume-average rule. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeAverage;

impl MixingRule for VolumeAverage {
    fn model(&self) -> MixingModel {
        MixingModel::VolumeAverage
    }

    fn effective_index(&self, spec: &CompositeSpec) -> EmtResult<Estimate> {
        Ok(Estimate::exact(volume_average_eps(spec).sqrt()))
    }
}

/// Volume-averaged permittivity. Also seeds the Bruggeman iteration.
pub(crate) fn volume_average_eps(spec: &CompositeSpec) -> f64 {
    spec.void_fraction() * spec.eps_void() + spec.solid_fraction() * spec.eps_solid()
}

/// Effective index $\sqrt{f_v n_v^2 + f_s n_s^2}$.
///
/// # Errors
/// Rejects fractions outside `[0, 1]` and indices below 1.
pub fn volume_average(f_solid: f64, n_solid: f64, n_void: f64) -> EmtResult<f64> {
    let spec = CompositeSpec::new(f_solid, n_solid, n_void)?;
    VolumeAverage.effective_index(&spec).map(|e| e.n_eff)
}
