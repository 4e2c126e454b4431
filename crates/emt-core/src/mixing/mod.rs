//! Effective-medium mixing rules.
//!
//! The [`MixingRule`] trait defines the interface every mixing rule
//! implements: given a validated two-phase composite, return its effective
//! refractive index. The CLI and the sweep code operate against the trait
//! without knowing which approximation sits behind it.
//!
//! | Rule | Module | Form |
//! |------|--------|------|
//! | Volume average (Wiener bound) | [`volume_average`] | closed form |
//! | Maxwell-Garnett | [`maxwell_garnett`] | closed form, dilute limit |
//! | Bruggeman (symmetric) | [`bruggeman`] | Newton-Raphson |
//!
//! For a low-index host with high-index inclusions the three are ordered
//! Maxwell-Garnett ≤ Bruggeman ≤ volume average.

pub mod bruggeman;
pub mod maxwell_garnett;
pub mod sweep;
pub mod volume_average;

pub use bruggeman::{bruggeman, Bruggeman};
pub use maxwell_garnett::{maxwell_garnett, MaxwellGarnett};
pub use sweep::{sweep_void_fraction, SweepRow};
pub use volume_average::{volume_average, VolumeAverage};

use crate::error::EmtResult;
use crate::propagation::{latency_ns, speed_km_s};
use crate::types::{CompositeSpec, Estimate, MixingModel, MixingResult};

/// The core trait all effective-medium approximations implement.
pub trait MixingRule {
    /// Which model this rule implements.
    fn model(&self) -> MixingModel;

    /// Effective refractive index of the composite.
    fn effective_index(&self, spec: &CompositeSpec) -> EmtResult<Estimate>;
}

impl MixingModel {
    /// The rule implementing this model, with default solver settings.
    pub fn rule(&self) -> Box<dyn MixingRule + Send + Sync> {
        match self {
            MixingModel::VolumeAverage => Box::new(VolumeAverage),
            MixingModel::MaxwellGarnett => Box::new(MaxwellGarnett),
            MixingModel::Bruggeman => Box::new(Bruggeman::default()),
        }
    }
}

/// Evaluate one model and derive speed and one-way latency over `length_m`.
pub fn evaluate(spec: &CompositeSpec, model: MixingModel, length_m: f64) -> EmtResult<MixingResult> {
    evaluate_with(model.rule().as_ref(), spec, length_m)
}

/// Like [`evaluate`], but with a caller-configured rule (e.g. a Bruggeman
/// solver with a custom tolerance).
pub fn evaluate_with(
    rule: &dyn MixingRule,
    spec: &CompositeSpec,
    length_m: f64,
) -> EmtResult<MixingResult> {
    let estimate = rule.effective_index(spec)?;
    Ok(MixingResult {
        model: rule.model(),
        n_eff: estimate.n_eff,
        speed_km_s: speed_km_s(estimate.n_eff)?,
        latency_ns: latency_ns(length_m, estimate.n_eff, false)?,
        length_m,
        warning: estimate.warning,
    })
}

/// Evaluate all three models side by side, in [`MixingModel::ALL`] order.
///
/// Fails if any model fails; there is no silent fallback from Bruggeman to
/// another rule.
pub fn compare_methods(spec: &CompositeSpec, length_m: f64) -> EmtResult<Vec<MixingResult>> {
    MixingModel::ALL
        .iter()
        .map(|&model| evaluate(spec, model, length_m))
        .collect()
}
