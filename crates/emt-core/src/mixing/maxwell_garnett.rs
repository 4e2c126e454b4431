//! Maxwell-Garnett mixing rule for dilute spherical inclusions.
//!
//! The void phase is the host and the solid phase the inclusion, with
//! inclusion fraction $f = f_s$:
//!
//! $$\epsilon_{\text{eff}} = \epsilon_h
//!   \frac{\epsilon_i + 2\epsilon_h + 2f(\epsilon_i - \epsilon_h)}
//!        {\epsilon_i + 2\epsilon_h - f(\epsilon_i - \epsilon_h)}$$
//!
//! Writing the denominator terms the other way round, as
//! $\epsilon_h + 2\epsilon_i$, swaps host and inclusion and no longer
//! returns $n_s$ at $f = 1$; that variant is not the one used here.
//!
//! The derivation assumes isolated inclusions. Above a solid fraction of
//! [`MAXWELL_GARNETT_DILUTE_LIMIT`] the result is still returned but carries
//! a [`DomainWarning`].

use log::warn;

use crate::error::EmtResult;
use crate::types::{CompositeSpec, DomainWarning, Estimate, MixingModel, MAXWELL_GARNETT_DILUTE_LIMIT};

use super::MixingRule;

/// Maxwell-Garnett rule (void host, solid inclusions).
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxwellGarnett;

impl MixingRule for MaxwellGarnett {
    fn model(&self) -> MixingModel {
        MixingModel::MaxwellGarnett
    }

    fn effective_index(&self, spec: &CompositeSpec) -> EmtResult<Estimate> {
        let warning = dilute_warning(spec);
        if let Some(w) = &warning {
            warn!("{}", w);
        }
        Ok(Estimate { n_eff: maxwell_garnett_eps(spec).sqrt(), warning })
    }
}

/// Effective permittivity, without the dilute-limit check.
pub(crate) fn maxwell_garnett_eps(spec: &CompositeSpec) -> f64 {
    let eps_h = spec.eps_void();
    let eps_i = spec.eps_solid();
    let f = spec.solid_fraction();

    let contrast = eps_i - eps_h;
    eps_h * (eps_i + 2.0 * eps_h + 2.0 * f * contrast) / (eps_i + 2.0 * eps_h - f * contrast)
}

/// The advisory for a composite past the dilute limit. Does not log.
pub(crate) fn dilute_warning(spec: &CompositeSpec) -> Option<DomainWarning> {
    let f = spec.solid_fraction();
    (f > MAXWELL_GARNETT_DILUTE_LIMIT).then_some(DomainWarning {
        model: MixingModel::MaxwellGarnett,
        solid_fraction: f,
        limit: MAXWELL_GARNETT_DILUTE_LIMIT,
    })
}

/// Maxwell-Garnett effective index with its domain advisory, if any.
///
/// # Errors
/// Rejects fractions outside `[0, 1]` and indices below 1. Exceeding the
/// dilute limit is *not* an error.
pub fn maxwell_garnett(f_solid: f64, n_solid: f64, n_void: f64) -> EmtResult<Estimate> {
    let spec = CompositeSpec::new(f_solid, n_solid, n_void)?;
    MaxwellGarnett.effective_index(&spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limits_recover_pure_phases() {
        assert_relative_eq!(maxwell_garnett(0.0, 1.45, 1.0).unwrap().n_eff, 1.0, epsilon = 1e-12);
        assert_relative_eq!(maxwell_garnett(1.0, 1.45, 1.0).unwrap().n_eff, 1.45, epsilon = 1e-12);
    }

    #[test]
    fn test_dilute_regime_has_no_warning() {
        let est = maxwell_garnett(0.3, 1.45, 1.0).unwrap();
        assert!(est.warning.is_none());
        assert_relative_eq!(est.n_eff, 1.123_866, epsilon = 1e-5);
    }

    #[test]
    fn test_dense_regime_warns_but_returns_value() {
        let est = maxwell_garnett(0.306, 1.45, 1.0).unwrap();
        let warning = est.warning.expect("30.6 % solid is beyond the dilute limit");
        assert_eq!(warning.limit, MAXWELL_GARNETT_DILUTE_LIMIT);
        assert_relative_eq!(est.n_eff, 1.126_413, epsilon = 1e-5);
    }

    #[test]
    fn test_advisory_starts_just_past_the_limit() {
        let at_limit = CompositeSpec::silica_air(MAXWELL_GARNETT_DILUTE_LIMIT).unwrap();
        let past_limit = CompositeSpec::silica_air(0.31).unwrap();
        assert!(dilute_warning(&at_limit).is_none());
        assert_eq!(dilute_warning(&past_limit).map(|w| w.solid_fraction), Some(0.31));
    }

    #[test]
    fn test_invalid_fraction_is_rejected() {
        assert!(maxwell_garnett(-0.1, 1.45, 1.0).is_err());
    }
}
