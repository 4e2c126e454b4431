//! Core types shared across the toolkit.
//!
//! This module defines the data passed between the mixing rules, the
//! propagation helpers and the CLI: optical media, two-phase composites, and
//! the per-model result records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, check_index, EmtResult};

/// Refractive index of fused silica (SiO₂) at 1550 nm, used as the default solid phase.
pub const N_SILICA: f64 = 1.45;

/// Refractive index of the void phase (air/vacuum).
pub const N_VOID: f64 = 1.0;

/// Solid fraction above which the dilute-inclusion assumption of
/// Maxwell-Garnett no longer holds.
pub const MAXWELL_GARNETT_DILUTE_LIMIT: f64 = 0.3;

/// A transmission medium characterised by a real refractive index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediumSample {
    /// Short identifier (e.g. `smf28`). Empty for computed media.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Real refractive index, n ≥ 1.
    pub refractive_index: f64,
    /// Provenance of the index value.
    pub source: String,
}

impl MediumSample {
    /// Create a medium from a computed or user-supplied index.
    pub fn new(label: impl Into<String>, refractive_index: f64) -> EmtResult<Self> {
        check_index("medium", refractive_index)?;
        Ok(Self {
            key: String::new(),
            label: label.into(),
            refractive_index,
            source: String::new(),
        })
    }

    /// Catalogue entry. Only called with literal constants, so no validation.
    pub(crate) fn catalogued(key: &str, label: &str, refractive_index: f64, source: &str) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            refractive_index,
            source: source.into(),
        }
    }
}

/// A two-phase solid/void composite.
///
/// The void fraction is always `1 - solid_fraction`; it is derived rather
/// than stored so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeSpec {
    solid_fraction: f64,
    n_solid: f64,
    n_void: f64,
}

impl CompositeSpec {
    /// Build a validated composite.
    ///
    /// # Errors
    /// [`crate::EmtError::InvalidFraction`] if `solid_fraction` is outside
    /// `[0, 1]`, [`crate::EmtError::InvalidIndex`] if either index is below 1.
    pub fn new(solid_fraction: f64, n_solid: f64, n_void: f64) -> EmtResult<Self> {
        check_fraction(solid_fraction)?;
        check_index("n_solid", n_solid)?;
        check_index("n_void", n_void)?;
        Ok(Self { solid_fraction, n_solid, n_void })
    }

    /// Silica/air composite with the given solid fraction.
    pub fn silica_air(solid_fraction: f64) -> EmtResult<Self> {
        Self::new(solid_fraction, N_SILICA, N_VOID)
    }

    /// Build from a solid fraction expressed in percent (0–100).
    pub fn from_percent(solid_percent: f64, n_solid: f64, n_void: f64) -> EmtResult<Self> {
        Self::new(solid_percent / 100.0, n_solid, n_void)
    }

    pub fn solid_fraction(&self) -> f64 {
        self.solid_fraction
    }

    pub fn void_fraction(&self) -> f64 {
        1.0 - self.solid_fraction
    }

    pub fn n_solid(&self) -> f64 {
        self.n_solid
    }

    pub fn n_void(&self) -> f64 {
        self.n_void
    }

    /// Permittivity of the solid phase, $\epsilon_s = n_s^2$.
    pub fn eps_solid(&self) -> f64 {
        self.n_solid * self.n_solid
    }

    /// Permittivity of the void phase, $\epsilon_v = n_v^2$.
    pub fn eps_void(&self) -> f64 {
        self.n_void * self.n_void
    }

    /// Same fractions with a different solid index (used by dispersion sweeps).
    pub fn with_n_solid(&self, n_solid: f64) -> EmtResult<Self> {
        Self::new(self.solid_fraction, n_solid, self.n_void)
    }
}

/// The effective-medium mixing rules supported by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingModel {
    VolumeAverage,
    MaxwellGarnett,
    Bruggeman,
}

impl MixingModel {
    /// All models in report order.
    pub const ALL: [MixingModel; 3] = [
        MixingModel::VolumeAverage,
        MixingModel::MaxwellGarnett,
        MixingModel::Bruggeman,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MixingModel::VolumeAverage => "Volume Average",
            MixingModel::MaxwellGarnett => "Maxwell-Garnett",
            MixingModel::Bruggeman => "Bruggeman",
        }
    }
}

impl fmt::Display for MixingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Advisory raised when a model is used outside its range of validity.
///
/// This is not an error: the numeric result is still produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainWarning {
    pub model: MixingModel,
    pub solid_fraction: f64,
    /// Largest solid fraction for which the model is considered reliable.
    pub limit: f64,
}

impl fmt::Display for DomainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assumes dilute inclusions; solid fraction {:.3} exceeds {:.2}, result is unreliable",
            self.model, self.solid_fraction, self.limit
        )
    }
}

/// Effective index returned by a mixing rule, with any domain advisory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub n_eff: f64,
    pub warning: Option<DomainWarning>,
}

impl Estimate {
    pub fn exact(n_eff: f64) -> Self {
        Self { n_eff, warning: None }
    }
}

/// A mixing rule's effective index together with derived propagation figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixingResult {
    pub model: MixingModel,
    pub n_eff: f64,
    /// Phase velocity in the composite (km/s).
    pub speed_km_s: f64,
    /// One-way latency over `length_m` (ns).
    pub latency_ns: f64,
    /// Path length the latency refers to (m).
    pub length_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<DomainWarning>,
}
