//! # EMT Materials
//!
//! Material property providers for the `emt` toolkit. All materials
//! implement the [`MaterialProvider`](provider::MaterialProvider) trait,
//! which provides wavelength-dependent complex dielectric functions.
//!
//! ## Available models
//!
//! | Model | Module | Use |
//! |-------|--------|-----|
//! | Sellmeier (fused silica) | [`sellmeier`] | Dispersive solid phase |
//! | Constant index | [`constant`] | Void phase, idealised glasses |
//!
//! The group index ([`MaterialProvider::group_index`](provider::MaterialProvider::group_index))
//! is derived numerically from the refractive index, so every provider
//! gets it for free.

pub mod constant;
pub mod provider;
pub mod sellmeier;
