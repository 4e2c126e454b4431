//! # EMT Core
//!
//! The numerical backbone of the `emt` toolkit. This crate computes the
//! effective refractive index of porous (solid/void) glass composites and
//! turns refractive indices into propagation speeds and latencies.
//!
//! ## Architecture
//!
//! All mixing rules implement the [`mixing::MixingRule`] trait, which maps a
//! validated [`types::CompositeSpec`] to an effective index. Three rules are
//! provided: the Wiener volume average, Maxwell-Garnett, and the symmetric
//! Bruggeman model (solved by Newton-Raphson).
//!
//! Everything here is a pure function of its inputs. Lookup tables of named
//! media and accelerators live in immutable catalogues ([`media`]) that
//! callers construct once and pass explicitly.
//!
//! ## Modules
//!
//! - [`types`] — Core data structures (composites, media, results).
//! - [`error`] — Error type shared by every fallible operation.
//! - [`mixing`] — Effective-medium mixing rules and fraction sweeps.
//! - [`propagation`] — Speed, latency, latency tax and system overhead.
//! - [`media`] — Catalogues of optical media and GPU platforms.
//! - [`cluster`] — Latency-tax analysis for GPU clusters.

pub mod cluster;
pub mod error;
pub mod media;
pub mod mixing;
pub mod propagation;
pub mod types;

pub use error::{EmtError, EmtResult};
