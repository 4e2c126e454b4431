//! Propagation speed and latency in a medium of refractive index $n$.
//!
//! - Phase velocity: $v = c / n$
//! - One-way time of flight: $\tau = L n / c$
//! - Latency tax versus vacuum: $\Delta\tau = L (n - 1) / c$
//!
//! On top of time of flight, a real link pays a fixed per-hop cost for
//! serialisation, forward error correction and switching, modelled by
//! [`SystemOverhead`].

use serde::{Deserialize, Serialize};

use crate::error::{check_length, EmtError, EmtResult};
use crate::media::{GpuSpec, MediaCatalog};

/// Speed of light in vacuum (m/s), exact by SI definition.
pub const C_VACUUM_M_S: f64 = 299_792_458.0;

/// Default threshold below which an index counts as "low-index" glass.
pub const LOW_INDEX_THRESHOLD: f64 = 1.20;

/// SerDes latency per hop (ns).
pub const SERDES_NS: f64 = 200.0;
/// Forward error correction latency per hop (ns).
pub const FEC_NS: f64 = 200.0;
/// Switch traversal latency per hop (ns).
pub const SWITCH_NS: f64 = 200.0;

fn check_n_eff(n_eff: f64) -> EmtResult<()> {
    if !n_eff.is_finite() || n_eff <= 0.0 {
        return Err(EmtError::InvalidParameter(format!(
            "refractive index must be finite and positive, got {n_eff}"
        )));
    }
    Ok(())
}

/// Phase velocity $c / n$ in m/s.
///
/// # Errors
/// Rejects `n_eff <= 0` and a non-positive `c`.
pub fn speed(n_eff: f64, c: f64) -> EmtResult<f64> {
    check_n_eff(n_eff)?;
    if !(c.is_finite() && c > 0.0) {
        return Err(EmtError::InvalidParameter(format!("light speed must be positive, got {c}")));
    }
    Ok(c / n_eff)
}

/// Phase velocity in km/s using the vacuum light speed.
pub fn speed_km_s(n_eff: f64) -> EmtResult<f64> {
    speed(n_eff, C_VACUUM_M_S).map(|v| v / 1e3)
}

/// Speed as a fraction of $c$, i.e. $1/n$.
pub fn speed_fraction_c(n_eff: f64) -> EmtResult<f64> {
    check_n_eff(n_eff)?;
    Ok(1.0 / n_eff)
}

/// Propagation latency in seconds, $L n / c$, doubled for a round trip.
///
/// # Errors
/// Rejects negative lengths and `n_eff <= 0`.
pub fn propagation_latency(length_m: f64, n_eff: f64, round_trip: bool, c: f64) -> EmtResult<f64> {
    check_length(length_m)?;
    speed(n_eff, c)?;
    let one_way = length_m * n_eff / c;
    Ok(if round_trip { 2.0 * one_way } else { one_way })
}

/// Propagation latency in nanoseconds using the vacuum light speed.
pub fn latency_ns(length_m: f64, n_eff: f64, round_trip: bool) -> EmtResult<f64> {
    propagation_latency(length_m, n_eff, round_trip, C_VACUUM_M_S).map(|t| t * 1e9)
}

/// Extra one-way delay relative to vacuum (ns).
pub fn latency_tax_ns(length_m: f64, n_eff: f64) -> EmtResult<f64> {
    check_length(length_m)?;
    check_n_eff(n_eff)?;
    Ok(length_m * (n_eff - 1.0) / C_VACUUM_M_S * 1e9)
}

/// Whether an index is below the low-index target.
pub fn meets_index_target(n_eff: f64, threshold: f64) -> bool {
    n_eff < threshold
}

/// Fixed per-hop electronics latency added to time of flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemOverhead {
    /// Time of flight only.
    #[default]
    None,
    /// SerDes + FEC + switch, 600 ns per hop.
    Typical,
}

impl SystemOverhead {
    /// Overhead per one-way hop (ns).
    pub fn per_hop_ns(&self) -> f64 {
        match self {
            SystemOverhead::None => 0.0,
            SystemOverhead::Typical => SERDES_NS + FEC_NS + SWITCH_NS,
        }
    }
}

/// Time of flight plus electronics overhead (ns). A round trip crosses the
/// electronics twice.
pub fn system_latency_ns(
    length_m: f64,
    n_eff: f64,
    round_trip: bool,
    overhead: SystemOverhead,
) -> EmtResult<f64> {
    let tof = latency_ns(length_m, n_eff, round_trip)?;
    let hops = if round_trip { 2.0 } else { 1.0 };
    Ok(tof + hops * overhead.per_hop_ns())
}

/// Operations an accelerator could have executed while waiting `latency_ns`.
pub fn wasted_operations(latency_ns: f64, gpu: &GpuSpec) -> f64 {
    latency_ns * gpu.ops_per_ns()
}

/// One row of a media latency comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaLatency {
    pub key: String,
    pub name: String,
    pub n: f64,
    pub speed_km_s: f64,
    pub percent_of_c: f64,
    /// Time of flight (ns), one way or round trip as requested.
    pub latency_ns: f64,
    /// Time of flight plus electronics overhead (ns).
    pub system_latency_ns: f64,
    /// One-way extra delay versus vacuum (ns).
    pub latency_tax_ns: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wasted_ops: Option<f64>,
}

/// Compare latency over `length_m` for the given catalogue keys, in order.
///
/// # Errors
/// Unknown keys and invalid lengths are rejected.
pub fn compare_media(
    catalog: &MediaCatalog,
    keys: &[&str],
    length_m: f64,
    round_trip: bool,
    overhead: SystemOverhead,
    gpu: Option<&GpuSpec>,
) -> EmtResult<Vec<MediaLatency>> {
    keys.iter()
        .map(|&key| {
            let medium = catalog
                .get(key)
                .ok_or_else(|| {
                    EmtError::InvalidParameter(format!(
                        "unknown medium '{key}' (known: {})",
                        catalog.keys().join(", ")
                    ))
                })?;
            let n = medium.refractive_index;
            let latency = latency_ns(length_m, n, round_trip)?;
            Ok(MediaLatency {
                key: medium.key.clone(),
                name: medium.label.clone(),
                n,
                speed_km_s: speed_km_s(n)?,
                percent_of_c: 100.0 * speed_fraction_c(n)?,
                latency_ns: latency,
                system_latency_ns: system_latency_ns(length_m, n, round_trip, overhead)?,
                latency_tax_ns: latency_tax_ns(length_m, n)?,
                wasted_ops: gpu.map(|g| wasted_operations(latency, g)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vacuum_speed_is_exact() {
        assert_eq!(speed(1.0, C_VACUUM_M_S).unwrap(), 299_792_458.0);
    }

    #[test]
    fn test_non_positive_index_is_rejected() {
        assert!(speed(0.0, C_VACUUM_M_S).is_err());
        assert!(speed(-1.2, C_VACUUM_M_S).is_err());
    }

    #[test]
    fn test_smf28_one_way_reference() {
        let t = propagation_latency(100.0, 1.4682, false, C_VACUUM_M_S).unwrap();
        assert_relative_eq!(t * 1e9, 489.7388, epsilon = 1e-3);
    }

    #[test]
    fn test_round_trip_doubles() {
        let one = latency_ns(200.0, 1.4682, false).unwrap();
        let two = latency_ns(200.0, 1.4682, true).unwrap();
        assert_relative_eq!(two, 2.0 * one, epsilon = 1e-9);
        assert_relative_eq!(two, 1958.955, epsilon = 1e-2);
    }

    #[test]
    fn test_negative_length_is_rejected() {
        assert_eq!(
            propagation_latency(-5.0, 1.45, false, C_VACUUM_M_S),
            Err(EmtError::InvalidLength(-5.0))
        );
    }

    #[test]
    fn test_vacuum_pays_no_tax() {
        assert_eq!(latency_tax_ns(1000.0, 1.0).unwrap(), 0.0);
        assert!(latency_tax_ns(1000.0, 1.45).unwrap() > 0.0);
    }

    #[test]
    fn test_typical_overhead_is_600ns_per_direction() {
        let tof = latency_ns(10.0, 1.45, true).unwrap();
        let total = system_latency_ns(10.0, 1.45, true, SystemOverhead::Typical).unwrap();
        assert_relative_eq!(total - tof, 1200.0, epsilon = 1e-9);
        let bare = system_latency_ns(10.0, 1.45, false, SystemOverhead::None).unwrap();
        assert_relative_eq!(bare, latency_ns(10.0, 1.45, false).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_index_target_is_strict() {
        assert!(meets_index_target(1.1524, LOW_INDEX_THRESHOLD));
        assert!(!meets_index_target(1.20, LOW_INDEX_THRESHOLD));
    }

    #[test]
    fn test_unknown_medium_lists_known_keys() {
        let catalog = crate::media::MediaCatalog::standard();
        let err = compare_media(&catalog, &["unobtainium"], 1.0, false, SystemOverhead::None, None)
            .unwrap_err();
        match err {
            EmtError::InvalidParameter(msg) => {
                assert!(msg.contains("unobtainium") && msg.contains("smf28"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
