//! Latency-tax analysis for synchronous GPU clusters.
//!
//! Each gradient synchronisation crosses `hops_per_sync` optical links of
//! length `cluster_distance_m`, and every GPU idles while photons are in
//! flight. Comparing the installed fibre with a candidate lower-index medium
//! gives the recoverable idle time:
//!
//! - per-hop round trip: $2 L n / c$
//! - per sync: hops × per-hop
//! - daily GPU-hours: syncs/s × 86 400 s × per-sync / 1e9 × GPUs / 3600

use serde::{Deserialize, Serialize};

use crate::error::{check_index, check_length, EmtError, EmtResult};
use crate::propagation::latency_ns;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Inputs for a cluster latency analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub total_gpus: u64,
    pub syncs_per_second: f64,
    pub hops_per_sync: u32,
    /// Typical optical path between switches (m).
    pub cluster_distance_m: f64,
    /// Index of the installed fibre.
    pub fiber_n: f64,
    /// Index of the candidate replacement medium.
    pub candidate_n: f64,
    /// Per-GPU FP8 throughput (TFLOPS).
    pub fp8_tflops: f64,
    pub gpu_hour_cost_usd: f64,
}

impl ClusterSpec {
    fn validate(&self) -> EmtResult<()> {
        if self.total_gpus == 0 {
            return Err(EmtError::InvalidParameter("cluster needs at least one GPU".into()));
        }
        if !(self.syncs_per_second.is_finite() && self.syncs_per_second >= 0.0) {
            return Err(EmtError::InvalidParameter(format!(
                "syncs_per_second must be non-negative, got {}",
                self.syncs_per_second
            )));
        }
        let costs = [("fp8_tflops", self.fp8_tflops), ("gpu_hour_cost_usd", self.gpu_hour_cost_usd)];
        for (name, value) in costs {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EmtError::InvalidParameter(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        check_length(self.cluster_distance_m)?;
        check_index("fiber_n", self.fiber_n)?;
        check_index("candidate_n", self.candidate_n)?;
        Ok(())
    }
}

/// Result of [`analyze_cluster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub name: String,
    pub total_gpus: u64,
    pub cluster_distance_m: f64,
    pub syncs_per_second: f64,
    pub hops_per_sync: u32,
    /// Round-trip time of flight per hop in the installed fibre (ns).
    pub latency_standard_ns: f64,
    /// Round-trip time of flight per hop in the candidate medium (ns).
    pub latency_candidate_ns: f64,
    pub savings_per_hop_ns: f64,
    pub savings_per_sync_ns: f64,
    pub daily_latency_tax_gpu_hours: f64,
    pub daily_savings_gpu_hours: f64,
    pub annual_latency_tax_gpu_hours: f64,
    pub annual_savings_gpu_hours: f64,
    pub annual_savings_usd: f64,
    /// FP8 operations one GPU could run during a single standard round trip.
    pub wasted_ops_per_round_trip: f64,
}

/// Idle GPU-hours per day caused by `per_sync_ns` of waiting per sync.
fn daily_gpu_hours(spec: &ClusterSpec, per_sync_ns: f64) -> f64 {
    let idle_s = spec.syncs_per_second * SECONDS_PER_DAY * per_sync_ns / 1e9;
    idle_s * spec.total_gpus as f64 / 3600.0
}

/// Estimate the latency tax of a cluster and the savings of a lower-index medium.
///
/// # Errors
/// Rejects zero GPUs, negative rates or distances, and indices below 1.
pub fn analyze_cluster(spec: &ClusterSpec) -> EmtResult<ClusterReport> {
    spec.validate()?;

    let latency_standard_ns = latency_ns(spec.cluster_distance_m, spec.fiber_n, true)?;
    let latency_candidate_ns = latency_ns(spec.cluster_distance_m, spec.candidate_n, true)?;
    let savings_per_hop_ns = latency_standard_ns - latency_candidate_ns;

    let hops = f64::from(spec.hops_per_sync);
    let per_sync_standard_ns = hops * latency_standard_ns;
    let savings_per_sync_ns = hops * savings_per_hop_ns;

    let daily_latency_tax_gpu_hours = daily_gpu_hours(spec, per_sync_standard_ns);
    let daily_savings_gpu_hours = daily_gpu_hours(spec, savings_per_sync_ns);
    let annual_savings_gpu_hours = daily_savings_gpu_hours * DAYS_PER_YEAR;

    Ok(ClusterReport {
        name: spec.name.clone(),
        total_gpus: spec.total_gpus,
        cluster_distance_m: spec.cluster_distance_m,
        syncs_per_second: spec.syncs_per_second,
        hops_per_sync: spec.hops_per_sync,
        latency_standard_ns,
        latency_candidate_ns,
        savings_per_hop_ns,
        savings_per_sync_ns,
        daily_latency_tax_gpu_hours,
        daily_savings_gpu_hours,
        annual_latency_tax_gpu_hours: daily_latency_tax_gpu_hours * DAYS_PER_YEAR,
        annual_savings_gpu_hours,
        annual_savings_usd: annual_savings_gpu_hours * spec.gpu_hour_cost_usd,
        wasted_ops_per_round_trip: latency_standard_ns * spec.fp8_tflops * 1e3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn b200_pod() -> ClusterSpec {
        ClusterSpec {
            name: "B200 pod".into(),
            total_gpus: 1024,
            syncs_per_second: 1000.0,
            hops_per_sync: 4,
            cluster_distance_m: 100.0,
            fiber_n: 1.4682,
            candidate_n: 1.1524,
            fp8_tflops: 9000.0,
            gpu_hour_cost_usd: 2.0,
        }
    }

    #[test]
    fn test_lower_index_candidate_saves_time() {
        let report = analyze_cluster(&b200_pod()).unwrap();
        assert!(report.savings_per_hop_ns > 0.0);
        assert_relative_eq!(report.latency_standard_ns, 979.4776, epsilon = 1e-3);
        assert_relative_eq!(report.savings_per_sync_ns, 4.0 * report.savings_per_hop_ns, epsilon = 1e-9);
        assert!(report.daily_savings_gpu_hours < report.daily_latency_tax_gpu_hours);
    }

    #[test]
    fn test_daily_tax_scaling() {
        let report = analyze_cluster(&b200_pod()).unwrap();
        // 1000 syncs/s * 86400 s * (4 * 979.48 ns) = 338.5 s idle per GPU per day.
        let expected = 1000.0 * 86_400.0 * 4.0 * report.latency_standard_ns / 1e9 * 1024.0 / 3600.0;
        assert_relative_eq!(report.daily_latency_tax_gpu_hours, expected, epsilon = 1e-9);
        assert_relative_eq!(
            report.annual_savings_usd,
            report.daily_savings_gpu_hours * 365.0 * 2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_empty_cluster_is_rejected() {
        let spec = ClusterSpec { total_gpus: 0, ..b200_pod() };
        assert!(matches!(analyze_cluster(&spec), Err(EmtError::InvalidParameter(_))));
    }

    #[test]
    fn test_sub_unity_candidate_is_rejected() {
        let spec = ClusterSpec { candidate_n: 0.5, ..b200_pod() };
        assert!(matches!(analyze_cluster(&spec), Err(EmtError::InvalidIndex { .. })));
    }

    #[test]
    fn test_non_finite_throughput_and_cost_are_rejected() {
        for spec in [
            ClusterSpec { fp8_tflops: f64::NAN, ..b200_pod() },
            ClusterSpec { gpu_hour_cost_usd: f64::INFINITY, ..b200_pod() },
            ClusterSpec { gpu_hour_cost_usd: -1.0, ..b200_pod() },
        ] {
            assert!(matches!(analyze_cluster(&spec), Err(EmtError::InvalidParameter(_))));
        }
    }
}
