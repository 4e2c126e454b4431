//! Typed run options and TOML cluster configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use emt_core::cluster::ClusterSpec;
use emt_core::propagation::SystemOverhead;
use emt_core::types::MixingModel;

/// Options for the `index` subcommand, resolved from the command line.
#[derive(Debug, Clone)]
pub struct CalculatorOptions {
    /// Solid fraction in percent (0–100).
    pub solid_percent: f64,
    pub n_solid: f64,
    pub n_void: f64,
    pub model: MixingModel,
    /// Path length for the latency figures (m).
    pub length_m: f64,
    pub compare: bool,
    pub dispersion: bool,
    pub overhead: SystemOverhead,
    /// Index below which a composite counts as low-index glass.
    pub threshold: f64,
    pub quiet: bool,
}

/// Options for the `latency` subcommand.
#[derive(Debug, Clone)]
pub struct LatencyOptions {
    pub length_m: f64,
    pub round_trip: bool,
    pub overhead: SystemOverhead,
    /// GPU catalogue key for the wasted-operations column.
    pub gpu: Option<String>,
    pub quiet: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Options for the `sweep` subcommand.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub points: usize,
    pub n_solid: f64,
    pub n_void: f64,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Top-level cluster configuration file.
#[derive(Debug, Deserialize)]
pub struct ClusterConfig {
    pub cluster: ClusterSection,
    #[serde(default)]
    pub interconnect: InterconnectSection,
    #[serde(default)]
    pub specs: SpecsSection,
    #[serde(default)]
    pub cost: CostSection,
}

/// Cluster size and synchronisation pattern.
#[derive(Debug, Deserialize)]
pub struct ClusterSection {
    pub name: String,
    #[serde(default = "default_total_gpus")]
    pub total_gpus: u64,
    #[serde(default = "default_syncs_per_second")]
    pub syncs_per_second: f64,
    #[serde(default = "default_hops_per_sync")]
    pub hops_per_sync: u32,
}

/// Optical path between switches.
#[derive(Debug, Deserialize)]
pub struct InterconnectSection {
    #[serde(default = "default_cluster_distance_m")]
    pub cluster_distance_m: f64,
    /// Index of the installed fibre (default: SMF-28).
    #[serde(default = "default_fiber_n")]
    pub fiber_n: f64,
    /// Index of the candidate medium (default: low-index lattice glass).
    #[serde(default = "default_candidate_n")]
    pub candidate_n: f64,
}

impl Default for InterconnectSection {
    fn default() -> Self {
        Self {
            cluster_distance_m: default_cluster_distance_m(),
            fiber_n: default_fiber_n(),
            candidate_n: default_candidate_n(),
        }
    }
}

/// Accelerator throughput.
#[derive(Debug, Deserialize)]
pub struct SpecsSection {
    #[serde(default = "default_fp8_tflops")]
    pub fp8_tflops: f64,
}

impl Default for SpecsSection {
    fn default() -> Self {
        Self { fp8_tflops: default_fp8_tflops() }
    }
}

/// Pricing used for the dollar projection.
#[derive(Debug, Deserialize)]
pub struct CostSection {
    #[serde(default = "default_gpu_hour_cost")]
    pub gpu_hour_cost_usd: f64,
}

impl Default for CostSection {
    fn default() -> Self {
        Self { gpu_hour_cost_usd: default_gpu_hour_cost() }
    }
}

fn default_total_gpus() -> u64 {
    256
}
fn default_syncs_per_second() -> f64 {
    1000.0
}
fn default_hops_per_sync() -> u32 {
    4
}
fn default_cluster_distance_m() -> f64 {
    100.0
}
fn default_fiber_n() -> f64 {
    1.4682
}
fn default_candidate_n() -> f64 {
    1.1524
}
fn default_fp8_tflops() -> f64 {
    3958.0
}
fn default_gpu_hour_cost() -> f64 {
    2.0
}

impl ClusterConfig {
    /// Flatten into the core analysis input.
    pub fn to_spec(&self) -> ClusterSpec {
        ClusterSpec {
            name: self.cluster.name.clone(),
            total_gpus: self.cluster.total_gpus,
            syncs_per_second: self.cluster.syncs_per_second,
            hops_per_sync: self.cluster.hops_per_sync,
            cluster_distance_m: self.interconnect.cluster_distance_m,
            fiber_n: self.interconnect.fiber_n,
            candidate_n: self.interconnect.candidate_n,
            fp8_tflops: self.specs.fp8_tflops,
            gpu_hour_cost_usd: self.cost.gpu_hour_cost_usd,
        }
    }
}

/// Load and parse a TOML cluster configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<ClusterConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading cluster config {}", path.display()))?;
    let config: ClusterConfig = toml::from_str(&content)
        .with_context(|| format!("parsing cluster config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ClusterConfig = toml::from_str("[cluster]\nname = \"lab\"\n").unwrap();
        let spec = config.to_spec();
        assert_eq!(spec.name, "lab");
        assert_eq!(spec.total_gpus, 256);
        assert_eq!(spec.hops_per_sync, 4);
        assert_eq!(spec.cluster_distance_m, 100.0);
        assert_eq!(spec.fiber_n, 1.4682);
        assert_eq!(spec.gpu_hour_cost_usd, 2.0);
    }

    #[test]
    fn test_bundled_b200_config_parses() {
        let config: ClusterConfig =
            toml::from_str(include_str!("../../../configs/nvidia_b200.toml")).unwrap();
        assert_eq!(config.specs.fp8_tflops, 9000.0);
        assert!(config.cluster.total_gpus > 256);
    }

    #[test]
    fn test_missing_cluster_section_is_an_error() {
        let result: Result<ClusterConfig, _> = toml::from_str("[specs]\nfp8_tflops = 1.0\n");
        assert!(result.is_err());
    }
}
