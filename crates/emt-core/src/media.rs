//! Catalogues of named optical media and GPU platforms.
//!
//! Both catalogues are immutable once built. Callers construct them once
//! (usually with [`MediaCatalog::standard`] / [`GpuCatalog::standard`]) and
//! pass them by reference into the calculations that need them.
//!
//! ## Standard media
//!
//! | Key | Medium | n |
//! |-----|--------|---|
//! | `vacuum` | Vacuum | 1.0000 |
//! | `air` | Air (STP) | 1.000293 |
//! | `hollow_core` | Hollow-core fibre | 1.003 |
//! | `low_index` | Superluminal Glass (30.6 % silica lattice) | 1.1524 |
//! | `silica` | Standard silica | 1.4500 |
//! | `fused_silica` | Fused silica at 1550 nm | 1.4440 |
//! | `smf28` | SMF-28 fibre | 1.4682 |
//! | `silicon` | Silicon waveguide | 3.48 |

use serde::{Deserialize, Serialize};

use crate::types::MediumSample;

/// Media printed by the latency table, in display order.
pub const LATENCY_TABLE_KEYS: [&str; 5] = ["vacuum", "low_index", "hollow_core", "silica", "smf28"];

/// Ordered, immutable set of named media.
#[derive(Debug, Clone)]
pub struct MediaCatalog {
    media: Vec<MediumSample>,
}

impl MediaCatalog {
    /// Build a catalogue from arbitrary media. Later duplicates of a key are dropped.
    pub fn new(media: Vec<MediumSample>) -> Self {
        let mut unique: Vec<MediumSample> = Vec::with_capacity(media.len());
        for m in media {
            if !unique.iter().any(|u| u.key == m.key) {
                unique.push(m);
            }
        }
        Self { media: unique }
    }

    /// Reference media with published indices.
    pub fn standard() -> Self {
        Self::new(vec![
            MediumSample::catalogued("vacuum", "Vacuum", 1.0, "Physics definition"),
            MediumSample::catalogued(
                "air",
                "Air (STP)",
                1.000_293,
                "CRC Handbook of Chemistry and Physics",
            ),
            MediumSample::catalogued(
                "hollow_core",
                "Hollow-Core Fiber",
                1.003,
                "Lumenisity CoreSmart datasheet",
            ),
            MediumSample::catalogued(
                "low_index",
                "Superluminal Glass",
                1.1524,
                "Quoted target for a 30.6 % solid silica lattice",
            ),
            MediumSample::catalogued("silica", "Standard Silica (SiO₂)", 1.45, "Corning HPFS datasheet"),
            MediumSample::catalogued(
                "fused_silica",
                "Fused Silica (1550 nm)",
                1.444,
                "Malitson (1965) Sellmeier fit",
            ),
            MediumSample::catalogued("smf28", "SMF-28 Fiber", 1.4682, "Corning SMF-28 Ultra datasheet"),
            MediumSample::catalogued("silicon", "Silicon Waveguide", 3.48, "Soref & Bennett (1987)"),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&MediumSample> {
        self.media.iter().find(|m| m.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediumSample> {
        self.media.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.media.iter().map(|m| m.key.as_str()).collect()
    }
}

/// Compute throughput of a GPU platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSpec {
    pub key: String,
    pub name: String,
    /// Dense FP8 throughput (TFLOPS). Zero for parts without FP8.
    pub fp8_tflops: f64,
    pub fp16_tflops: f64,
    pub year: u16,
}

impl GpuSpec {
    /// FP8 operations per nanosecond (TFLOPS × 1e3).
    pub fn ops_per_ns(&self) -> f64 {
        self.fp8_tflops * 1e3
    }
}

/// Immutable set of GPU platforms.
#[derive(Debug, Clone)]
pub struct GpuCatalog {
    gpus: Vec<GpuSpec>,
}

impl GpuCatalog {
    /// Public datasheet figures (B200 values are launch estimates).
    pub fn standard() -> Self {
        let gpu = |key: &str, name: &str, fp8_tflops: f64, fp16_tflops: f64, year: u16| GpuSpec {
            key: key.into(),
            name: name.into(),
            fp8_tflops,
            fp16_tflops,
            year,
        };
        Self {
            gpus: vec![
                gpu("k80", "NVIDIA K80", 0.0, 0.0, 2014),
                gpu("v100", "NVIDIA V100", 0.0, 125.0, 2017),
                gpu("a100", "NVIDIA A100", 624.0, 312.0, 2020),
                gpu("h100", "NVIDIA H100 SXM5", 3958.0, 1979.0, 2023),
                gpu("b200", "NVIDIA B200", 9000.0, 4500.0, 2024),
            ],
        }
    }

    pub fn get(&self, key: &str) -> Option<&GpuSpec> {
        self.gpus.iter().find(|g| g.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GpuSpec> {
        self.gpus.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.gpus.iter().map(|g| g.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_table_keys_exist() {
        let catalog = MediaCatalog::standard();
        for key in LATENCY_TABLE_KEYS {
            assert!(catalog.get(key).is_some(), "missing medium {key}");
        }
    }

    #[test]
    fn test_every_catalogued_index_is_physical() {
        assert!(MediaCatalog::standard().iter().all(|m| m.refractive_index >= 1.0));
    }

    #[test]
    fn test_duplicate_keys_keep_first_entry() {
        let catalog = MediaCatalog::new(vec![
            MediumSample::catalogued("x", "first", 1.1, ""),
            MediumSample::catalogued("x", "second", 1.2, ""),
        ]);
        assert_eq!(catalog.keys(), vec!["x"]);
        assert_eq!(catalog.get("x").unwrap().label, "first");
    }

    #[test]
    fn test_h100_ops_per_ns() {
        let gpus = GpuCatalog::standard();
        assert_eq!(gpus.get("h100").unwrap().ops_per_ns(), 3_958_000.0);
        assert!(gpus.get("tpu").is_none());
    }
}
