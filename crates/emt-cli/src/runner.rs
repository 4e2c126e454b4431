//! Report runner: ties together the mixing rules, media catalogue and materials.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use emt_core::cluster::{analyze_cluster, ClusterReport};
use emt_core::media::{GpuCatalog, MediaCatalog, LATENCY_TABLE_KEYS};
use emt_core::mixing::{compare_methods, evaluate, sweep_void_fraction, SweepRow};
use emt_core::propagation::{
    compare_media, latency_ns, meets_index_target, speed_fraction_c, speed_km_s,
    system_latency_ns, MediaLatency, SystemOverhead,
};
use emt_core::types::{CompositeSpec, MediumSample, MixingModel, MixingResult};
use emt_materials::constant::ConstantMaterial;
use emt_materials::provider::MaterialProvider;
use emt_materials::sellmeier::SellmeierMaterial;

use crate::config::{CalculatorOptions, ClusterConfig, LatencyOptions, SweepOptions};

/// Telecom O- to U-band wavelengths used by the dispersion report (nm).
const DISPERSION_RANGE_NM: [f64; 2] = [1260.0, 1675.0];
const DISPERSION_POINTS: usize = 10;

/// Effective index and latency of the composite at one wavelength.
#[derive(Debug, Clone)]
pub struct DispersionRow {
    pub wavelength_nm: f64,
    pub n_solid: f64,
    /// Group index of the bulk solid phase.
    pub n_group_solid: f64,
    pub n_eff: f64,
    pub latency_ns: f64,
}

/// Everything the `index` subcommand prints.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub spec: CompositeSpec,
    pub primary: MixingResult,
    pub comparison: Option<Vec<MixingResult>>,
    pub dispersion: Option<Vec<DispersionRow>>,
}

/// Evaluate the composite described by `opts`.
pub fn run_index(opts: &CalculatorOptions) -> Result<IndexReport> {
    let spec = CompositeSpec::from_percent(opts.solid_percent, opts.n_solid, opts.n_void)
        .context("lattice density must be a solid fraction between 0 % and 100 % with indices >= 1")?;

    let primary = evaluate(&spec, opts.model, opts.length_m)
        .with_context(|| format!("{} evaluation failed", opts.model))?;

    let comparison = if opts.compare {
        Some(compare_methods(&spec, opts.length_m).context("model comparison failed")?)
    } else {
        None
    };

    let dispersion = if opts.dispersion {
        let silica = SellmeierMaterial::fused_silica();
        let void = ConstantMaterial::new("Void", opts.n_void)?;
        let wavelengths = wavelength_grid(DISPERSION_RANGE_NM, DISPERSION_POINTS);
        Some(dispersion_table(&spec, opts.model, opts.length_m, &silica, &void, &wavelengths)?)
    } else {
        None
    };

    Ok(IndexReport { spec, primary, comparison, dispersion })
}

fn wavelength_grid(range: [f64; 2], points: usize) -> Vec<f64> {
    let [start, end] = range;
    (0..points)
        .map(|i| start + (end - start) * i as f64 / (points - 1).max(1) as f64)
        .collect()
}

/// Re-evaluate `model` with both phase indices taken from their providers at each wavelength.
pub fn dispersion_table(
    spec: &CompositeSpec,
    model: MixingModel,
    length_m: f64,
    solid: &dyn MaterialProvider,
    void: &dyn MaterialProvider,
    wavelengths: &[f64],
) -> Result<Vec<DispersionRow>> {
    let rule = model.rule();
    wavelengths
        .iter()
        .map(|&wl| {
            let context = |m: &dyn MaterialProvider| format!("Material '{}' at {:.1} nm", m.name(), wl);
            let n_solid = solid.refractive_index(wl).with_context(|| context(solid))?.re;
            let n_group_solid = solid.group_index(wl).with_context(|| context(solid))?;
            let n_void = void.refractive_index(wl).with_context(|| context(void))?.re;
            let at_wl = CompositeSpec::new(spec.solid_fraction(), n_solid, n_void)?;
            let n_eff = rule.effective_index(&at_wl)?.n_eff;
            Ok(DispersionRow {
                wavelength_nm: wl,
                n_solid,
                n_group_solid,
                n_eff,
                latency_ns: latency_ns(length_m, n_eff, false)?,
            })
        })
        .collect()
}

/// Print the `index` report.
pub fn print_index_report(report: &IndexReport, opts: &CalculatorOptions, catalog: &MediaCatalog) -> Result<()> {
    let r = &report.primary;
    let fraction_c = speed_fraction_c(r.n_eff)?;
    let low_index = meets_index_target(r.n_eff, opts.threshold);

    if opts.quiet {
        let status = if low_index { "LOW-INDEX" } else { "STANDARD" };
        println!(
            "Refractive Index: {:.4}. Speed: {:.2}c. Status: {}.",
            r.n_eff, fraction_c, status
        );
        return Ok(());
    }

    println!("Effective Medium Index Calculator");
    println!("=================================");
    println!("  Solid fraction:   {:.1} %", report.spec.solid_fraction() * 100.0);
    println!("  Void fraction:    {:.1} %", report.spec.void_fraction() * 100.0);
    println!("  n_solid:          {:.4}", report.spec.n_solid());
    println!("  n_void:           {:.4}", report.spec.n_void());
    println!();
    println!("Result ({}):", r.model);
    println!("  Refractive index: {:.4}", r.n_eff);
    println!("  Speed:            {:.0} km/s ({:.2}c)", r.speed_km_s, fraction_c);
    println!("  Latency:          {:.2} ns over {} m (one-way)", r.latency_ns, r.length_m);
    if opts.overhead != SystemOverhead::None {
        let total = system_latency_ns(r.length_m, r.n_eff, false, opts.overhead)?;
        println!("  With overhead:    {:.2} ns (+{:.0} ns SerDes/FEC/switch)", total, opts.overhead.per_hop_ns());
    }
    if low_index {
        println!("  Status:           LOW-INDEX (n < {:.2})", opts.threshold);
    } else {
        println!("  Status:           STANDARD (n >= {:.2})", opts.threshold);
    }
    if let Some(w) = r.warning {
        println!("  Warning:          {}", w);
    }

    println!();
    println!("  {:<25} {:>8} {:>15}", "Medium", "n", "Speed (km/s)");
    println!("  {:-<25} {:->8} {:->15}", "", "", "");
    let composite = MediumSample::new("This composite", r.n_eff)?;
    let references = ["smf28", "vacuum"].into_iter().filter_map(|key| catalog.get(key));
    for m in std::iter::once(&composite).chain(references) {
        let v = speed_km_s(m.refractive_index)?;
        println!("  {:<25} {:>8.4} {:>15.0}", m.label, m.refractive_index, v);
    }
    if let Some(fiber) = catalog.get("smf28") {
        let fiber_speed = speed_km_s(fiber.refractive_index)?;
        println!();
        println!("  Speed gain vs {}: {:.1} %", fiber.label, (r.speed_km_s / fiber_speed - 1.0) * 100.0);
    }

    if let Some(rows) = &report.comparison {
        println!();
        println!("Model comparison:");
        println!("  {:<18} {:>8} {:>14} {:>12}", "Model", "n_eff", "Speed (km/s)", "Latency");
        for row in rows {
            let flag = if row.warning.is_some() { " *" } else { "" };
            println!(
                "  {:<18} {:>8.4} {:>14.0} {:>9.2} ns{}",
                row.model.label(),
                row.n_eff,
                row.speed_km_s,
                row.latency_ns,
                flag
            );
        }
        if rows.iter().any(|row| row.warning.is_some()) {
            println!("  * outside the model's validity range; treat as indicative only");
        }
    }

    if let Some(rows) = &report.dispersion {
        println!();
        println!("Dispersion ({}, fused-silica Sellmeier solid phase):", r.model);
        println!(
            "  {:>10} {:>9} {:>10} {:>8} {:>12}",
            "λ (nm)", "n_solid", "n_g solid", "n_eff", "Latency"
        );
        for row in rows {
            println!(
                "  {:>10.1} {:>9.4} {:>10.4} {:>8.4} {:>9.2} ns",
                row.wavelength_nm, row.n_solid, row.n_group_solid, row.n_eff, row.latency_ns
            );
        }
    }
    Ok(())
}

/// Build the fixed media latency table.
pub fn run_latency(opts: &LatencyOptions, catalog: &MediaCatalog, gpus: &GpuCatalog) -> Result<Vec<MediaLatency>> {
    let gpu = match &opts.gpu {
        Some(key) => Some(gpus.get(key).with_context(|| {
            format!("Unknown GPU '{}'. Valid identifiers: {}", key, gpus.keys().join(", "))
        })?),
        None => None,
    };
    let rows = compare_media(
        catalog,
        &LATENCY_TABLE_KEYS,
        opts.length_m,
        opts.round_trip,
        opts.overhead,
        gpu,
    )
    .context("latency calculation failed")?;
    Ok(rows)
}

/// Print the media latency table.
pub fn print_latency_table(rows: &[MediaLatency], opts: &LatencyOptions) {
    let find = |key: &str| rows.iter().find(|r| r.key == key);
    let direction = if opts.round_trip { "round-trip" } else { "one-way" };

    if opts.quiet {
        if let (Some(standard), Some(low)) = (find("silica"), find("low_index")) {
            println!(
                "Latency: {:.0}ns ({}) vs {:.0}ns ({}). Gap: {:.0}ns.",
                standard.system_latency_ns,
                standard.name,
                low.system_latency_ns,
                low.name,
                standard.system_latency_ns - low.system_latency_ns
            );
        }
        return;
    }

    println!("Optical Interconnect Latency");
    println!("============================");
    println!("  Length: {} m ({})", opts.length_m, direction);
    if opts.overhead != SystemOverhead::None {
        println!("  Overhead: {:.0} ns per hop (SerDes + FEC + switch)", opts.overhead.per_hop_ns());
    }
    println!();
    println!(
        "  {:<25} {:>8} {:>14} {:>12} {:>12}{}",
        "Medium",
        "n",
        "Speed (km/s)",
        "Latency",
        "System",
        if rows.iter().any(|r| r.wasted_ops.is_some()) { "   Wasted ops" } else { "" }
    );
    for r in rows {
        let wasted = r.wasted_ops.map(format_ops).unwrap_or_default();
        println!(
            "  {:<25} {:>8.4} {:>14.0} {:>9.2} ns {:>9.2} ns {:>12}",
            r.name, r.n, r.speed_km_s, r.latency_ns, r.system_latency_ns, wasted
        );
    }

    if let (Some(standard), Some(low), Some(vacuum)) = (find("silica"), find("low_index"), find("vacuum")) {
        let gap = standard.latency_ns - low.latency_ns;
        println!();
        println!("  Gap vs {}: {:.2} ns ({:.1} %)", standard.name, gap, gap / standard.latency_ns * 100.0);
        println!("  Vacuum floor:        {:.2} ns", vacuum.latency_ns);
        if standard.system_latency_ns > 0.0 {
            let tof_share = standard.latency_ns / standard.system_latency_ns * 100.0;
            println!("  Time of flight share of {} system latency: {:.1} %", standard.name, tof_share);
        }
    }
}

fn format_ops(ops: f64) -> String {
    if ops > 1e9 {
        format!("{:.2}B", ops / 1e9)
    } else {
        format!("{:.1}M", ops / 1e6)
    }
}

/// Evaluate all three rules across the void-fraction grid.
pub fn run_sweep(opts: &SweepOptions) -> Result<Vec<SweepRow>> {
    let rows = sweep_void_fraction(opts.n_solid, opts.n_void, opts.points).context("void-fraction sweep failed")?;
    Ok(rows)
}

/// Print a sweep, sub-sampled to at most 11 lines.
pub fn print_sweep(rows: &[SweepRow]) {
    println!("  {:>8} {:>10} {:>10} {:>10}", "void %", "VolAvg", "MG", "Bruggeman");
    let stride = (rows.len() / 10).max(1);
    for (i, r) in rows.iter().enumerate() {
        if i % stride == 0 || i == rows.len() - 1 {
            println!(
                "  {:>8.1} {:>10.4} {:>10.4} {:>10.4}",
                r.void_fraction * 100.0,
                r.n_volume_average,
                r.n_maxwell_garnett,
                r.n_bruggeman
            );
        }
    }
}

/// Analyse every loaded cluster configuration.
pub fn run_cluster(configs: &[(String, ClusterConfig)]) -> Result<Vec<ClusterReport>> {
    configs
        .iter()
        .map(|(source, config)| {
            analyze_cluster(&config.to_spec()).with_context(|| format!("invalid cluster config {}", source))
        })
        .collect()
}

/// Print a cluster latency-tax report.
pub fn print_cluster_report(report: &ClusterReport) {
    println!("Cluster Latency Analysis: {}", report.name);
    println!("==========================");
    println!("  GPUs:                 {}", report.total_gpus);
    println!("  Cluster distance:     {} m", report.cluster_distance_m);
    println!("  Syncs per second:     {}", report.syncs_per_second);
    println!("  Hops per sync:        {}", report.hops_per_sync);
    println!();
    println!("  Round trip per hop:");
    println!("    Installed fibre:    {:.2} ns", report.latency_standard_ns);
    println!("    Candidate medium:   {:.2} ns", report.latency_candidate_ns);
    println!("    Savings per hop:    {:.2} ns", report.savings_per_hop_ns);
    println!("    Savings per sync:   {:.2} ns", report.savings_per_sync_ns);
    println!();
    println!("  Daily latency tax:    {:.1} GPU-hours", report.daily_latency_tax_gpu_hours);
    println!("  Daily recoverable:    {:.1} GPU-hours", report.daily_savings_gpu_hours);
    println!("  Annual latency tax:   {:.0} GPU-hours", report.annual_latency_tax_gpu_hours);
    println!("  Annual savings:       {:.0} GPU-hours (${:.0})", report.annual_savings_gpu_hours, report.annual_savings_usd);
    println!("  Ops idle per round trip: {:.2e}", report.wasted_ops_per_round_trip);
    println!();
}

/// Print the catalogues.
pub fn print_media(catalog: &MediaCatalog, gpus: &GpuCatalog) -> Result<()> {
    println!("Optical media:");
    println!();
    for m in catalog.iter() {
        println!(
            "  {:<13} {:<25} n = {:<9} {:>8.0} km/s  ({})",
            m.key,
            m.label,
            m.refractive_index,
            speed_km_s(m.refractive_index)?,
            m.source
        );
    }
    println!();
    println!("GPU platforms:");
    println!();
    for g in gpus.iter() {
        println!(
            "  {:<6} {:<18} {:>6.0} TFLOPS FP8 {:>6.0} TFLOPS FP16  ({})",
            g.key, g.name, g.fp8_tflops, g.fp16_tflops, g.year
        );
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Write the latency table to CSV with a metadata header.
pub fn write_latency_csv(rows: &[MediaLatency], path: &Path, opts: &LatencyOptions) -> Result<()> {
    use std::io::Write;

    create_parent(path)?;
    let mut file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "# emt - Optical Interconnect Latency")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# length_m: {}", opts.length_m)?;
    writeln!(file, "# round_trip: {}", opts.round_trip)?;
    writeln!(file, "# overhead_ns: {}", opts.overhead.per_hop_ns())?;
    writeln!(file, "#")?;
    writeln!(
        file,
        "key,name,n,speed_km_s,percent_of_c,latency_ns,system_latency_ns,latency_tax_ns,wasted_ops"
    )?;
    for r in rows {
        writeln!(
            file,
            "{},\"{}\",{:.6},{:.3},{:.4},{:.4},{:.4},{:.4},{}",
            r.key,
            r.name,
            r.n,
            r.speed_km_s,
            r.percent_of_c,
            r.latency_ns,
            r.system_latency_ns,
            r.latency_tax_ns,
            r.wasted_ops.map(|w| format!("{:.6e}", w)).unwrap_or_default()
        )?;
    }

    println!("Latency table written to: {}", path.display());
    Ok(())
}

/// Write a void-fraction sweep to CSV with a metadata header.
pub fn write_sweep_csv(rows: &[SweepRow], path: &Path, opts: &SweepOptions) -> Result<()> {
    use std::io::Write;

    create_parent(path)?;
    let mut file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(file, "# emt - Effective Index vs Void Fraction")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# n_solid: {}", opts.n_solid)?;
    writeln!(file, "# n_void: {}", opts.n_void)?;
    writeln!(file, "#")?;
    writeln!(file, "void_fraction,n_volume_average,n_maxwell_garnett,n_bruggeman")?;
    for r in rows {
        writeln!(
            file,
            "{:.6},{:.8},{:.8},{:.8}",
            r.void_fraction, r.n_volume_average, r.n_maxwell_garnett, r.n_bruggeman
        )?;
    }

    println!("Sweep written to: {}", path.display());
    Ok(())
}

/// Whether an output path asks for JSON rather than CSV.
pub fn is_json_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Serialise any report as pretty JSON, to a file or stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    match path {
        Some(path) => {
            create_parent(path)?;
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("JSON written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn index_options(solid_percent: f64) -> CalculatorOptions {
        CalculatorOptions {
            solid_percent,
            n_solid: 1.45,
            n_void: 1.0,
            model: MixingModel::Bruggeman,
            length_m: 100.0,
            compare: true,
            dispersion: true,
            overhead: SystemOverhead::None,
            threshold: 1.20,
            quiet: true,
        }
    }

    fn latency_options() -> LatencyOptions {
        LatencyOptions {
            length_m: 100.0,
            round_trip: false,
            overhead: SystemOverhead::Typical,
            gpu: Some("h100".into()),
            quiet: true,
            output: None,
            json: false,
        }
    }

    #[test]
    fn test_index_report_sections() {
        let report = run_index(&index_options(30.6)).unwrap();
        assert_eq!(report.primary.model, MixingModel::Bruggeman);
        assert_eq!(report.comparison.as_ref().unwrap().len(), 3);

        let dispersion = report.dispersion.unwrap();
        assert_eq!(dispersion.len(), DISPERSION_POINTS);
        assert_eq!(dispersion[0].wavelength_nm, 1260.0);
        assert_relative_eq!(dispersion.last().unwrap().wavelength_nm, 1675.0, epsilon = 1e-9);
        assert!(dispersion.iter().all(|r| r.n_eff < r.n_solid && r.n_group_solid > r.n_solid));
    }

    #[test]
    fn test_out_of_range_percent_fails() {
        let err = run_index(&index_options(100.5)).unwrap_err();
        assert!(err.to_string().contains("between 0 % and 100 %"));
    }

    #[test]
    fn test_latency_rows_follow_table_order() {
        let rows = run_latency(&latency_options(), &MediaCatalog::standard(), &GpuCatalog::standard()).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, LATENCY_TABLE_KEYS.to_vec());
        assert!(rows.iter().all(|r| r.wasted_ops.is_some()));
        assert_relative_eq!(rows[0].system_latency_ns - rows[0].latency_ns, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_gpu_is_rejected() {
        let opts = LatencyOptions { gpu: Some("tpu".into()), ..latency_options() };
        let err = run_latency(&opts, &MediaCatalog::standard(), &GpuCatalog::standard()).unwrap_err();
        assert!(err.to_string().contains("Unknown GPU 'tpu'"));
    }

    #[test]
    fn test_sweep_csv_has_header_and_rows() {
        let opts = SweepOptions { points: 5, n_solid: 1.45, n_void: 1.0, output: None, json: false };
        let rows = run_sweep(&opts).unwrap();
        let path = std::env::temp_dir().join(format!("emt-sweep-{}.csv", std::process::id()));
        write_sweep_csv(&rows, &path, &opts).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let data: Vec<_> = content.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data[0], "void_fraction,n_volume_average,n_maxwell_garnett,n_bruggeman");
        assert_eq!(data.len(), 6);
        assert!(data[1].starts_with("0.000000,1.45000000"));
    }

    #[test]
    fn test_json_output_is_chosen_by_extension() {
        assert!(is_json_path(Path::new("out/latency.JSON")));
        assert!(!is_json_path(Path::new("out/latency.csv")));
        assert!(!is_json_path(Path::new("latency")));
    }

    #[test]
    fn test_latency_json_file_round_trips_rows() {
        let rows = run_latency(&latency_options(), &MediaCatalog::standard(), &GpuCatalog::standard()).unwrap();
        let dir = std::env::temp_dir().join(format!("emt-json-{}", std::process::id()));
        let path = dir.join("latency.json");
        write_json(&rows, Some(&path)).unwrap();

        let parsed: Vec<MediaLatency> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_nan_throughput_config_is_rejected() {
        let config: ClusterConfig =
            toml::from_str("[cluster]\nname = \"lab\"\n[specs]\nfp8_tflops = nan\n").unwrap();
        let err = run_cluster(&[("lab.toml".into(), config)]).unwrap_err();
        assert!(err.to_string().contains("lab.toml"));
    }

    #[test]
    fn test_dispersion_uses_void_provider() {
        let spec = CompositeSpec::silica_air(0.306).unwrap();
        let silica = SellmeierMaterial::fused_silica();
        let air = ConstantMaterial::new("Void", 1.0).unwrap();
        let denser_void = ConstantMaterial::new("Water", 1.33).unwrap();
        let in_air = dispersion_table(&spec, MixingModel::Bruggeman, 100.0, &silica, &air, &[1550.0]).unwrap();
        let in_water =
            dispersion_table(&spec, MixingModel::Bruggeman, 100.0, &silica, &denser_void, &[1550.0]).unwrap();
        assert!(in_water[0].n_eff > in_air[0].n_eff);
    }
}
