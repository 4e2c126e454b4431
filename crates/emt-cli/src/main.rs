//! `emt` command-line interface.
//!
//! Effective refractive index of porous silica and optical latency:
//! ```sh
//! emt index 30.6 --compare-methods
//! emt latency --length 200 --round-trip --overhead typical
//! emt sweep --points 101 -o sweep.csv
//! emt cluster configs/nvidia_b200.toml
//! emt media
//! ```

mod config;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use emt_core::media::{GpuCatalog, MediaCatalog};
use emt_core::propagation::{SystemOverhead, LOW_INDEX_THRESHOLD};
use emt_core::types::{MixingModel, N_SILICA, N_VOID};

use crate::config::{CalculatorOptions, LatencyOptions, SweepOptions};

#[derive(Parser)]
#[command(name = "emt")]
#[command(about = "Effective-medium refractive index and optical latency calculator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Effective refractive index of a solid/void composite.
    Index {
        /// Solid volume fraction in percent (0–100).
        solid_fraction_percent: f64,
        /// Print all three mixing rules side by side.
        #[arg(long)]
        compare_methods: bool,
        /// Print n_eff across telecom wavelengths using a Sellmeier silica solid phase.
        #[arg(long)]
        dispersion: bool,
        /// Mixing rule for the headline result.
        #[arg(long, value_enum, default_value_t = ModelArg::Bruggeman)]
        model: ModelArg,
        /// Refractive index of the solid phase.
        #[arg(long, default_value_t = N_SILICA)]
        n_solid: f64,
        /// Refractive index of the void phase.
        #[arg(long, default_value_t = N_VOID)]
        n_void: f64,
        /// Path length for the latency figures (m).
        #[arg(short, long, default_value_t = 100.0)]
        length: f64,
        /// Electronics overhead added to the latency figure.
        #[arg(long, value_enum, default_value_t = OverheadArg::None)]
        overhead: OverheadArg,
        /// Index below which the composite counts as low-index glass.
        #[arg(long, default_value_t = LOW_INDEX_THRESHOLD)]
        threshold: f64,
        /// One-line summary.
        #[arg(short, long)]
        quiet: bool,
    },
    /// Propagation speed and latency for reference media.
    Latency {
        /// Interconnect length (m).
        #[arg(short, long, default_value_t = 100.0)]
        length: f64,
        /// Report round-trip instead of one-way latency.
        #[arg(long)]
        round_trip: bool,
        /// Electronics overhead added per hop.
        #[arg(long, value_enum, default_value_t = OverheadArg::None)]
        overhead: OverheadArg,
        /// GPU identifier for the wasted-operations column (see `emt media`).
        #[arg(short, long)]
        gpu: Option<String>,
        /// One-line summary.
        #[arg(short, long)]
        quiet: bool,
        /// Write the table to a file: JSON for a `.json` path, CSV otherwise.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the table as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Effective index versus void fraction for all mixing rules.
    Sweep {
        /// Number of grid points in [0, 1].
        #[arg(short, long, default_value_t = 101)]
        points: usize,
        #[arg(long, default_value_t = N_SILICA)]
        n_solid: f64,
        #[arg(long, default_value_t = N_VOID)]
        n_void: f64,
        /// Write the sweep to a file: JSON for a `.json` path, CSV otherwise.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the sweep as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Latency-tax analysis from TOML cluster configuration files.
    Cluster {
        /// One or more cluster configuration files.
        #[arg(required = true)]
        configs: Vec<PathBuf>,
        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
        /// Also write the reports to a JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the built-in media and GPU catalogues.
    Media,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    VolumeAverage,
    MaxwellGarnett,
    Bruggeman,
}

impl From<ModelArg> for MixingModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::VolumeAverage => MixingModel::VolumeAverage,
            ModelArg::MaxwellGarnett => MixingModel::MaxwellGarnett,
            ModelArg::Bruggeman => MixingModel::Bruggeman,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OverheadArg {
    None,
    Typical,
}

impl From<OverheadArg> for SystemOverhead {
    fn from(arg: OverheadArg) -> Self {
        match arg {
            OverheadArg::None => SystemOverhead::None,
            OverheadArg::Typical => SystemOverhead::Typical,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let catalog = MediaCatalog::standard();
    let gpus = GpuCatalog::standard();

    match cli.command {
        Commands::Index {
            solid_fraction_percent,
            compare_methods,
            dispersion,
            model,
            n_solid,
            n_void,
            length,
            overhead,
            threshold,
            quiet,
        } => {
            let opts = CalculatorOptions {
                solid_percent: solid_fraction_percent,
                n_solid,
                n_void,
                model: model.into(),
                length_m: length,
                compare: compare_methods,
                dispersion,
                overhead: overhead.into(),
                threshold,
                quiet,
            };
            info!("index options: {:?}", opts);
            let report = runner::run_index(&opts)?;
            runner::print_index_report(&report, &opts, &catalog)?;
            Ok(())
        }
        Commands::Latency { length, round_trip, overhead, gpu, quiet, output, json } => {
            let opts = LatencyOptions {
                length_m: length,
                round_trip,
                overhead: overhead.into(),
                gpu,
                quiet,
                output,
                json,
            };
            info!("latency options: {:?}", opts);
            let rows = runner::run_latency(&opts, &catalog, &gpus)?;
            if opts.json {
                runner::write_json(&rows, None)?;
            } else {
                runner::print_latency_table(&rows, &opts);
            }
            match &opts.output {
                Some(path) if runner::is_json_path(path) => runner::write_json(&rows, Some(path))?,
                Some(path) => runner::write_latency_csv(&rows, path, &opts)?,
                None => {}
            }
            Ok(())
        }
        Commands::Sweep { points, n_solid, n_void, output, json } => {
            let opts = SweepOptions { points, n_solid, n_void, output, json };
            let rows = runner::run_sweep(&opts)?;
            if opts.json {
                runner::write_json(&rows, None)?;
            } else {
                println!("Effective index vs void fraction (n_solid = {}, n_void = {})", n_solid, n_void);
                println!();
                runner::print_sweep(&rows);
            }
            match &opts.output {
                Some(path) if runner::is_json_path(path) => runner::write_json(&rows, Some(path))?,
                Some(path) => runner::write_sweep_csv(&rows, path, &opts)?,
                None => {}
            }
            Ok(())
        }
        Commands::Cluster { configs, json, output } => {
            let loaded = configs
                .iter()
                .map(|path| Ok((path.display().to_string(), config::load_config(path)?)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let reports = runner::run_cluster(&loaded)?;
            if json {
                runner::write_json(&reports, None)?;
            } else {
                for report in &reports {
                    runner::print_cluster_report(report);
                }
            }
            if let Some(path) = &output {
                runner::write_json(&reports, Some(path))?;
            }
            Ok(())
        }
        Commands::Media => runner::print_media(&catalog, &gpus),
    }
}
