//! SoC simulation driver CLI.
//!
//! This binary boots the reference circuit from a firmware image. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON file, then command-line overrides.
//! 2. **Load:** Places the image in the circuit's SPI flash at the load offset.
//! 3. **Run:** Settles, pulses reset for one tick, then ticks the clock forever (or for
//!    `--max-ticks`).
//!
//! Any load or simulation error is fatal and exits with code 1.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use socsim_core::Simulator;
use socsim_core::config::{self, Config};

#[derive(Parser, Debug)]
#[command(
    name = "socsim",
    author,
    version,
    about = "Boot a cycle-accurate SoC model from SPI flash",
    long_about = "Load a firmware image into the simulated SPI flash, pulse reset for one clock, then clock the circuit until killed.\n\nExamples:\n  socsim --image build/bios.bin\n  socsim --image bios.bin --offset 0 --max-ticks 100000 --stats\n  socsim --config sim.json"
)]
struct Cli {
    /// Firmware image to load into flash.
    #[arg(long, env = "SOCSIM_IMAGE")]
    image: Option<PathBuf>,

    /// Flash byte offset for the image (decimal or 0x hex).
    #[arg(long, value_parser = parse_offset_arg)]
    offset: Option<u64>,

    /// JSON configuration file; command-line options take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many free-run ticks instead of running forever.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Print run statistics when the run stops.
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_offset_arg(text: &str) -> Result<u64, String> {
    config::parse_offset(text).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    info!(
        "image={} offset={:#010x} flash={} MiB",
        config.image_path.display(),
        config.load_offset,
        config.flash.capacity / 1024 / 1024
    );

    let mut sim = match Simulator::from_config(&config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("FATAL: {e}");
            if let Some(source) = std::error::Error::source(&e) {
                error!("  caused by: {source}");
            }
            process::exit(1);
        }
    };

    if let Err(e) = sim.run(config.run.max_ticks) {
        error!("FATAL: simulation aborted: {e}");
        if cli.stats {
            sim.stats().print();
        }
        process::exit(1);
    }

    if cli.stats {
        sim.stats().print();
    }
}

/// Merges defaults, the optional JSON file, and command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config, socsim_core::common::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(image) = &cli.image {
        config.image_path.clone_from(image);
    }
    if let Some(offset) = cli.offset {
        config.load_offset = offset;
    }
    if cli.max_ticks.is_some() {
        config.run.max_ticks = cli.max_ticks;
    }
    Ok(config)
}
