//! Runs the producer / distributor / consumer demo and prints its trace.
//!
//! ```bash
//! # 20 simulated seconds, consumers drain once per second
//! tickroute
//!
//! # Longer run, slower consumers, reproducible
//! tickroute --cycles 60 --rate 2.5 --seed 7
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tickroute_core::{scenario, ConfigError, DemoConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tickroute")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of simulation cycles (seconds) to run
    #[arg(short = 'd', long, visible_alias = "duration", allow_hyphen_values = true)]
    cycles: Option<i64>,

    /// Seconds each consumer waits between two messages
    #[arg(short = 'r', long, allow_hyphen_values = true)]
    rate: Option<f64>,

    /// Random seed for reproducible runs. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with a full demo configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<DemoConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::from_json_file(path)?,
            None => DemoConfig::default(),
        };
        if let Some(cycles) = self.cycles {
            config.duration_secs = u64::try_from(cycles)
                .ok()
                .filter(|&c| c > 0)
                .ok_or(ConfigError::NonPositiveDuration)?;
        }
        if let Some(rate) = self.rate {
            config.consume_interval_secs = rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            error!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut sim = match scenario::build(&config) {
        Ok(sim) => sim,
        Err(err) => {
            error!("failed to wire demo topology: {err}");
            return ExitCode::FAILURE;
        }
    };
    sim.set_observer(|record| println!("{record}"));

    info!(
        duration_secs = config.duration_secs,
        consume_interval_secs = config.consume_interval_secs,
        consumers = config.consumers.len(),
        seed = ?config.seed,
        "Starting simulation"
    );
    println!("=== Starting Tickroute Demo Simulation ===");
    println!("Simulation Duration: {} cycles (seconds)", config.duration_secs);
    println!(
        "Producer: Randomly generates messages ({:.0}% chance per tick)",
        config.generation_probability * 100.0
    );
    println!("Distributor: Routes messages to correct consumer");
    println!(
        "Consumers: Process messages at fixed rate (1 per {} seconds)",
        config.consume_interval_secs
    );
    println!();

    sim.run();

    println!("\n=== Simulation Complete ===");
    println!("{}", sim.analytics);
    ExitCode::SUCCESS
}
