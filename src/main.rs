use anyhow::{Context, Result};
use clap::Parser;
use ecm_migration::output::save_outputs;
use ecm_migration::MigrationSimulation;
use log::{debug, error, info};
use migration_common::SimulationConfig;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulates cell migration through a fibrous extracellular matrix")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of generations to simulate
    #[arg(short = 'g', long)]
    generations: Option<u32>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the base filename of every output
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Starting ECM migration engine...");

    // --- Load Configuration ---
    let mut config = SimulationConfig::load(&args.config)?;
    if let Some(generations) = args.generations {
        config.timing.num_generations = generations;
    }
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = seed;
    }
    if let Some(base) = args.output {
        config.output.base_filename = base;
    }
    config.validate().context("Invalid configuration after command-line overrides")?;
    info!("Loaded configuration from {}", args.config.display());
    debug!("Configuration: {:#?}", config);
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Initialize Simulation ---
    let mut sim = MigrationSimulation::new(config).context("Failed to initialize the ECM")?;

    // --- Simulation Loop ---
    let start_time = Instant::now();
    if let Err(e) = sim.run() {
        error!("Simulation failed at generation {}: {}", sim.current_generation() + 1, e);
        anyhow::bail!("Simulation step failed.");
    }
    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished in {:.3} seconds ({} generations).",
        total_duration.as_secs_f64(),
        sim.current_generation()
    );

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    let output = sim.config().output.clone();
    let run = sim.into_run();
    let written = save_outputs(&output, &run)?;
    info!("Wrote {} output files.", written.len());

    Ok(())
}
