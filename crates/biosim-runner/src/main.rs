//! Runs a BioSim scenario file.

#[macro_use]
mod telemetry;

use anyhow::{Context, Result};
use biosim_core::{SimulationConfig, Species};
use biosim_world::BioSim;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Run a BioSim island scenario")]
struct Args {
    /// Path to the scenario JSON file
    #[arg(default_value = "demos/scenario.json")]
    scenario: PathBuf,

    /// Override the number of simulated years
    years: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json)?;

    let config = SimulationConfig::load(&args.scenario)
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;
    let years = args.years.unwrap_or(config.years);

    info!(
        scenario = %args.scenario.display(),
        seed = config.seed,
        years,
        "Starting simulation"
    );

    let mut sim = BioSim::from_config(&config).context("invalid scenario")?;
    let history = sim.simulate(years)?;

    record_gauge!("final_population", sim.num_animals(), year = sim.year());

    let counts = sim.num_animals_per_species();
    println!("year {}: {} animals", sim.year(), sim.num_animals());
    for species in Species::all() {
        let peak = history.iter().map(|c| c.get(species)).max().unwrap_or(0);
        let mean_weight = sim.yearly_stats().species(species).mean_weight();
        match mean_weight {
            Some(weight) => println!(
                "  {:<10} {:>6} (peak {}, mean weight {:.2})",
                species.name(),
                counts.get(species),
                peak,
                weight
            ),
            None => println!("  {:<10} {:>6} (peak {})", species.name(), counts.get(species), peak),
        }
    }

    Ok(())
}
