//! Simulation driver owning the island, the random stream and the year count.

use crate::count_log::CountLog;
use crate::island::{Distributions, Island};
use crate::rng::SimRng;
use biosim_core::{
    HistogramSpecs, ParamMap, ParamRegistry, PopulationRecord, Result, SimulationConfig, Species,
    SpeciesCounts, SpeciesHistograms, YearlyStats,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct BioSim {
    island: Island,
    rng: SimRng,
    seed: u64,
    year: u32,
    count_log: Option<CountLog>,
}

impl BioSim {
    /// Build the island from `island_map`, seed the generator once and place
    /// the initial population.
    pub fn new(island_map: &str, initial_population: &[PopulationRecord], seed: u64) -> Result<Self> {
        Self::build(island_map, ParamRegistry::default(), initial_population, seed)
    }

    /// Build a simulation from a scenario. The island is constructed with
    /// the scenario's parameter tables, so its overrides hold from year 1.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let params = config.param_registry()?;
        let sim = Self::build(
            &config.island_map,
            params,
            &config.initial_population,
            config.seed,
        )?;

        match &config.log_file {
            Some(path) => sim.with_log_file(path),
            None => Ok(sim),
        }
    }

    fn build(
        island_map: &str,
        params: ParamRegistry,
        initial_population: &[PopulationRecord],
        seed: u64,
    ) -> Result<Self> {
        let mut island = Island::with_params(island_map, params)?;
        island.add_population(initial_population)?;

        info!(
            seed,
            rows = island.rows(),
            cols = island.cols(),
            animals = island.get_total_animal_count(),
            "Created simulation"
        );

        Ok(Self {
            island,
            rng: SimRng::seed_from_u64(seed),
            seed,
            year: 0,
            count_log: None,
        })
    }

    /// Write the animal counts of every simulated year to `path`
    pub fn with_log_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let log = CountLog::create(path)?;
        debug!(path = %log.path().display(), "Logging yearly counts");
        self.count_log = Some(log);
        Ok(self)
    }

    pub fn set_animal_parameters(&mut self, species: &str, params: &ParamMap) -> Result<()> {
        self.island.update_animal_params(species, params)?;
        debug!(species, keys = params.len(), "Updated animal parameters");
        Ok(())
    }

    pub fn set_landscape_parameters(&mut self, code: &str, params: &ParamMap) -> Result<()> {
        self.island.update_cell_params(code, params)?;
        debug!(code, keys = params.len(), "Updated landscape parameters");
        Ok(())
    }

    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        self.island.add_population(records)
    }

    /// Run `num_years` annual cycles, continuing from the current year.
    /// Returns the counts after each of these years.
    #[instrument(skip(self), fields(seed = self.seed, start_year = self.year))]
    pub fn simulate(&mut self, num_years: u32) -> Result<Vec<SpeciesCounts>> {
        let mut history = Vec::with_capacity(num_years as usize);

        for _ in 0..num_years {
            self.island.commence_annual_cycle(&mut self.rng);
            self.year += 1;

            let counts = self.island.get_total_species_count();
            if let Some(log) = self.count_log.as_mut() {
                log.record(self.year, counts)?;
            }
            info!(
                year = self.year,
                herbivores = counts.herbivores,
                carnivores = counts.carnivores,
                "Year complete"
            );
            history.push(counts);
        }

        let stats = self.island.yearly_stats();
        info!(
            event = "simulation_summary",
            years = num_years,
            final_year = self.year,
            animals = self.num_animals(),
            herbivore_mean_weight = stats.herbivore.mean_weight().unwrap_or(0.0),
            carnivore_mean_weight = stats.carnivore.mean_weight().unwrap_or(0.0),
            "Simulation finished"
        );

        Ok(history)
    }

    /// Years simulated so far
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn num_animals(&self) -> usize {
        self.island.get_total_animal_count()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCounts {
        self.island.get_total_species_count()
    }

    /// Fitness, age and weight samples from the last simulated year
    pub fn yearly_stats(&self) -> &YearlyStats {
        self.island.yearly_stats()
    }

    pub fn histograms(&self, specs: &HistogramSpecs) -> BTreeMap<Species, SpeciesHistograms> {
        let stats = self.island.yearly_stats();
        Species::all()
            .into_iter()
            .map(|species| {
                (
                    species,
                    SpeciesHistograms::from_samples(specs, stats.species(species)),
                )
            })
            .collect()
    }

    pub fn distributions(&self) -> Distributions {
        self.island.get_distributions()
    }

    pub fn island(&self) -> &Island {
        &self.island
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosim_core::{AnimalSpec, Location};

    const MAP: &str = "WWWW\nWLHW\nWWWW";

    fn population() -> Vec<PopulationRecord> {
        vec![
            PopulationRecord::uniform((2, 2), AnimalSpec::herbivore(5, 20.0), 30),
            PopulationRecord::uniform((2, 3), AnimalSpec::carnivore(5, 20.0), 5),
        ]
    }

    #[test]
    fn test_simulation_creation() {
        let sim = BioSim::new(MAP, &population(), 42).unwrap();
        assert_eq!(sim.year(), 0);
        assert_eq!(sim.num_animals(), 35);
        assert_eq!(
            sim.num_animals_per_species(),
            SpeciesCounts { herbivores: 30, carnivores: 5 }
        );
    }

    #[test]
    fn test_simulate_continues_year_count() {
        let mut sim = BioSim::new(MAP, &population(), 42).unwrap();

        let history = sim.simulate(3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(sim.year(), 3);
        assert_eq!(history[2], sim.num_animals_per_species());

        sim.simulate(2).unwrap();
        assert_eq!(sim.year(), 5);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut first = BioSim::new(MAP, &population(), 7).unwrap();
        let mut second = BioSim::new(MAP, &population(), 7).unwrap();
        assert_eq!(first.simulate(10).unwrap(), second.simulate(10).unwrap());
        assert_eq!(first.yearly_stats(), second.yearly_stats());
    }

    #[test]
    fn test_histograms_cover_samples() {
        let mut sim = BioSim::new(MAP, &population(), 1).unwrap();
        sim.simulate(1).unwrap();

        let histograms = sim.histograms(&HistogramSpecs::default());
        let herbivores = &histograms[&Species::Herbivore];
        assert_eq!(herbivores.fitness.total(), sim.yearly_stats().herbivore.len());
        assert_eq!(herbivores.age.counts.len(), 30);
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("counts.csv");
        let json = serde_json::json!({
            "island_map": MAP,
            "seed": 3,
            "initial_population": [
                {"loc": [2, 2], "pop": [{"species": "Herbivore", "age": 5, "weight": 20.0}]}
            ],
            "animal_parameters": {"Herbivore": {"omega": 0.0, "gamma": 0.0}},
            "landscape_parameters": {"H": {"f_max": 10.0}},
            "log_file": log_path,
        });
        let config = SimulationConfig::from_json(&json.to_string()).unwrap();

        let mut sim = BioSim::from_config(&config).unwrap();
        assert_eq!(sim.island().params().herbivore.omega, 0.0);
        assert_eq!(sim.island().params().landscape.highland_f_max, 10.0);

        sim.simulate(2).unwrap();
        assert_eq!(sim.num_animals(), 1);
        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.lines().count(), 3);
    }

    #[test]
    fn test_config_fodder_applies_from_first_year() {
        let json = serde_json::json!({
            "island_map": MAP,
            "landscape_parameters": {"L": {"f_max": 5.0}, "H": {"f_max": 12.0}},
        });
        let config = SimulationConfig::from_json(&json.to_string()).unwrap();
        let sim = BioSim::from_config(&config).unwrap();

        let lowland = sim.island().cell(Location::new(2, 2)).unwrap();
        let highland = sim.island().cell(Location::new(2, 3)).unwrap();
        assert_eq!(lowland.food_status(), 5.0);
        assert_eq!(highland.food_status(), 12.0);
    }

    #[test]
    fn test_from_config_rejects_bad_overrides() {
        let config = SimulationConfig {
            island_map: MAP.to_string(),
            landscape_parameters: [("D".to_string(), ParamMap::from([("f_max".to_string(), 1.0)]))]
                .into_iter()
                .collect(),
            ..SimulationConfig::default()
        };
        assert!(BioSim::from_config(&config).unwrap_err().is_validation());
    }
}
