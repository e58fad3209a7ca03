//! Configuration types for the simulation.

use crate::population::PopulationRecord;
use crate::{Error, Result, Species, Terrain};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parameter overrides keyed by parameter name
pub type ParamMap = BTreeMap<String, f64>;

/// Species-level parameters shared by every animal of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean birth weight
    pub w_birth: f64,
    /// Standard deviation of the birth weight
    pub sigma_birth: f64,
    /// Fraction of eaten food turned into weight
    pub beta: f64,
    /// Yearly weight loss rate
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration propensity
    pub mu: f64,
    /// Procreation intensity
    pub gamma: f64,
    /// Minimum maternal weight as a multiple of `w_birth + sigma_birth`
    pub zeta: f64,
    /// Weight the mother loses per unit of newborn weight
    pub xi: f64,
    /// Death rate multiplier
    pub omega: f64,
    /// Appetite
    #[serde(rename = "F")]
    pub appetite: f64,
    /// Fitness gap above which a kill is certain (carnivores only)
    #[serde(rename = "DeltaPhiMax", default, skip_serializing_if = "Option::is_none")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            appetite: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Parameter names recognised for a species
    pub fn keys(species: Species) -> &'static [&'static str] {
        const HERBIVORE: &[&str] = &[
            "w_birth",
            "sigma_birth",
            "beta",
            "eta",
            "a_half",
            "phi_age",
            "w_half",
            "phi_weight",
            "mu",
            "gamma",
            "zeta",
            "xi",
            "omega",
            "F",
        ];
        const CARNIVORE: &[&str] = &[
            "w_birth",
            "sigma_birth",
            "beta",
            "eta",
            "a_half",
            "phi_age",
            "w_half",
            "phi_weight",
            "mu",
            "gamma",
            "zeta",
            "xi",
            "omega",
            "F",
            "DeltaPhiMax",
        ];
        match species {
            Species::Herbivore => HERBIVORE,
            Species::Carnivore => CARNIVORE,
        }
    }

    /// Validate every entry of `params`, then merge them.
    ///
    /// Nothing is merged unless all entries are valid.
    pub fn update(&mut self, species: Species, params: &ParamMap) -> Result<()> {
        let known = Self::keys(species);
        for (key, &value) in params {
            if !known.contains(&key.as_str()) {
                return Err(Error::invalid_parameter(
                    key,
                    format!("not a {} parameter", species),
                ));
            }
            if !value.is_finite() {
                return Err(Error::invalid_parameter(key, "value must be a finite number"));
            }
            if key == "DeltaPhiMax" && value <= 0.0 {
                return Err(Error::invalid_parameter(key, "DeltaPhiMax must be > 0"));
            }
            if value < 0.0 {
                return Err(Error::invalid_parameter(key, "value must be >= 0"));
            }
        }

        for (key, &value) in params {
            match key.as_str() {
                "w_birth" => self.w_birth = value,
                "sigma_birth" => self.sigma_birth = value,
                "beta" => self.beta = value,
                "eta" => self.eta = value,
                "a_half" => self.a_half = value,
                "phi_age" => self.phi_age = value,
                "w_half" => self.w_half = value,
                "phi_weight" => self.phi_weight = value,
                "mu" => self.mu = value,
                "gamma" => self.gamma = value,
                "zeta" => self.zeta = value,
                "xi" => self.xi = value,
                "omega" => self.omega = value,
                "F" => self.appetite = value,
                "DeltaPhiMax" => self.delta_phi_max = Some(value),
                _ => unreachable!("keys validated above"),
            }
        }

        Ok(())
    }
}

/// Maximum fodder per landscape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    pub lowland_f_max: f64,
    pub highland_f_max: f64,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            lowland_f_max: Terrain::Lowland.default_max_fodder(),
            highland_f_max: Terrain::Highland.default_max_fodder(),
        }
    }
}

impl LandscapeParams {
    pub fn max_fodder(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Lowland => self.lowland_f_max,
            Terrain::Highland => self.highland_f_max,
            Terrain::Water | Terrain::Desert => 0.0,
        }
    }

    /// Update the fodder parameters of one landscape type.
    ///
    /// Only `f_max` is recognised, and only Lowland and Highland carry fodder.
    pub fn update(&mut self, terrain: Terrain, params: &ParamMap) -> Result<()> {
        if !terrain.has_fodder() {
            return Err(Error::invalid_parameter(
                "f_max",
                format!("landscape {:?} cannot hold fodder", terrain),
            ));
        }

        let mut f_max = None;
        for (key, &value) in params {
            if key != "f_max" {
                return Err(Error::invalid_parameter(key, "not a landscape parameter"));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_parameter(
                    key,
                    "value must be a finite number >= 0",
                ));
            }
            f_max = Some(value);
        }

        if let Some(value) = f_max {
            match terrain {
                Terrain::Lowland => self.lowland_f_max = value,
                Terrain::Highland => self.highland_f_max = value,
                Terrain::Water | Terrain::Desert => {}
            }
        }

        Ok(())
    }
}

/// Simulation-scoped table of every tunable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRegistry {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub landscape: LandscapeParams,
}

impl Default for ParamRegistry {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            landscape: LandscapeParams::default(),
        }
    }
}

impl ParamRegistry {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn update_species(&mut self, species: Species, params: &ParamMap) -> Result<()> {
        let entry = match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        };
        entry.update(species, params)
    }

    pub fn update_landscape(&mut self, terrain: Terrain, params: &ParamMap) -> Result<()> {
        self.landscape.update(terrain, params)
    }

    pub fn max_fodder(&self, terrain: Terrain) -> f64 {
        self.landscape.max_fodder(terrain)
    }
}

/// A complete simulation scenario, usually loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Multi-line terrain map
    pub island_map: String,
    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: u64,
    /// Number of years the runner simulates
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub initial_population: Vec<PopulationRecord>,
    /// Species name to parameter overrides
    #[serde(default)]
    pub animal_parameters: BTreeMap<String, ParamMap>,
    /// Landscape code to parameter overrides
    #[serde(default)]
    pub landscape_parameters: BTreeMap<String, ParamMap>,
    /// Where to write yearly animal counts
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Default tables with this scenario's overrides applied
    pub fn param_registry(&self) -> Result<ParamRegistry> {
        let mut registry = ParamRegistry::default();
        for (species, params) in &self.animal_parameters {
            registry.update_species(species.parse()?, params)?;
        }
        for (code, params) in &self.landscape_parameters {
            registry.update_landscape(code.parse()?, params)?;
        }
        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded simulation config");
        Ok(config)
    }
}
