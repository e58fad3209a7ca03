//! Population records used to seed cells with animals.

use crate::{Location, Result, Species};
use serde::{Deserialize, Serialize};

/// One animal to be placed on the island.
///
/// The species stays a plain name until the record is applied, so unknown
/// species surface as taxonomy errors at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: String,
    pub age: u32,
    pub weight: f64,
}

impl AnimalSpec {
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species: species.name().to_string(),
            age,
            weight,
        }
    }

    pub fn herbivore(age: u32, weight: f64) -> Self {
        Self::new(Species::Herbivore, age, weight)
    }

    pub fn carnivore(age: u32, weight: f64) -> Self {
        Self::new(Species::Carnivore, age, weight)
    }

    pub fn species(&self) -> Result<Species> {
        self.species.parse()
    }
}

/// A group of animals destined for one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub loc: (usize, usize),
    pub pop: Vec<AnimalSpec>,
}

impl PopulationRecord {
    pub fn new(loc: (usize, usize), pop: Vec<AnimalSpec>) -> Self {
        Self { loc, pop }
    }

    /// `count` identical animals at `loc`
    pub fn uniform(loc: (usize, usize), spec: AnimalSpec, count: usize) -> Self {
        Self {
            loc,
            pop: vec![spec; count],
        }
    }

    pub fn location(&self) -> Location {
        Location::from(self.loc)
    }
}
