//! Core type definitions for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a cell on the island, 1-indexed as (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The four orthogonal neighbours: north, south, west, east.
    ///
    /// Rows and columns start at 1, so a neighbour of row/column 1 is reported
    /// with index 0, which lies outside every island.
    pub fn neighbours(&self) -> [Location; 4] {
        [
            Location::new(self.row.saturating_sub(1), self.col),
            Location::new(self.row + 1, self.col),
            Location::new(self.row, self.col.saturating_sub(1)),
            Location::new(self.row, self.col + 1),
        ]
    }
}

impl From<(usize, usize)> for Location {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Animal species living on the island
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub fn all() -> [Species; 2] {
        [Species::Herbivore, Species::Carnivore]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(Error::UnknownSpecies(other.to_string())),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Landscape type of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Water,
    Lowland,
    Highland,
    Desert,
}

impl Terrain {
    pub fn from_code(code: char) -> Result<Self> {
        match code {
            'W' => Ok(Terrain::Water),
            'L' => Ok(Terrain::Lowland),
            'H' => Ok(Terrain::Highland),
            'D' => Ok(Terrain::Desert),
            other => Err(Error::UnknownTerrain(other.to_string())),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Terrain::Water => 'W',
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
        }
    }

    pub fn allows_animals(&self) -> bool {
        !matches!(self, Terrain::Water)
    }

    /// Whether the landscape grows fodder at all
    pub fn has_fodder(&self) -> bool {
        matches!(self, Terrain::Lowland | Terrain::Highland)
    }

    pub fn default_max_fodder(&self) -> f64 {
        match self {
            Terrain::Lowland => 800.0,
            Terrain::Highland => 300.0,
            Terrain::Water | Terrain::Desert => 0.0,
        }
    }

    /// Display colour as RGB fractions
    pub fn rgb(&self) -> (f32, f32, f32) {
        match self {
            Terrain::Water => (0.0, 0.0, 1.0),
            Terrain::Lowland => (0.0, 0.6, 0.0),
            Terrain::Highland => (0.5, 1.0, 0.5),
            Terrain::Desert => (1.0, 1.0, 0.5),
        }
    }
}

impl FromStr for Terrain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Terrain::from_code(code),
            _ => Err(Error::UnknownTerrain(s.to_string())),
        }
    }
}

/// Number of live animals per species
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCounts {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}
