//! Animal state and its yearly life-cycle operations.

use crate::rng::RandomSource;
use biosim_core::{Species, SpeciesParams};
use serde::{Deserialize, Serialize};

/// An individual animal on the island.
///
/// Species parameters are not stored on the animal; every operation that
/// needs them receives the current table for the animal's species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    alive: bool,
    migrates: bool,
    has_migrated: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        let mut animal = Self {
            species,
            age,
            weight,
            fitness: 0.0,
            alive: true,
            migrates: false,
            has_migrated: false,
        };
        animal.calculate_fitness(params);
        animal
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn migrates(&self) -> bool {
        self.migrates
    }

    pub fn has_migrated(&self) -> bool {
        self.has_migrated
    }

    pub(crate) fn mark_migrated(&mut self) {
        self.has_migrated = true;
    }

    /// Recompute fitness from age and weight:
    /// `q+(age, a_half, phi_age) * q-(weight, w_half, phi_weight)`, or 0 when
    /// the animal has no weight left.
    pub fn calculate_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = fitness_of(self.age, self.weight, params);
    }

    /// Herbivore feeding. Eats up to the appetite from `available` fodder and
    /// returns what is left in the cell.
    pub fn feeds_on_fodder(&mut self, available: f64, params: &SpeciesParams) -> f64 {
        debug_assert_eq!(self.species, Species::Herbivore);

        let available = available.max(0.0);
        let eaten = params.appetite.min(available);
        self.weight += eaten * params.beta;
        self.calculate_fitness(params);
        available - eaten
    }

    /// Carnivore feeding. `prey` must be sorted by ascending fitness; the
    /// weakest is attacked first. Returns the total weight eaten.
    ///
    /// The hunt ends as soon as the predator meets prey at least as fit as
    /// itself, or once the eaten weight reaches the appetite.
    pub fn feeds_on_prey<R: RandomSource + ?Sized>(
        &mut self,
        prey: &mut [Animal],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> f64 {
        debug_assert_eq!(self.species, Species::Carnivore);

        let mut eaten = 0.0;
        for victim in prey.iter_mut().filter(|victim| victim.alive) {
            if self.fitness <= victim.fitness {
                break;
            }

            let kill_probability = kill_probability(self.fitness - victim.fitness, params);
            if rng.uniform() < kill_probability {
                victim.alive = false;
                self.weight += params.beta * victim.weight;
                eaten += victim.weight;
                self.calculate_fitness(params);
                if eaten >= params.appetite {
                    break;
                }
            }
        }
        eaten
    }

    /// Decide whether the animal wants to leave its cell this year.
    pub fn migration<R: RandomSource + ?Sized>(&mut self, params: &SpeciesParams, rng: &mut R) {
        let probability = params.mu * self.fitness;
        self.migrates = rng.uniform() < probability;
    }

    /// Attempt to give birth given the number of animals of the same species
    /// in the cell. Returns the newborn, if any.
    pub fn procreation<R: RandomSource + ?Sized>(
        &mut self,
        same_species_count: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        let heavy_enough = self.weight >= params.zeta * (params.w_birth + params.sigma_birth);
        let birth_probability = if same_species_count > 1 && heavy_enough {
            (params.gamma * self.fitness * (same_species_count - 1) as f64).min(1.0)
        } else {
            0.0
        };

        if rng.uniform() >= birth_probability {
            return None;
        }

        let birth_weight = rng.gaussian(params.w_birth, params.sigma_birth);
        let weight_loss = params.xi * birth_weight;
        if birth_weight <= 0.0 || self.weight < weight_loss {
            return None;
        }

        self.weight -= weight_loss;
        self.calculate_fitness(params);
        Some(Animal::new(self.species, 0, birth_weight, params))
    }

    /// One year older. Clears this year's migration state.
    pub fn commence_aging(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.migrates = false;
        self.has_migrated = false;
        self.calculate_fitness(params);
    }

    /// Yearly metabolic weight loss. An animal left without weight dies on
    /// the spot.
    pub fn commence_weight_loss(&mut self, params: &SpeciesParams) {
        self.weight -= self.weight * params.eta;
        self.calculate_fitness(params);
        if self.weight <= 0.0 {
            self.alive = false;
        }
    }

    /// Decide whether the animal dies this year.
    pub fn death<R: RandomSource + ?Sized>(&mut self, params: &SpeciesParams, rng: &mut R) {
        if !self.alive {
            return;
        }
        if self.weight <= 0.0 {
            self.alive = false;
            return;
        }

        let probability = params.omega * (1.0 - self.fitness);
        if rng.uniform() < probability {
            self.alive = false;
        }
    }
}

/// Fitness of an animal with the given age and weight
pub fn fitness_of(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let q_age = 1.0 / (1.0 + (params.phi_age * (age as f64 - params.a_half)).exp());
    let q_weight = 1.0 / (1.0 + (-params.phi_weight * (weight - params.w_half)).exp());
    q_age * q_weight
}

fn kill_probability(fitness_gap: f64, params: &SpeciesParams) -> f64 {
    match params.delta_phi_max {
        Some(delta_phi_max) if fitness_gap > 0.0 && fitness_gap < delta_phi_max => {
            fitness_gap / delta_phi_max
        }
        _ if fitness_gap <= 0.0 => 0.0,
        _ => 1.0,
    }
}
