//! A single landscape cell and its yearly sub-phases.

use crate::animal::Animal;
use crate::rng::RandomSource;
use biosim_core::{
    AnimalSpec, Error, Location, ParamRegistry, Result, Species, SpeciesCounts, Terrain,
    YearlyStats,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// A square of the island holding fodder and two populations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    location: Location,
    terrain: Terrain,
    food_status: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(location: Location, terrain: Terrain, params: &ParamRegistry) -> Self {
        Self {
            location,
            terrain,
            food_status: params.max_fodder(terrain),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn allows_animals(&self) -> bool {
        self.terrain.allows_animals()
    }

    /// Fodder currently available
    pub fn food_status(&self) -> f64 {
        self.food_status
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub fn counts(&self) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
        }
    }

    /// Place animals described by `records` in the cell.
    ///
    /// All records are checked before any animal is added.
    pub fn add_animal(&mut self, records: &[AnimalSpec], params: &ParamRegistry) -> Result<()> {
        let species = self.check_records(records)?;
        self.place(records, &species, params);
        Ok(())
    }

    /// Validate `records` for this cell without placing them. Returns the
    /// parsed species of every record, in order.
    pub(crate) fn check_records(&self, records: &[AnimalSpec]) -> Result<Vec<Species>> {
        if !self.allows_animals() && !records.is_empty() {
            return Err(Error::Validation(format!(
                "cell {} is {:?} and cannot hold animals",
                self.location, self.terrain
            )));
        }

        records
            .iter()
            .map(|record| {
                let species = record.species()?;
                if !record.weight.is_finite() || record.weight <= 0.0 {
                    return Err(Error::Validation(format!(
                        "animal weight must be positive, got {}",
                        record.weight
                    )));
                }
                Ok(species)
            })
            .collect()
    }

    /// Place records already accepted by `check_records`
    pub(crate) fn place(
        &mut self,
        records: &[AnimalSpec],
        species: &[Species],
        params: &ParamRegistry,
    ) {
        for (record, &species) in records.iter().zip(species) {
            let animal = Animal::new(species, record.age, record.weight, params.species(species));
            self.push(animal);
        }
    }

    fn push(&mut self, animal: Animal) {
        match animal.species() {
            Species::Herbivore => self.herbivores.push(animal),
            Species::Carnivore => self.carnivores.push(animal),
        }
    }

    /// Feeding phase. Herbivores graze weakest first, then carnivores hunt
    /// strongest first, each against the surviving herbivores sorted weakest
    /// first.
    pub fn animals_feed<R: RandomSource + ?Sized>(&mut self, params: &ParamRegistry, rng: &mut R) {
        let herbivore_params = params.species(Species::Herbivore);
        let carnivore_params = params.species(Species::Carnivore);

        // Pick up parameter changes made since the previous year
        for animal in &mut self.herbivores {
            animal.calculate_fitness(herbivore_params);
        }
        for animal in &mut self.carnivores {
            animal.calculate_fitness(carnivore_params);
        }

        self.herbivores.sort_by(ascending_fitness);
        for herbivore in &mut self.herbivores {
            self.food_status = herbivore.feeds_on_fodder(self.food_status, herbivore_params);
        }

        self.carnivores.sort_by(|a, b| ascending_fitness(b, a));
        let herbivores = &mut self.herbivores;
        let mut kills = 0;
        for carnivore in &mut self.carnivores {
            if herbivores.is_empty() {
                break;
            }
            herbivores.sort_by(ascending_fitness);
            carnivore.feeds_on_prey(herbivores, carnivore_params, rng);
            let before = herbivores.len();
            herbivores.retain(Animal::is_alive);
            kills += before - herbivores.len();
        }

        trace!(
            location = %self.location,
            food_left = self.food_status,
            kills,
            "Cell feeding done"
        );
    }

    /// Procreation phase over the members present when the phase starts.
    /// Returns the newborn herbivores and carnivores.
    pub fn animals_procreate<R: RandomSource + ?Sized>(
        &mut self,
        herbivore_count: usize,
        carnivore_count: usize,
        params: &ParamRegistry,
        rng: &mut R,
    ) -> (Vec<Animal>, Vec<Animal>) {
        let newborn_herbivores = procreate(
            &mut self.herbivores,
            herbivore_count,
            params.species(Species::Herbivore),
            rng,
        );
        let newborn_carnivores = procreate(
            &mut self.carnivores,
            carnivore_count,
            params.species(Species::Carnivore),
            rng,
        );

        if !newborn_herbivores.is_empty() || !newborn_carnivores.is_empty() {
            debug!(
                location = %self.location,
                herbivores_born = newborn_herbivores.len(),
                carnivores_born = newborn_carnivores.len(),
                "Births"
            );
        }
        (newborn_herbivores, newborn_carnivores)
    }

    /// Append newborns after the procreation phase
    pub fn add_newborns(&mut self, herbivores: Vec<Animal>, carnivores: Vec<Animal>) {
        self.herbivores.extend(herbivores);
        self.carnivores.extend(carnivores);
    }

    /// Migration decision for every animal that has not moved this year.
    /// Only sets the flag; moving is up to the island.
    pub fn animals_migrate<R: RandomSource + ?Sized>(
        &mut self,
        params: &ParamRegistry,
        rng: &mut R,
    ) {
        for (animals, species) in [
            (&mut self.herbivores, Species::Herbivore),
            (&mut self.carnivores, Species::Carnivore),
        ] {
            let species_params = params.species(species);
            for animal in animals.iter_mut().filter(|a| !a.has_migrated()) {
                animal.migration(species_params, rng);
            }
        }
    }

    /// Remove every animal willing to migrate for which `choose` names a
    /// destination. Herbivores are offered first, each list in order.
    pub(crate) fn take_emigrants<F>(&mut self, mut choose: F) -> Vec<(Location, Animal)>
    where
        F: FnMut(&Animal) -> Option<Location>,
    {
        let mut leaving = Vec::new();
        split_emigrants(&mut self.herbivores, &mut choose, &mut leaving);
        split_emigrants(&mut self.carnivores, &mut choose, &mut leaving);
        leaving
    }

    /// Accept an animal arriving from a neighbouring cell
    pub(crate) fn receive(&mut self, animal: Animal) {
        self.push(animal);
    }

    /// Aging and weight loss phase
    pub fn animals_age(&mut self, params: &ParamRegistry) {
        for (animals, species) in [
            (&mut self.herbivores, Species::Herbivore),
            (&mut self.carnivores, Species::Carnivore),
        ] {
            let species_params = params.species(species);
            for animal in animals.iter_mut() {
                animal.commence_aging(species_params);
                animal.commence_weight_loss(species_params);
            }
        }
    }

    /// Death phase. Dead animals leave the cell.
    pub fn animals_death<R: RandomSource + ?Sized>(&mut self, params: &ParamRegistry, rng: &mut R) {
        let before = self.counts();
        for (animals, species) in [
            (&mut self.herbivores, Species::Herbivore),
            (&mut self.carnivores, Species::Carnivore),
        ] {
            let species_params = params.species(species);
            for animal in animals.iter_mut() {
                animal.death(species_params, rng);
            }
            animals.retain(Animal::is_alive);
        }

        let after = self.counts();
        if after != before {
            debug!(
                location = %self.location,
                herbivores_died = before.herbivores - after.herbivores,
                carnivores_died = before.carnivores - after.carnivores,
                "Deaths"
            );
        }
    }

    /// Restore fodder to the landscape's current maximum
    pub fn reset_cell(&mut self, params: &ParamRegistry) {
        self.food_status = params.max_fodder(self.terrain);
    }

    /// The four orthogonal neighbours an animal may move to
    pub fn get_migration_possibilities(&self) -> [Location; 4] {
        self.location.neighbours()
    }

    /// Append the fitness, age and weight of every animal to `stats`
    pub fn record_samples(&self, stats: &mut YearlyStats) {
        for species in Species::all() {
            let samples = stats.species_mut(species);
            for animal in self.animals(species) {
                samples.record(animal.fitness(), animal.age(), animal.weight());
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_food_status(&mut self, food_status: f64) {
        self.food_status = food_status;
    }
}

fn ascending_fitness(a: &Animal, b: &Animal) -> Ordering {
    a.fitness().total_cmp(&b.fitness())
}

fn procreate<R: RandomSource + ?Sized>(
    parents: &mut [Animal],
    count: usize,
    params: &biosim_core::SpeciesParams,
    rng: &mut R,
) -> Vec<Animal> {
    parents
        .iter_mut()
        .filter_map(|parent| parent.procreation(count, params, rng))
        .collect()
}

fn split_emigrants<F>(animals: &mut Vec<Animal>, choose: &mut F, leaving: &mut Vec<(Location, Animal)>)
where
    F: FnMut(&Animal) -> Option<Location>,
{
    let mut staying = Vec::with_capacity(animals.len());
    for mut animal in animals.drain(..) {
        if animal.migrates() && !animal.has_migrated() {
            if let Some(destination) = choose(&animal) {
                animal.mark_migrated();
                leaving.push((destination, animal));
                continue;
            }
        }
        staying.push(animal);
    }
    *animals = staying;
}
