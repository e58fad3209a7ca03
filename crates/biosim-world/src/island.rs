//! The island grid and its annual cycle.

use crate::cell::Cell;
use crate::rng::RandomSource;
use biosim_core::{
    Error, Location, ParamMap, ParamRegistry, PopulationRecord, Result, Species, SpeciesCounts,
    Terrain, YearlyStats,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-species population counts laid out like the map, `[row][col]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributions {
    pub herbivores: Vec<Vec<usize>>,
    pub carnivores: Vec<Vec<usize>>,
}

impl Distributions {
    pub fn get(&self, species: Species) -> &[Vec<usize>] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }
}

/// A rectangular grid of cells surrounded by water
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Island {
    rows: usize,
    cols: usize,
    /// Row-major; the cell at `(row, col)` sits at `(row - 1) * cols + col - 1`
    cells: Vec<Cell>,
    params: ParamRegistry,
    stats: YearlyStats,
}

impl Island {
    /// Parse `map` using the default parameter tables
    pub fn new(map: &str) -> Result<Self> {
        Self::with_params(map, ParamRegistry::default())
    }

    /// Parse a multi-line terrain map. Each line is trimmed; all lines must
    /// be equally long and the outer ring must be water.
    pub fn with_params(map: &str, params: ParamRegistry) -> Result<Self> {
        let lines: Vec<&str> = map.trim().lines().map(str::trim).collect();
        if lines.iter().all(|line| line.is_empty()) {
            return Err(Error::InvalidMap("map is empty".to_string()));
        }

        let rows = lines.len();
        let cols = lines[0].chars().count();
        if let Some((row, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.chars().count() != cols)
        {
            return Err(Error::InvalidMap(format!(
                "row {} has {} cells, expected {}",
                row + 1,
                line.chars().count(),
                cols
            )));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, line) in lines.iter().enumerate() {
            for (c, code) in line.chars().enumerate() {
                let terrain = Terrain::from_code(code)?;
                let location = Location::new(r + 1, c + 1);
                let on_boundary = r == 0 || r == rows - 1 || c == 0 || c == cols - 1;
                if on_boundary && terrain != Terrain::Water {
                    return Err(Error::InvalidMap(format!(
                        "boundary cell {} is {:?}, expected water",
                        location, terrain
                    )));
                }
                cells.push(Cell::new(location, terrain, &params));
            }
        }

        debug!(rows, cols, "Parsed island map");

        Ok(Self {
            rows,
            cols,
            cells,
            params,
            stats: YearlyStats::new(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn params(&self) -> &ParamRegistry {
        &self.params
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, location: Location) -> Option<&Cell> {
        location_index(self.rows, self.cols, location).map(|i| &self.cells[i])
    }

    /// Samples gathered during the last annual cycle
    pub fn yearly_stats(&self) -> &YearlyStats {
        &self.stats
    }

    /// Place each record's animals in its cell.
    ///
    /// Every record is resolved and validated first; on error the island is
    /// left unchanged.
    pub fn add_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        let mut accepted = Vec::with_capacity(records.len());
        for record in records {
            let location = record.location();
            let index = location_index(self.rows, self.cols, location)
                .ok_or_else(|| Error::NotFound(format!("no cell at {}", location)))?;
            let species = self.cells[index].check_records(&record.pop)?;
            accepted.push((index, species));
        }

        for (record, (index, species)) in records.iter().zip(accepted) {
            self.cells[index].place(&record.pop, &species, &self.params);
        }
        Ok(())
    }

    /// Replace parameters of the species named `species`
    pub fn update_animal_params(&mut self, species: &str, params: &ParamMap) -> Result<()> {
        let species: Species = species.parse()?;
        self.params.update_species(species, params)
    }

    /// Replace parameters of the terrain with code `code`. Applies to cells
    /// from their next fodder reset.
    pub fn update_cell_params(&mut self, code: &str, params: &ParamMap) -> Result<()> {
        let terrain: Terrain = code.parse()?;
        self.params.update_landscape(terrain, params)
    }

    /// Run one simulated year. Every phase visits all habitable cells in
    /// row-major order before the next phase starts.
    pub fn commence_annual_cycle<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.stats.reset();

        {
            let params = &self.params;
            for cell in self.cells.iter_mut().filter(|c| c.allows_animals()) {
                cell.animals_feed(params, rng);
            }
            for cell in self.cells.iter_mut().filter(|c| c.allows_animals()) {
                let counts = cell.counts();
                let (herbivores, carnivores) =
                    cell.animals_procreate(counts.herbivores, counts.carnivores, params, rng);
                cell.add_newborns(herbivores, carnivores);
            }
        }

        self.migration_pass(rng);

        let params = &self.params;
        for cell in self.cells.iter_mut().filter(|c| c.allows_animals()) {
            cell.animals_age(params);
        }
        for cell in self.cells.iter_mut() {
            if cell.allows_animals() {
                cell.animals_death(params, rng);
            }
            cell.reset_cell(params);
            cell.record_samples(&mut self.stats);
        }
    }

    /// Each habitable cell decides who wants to leave, then every willing
    /// animal picks one of the four neighbours. Water keeps it at home.
    fn migration_pass<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let (rows, cols) = (self.rows, self.cols);
        let habitable: Vec<bool> = self.cells.iter().map(Cell::allows_animals).collect();
        let mut moved = 0;

        for index in 0..self.cells.len() {
            if !habitable[index] {
                continue;
            }

            let cell = &mut self.cells[index];
            cell.animals_migrate(&self.params, rng);
            let options = cell.get_migration_possibilities();
            let leaving = cell.take_emigrants(|_| {
                let destination = options[rng.index(options.len())];
                location_index(rows, cols, destination)
                    .filter(|&i| habitable[i])
                    .map(|_| destination)
            });

            moved += leaving.len();
            for (destination, animal) in leaving {
                if let Some(i) = location_index(rows, cols, destination) {
                    self.cells[i].receive(animal);
                }
            }
        }

        debug!(moved, "Migration done");
    }

    /// Live animals per species, counted afresh
    pub fn get_total_species_count(&self) -> SpeciesCounts {
        self.cells
            .iter()
            .map(Cell::counts)
            .fold(SpeciesCounts::default(), |acc, c| SpeciesCounts {
                herbivores: acc.herbivores + c.herbivores,
                carnivores: acc.carnivores + c.carnivores,
            })
    }

    pub fn get_total_animal_count(&self) -> usize {
        self.get_total_species_count().total()
    }

    pub fn get_distributions(&self) -> Distributions {
        Distributions {
            herbivores: self.grid_of(|cell| cell.counts().herbivores),
            carnivores: self.grid_of(|cell| cell.counts().carnivores),
        }
    }

    /// Terrain colour of every cell, `[row][col]`
    pub fn rgb_map(&self) -> Vec<Vec<(f32, f32, f32)>> {
        self.grid_of(|cell| cell.terrain().rgb())
    }

    fn grid_of<T>(&self, f: impl Fn(&Cell) -> T) -> Vec<Vec<T>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(&f).collect())
            .collect()
    }
}

fn location_index(rows: usize, cols: usize, location: Location) -> Option<usize> {
    let in_bounds = (1..=rows).contains(&location.row) && (1..=cols).contains(&location.col);
    in_bounds.then(|| (location.row - 1) * cols + location.col - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedSource, SimRng};
    use biosim_core::AnimalSpec;

    const SMALL_MAP: &str = "WWWW\nWLLW\nWWWW";

    fn f_max(value: f64) -> ParamMap {
        [("f_max".to_string(), value)].into_iter().collect()
    }

    fn herbivores_at(loc: (usize, usize), count: usize) -> Vec<PopulationRecord> {
        vec![PopulationRecord::uniform(loc, AnimalSpec::herbivore(5, 20.0), count)]
    }

    #[test]
    fn test_parse_map() {
        let island = Island::new(
            "WWWWW
             WLHDW
             WWWWW",
        )
        .unwrap();

        assert_eq!(island.rows(), 3);
        assert_eq!(island.cols(), 5);
        assert_eq!(island.cells().len(), 15);
        assert_eq!(
            island.cell(Location::new(2, 3)).unwrap().terrain(),
            Terrain::Highland
        );
        assert!(island.cell(Location::new(0, 1)).is_none());
        assert!(island.cell(Location::new(4, 1)).is_none());
    }

    #[test]
    fn test_invalid_maps() {
        assert!(matches!(Island::new(""), Err(Error::InvalidMap(_))));
        assert!(matches!(
            Island::new("WWW\nWLLW\nWWWW"),
            Err(Error::InvalidMap(_))
        ));
        assert!(matches!(
            Island::new("WWW\nWLL\nWWW"),
            Err(Error::InvalidMap(_))
        ));
        assert!(matches!(
            Island::new("WWW\nWXW\nWWW"),
            Err(Error::UnknownTerrain(_))
        ));
    }

    #[test]
    fn test_add_population() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        island.add_population(&herbivores_at((2, 2), 10)).unwrap();
        island
            .add_population(&[PopulationRecord::uniform(
                (2, 3),
                AnimalSpec::carnivore(5, 20.0),
                3,
            )])
            .unwrap();

        assert_eq!(
            island.get_total_species_count(),
            SpeciesCounts { herbivores: 10, carnivores: 3 }
        );
        assert_eq!(island.get_total_animal_count(), 13);
    }

    #[test]
    fn test_add_population_errors() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        assert!(matches!(
            island.add_population(&herbivores_at((7, 7), 1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            island.add_population(&herbivores_at((1, 1), 1)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_failed_add_population_places_nothing() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        let mut records = herbivores_at((2, 2), 10);
        records.extend(herbivores_at((9, 9), 1));
        assert!(matches!(
            island.add_population(&records),
            Err(Error::NotFound(_))
        ));
        assert_eq!(island.get_total_animal_count(), 0);

        let mut records = herbivores_at((2, 2), 10);
        records.push(PopulationRecord::new(
            (2, 3),
            vec![AnimalSpec::carnivore(3, 12.0), AnimalSpec::herbivore(1, -4.0)],
        ));
        assert!(matches!(
            island.add_population(&records),
            Err(Error::Validation(_))
        ));
        assert_eq!(island.get_total_animal_count(), 0);

        island.add_population(&herbivores_at((2, 2), 10)).unwrap();
        assert_eq!(island.get_total_animal_count(), 10);
    }

    #[test]
    fn test_migration_never_enters_water() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        island.add_population(&herbivores_at((2, 2), 2)).unwrap();
        // Both want to leave; the first heads north into water, the second east
        let mut rng = ScriptedSource::constant(0.0).with_indices([0, 3]);

        island.migration_pass(&mut rng);

        let west = island.cell(Location::new(2, 2)).unwrap();
        let east = island.cell(Location::new(2, 3)).unwrap();
        assert_eq!(west.herbivores().len(), 1);
        assert!(!west.herbivores()[0].has_migrated());
        assert_eq!(east.herbivores().len(), 1);
        assert!(east.herbivores()[0].has_migrated());
    }

    #[test]
    fn test_migrated_animals_move_once() {
        let mut island = Island::new("WWWWW\nWLLLW\nWWWWW").unwrap();
        island.add_population(&herbivores_at((2, 2), 1)).unwrap();
        // Every index draw points east
        let mut rng = ScriptedSource::constant(0.0).with_indices([3, 3, 3]);

        island.migration_pass(&mut rng);

        assert_eq!(island.get_distributions().herbivores[1], vec![0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_fodder_restored_after_cycle() {
        let mut island = Island::new("WWWWW\nWLHDW\nWWWWW").unwrap();
        island.add_population(&herbivores_at((2, 2), 40)).unwrap();
        island.add_population(&herbivores_at((2, 3), 40)).unwrap();
        let mut rng = SimRng::seed_from_u64(1);

        for _ in 0..3 {
            island.commence_annual_cycle(&mut rng);
            for cell in island.cells() {
                assert_eq!(cell.food_status(), island.params().max_fodder(cell.terrain()));
            }
        }
    }

    #[test]
    fn test_species_count_idempotent() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        island.add_population(&herbivores_at((2, 2), 20)).unwrap();
        island.commence_annual_cycle(&mut SimRng::seed_from_u64(3));

        let first = island.get_total_species_count();
        assert_eq!(first, island.get_total_species_count());
        assert_eq!(first.herbivores, island.yearly_stats().herbivore.len());
    }

    #[test]
    fn test_distributions_follow_map_layout() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        island.add_population(&herbivores_at((2, 3), 4)).unwrap();

        let distributions = island.get_distributions();
        assert_eq!(distributions.herbivores.len(), 3);
        assert_eq!(distributions.herbivores[1], vec![0, 0, 4, 0]);
        assert!(distributions
            .get(Species::Carnivore)
            .iter()
            .flatten()
            .all(|&n| n == 0));
    }

    #[test]
    fn test_rgb_map() {
        let island = Island::new(SMALL_MAP).unwrap();
        let rgb = island.rgb_map();
        assert_eq!(rgb[0][0], Terrain::Water.rgb());
        assert_eq!(rgb[1][1], Terrain::Lowland.rgb());
    }

    #[test]
    fn test_update_cell_params() {
        let mut island = Island::new("WWWW\nWHLW\nWWWW").unwrap();
        island.update_cell_params("H", &f_max(10.0)).unwrap();
        island.commence_annual_cycle(&mut SimRng::seed_from_u64(0));
        assert_eq!(island.cell(Location::new(2, 2)).unwrap().food_status(), 10.0);

        assert!(island.update_cell_params("D", &f_max(10.0)).is_err());
        assert!(island.update_cell_params("W", &f_max(10.0)).is_err());
        assert!(matches!(
            island.update_cell_params("Q", &f_max(10.0)),
            Err(Error::UnknownTerrain(_))
        ));
    }

    #[test]
    fn test_update_animal_params() {
        let mut island = Island::new(SMALL_MAP).unwrap();
        let params: ParamMap = [("mu".to_string(), 0.0)].into_iter().collect();
        island.update_animal_params("Herbivore", &params).unwrap();
        assert_eq!(island.params().herbivore.mu, 0.0);
        assert!(matches!(
            island.update_animal_params("Dodo", &params),
            Err(Error::UnknownSpecies(_))
        ));
    }
}
