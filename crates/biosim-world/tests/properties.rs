use biosim_core::{
    AnimalSpec, Location, ParamMap, ParamRegistry, PopulationRecord, Species, SpeciesParams,
    Terrain,
};
use biosim_world::animal::fitness_of;
use biosim_world::{Animal, BioSim, Cell, ScriptedSource};
use proptest::prelude::*;

proptest! {
    #[test]
    fn fitness_stays_in_unit_interval(age in 0u32..200, weight in -10.0f64..200.0) {
        for params in [SpeciesParams::herbivore(), SpeciesParams::carnivore()] {
            let fitness = fitness_of(age, weight, &params);
            prop_assert!((0.0..=1.0).contains(&fitness));
            if weight <= 0.0 {
                prop_assert_eq!(fitness, 0.0);
            }
        }
    }

    #[test]
    fn fodder_stays_within_bounds(
        f_max in 0.0f64..1000.0,
        weights in prop::collection::vec(1.0f64..60.0, 0..120),
    ) {
        let mut registry = ParamRegistry::default();
        let update: ParamMap = [("f_max".to_string(), f_max)].into_iter().collect();
        registry.update_landscape(Terrain::Lowland, &update).unwrap();

        let records: Vec<AnimalSpec> = weights.iter().map(|&w| AnimalSpec::herbivore(3, w)).collect();
        let mut cell = Cell::new(Location::new(2, 2), Terrain::Lowland, &registry);
        cell.add_animal(&records, &registry).unwrap();

        cell.animals_feed(&registry, &mut ScriptedSource::constant(0.5));
        prop_assert!(cell.food_status() >= 0.0);
        prop_assert!(cell.food_status() <= f_max);
    }

    #[test]
    fn no_birth_without_partner(count in 0usize..2, age in 0u32..50, weight in 1.0f64..200.0) {
        let params = SpeciesParams::herbivore();
        let mut animal = Animal::new(Species::Herbivore, age, weight, &params);
        let mut rng = ScriptedSource::constant(0.0);
        prop_assert!(animal.procreation(count, &params, &mut rng).is_none());
        prop_assert_eq!(animal.weight(), weight);
    }

    #[test]
    fn carnivore_intake_bounded_by_appetite(
        prey_weights in prop::collection::vec(0.5f64..40.0, 1..30),
        predator_weight in 20.0f64..80.0,
    ) {
        let herbivore_params = SpeciesParams::herbivore();
        let carnivore_params = SpeciesParams::carnivore();
        let mut prey: Vec<Animal> = prey_weights
            .iter()
            .map(|&w| Animal::new(Species::Herbivore, 50, w, &herbivore_params))
            .collect();
        prey.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        let mut predator = Animal::new(Species::Carnivore, 2, predator_weight, &carnivore_params);

        let eaten = predator.feeds_on_prey(&mut prey, &carnivore_params, &mut ScriptedSource::constant(0.0));
        let heaviest = prey_weights.iter().copied().fold(0.0, f64::max);
        prop_assert!(eaten <= carnivore_params.appetite + heaviest);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn water_never_holds_animals(seed in any::<u64>()) {
        let map = "WWWWWW\nWLWLHW\nWLLWDW\nWWWWWW";
        let population = vec![
            PopulationRecord::uniform((2, 2), AnimalSpec::herbivore(5, 20.0), 30),
            PopulationRecord::uniform((3, 3), AnimalSpec::carnivore(5, 20.0), 10),
        ];
        let mut sim = BioSim::new(map, &population, seed).unwrap();

        for _ in 0..5 {
            sim.simulate(1).unwrap();
            for cell in sim.island().cells() {
                prop_assert!(cell.allows_animals() || cell.counts().total() == 0);
                prop_assert_eq!(cell.food_status(), sim.island().params().max_fodder(cell.terrain()));
            }
        }
    }
}
