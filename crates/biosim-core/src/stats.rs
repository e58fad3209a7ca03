//! Yearly statistics collected over the island's animals.

use crate::Species;
use serde::{Deserialize, Serialize};

/// Fitness, age and weight of every animal of one species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSamples {
    pub fitness: Vec<f64>,
    pub age: Vec<u32>,
    pub weight: Vec<f64>,
}

impl SpeciesSamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fitness: f64, age: u32, weight: f64) {
        self.fitness.push(fitness);
        self.age.push(age);
        self.weight.push(weight);
    }

    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    pub fn clear(&mut self) {
        self.fitness.clear();
        self.age.clear();
        self.weight.clear();
    }

    pub fn mean_fitness(&self) -> Option<f64> {
        mean(self.fitness.iter().copied())
    }

    pub fn mean_age(&self) -> Option<f64> {
        mean(self.age.iter().map(|&a| a as f64))
    }

    pub fn mean_weight(&self) -> Option<f64> {
        mean(self.weight.iter().copied())
    }
}

/// Samples for both species, rebuilt every simulated year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub herbivore: SpeciesSamples,
    pub carnivore: SpeciesSamples,
}

impl YearlyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn species(&self, species: Species) -> &SpeciesSamples {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesSamples {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    pub fn reset(&mut self) {
        self.herbivore.clear();
        self.carnivore.clear();
    }
}

/// Bin layout for one sampled property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub max: f64,
    pub delta: f64,
}

/// Bin layouts for the three sampled properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpecs {
    pub fitness: HistogramSpec,
    pub age: HistogramSpec,
    pub weight: HistogramSpec,
}

impl Default for HistogramSpecs {
    fn default() -> Self {
        Self {
            fitness: HistogramSpec {
                max: 1.0,
                delta: 0.05,
            },
            age: HistogramSpec {
                max: 60.0,
                delta: 2.0,
            },
            weight: HistogramSpec {
                max: 60.0,
                delta: 2.0,
            },
        }
    }
}

/// Counts of samples in equally wide bins over `[0, max]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub delta: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `samples`; values outside `[0, max]` are dropped and `max` itself
    /// lands in the last bin.
    pub fn from_samples(spec: HistogramSpec, samples: impl IntoIterator<Item = f64>) -> Self {
        let bins = if spec.delta > 0.0 && spec.max > 0.0 {
            (spec.max / spec.delta).round().max(1.0) as usize
        } else {
            0
        };
        let mut counts = vec![0; bins];

        if bins > 0 {
            for value in samples {
                if !(0.0..=spec.max).contains(&value) {
                    continue;
                }
                let index = ((value / spec.delta) as usize).min(bins - 1);
                counts[index] += 1;
            }
        }

        Self {
            delta: spec.delta,
            counts,
        }
    }

    /// Lower edge of every bin
    pub fn edges(&self) -> Vec<f64> {
        (0..self.counts.len()).map(|i| i as f64 * self.delta).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histograms of one species' samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesHistograms {
    pub fitness: Histogram,
    pub age: Histogram,
    pub weight: Histogram,
}

impl SpeciesHistograms {
    pub fn from_samples(specs: &HistogramSpecs, samples: &SpeciesSamples) -> Self {
        Self {
            fitness: Histogram::from_samples(specs.fitness, samples.fitness.iter().copied()),
            age: Histogram::from_samples(specs.age, samples.age.iter().map(|&a| a as f64)),
            weight: Histogram::from_samples(specs.weight, samples.weight.iter().copied()),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
