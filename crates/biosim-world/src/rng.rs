//! Random sources driving every stochastic decision.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;

/// Source of the three kinds of draws the simulation makes
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Normal draw with the given mean and standard deviation
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Uniform index in `0..n`; `n` must be non-zero
    fn index(&mut self, n: usize) -> usize;
}

/// Seeded ChaCha8 stream owned by a simulation
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SimRng {
    fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(&mut self.inner),
            // Rejected only for a negative or NaN standard deviation
            Err(_) => mean,
        }
    }

    fn index(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }
}

/// Deterministic source replaying queued values.
///
/// Once a queue runs dry the matching fallback is returned: `fallback` for
/// uniform draws, the mean for gaussian draws and 0 for index draws.
#[doc(hidden)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    uniforms: VecDeque<f64>,
    gaussians: VecDeque<f64>,
    indices: VecDeque<usize>,
    fallback: f64,
}

impl ScriptedSource {
    /// Every uniform draw returns `value`
    pub fn constant(value: f64) -> Self {
        Self {
            fallback: value,
            ..Self::default()
        }
    }

    pub fn with_uniforms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(values);
        self
    }

    pub fn with_gaussians(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.gaussians.extend(values);
        self
    }

    pub fn with_indices(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(values);
        self
    }

    /// Uniform draws still queued
    pub fn remaining_uniforms(&self) -> usize {
        self.uniforms.len()
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(self.fallback)
    }

    fn gaussian(&mut self, mean: f64, _std_dev: f64) -> f64 {
        self.gaussians.pop_front().unwrap_or(mean)
    }

    fn index(&mut self, n: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % n
    }
}
