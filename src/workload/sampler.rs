//! Uniform key-space sampling

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{HarnessError, Result};

/// Samples ids uniformly from `[0, population)`
///
/// The upper bound is exclusive by construction; no sample can fall outside
/// the loaded key space.
#[derive(Debug, Clone)]
pub struct KeySampler {
    population: u64,
    dist: Uniform<u64>,
}

impl KeySampler {
    pub fn new(population: u64) -> Result<Self> {
        let dist = Uniform::new(0, population).map_err(|e| {
            HarnessError::Config(format!("cannot sample a population of {population}: {e}"))
        })?;
        Ok(Self { population, dist })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        self.dist.sample(rng)
    }

    pub fn population(&self) -> u64 {
        self.population
    }
}

/// RNG for worker `index`
///
/// With a base seed every worker gets a distinct, reproducible stream.
pub fn worker_rng(seed: Option<u64>, index: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index)),
        None => StdRng::from_os_rng(),
    }
}
