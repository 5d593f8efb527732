//! Raster sources: a seeded uniform generator standing in for a sensor, and a
//! fixed source for injected data.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::core::raster::{Raster, Shape, SourceRaster};
use crate::error::Result;

pub trait SampleSource {
    /// Produce one raster of the requested shape.
    fn generate(&mut self, shape: Shape) -> Result<SourceRaster>;
}

/// Uniform `u16` samples over the full `0..=65535` range from a seeded `StdRng`.
///
/// Deterministic for a given seed and `rand` version; not bit-compatible with
/// other generators.
#[derive(Debug, Clone)]
pub struct SeededUniformSource {
    seed: u64,
    rng: StdRng,
}

impl SeededUniformSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SampleSource for SeededUniformSource {
    fn generate(&mut self, shape: Shape) -> Result<SourceRaster> {
        debug!("Generating {} raster from seed {}", shape, self.seed);
        let data: Vec<u16> = (0..shape.len()).map(|_| self.rng.random::<u16>()).collect();
        Raster::from_vec(shape, data)
    }
}

/// Serves a pre-built raster; fails with a shape error when asked for another shape.
#[derive(Debug, Clone)]
pub struct FixedSource {
    data: Vec<u16>,
}

impl FixedSource {
    pub fn new(data: Vec<u16>) -> Self {
        Self { data }
    }
}

impl SampleSource for FixedSource {
    fn generate(&mut self, shape: Shape) -> Result<SourceRaster> {
        Raster::from_vec(shape, self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn same_seed_same_raster() {
        let shape = Shape::new(16, 8);
        let a = SeededUniformSource::new(42).generate(shape).unwrap();
        let b = SeededUniformSource::new(42).generate(shape).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), shape);
    }

    #[test]
    fn different_seeds_differ() {
        let shape = Shape::new(16, 8);
        let a = SeededUniformSource::new(1).generate(shape).unwrap();
        let b = SeededUniformSource::new(2).generate(shape).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_source_checks_length() {
        let mut source = FixedSource::new(vec![1, 2, 3, 4]);
        assert!(source.generate(Shape::new(2, 2)).is_ok());
        let err = source.generate(Shape::new(3, 2)).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { len: 4, .. }));
    }
}
