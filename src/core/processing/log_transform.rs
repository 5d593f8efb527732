use crate::core::params::PipelineConfig;
use crate::core::processing::{ensure_shape, working_stats};
use crate::core::raster::{Raster, Shape, SourceRaster, ValidityMask, WorkingFloat};
use crate::core::stats::{RunningStats, StageStatistics};
use crate::error::Result;
use crate::types::Stage;

/// Converts raw samples to decibels: `10 * log10(e)` for `e > 0`, NaN otherwise.
#[derive(Debug, Clone, Copy)]
pub struct LogTransformStage {
    shape: Shape,
}

#[derive(Debug, Clone)]
pub struct LogTransformOutput<W> {
    pub raster: Raster<W>,
    pub mask: ValidityMask,
    pub stats: StageStatistics,
}

impl LogTransformStage {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.shape())
    }

    /// Allocates the working raster; the source is only borrowed.
    pub fn run<W: WorkingFloat>(&self, source: &SourceRaster) -> Result<LogTransformOutput<W>> {
        ensure_shape(Stage::Log, self.shape, source.shape())?;

        let mask = ValidityMask::from_source(source);
        let raster = Raster::from_array(source.as_array().mapv(decibels::<W>));
        let stats = working_stats(&raster);

        Ok(LogTransformOutput {
            raster,
            mask,
            stats,
        })
    }
}

/// `10 * log10(sample)`, or NaN for a zero sample.
#[inline]
pub fn decibels<W: WorkingFloat>(sample: u16) -> W {
    if sample > 0 {
        let ten = <W as From<u16>>::from(10);
        ten * <W as From<u16>>::from(sample).log10()
    } else {
        W::nan()
    }
}

/// Statistics of the raw samples, with zero samples (which the log transform
/// invalidates) counted as invalid.
pub fn source_stats(source: &SourceRaster) -> StageStatistics {
    let mut acc = RunningStats::default();
    for &v in source.iter() {
        if v > 0 {
            acc.push(f64::from(v));
        } else {
            acc.push_invalid();
        }
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::DataCondition;
    use crate::error::Error;

    fn raster(width: usize, height: usize, data: Vec<u16>) -> SourceRaster {
        Raster::from_vec(Shape::new(width, height), data).unwrap()
    }

    #[test]
    fn positive_samples_map_to_decibels() {
        let samples: Vec<u16> = vec![1, 2, 3, 10, 100, 1000, 12345, 65535];
        let source = raster(4, 2, samples.clone());
        let out = LogTransformStage::new(source.shape())
            .run::<f64>(&source)
            .unwrap();
        for (&e, &db) in samples.iter().zip(out.raster.iter()) {
            let expected = 10.0 * f64::from(e).log10();
            let tol = 1e-9 * expected.abs().max(1.0);
            assert!((db - expected).abs() <= tol, "e={e}: {db} vs {expected}");
        }
        assert_eq!(out.stats.invalid_count, 0);
        assert_eq!(out.stats.minimum, Some(0.0));
        let max = out.stats.maximum.unwrap();
        assert!((max - 10.0 * 65535f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn zero_samples_become_nan_and_are_excluded() {
        let source = raster(3, 1, vec![0, 10, 100]);
        let out = LogTransformStage::new(source.shape())
            .run::<f64>(&source)
            .unwrap();
        assert!(out.raster.get(0, 0).unwrap().is_nan());
        assert!(!out.mask.is_valid(0, 0));
        assert!(out.mask.is_valid(1, 0));
        assert_eq!(out.stats.invalid_count, 1);
        assert_eq!(out.stats.valid_count, 2);
        assert!((out.stats.minimum.unwrap() - 10.0).abs() < 1e-12);
        assert!((out.stats.mean.unwrap() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn all_zero_input_is_degenerate_not_error() {
        let source = raster(2, 2, vec![0; 4]);
        let out = LogTransformStage::new(source.shape())
            .run::<f32>(&source)
            .unwrap();
        assert!(out.raster.iter().all(|v| v.is_nan()));
        assert_eq!(out.stats.invalid_count, 4);
        assert_eq!(out.stats.minimum, None);
        assert_eq!(out.stats.maximum, None);
        assert_eq!(out.stats.condition, DataCondition::AllInvalid);
    }

    #[test]
    fn shape_is_preserved() {
        let source = raster(5, 3, (1..=15).collect());
        let out = LogTransformStage::new(source.shape())
            .run::<f32>(&source)
            .unwrap();
        assert_eq!(out.raster.shape(), source.shape());
        assert_eq!(out.mask.shape(), source.shape());
    }

    #[test]
    fn rejects_unexpected_shape() {
        let source = raster(2, 2, vec![1; 4]);
        let err = LogTransformStage::new(Shape::new(4, 1))
            .run::<f64>(&source)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { stage: Stage::Log, .. }));
    }

    #[test]
    fn source_stats_skip_zero_samples() {
        let stats = source_stats(&raster(4, 1, vec![0, 2, 4, 0]));
        assert_eq!(stats.minimum, Some(2.0));
        assert_eq!(stats.maximum, Some(4.0));
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.invalid_count, 2);
    }
}
