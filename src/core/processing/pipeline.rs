use crate::core::memory::{MemoryEstimate, estimate_memory};
use crate::core::observer::PipelineObserver;
use crate::core::params::PipelineConfig;
use crate::core::processing::ensure_shape;
use crate::core::processing::log_transform::{LogTransformStage, source_stats};
use crate::core::processing::normalize::NormalizeStage;
use crate::core::processing::scale::ConditionalScaleStage;
use crate::core::raster::{Raster, SourceRaster, ValidityMask, WorkingFloat};
use crate::core::stats::{StageStatistics, StatsCollector};
use crate::error::Result;
use crate::types::{Precision, Stage};

/// Result of a complete run: the quantized raster plus everything the export
/// collaborators need to describe it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub image: Raster<u8>,
    pub mask: ValidityMask,
    pub stats: StatsCollector,
    pub memory: MemoryEstimate,
}

/// Strictly linear driver: log transform, conditional scale, normalize.
///
/// The log stage borrows the source and allocates the working buffer, the
/// scale stage rewrites that buffer in place, and the normalize stage borrows
/// it to allocate the `u8` output. At most the source, one working buffer and
/// the output are alive at once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    log: LogTransformStage,
    scale: ConditionalScaleStage,
    normalize: NormalizeStage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            log: LogTransformStage::from_config(&config),
            scale: ConditionalScaleStage::from_config(&config),
            normalize: NormalizeStage::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn estimate_memory(&self) -> MemoryEstimate {
        estimate_memory(&self.config)
    }

    /// Run every stage at the configured working precision.
    pub fn run(
        &self,
        source: &SourceRaster,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineOutput> {
        match self.config.precision() {
            Precision::F32 => self.run_with::<f32>(source, observer),
            Precision::F64 => self.run_with::<f64>(source, observer),
        }
    }

    pub fn run_with<W: WorkingFloat>(
        &self,
        source: &SourceRaster,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineOutput> {
        let memory = self.estimate_memory();
        observer.on_memory_estimate(&memory);

        ensure_shape(Stage::Original, self.config.shape(), source.shape())?;

        let mut stats = StatsCollector::new();
        let mut complete = |stage: Stage, stage_stats: StageStatistics| {
            observer.on_stage_complete(stage, &stage_stats);
            stats.record(stage, stage_stats);
        };

        complete(Stage::Original, source_stats(source));

        let logged = self.log.run::<W>(source)?;
        complete(Stage::Log, logged.stats);

        let mut mask = logged.mask;
        let scaled = self.scale.run(logged.raster, &mut mask)?;
        complete(Stage::Scaled, scaled.stats);

        let normalized = self.normalize.run(&scaled.raster)?;
        drop(scaled.raster);
        complete(Stage::Normalized, normalized.stats);

        Ok(PipelineOutput {
            image: normalized.raster,
            mask,
            stats,
            memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::{NullObserver, RecordingObserver};
    use crate::core::params::PipelineParams;
    use crate::core::raster::Shape;
    use crate::error::Error;

    fn pipeline(width: usize, height: usize, precision: Precision) -> Pipeline {
        Pipeline::new(
            PipelineConfig::new(&PipelineParams {
                width,
                height,
                precision,
                ..PipelineParams::default()
            })
            .unwrap(),
        )
    }

    #[test]
    fn observer_sees_every_stage_in_order() {
        let source = Raster::from_vec(Shape::new(2, 2), vec![0u16, 10, 100, 1000]).unwrap();
        let mut observer = RecordingObserver::default();
        let out = pipeline(2, 2, Precision::F64)
            .run(&source, &mut observer)
            .unwrap();
        assert_eq!(observer.estimate, Some(out.memory));
        let order: Vec<Stage> = observer.stages.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Stage::ALL.to_vec());
        assert!(out.stats.is_complete());
        assert_eq!(out.stats.get(Stage::Log), Some(&observer.stages[1].1));
    }

    #[test]
    fn precisions_agree_on_output() {
        let data: Vec<u16> = (0..64u16).map(|i| i * 1021).collect();
        let source = Raster::from_vec(Shape::new(8, 8), data).unwrap();
        let a = pipeline(8, 8, Precision::F32)
            .run(&source, &mut NullObserver)
            .unwrap();
        let b = pipeline(8, 8, Precision::F64)
            .run(&source, &mut NullObserver)
            .unwrap();
        let diff = a
            .image
            .iter()
            .zip(b.image.iter())
            .map(|(&x, &y)| (i16::from(x) - i16::from(y)).abs())
            .max()
            .unwrap();
        assert!(diff <= 1, "max level difference {diff}");
        assert_eq!(a.image.shape(), b.image.shape());
    }

    #[test]
    fn shape_mismatch_aborts_before_any_stage() {
        let source = Raster::from_elem(Shape::new(3, 3), 7u16);
        let mut observer = RecordingObserver::default();
        let err = pipeline(4, 4, Precision::F64)
            .run(&source, &mut observer)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { stage: Stage::Original, .. }));
        assert!(observer.stages.is_empty());
    }
}
