use crate::core::params::PipelineConfig;
use crate::core::processing::{ensure_shape, to_working, working_stats};
use crate::core::raster::{Raster, Shape, ValidityMask, WorkingFloat};
use crate::core::stats::StageStatistics;
use crate::error::Result;
use crate::types::Stage;

/// Multiplies log-domain values strictly below `threshold` by `multiplier`.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalScaleStage {
    shape: Shape,
    threshold: f64,
    multiplier: f64,
}

#[derive(Debug, Clone)]
pub struct ScaleOutput<W> {
    pub raster: Raster<W>,
    pub stats: StageStatistics,
}

impl ConditionalScaleStage {
    pub fn new(shape: Shape, threshold: f64, multiplier: f64) -> Self {
        Self {
            shape,
            threshold,
            multiplier,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.shape(), config.log_threshold(), config.log_multiplier())
    }

    /// Takes ownership of the working raster and rescales it in place. A
    /// product outside the working type's finite range is stored as NaN, and
    /// every cell that ends up NaN is cleared from `mask`.
    pub fn run<W: WorkingFloat>(
        &self,
        mut working: Raster<W>,
        mask: &mut ValidityMask,
    ) -> Result<ScaleOutput<W>> {
        ensure_shape(Stage::Scaled, self.shape, working.shape())?;
        ensure_shape(Stage::Scaled, self.shape, mask.shape())?;

        let threshold = to_working::<W>(self.threshold);
        let multiplier = to_working::<W>(self.multiplier);

        let mut rescaled = 0usize;
        working.as_array_mut().map_inplace(|v| {
            // NaN compares false, so invalid cells are never rescaled.
            if *v < threshold {
                let product = *v * multiplier;
                // Overflow leaves the representable range; the cell becomes invalid.
                *v = if product.is_finite() { product } else { W::nan() };
                rescaled += 1;
            }
        });
        mask.narrow(&working);

        let mut stats = working_stats(&working);
        stats.rescaled_count = Some(rescaled);

        Ok(ScaleOutput {
            raster: working,
            stats,
        })
    }
}
