use ndarray::Array2;

use crate::core::params::PipelineConfig;
use crate::core::processing::ensure_shape;
use crate::core::raster::{Raster, Shape, WorkingFloat};
use crate::core::stats::{DataCondition, RunningStats, StageStatistics, ValueRange};
use crate::error::Result;
use crate::types::Stage;

/// Maps the global non-NaN value range of a working raster onto `0..=max_level`.
///
/// Only finite elements are valid; NaN and infinities always map to 0.
///
/// - no valid element: all-zero output, `DataCondition::NoValidData`
/// - flat range (vmax == vmin): valid cells get the midpoint level, invalid
///   cells 0, `DataCondition::FlatRange`
/// - otherwise: invalid cells 0, valid cells
///   `round(max_level * (e - vmin) / (vmax - vmin))`
#[derive(Debug, Clone, Copy)]
pub struct NormalizeStage {
    shape: Shape,
    max_level: u8,
}

#[derive(Debug, Clone)]
pub struct NormalizeOutput {
    pub raster: Raster<u8>,
    pub stats: StageStatistics,
}

impl NormalizeStage {
    pub fn new(shape: Shape, max_level: u8) -> Self {
        Self { shape, max_level }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.shape(), config.max_level())
    }

    pub fn midpoint(&self) -> u8 {
        self.max_level / 2
    }

    /// Allocates the output raster; the working raster is only borrowed.
    pub fn run<W: WorkingFloat>(&self, scaled: &Raster<W>) -> Result<NormalizeOutput> {
        ensure_shape(Stage::Normalized, self.shape, scaled.shape())?;

        let input = scaled.as_array();
        let range = valid_range(input);
        let (data, condition) = match range {
            None => (Array2::<u8>::zeros(input.dim()), DataCondition::NoValidData),
            Some(r) if r.max == r.min => {
                let mid = self.midpoint();
                let data = input.mapv(|v| if v.is_finite() { mid } else { 0 });
                (data, DataCondition::FlatRange)
            }
            Some(r) => {
                let levels = f64::from(self.max_level);
                let span = r.span();
                let data = input.mapv(|v| {
                    if v.is_finite() {
                        let e: f64 = v.into();
                        // Divide first so a span near f64::MAX cannot overflow.
                        quantize((e - r.min) / span * levels, levels)
                    } else {
                        0
                    }
                });
                (data, DataCondition::Nominal)
            }
        };

        let mut acc = RunningStats::default();
        ndarray::Zip::from(input).and(&data).for_each(|v, &out| {
            if v.is_finite() {
                acc.push(f64::from(out));
            } else {
                acc.push_invalid();
            }
        });
        let mut stats = acc.finish();
        stats.condition = condition;
        stats.input_range = range;

        Ok(NormalizeOutput {
            raster: Raster::from_array(data),
            stats,
        })
    }
}

/// Min/max over the finite elements, or `None` when there are none.
fn valid_range<W: WorkingFloat>(input: &Array2<W>) -> Option<ValueRange> {
    input
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| -> f64 { v.into() })
        .fold(None, |acc, v| match acc {
            None => Some(ValueRange { min: v, max: v }),
            Some(r) => Some(ValueRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
}

/// Round to the nearest level, clamped to absorb rounding at the range ends.
#[inline]
fn quantize(v: f64, max_level: f64) -> u8 {
    v.round().clamp(0.0, max_level) as u8
}
