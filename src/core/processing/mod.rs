//! The numeric pipeline: log transform, conditional scale, normalize, and the
//! linear driver that runs them in order.
pub mod log_transform;
pub mod normalize;
pub mod pipeline;
pub mod scale;

use crate::core::raster::{Raster, Shape, WorkingFloat};
use crate::core::stats::StageStatistics;
use crate::error::{Error, Result};
use crate::types::Stage;

pub(crate) fn ensure_shape(stage: Stage, expected: Shape, actual: Shape) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Statistics over the non-NaN elements of a working raster.
pub(crate) fn working_stats<W: WorkingFloat>(raster: &Raster<W>) -> StageStatistics {
    StageStatistics::from_floats(raster.iter().map(|&v| -> f64 { v.into() }))
}

/// Convert an `f64` parameter into the working type, saturating values the
/// working type cannot represent.
pub(crate) fn to_working<W: WorkingFloat>(value: f64) -> W {
    W::from_f64(value).unwrap_or_else(|| {
        if value.is_sign_negative() {
            W::neg_infinity()
        } else {
            W::infinity()
        }
    })
}
