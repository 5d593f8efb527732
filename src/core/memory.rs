//! Advisory working-set estimate, computed from the configuration alone.
use serde::{Deserialize, Serialize};

use crate::core::params::PipelineConfig;
use crate::types::Precision;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MemoryEstimate {
    pub input_bytes: usize,
    pub working_bytes: usize,
    pub output_bytes: usize,
    /// Conservative: assumes no stage frees its predecessor before allocating.
    pub peak_bytes: usize,
}

impl MemoryEstimate {
    pub fn peak_mib(&self) -> f64 {
        self.peak_bytes as f64 / BYTES_PER_MIB
    }
}

impl std::fmt::Display for MemoryEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "input={:.2} MB, working={:.2} MB, output={:.2} MB, peak={:.2} MB",
            self.input_bytes as f64 / BYTES_PER_MIB,
            self.working_bytes as f64 / BYTES_PER_MIB,
            self.output_bytes as f64 / BYTES_PER_MIB,
            self.peak_mib()
        )
    }
}

/// Bytes held per grid cell when the source, one working buffer and the output
/// are alive together.
pub fn bytes_per_element(precision: Precision) -> usize {
    std::mem::size_of::<u16>() + precision.bytes() + std::mem::size_of::<u8>()
}

/// `PipelineConfig` guarantees that `len * bytes_per_element` fits in `usize`,
/// so none of the byte counts below can overflow.
pub fn estimate_memory(config: &PipelineConfig) -> MemoryEstimate {
    let elements = config.shape().len();
    let input_bytes = elements * std::mem::size_of::<u16>();
    let working_bytes = elements * config.precision().bytes();
    let output_bytes = elements * std::mem::size_of::<u8>();
    MemoryEstimate {
        input_bytes,
        working_bytes,
        output_bytes,
        peak_bytes: input_bytes + working_bytes + output_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::PipelineParams;
    use crate::error::Error;

    #[test]
    fn reference_run_f64() {
        let config = PipelineConfig::new(&PipelineParams::default()).unwrap();
        let est = estimate_memory(&config);
        assert_eq!(est.input_bytes, 20_000_000);
        assert_eq!(est.working_bytes, 80_000_000);
        assert_eq!(est.output_bytes, 10_000_000);
        assert_eq!(est.peak_bytes, 110_000_000);
    }

    #[test]
    fn working_size_follows_precision() {
        let config = PipelineConfig::new(&PipelineParams {
            width: 10,
            height: 10,
            precision: Precision::F32,
            ..PipelineParams::default()
        })
        .unwrap();
        let est = estimate_memory(&config);
        assert_eq!(est.working_bytes, 400);
        assert_eq!(est.peak_bytes, 200 + 400 + 100);
    }

    #[test]
    fn peak_matches_bytes_per_element() {
        let config = PipelineConfig::new(&PipelineParams {
            width: 7,
            height: 3,
            ..PipelineParams::default()
        })
        .unwrap();
        let est = estimate_memory(&config);
        assert_eq!(est.peak_bytes, 21 * bytes_per_element(Precision::F64));
    }

    #[test]
    fn byte_count_overflow_is_rejected_before_estimating() {
        for precision in [Precision::F32, Precision::F64] {
            let err = PipelineConfig::new(&PipelineParams {
                width: usize::MAX / 4,
                height: 1,
                precision,
                ..PipelineParams::default()
            })
            .unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { field: "width", .. }));
        }
    }
}
