use serde::{Deserialize, Serialize};

use crate::core::memory::bytes_per_element;
use crate::core::raster::Shape;
use crate::error::{Error, Result};
use crate::types::Precision;

/// Number of output intensity levels of the normalized raster.
pub const QUANTIZATION_LEVELS: u16 = 256;

/// Pipeline parameters suitable for config files and CLI overrides.
/// Unvalidated; freeze them into a [`PipelineConfig`] before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    /// Log-domain values strictly below this are rescaled
    pub log_threshold: f64,
    pub log_multiplier: f64,
    pub precision: Precision,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            width: 10_000,
            height: 1_000,
            seed: 42,
            log_threshold: 13.0,
            log_multiplier: 2.0,
            precision: Precision::F64,
        }
    }
}

/// Validated, immutable pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    shape: Shape,
    seed: u64,
    log_threshold: f64,
    log_multiplier: f64,
    precision: Precision,
    quantization_levels: u16,
}

impl PipelineConfig {
    pub fn new(params: &PipelineParams) -> Result<Self> {
        if params.width == 0 {
            return Err(Error::config("width", params.width, "must be positive"));
        }
        if params.height == 0 {
            return Err(Error::config("height", params.height, "must be positive"));
        }
        let shape = Shape::new(params.width, params.height);
        let fits = shape
            .checked_len()
            .and_then(|len| len.checked_mul(bytes_per_element(params.precision)))
            .is_some();
        if !fits {
            return Err(Error::config(
                "width",
                shape,
                "byte count of the working set overflows usize",
            ));
        }
        if !params.log_threshold.is_finite() {
            return Err(Error::config("log_threshold", params.log_threshold, "must be finite"));
        }
        if params.log_threshold <= 0.0 {
            return Err(Error::config("log_threshold", params.log_threshold, "must be positive"));
        }
        if !params.log_multiplier.is_finite() {
            return Err(Error::config(
                "log_multiplier",
                params.log_multiplier,
                "must be finite",
            ));
        }

        Ok(Self {
            shape,
            seed: params.seed,
            log_threshold: params.log_threshold,
            log_multiplier: params.log_multiplier,
            precision: params.precision,
            quantization_levels: QUANTIZATION_LEVELS,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn width(&self) -> usize {
        self.shape.width
    }

    pub fn height(&self) -> usize {
        self.shape.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn log_threshold(&self) -> f64 {
        self.log_threshold
    }

    pub fn log_multiplier(&self) -> f64 {
        self.log_multiplier
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn quantization_levels(&self) -> u16 {
        self.quantization_levels
    }

    /// Highest output level (255 for 256 levels).
    pub fn max_level(&self) -> u8 {
        (self.quantization_levels - 1) as u8
    }

    pub fn params(&self) -> PipelineParams {
        PipelineParams {
            width: self.shape.width,
            height: self.shape.height,
            seed: self.seed,
            log_threshold: self.log_threshold,
            log_multiplier: self.log_multiplier,
            precision: self.precision,
        }
    }
}

impl TryFrom<PipelineParams> for PipelineConfig {
    type Error = Error;

    fn try_from(params: PipelineParams) -> Result<Self> {
        Self::new(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PipelineParams {
        PipelineParams {
            width: 4,
            height: 3,
            ..PipelineParams::default()
        }
    }

    #[test]
    fn defaults_match_reference_run() {
        let config = PipelineConfig::new(&PipelineParams::default()).unwrap();
        assert_eq!(config.shape(), Shape::new(10_000, 1_000));
        assert_eq!(config.seed(), 42);
        assert_eq!(config.log_threshold(), 13.0);
        assert_eq!(config.log_multiplier(), 2.0);
        assert_eq!(config.quantization_levels(), 256);
        assert_eq!(config.max_level(), 255);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = PipelineConfig::new(&PipelineParams { width: 0, ..params() }).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "width", .. }));
        let err = PipelineConfig::new(&PipelineParams { height: 0, ..params() }).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "height", .. }));
    }

    #[test]
    fn rejects_non_positive_threshold() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = PipelineConfig::new(&PipelineParams {
                log_threshold: t,
                ..params()
            })
            .unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { field: "log_threshold", .. }));
        }
    }

    #[test]
    fn rejects_non_finite_multiplier() {
        let err = PipelineConfig::new(&PipelineParams {
            log_multiplier: f64::NAN,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { field: "log_multiplier", .. }));
    }

    #[test]
    fn negative_multiplier_is_allowed() {
        let config = PipelineConfig::new(&PipelineParams {
            log_multiplier: -0.5,
            ..params()
        })
        .unwrap();
        assert_eq!(config.log_multiplier(), -0.5);
    }

    #[test]
    fn params_round_trip_through_json_with_defaults() {
        let parsed: PipelineParams =
            serde_json::from_str(r#"{"width": 8, "precision": "f32"}"#).unwrap();
        assert_eq!(parsed.width, 8);
        assert_eq!(parsed.height, 1_000);
        assert_eq!(parsed.precision, Precision::F32);
    }
}
