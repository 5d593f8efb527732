//! Shared enums used across dbraster.
//! Includes the working float `Precision`, the image `OutputFormat`, and the
//! pipeline `Stage` names used to key statistics.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Floating-point type used for the log-domain working raster.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    F32,
    F64,
}

impl Precision {
    /// Size of one working element in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Precision::F32 => std::mem::size_of::<f32>(),
            Precision::F64 => std::mem::size_of::<f64>(),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precision::F32 => write!(f, "f32"),
            Precision::F64 => write!(f, "f64"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    TIFF,
    JPEG, // Lossy, preview only
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::TIFF => "tiff",
            OutputFormat::JPEG => "jpg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::TIFF => write!(f, "TIFF"),
            OutputFormat::JPEG => write!(f, "JPEG"),
        }
    }
}

/// Pipeline stages in execution order. The derived `Ord` follows that order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Original,
    Log,
    Scaled,
    Normalized,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Original, Stage::Log, Stage::Scaled, Stage::Normalized];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Original => "original",
            Stage::Log => "log",
            Stage::Scaled => "scaled",
            Stage::Normalized => "normalized",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
