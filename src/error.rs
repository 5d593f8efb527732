//! Crate-level error type and `Result` alias.
//! Configuration and raster-contract violations are hard errors; numeric edge
//! cases (NaN cells, flat ranges) are not errors and are reported through
//! [`crate::core::stats::DataCondition`] instead.
use thiserror::Error;

use crate::core::raster::Shape;
use crate::types::Stage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {field}={value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Shape mismatch in {stage} stage: expected {expected}, got {actual}")]
    ShapeMismatch {
        stage: Stage,
        expected: Shape,
        actual: Shape,
    },

    #[error("Buffer of {len} elements does not fit a {shape} raster")]
    InvalidShape { shape: Shape, len: usize },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Encoding error: {0}")]
    Encode(String),
}

impl Error {
    pub fn encode<E: std::fmt::Display>(e: E) -> Self {
        Error::Encode(e.to_string())
    }

    pub(crate) fn config(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Error::InvalidConfig {
            field,
            value: value.to_string(),
            reason,
        }
    }
}
