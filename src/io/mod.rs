//! I/O layer: raster sources at the input end, image and metadata writers at
//! the output end. Nothing here runs between pipeline stages.
pub mod source;
pub use source::{FixedSource, SampleSource, SeededUniformSource};

pub mod writers;
