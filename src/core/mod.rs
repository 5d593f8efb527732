//! Core building blocks: rasters and validity masks, configuration, memory
//! estimation, per-stage statistics, the observer sink, and the processing
//! pipeline. Consumed by the high-level `api` module and the CLI.
pub mod memory;
pub mod observer;
pub mod params;
pub mod processing;
pub mod raster;
pub mod stats;
