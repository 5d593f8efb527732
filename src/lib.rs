#![doc = r#"
dbraster: decibel compression and 8-bit normalization of sensor rasters.

The crate takes a two-dimensional grid of `u16` samples through a fixed, linear
pipeline and returns an 8-bit raster plus statistics for every stage:

1. **log transform**: `10 * log10(e)` for `e > 0`, NaN for zero samples
   (tracked in a validity mask);
2. **conditional scale**: log values strictly below a threshold are multiplied
   by a factor; NaN passes through;
3. **normalize**: the global non-NaN range is mapped onto `0..=255`, with
   defined fallbacks for flat ranges (midpoint 127) and no valid data (all 0).

Quick start: in-memory
----------------------
```rust
use dbraster::{PipelineParams, NullObserver, Raster, Shape, process_to_buffer};

fn main() -> dbraster::Result<()> {
    let params = PipelineParams { width: 2, height: 2, ..PipelineParams::default() };
    let source = Raster::from_vec(Shape::new(2, 2), vec![1u16, 10, 100, 1000])?;
    let out = process_to_buffer(&params, &source, &mut NullObserver)?;
    assert_eq!(out.image.to_vec(), vec![0, 170, 170, 255]);
    Ok(())
}
```

Synthetic data to a file
------------------------
```rust,no_run
use std::path::Path;
use dbraster::{OutputFormat, PipelineParams, TracingObserver, process_to_path};

fn main() -> dbraster::Result<()> {
    let params = PipelineParams::default(); // 10000x1000, seed 42, threshold 13, x2
    process_to_path(
        &params,
        Path::new("/out/processed.jpg"),
        OutputFormat::JPEG,
        true, // JSON sidecar with per-stage statistics
        &mut TracingObserver,
    )?;
    Ok(())
}
```

Error handling
--------------
Invalid configuration fails when the `PipelineConfig` is built; a raster whose
shape disagrees with the configuration fails the stage that receives it. Numeric
edge cases are not errors: they are reported through
`StageStatistics::condition`.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: rasters, configuration, stages, statistics, observers.
- [`io`]: sources and writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use core::memory::{MemoryEstimate, estimate_memory};
pub use core::observer::{NullObserver, PipelineObserver, RecordingObserver, TracingObserver};
pub use core::params::{PipelineConfig, PipelineParams, QUANTIZATION_LEVELS};
pub use core::processing::log_transform::LogTransformStage;
pub use core::processing::normalize::NormalizeStage;
pub use core::processing::pipeline::{Pipeline, PipelineOutput};
pub use core::processing::scale::ConditionalScaleStage;
pub use core::raster::{Raster, Shape, SourceRaster, ValidityMask, WorkingFloat};
pub use core::stats::{DataCondition, StageStatistics, StatsCollector, ValueRange};
pub use error::{Error, Result};
pub use types::{OutputFormat, Precision, Stage};

pub use io::source::{FixedSource, SampleSource, SeededUniformSource};
pub use io::writers::metadata::RunMetadata;

pub use api::{
    WrittenArtifacts, estimate, process_from_source, process_synthetic, process_to_buffer,
    process_to_path,
};
