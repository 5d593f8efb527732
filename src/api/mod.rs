//! High-level library API: run the pipeline on injected or synthetic data, to
//! in-memory buffers or to files. Prefer these entrypoints over the individual
//! stages when embedding dbraster.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::memory::{MemoryEstimate, estimate_memory};
use crate::core::observer::PipelineObserver;
use crate::core::params::{PipelineConfig, PipelineParams};
use crate::core::processing::pipeline::{Pipeline, PipelineOutput};
use crate::core::raster::SourceRaster;
use crate::error::Result;
use crate::io::source::{SampleSource, SeededUniformSource};
use crate::io::writers::metadata::{RunMetadata, stage_metadata_sidecar};
use crate::io::writers::{commit_all, stage_gray_image};
use crate::types::OutputFormat;

/// Files produced by [`process_to_path`].
#[derive(Debug, Clone)]
pub struct WrittenArtifacts {
    pub image: PathBuf,
    pub sidecar: Option<PathBuf>,
    pub metadata: RunMetadata,
}

/// Validate `params` and report the advisory memory estimate without processing.
pub fn estimate(params: &PipelineParams) -> Result<MemoryEstimate> {
    let config = PipelineConfig::new(params)?;
    Ok(estimate_memory(&config))
}

/// Run the pipeline on an injected source raster (no disk I/O).
pub fn process_to_buffer(
    params: &PipelineParams,
    source: &SourceRaster,
    observer: &mut dyn PipelineObserver,
) -> Result<PipelineOutput> {
    let config = PipelineConfig::new(params)?;
    Pipeline::new(config).run(source, observer)
}

/// Draw a source from `sampler` with the configured shape, then run the pipeline.
pub fn process_from_source(
    params: &PipelineParams,
    sampler: &mut dyn SampleSource,
    observer: &mut dyn PipelineObserver,
) -> Result<PipelineOutput> {
    let config = PipelineConfig::new(params)?;
    let source = sampler.generate(config.shape())?;
    Pipeline::new(config).run(&source, observer)
}

/// Generate a seeded synthetic raster and run the pipeline on it.
pub fn process_synthetic(
    params: &PipelineParams,
    observer: &mut dyn PipelineObserver,
) -> Result<PipelineOutput> {
    let mut sampler = SeededUniformSource::new(params.seed);
    process_from_source(params, &mut sampler, observer)
}

/// Run the pipeline on synthetic data and write the image (and optionally the
/// JSON sidecar). Nothing is written unless every stage succeeded.
pub fn process_to_path(
    params: &PipelineParams,
    output: &Path,
    format: OutputFormat,
    write_sidecar: bool,
    observer: &mut dyn PipelineObserver,
) -> Result<WrittenArtifacts> {
    let config = PipelineConfig::new(params)?;
    let mut sampler = SeededUniformSource::new(config.seed());
    let source = sampler.generate(config.shape())?;
    let result = Pipeline::new(config.clone()).run(&source, observer)?;
    drop(source);

    let metadata = RunMetadata::new(config.params(), &result, format, config.quantization_levels());
    let description = metadata.to_json()?;

    // Both files are fully encoded before either is renamed into place.
    let mut staged = vec![stage_gray_image(output, &result.image, format, Some(&description))?];
    if write_sidecar {
        staged.push(stage_metadata_sidecar(output, &metadata)?);
    }
    let mut committed = commit_all(staged)?.into_iter();
    let image = committed.next().unwrap_or_else(|| output.to_path_buf());
    let sidecar = committed.next();

    if let Some(path) = &sidecar {
        info!("Created metadata sidecar: {:?}", path);
    }
    info!("Successfully processed -> {:?}", image);
    Ok(WrittenArtifacts {
        image,
        sidecar,
        metadata,
    })
}
