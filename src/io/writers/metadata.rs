use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::memory::MemoryEstimate;
use crate::core::params::PipelineParams;
use crate::core::processing::pipeline::PipelineOutput;
use crate::core::stats::StatsCollector;
use crate::error::Result;
use crate::io::writers::{StagedFile, stage_file};
use crate::types::OutputFormat;

pub const CONVERSION_TOOL: &str = "dbraster";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub format: OutputFormat,
    pub quantization_levels: u16,
}

/// Machine-readable description of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub conversion_tool: String,
    pub conversion_version: String,
    pub conversion_timestamp: String,
    pub params: PipelineParams,
    pub memory: MemoryEstimate,
    pub image: ImageInfo,
    pub stages: StatsCollector,
}

impl RunMetadata {
    pub fn new(
        params: PipelineParams,
        output: &PipelineOutput,
        format: OutputFormat,
        quantization_levels: u16,
    ) -> Self {
        Self {
            conversion_tool: CONVERSION_TOOL.to_string(),
            conversion_version: env!("CARGO_PKG_VERSION").to_string(),
            conversion_timestamp: chrono::Utc::now().to_rfc3339(),
            params,
            memory: output.memory,
            image: ImageInfo {
                width: output.image.width(),
                height: output.image.height(),
                format,
                quantization_levels,
            },
            stages: output.stats.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `<output>.json`, next to the image.
pub fn sidecar_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("json")
}

/// Serialize the metadata as pretty-printed JSON into a staged sidecar file.
pub fn stage_metadata_sidecar(output_path: &Path, meta: &RunMetadata) -> Result<StagedFile> {
    let json = meta.to_json()?;
    stage_file(&sidecar_path(output_path), |w| Ok(w.write_all(json.as_bytes())?))
}

/// Write the metadata as a pretty-printed JSON sidecar next to `output_path`.
pub fn write_metadata_sidecar(output_path: &Path, meta: &RunMetadata) -> Result<PathBuf> {
    let sidecar = stage_metadata_sidecar(output_path, meta)?.commit()?;
    info!("Created metadata sidecar: {:?}", sidecar);
    Ok(sidecar)
}
