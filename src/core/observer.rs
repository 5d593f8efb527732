//! Observability sink passed into the pipeline.
//!
//! The numeric core never logs on its own; it reports to a [`PipelineObserver`].
//! [`TracingObserver`] forwards those reports to `tracing`.
use tracing::{debug, info, warn};

use crate::core::memory::MemoryEstimate;
use crate::core::stats::StageStatistics;
use crate::types::Stage;

pub trait PipelineObserver {
    /// Called once before any stage runs.
    fn on_memory_estimate(&mut self, _estimate: &MemoryEstimate) {}

    /// Called after each stage, in pipeline order.
    fn on_stage_complete(&mut self, stage: Stage, stats: &StageStatistics);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn on_stage_complete(&mut self, _stage: Stage, _stats: &StageStatistics) {}
}

/// Emits `tracing` events for the memory estimate and each completed stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_memory_estimate(&mut self, estimate: &MemoryEstimate) {
        info!("Memory usage (approx): {}", estimate);
    }

    fn on_stage_complete(&mut self, stage: Stage, stats: &StageStatistics) {
        info!(
            "{} stage: min={}, max={}, mean={}, invalid={}",
            stage,
            fmt_opt(stats.minimum),
            fmt_opt(stats.maximum),
            fmt_opt(stats.mean),
            stats.invalid_count
        );
        if let Some(n) = stats.rescaled_count {
            debug!("{} stage: rescaled {} elements", stage, n);
        }
        if let Some(range) = stats.input_range {
            debug!(
                "{} stage: mapped [{:.3}, {:.3}] onto output levels",
                stage, range.min, range.max
            );
        }
        if stats.condition.is_degenerate() {
            warn!("{} stage: degenerate data ({:?})", stage, stats.condition);
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub estimate: Option<MemoryEstimate>,
    pub stages: Vec<(Stage, StageStatistics)>,
}

impl PipelineObserver for RecordingObserver {
    fn on_memory_estimate(&mut self, estimate: &MemoryEstimate) {
        self.estimate = Some(*estimate);
    }

    fn on_stage_complete(&mut self, stage: Stage, stats: &StageStatistics) {
        self.stages.push((stage, stats.clone()));
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}
