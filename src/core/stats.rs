//! Per-stage descriptive statistics and the ordered collector that gathers them.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Stage;

/// Degenerate-data conditions. None of these is an error: each has a defined
/// fallback output and is only reported here.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCondition {
    #[default]
    Nominal,
    /// Every element of the stage output is invalid (NaN).
    AllInvalid,
    /// Normalization found no valid element; output is all zero.
    NoValidData,
    /// Normalization input had vmax == vmin; valid cells map to the midpoint.
    FlatRange,
}

impl DataCondition {
    pub fn is_degenerate(self) -> bool {
        self != DataCondition::Nominal
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Statistics over the valid elements of one stage's output.
///
/// `minimum`, `maximum` and `mean` are `None` when the stage has no valid
/// element; they serialize as `null`. A value inside `Some` is always finite.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct StageStatistics {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub valid_count: usize,
    pub invalid_count: usize,
    #[serde(default)]
    pub condition: DataCondition,
    /// Elements multiplied by the scale stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescaled_count: Option<usize>,
    /// Value range the normalize stage mapped onto the output levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_range: Option<ValueRange>,
}

impl StageStatistics {
    pub fn total_count(&self) -> usize {
        self.valid_count + self.invalid_count
    }

    pub fn range(&self) -> Option<ValueRange> {
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => Some(ValueRange { min, max }),
            _ => None,
        }
    }

    /// Statistics over float samples; NaN and infinities count as invalid.
    pub fn from_floats<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut acc = RunningStats::default();
        for v in values {
            if v.is_finite() {
                acc.push(v);
            } else {
                acc.push_invalid();
            }
        }
        acc.finish()
    }
}

/// Single-pass min/max and Welford mean/variance accumulator.
#[derive(Clone, Debug)]
pub struct RunningStats {
    count: u64,
    invalid: u64,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64, // Sum of squares of differences from the current mean
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            invalid: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }
}

impl RunningStats {
    /// Add a sample; a non-finite one is counted as invalid instead.
    #[inline]
    pub fn push(&mut self, v: f64) {
        if !v.is_finite() {
            self.invalid += 1;
            return;
        }
        self.count += 1;
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        let delta = v - self.mean;
        self.mean += delta / (self.count as f64);
        let delta2 = v - self.mean;
        self.m2 += delta * delta2;
    }

    #[inline]
    pub fn push_invalid(&mut self) {
        self.invalid += 1;
    }

    pub fn finish(self) -> StageStatistics {
        let invalid_count = self.invalid as usize;
        if self.count == 0 {
            return StageStatistics {
                invalid_count,
                condition: if invalid_count > 0 {
                    DataCondition::AllInvalid
                } else {
                    DataCondition::Nominal
                },
                ..StageStatistics::default()
            };
        }
        StageStatistics {
            minimum: Some(self.min),
            maximum: Some(self.max),
            // Moments of extreme finite samples can still overflow.
            mean: Some(self.mean).filter(|m| m.is_finite()),
            std_dev: Some((self.m2 / self.count as f64).sqrt()).filter(|s| s.is_finite()),
            valid_count: self.count as usize,
            invalid_count,
            condition: DataCondition::Nominal,
            rescaled_count: None,
            input_range: None,
        }
    }
}

/// Ordered report of stage statistics, keyed by stage name.
///
/// Serializes as a JSON object in pipeline order. Looking up a stage that has
/// not run yet returns `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsCollector {
    stages: BTreeMap<Stage, StageStatistics>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage's statistics, replacing an earlier record for the same stage.
    pub fn record(&mut self, stage: Stage, stats: StageStatistics) {
        self.stages.insert(stage, stats);
    }

    pub fn get(&self, stage: Stage) -> Option<&StageStatistics> {
        self.stages.get(&stage)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains_key(&stage)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        Stage::ALL.iter().all(|s| self.contains(*s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &StageStatistics)> {
        self.stages.iter().map(|(stage, stats)| (*stage, stats))
    }

    /// Degenerate conditions in pipeline order.
    pub fn degenerate_conditions(&self) -> Vec<(Stage, DataCondition)> {
        self.iter()
            .filter(|(_, s)| s.condition.is_degenerate())
            .map(|(stage, s)| (stage, s.condition))
            .collect()
    }
}
