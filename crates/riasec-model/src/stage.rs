use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How far the pipeline has progressed; stages are strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    NotStarted,
    /// The all-occupations accumulator is complete.
    Fetched,
    Deduplicated,
    TitlesScraped,
    Merged,
}

impl PipelineStage {
    /// Stage that must be recorded before this one can be.
    pub fn previous(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::NotStarted => None,
            PipelineStage::Fetched => Some(PipelineStage::NotStarted),
            PipelineStage::Deduplicated => Some(PipelineStage::Fetched),
            PipelineStage::TitlesScraped => Some(PipelineStage::Deduplicated),
            PipelineStage::Merged => Some(PipelineStage::TitlesScraped),
        }
    }
}

/// Persisted pipeline progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub stage: PipelineStage,
    pub updated_at: DateTime<Utc>,
    /// Row count of the all-occupations file after the last dedupe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_occupation_rows: Option<usize>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            stage: PipelineStage::NotStarted,
            updated_at: Utc::now(),
            all_occupation_rows: None,
        }
    }
}

impl PipelineState {
    /// Record that `stage` completed.
    ///
    /// Moving back to an earlier stage is allowed (a refetch invalidates
    /// everything after it), but a stage whose predecessor is not recorded
    /// is refused and `false` is returned.
    pub fn advance(&mut self, stage: PipelineStage) -> bool {
        if stage.previous().is_some_and(|prev| !self.reached(prev)) {
            return false;
        }
        self.stage = stage;
        self.updated_at = Utc::now();
        true
    }

    pub fn reached(&self, stage: PipelineStage) -> bool {
        self.stage >= stage
    }
}
