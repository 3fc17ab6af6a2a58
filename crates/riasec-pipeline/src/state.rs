use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use riasec_model::{PipelineStage, PipelineState};

/// Load the persisted state, or `None` if no state file exists yet.
pub fn load(path: &Path) -> Result<Option<PipelineState>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let state = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &PipelineState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), stage = ?state.stage, "Saved pipeline state");
    Ok(())
}

/// Record `stage` as completed and persist it.
///
/// A stage whose predecessor was never recorded is not written; the state
/// keeps its current stage so a resumed run still performs the missing step.
pub fn record(path: &Path, state: &mut PipelineState, stage: PipelineStage) -> Result<()> {
    if !state.advance(stage) {
        tracing::warn!(
            current = ?state.stage,
            requested = ?stage,
            "Earlier step not recorded; keeping current stage"
        );
    }
    save(path, state)
}
