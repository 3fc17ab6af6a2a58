use std::path::Path;

use anyhow::Result;
use riasec_acquire::PageSource;
use riasec_model::{expected_count, PipelineStage, PipelineState};

pub mod config;
pub mod state;
pub mod steps;
pub mod tables;

pub use config::{PipelineConfig, PipelinePaths};
pub use steps::FetchDecision;

/// A single stage that can be run on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch,
    Dedupe,
    FilterZone,
    Titles,
    Merge,
}

/// Run the whole pipeline: fetch (if needed), dedupe, optional zone filter,
/// scrape titles, merge.
///
/// Progress is persisted after every step. Dedupe, titles and merge run on
/// every invocation unless `config.resume` is set, in which case a step is
/// skipped when its stage is recorded and its output file exists.
pub async fn run<S>(source: &S, config: &PipelineConfig) -> Result<PipelineState>
where
    S: PageSource + ?Sized,
{
    tracing::info!(
        areas = config.interest_areas.len(),
        combinations = expected_count(config.interest_areas.len()),
        "Number of combinations"
    );

    let mut state = load_state(config)?;
    let paths = &config.paths;

    fetch_stage(source, config, &mut state).await?;

    if skip_completed(config, &state, PipelineStage::Deduplicated, &paths.all_occupations) {
        tracing::info!("Deduplication already recorded; skipping");
    } else {
        dedupe_stage(config, &mut state)?;
    }

    if let Some(min_zone) = config.min_zone {
        steps::filter_zone(paths, min_zone)?;
    }

    if skip_completed(config, &state, PipelineStage::TitlesScraped, &paths.stem_job_titles) {
        tracing::info!("Job titles already recorded; skipping");
    } else {
        steps::titles(source, config).await?;
        state::record(&paths.state, &mut state, PipelineStage::TitlesScraped)?;
    }

    if skip_completed(config, &state, PipelineStage::Merged, &paths.merged) {
        tracing::info!("Merge already recorded; skipping");
    } else {
        steps::merge(paths)?;
        state::record(&paths.state, &mut state, PipelineStage::Merged)?;
    }

    tracing::info!(stage = ?state.stage, "Pipeline complete");
    Ok(state)
}

/// Run one step and record its stage.
///
/// `FilterZone` requires `config.min_zone` and does not change the stage.
pub async fn run_step<S>(source: &S, config: &PipelineConfig, step: Step) -> Result<PipelineState>
where
    S: PageSource + ?Sized,
{
    let mut state = load_state(config)?;
    let paths = &config.paths;

    match step {
        Step::Fetch => fetch_stage(source, config, &mut state).await?,
        Step::Dedupe => dedupe_stage(config, &mut state)?,
        Step::FilterZone => {
            let Some(min_zone) = config.min_zone else {
                anyhow::bail!("Filtering by job zone needs a minimum zone");
            };
            steps::filter_zone(paths, min_zone)?;
        }
        Step::Titles => {
            steps::titles(source, config).await?;
            state::record(&paths.state, &mut state, PipelineStage::TitlesScraped)?;
        }
        Step::Merge => {
            steps::merge(paths)?;
            state::record(&paths.state, &mut state, PipelineStage::Merged)?;
        }
    }

    Ok(state)
}

fn load_state(config: &PipelineConfig) -> Result<PipelineState> {
    let state = state::load(&config.paths.state)?.unwrap_or_default();
    tracing::info!(stage = ?state.stage, "Loaded pipeline state");
    Ok(state)
}

async fn fetch_stage<S>(source: &S, config: &PipelineConfig, state: &mut PipelineState) -> Result<()>
where
    S: PageSource + ?Sized,
{
    let paths = &config.paths;
    let accumulator_exists = paths.all_occupations.exists();

    match steps::decide_fetch(state, accumulator_exists, config.refetch) {
        FetchDecision::Fetch => {
            steps::fetch(source, config).await?;
            // Raw line count includes any verbatim error bodies; dedupe sets the real one
            state.all_occupation_rows = None;
            state::record(&paths.state, state, PipelineStage::Fetched)?;
        }
        FetchDecision::Skip { adopted } => {
            tracing::info!(
                path = %paths.all_occupations.display(),
                "All-occupations file exists; skipping download"
            );
            if adopted {
                tracing::warn!("No recorded download for the existing all-occupations file; adopting it");
                state::record(&paths.state, state, PipelineStage::Fetched)?;
            }
        }
    }
    Ok(())
}

fn dedupe_stage(config: &PipelineConfig, state: &mut PipelineState) -> Result<()> {
    let summary = steps::dedupe(&config.paths)?;
    state.all_occupation_rows = Some(summary.after);
    state::record(&config.paths.state, state, PipelineStage::Deduplicated)
}

fn skip_completed(config: &PipelineConfig, state: &PipelineState, stage: PipelineStage, output: &Path) -> bool {
    config.resume && state.reached(stage) && output.exists()
}
