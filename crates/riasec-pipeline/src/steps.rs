// The individual pipeline steps. Each reads its inputs from disk and writes
// its output file; `crate::run` strings them together and records progress.

use anyhow::{Context, Result};
use riasec_acquire::{FetchOptions, FetchSummary, PageSource, TitleReport};
use riasec_model::dedupe::{dedupe_occupations, filter_by_zone};
use riasec_model::merge::{left_join, MergeStats};
use riasec_model::{
    interest_combinations, PipelineStage, PipelineState, Table, CODE_COLUMN, JOB_TITLES_COLUMN,
    OCCUPATION_COLUMN,
};

use crate::config::{PipelineConfig, PipelinePaths};
use crate::tables;

/// What to do about the bulk download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Fetch,
    /// The accumulator is complete. `adopted` is set when it predates any
    /// recorded state and is being taken over as-is.
    Skip { adopted: bool },
}

/// Decide whether the bulk download has to run.
///
/// A complete accumulator only ever exists at its final path (it is built
/// under a `.partial` name), so its presence means the download finished.
pub fn decide_fetch(state: &PipelineState, accumulator_exists: bool, refetch: bool) -> FetchDecision {
    if refetch || !accumulator_exists {
        return FetchDecision::Fetch;
    }
    FetchDecision::Skip {
        adopted: !state.reached(PipelineStage::Fetched),
    }
}

/// Download every interests table into the accumulator.
pub async fn fetch<S>(source: &S, config: &PipelineConfig) -> Result<FetchSummary>
where
    S: PageSource + ?Sized,
{
    let combinations = interest_combinations(&config.interest_areas);
    let options = FetchOptions {
        strict: config.strict,
        backoff: config.rate.backoff.clone(),
    };
    riasec_acquire::fetch_all_occupations(
        source,
        &config.base_url,
        &combinations,
        &config.paths.all_occupations,
        &options,
    )
    .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeSummary {
    pub before: usize,
    pub after: usize,
}

/// Keep the first row per occupation code and rewrite the accumulator in place.
pub fn dedupe(paths: &PipelinePaths) -> Result<DedupeSummary> {
    let rows = tables::read_occupations(&paths.all_occupations)?;
    tracing::info!(rows = rows.len(), "Number of rows before removing duplicates");

    let result = dedupe_occupations(rows);
    tables::write_occupations(&paths.all_occupations, &result.rows)?;

    let summary = DedupeSummary {
        before: result.before,
        after: result.rows.len(),
    };
    tracing::info!(
        rows = summary.after,
        removed = result.removed,
        path = %paths.all_occupations.display(),
        "Number of rows after removing duplicates"
    );
    Ok(summary)
}

/// Write the occupations with job zone `>= min_zone` to the filtered file.
pub fn filter_zone(paths: &PipelinePaths, min_zone: u8) -> Result<usize> {
    let rows = tables::read_occupations(&paths.all_occupations)?;
    tracing::info!(rows = rows.len(), min_zone, "Number of rows before filtering");

    let filtered = filter_by_zone(&rows, min_zone);
    tables::write_occupations(&paths.filtered_by_zone, &filtered)?;

    tracing::info!(
        rows = filtered.len(),
        path = %paths.filtered_by_zone.display(),
        "Number of rows after filtering"
    );
    Ok(filtered.len())
}

/// Scrape a job title for every STEM code and write the enriched table.
pub async fn titles<S>(source: &S, config: &PipelineConfig) -> Result<TitleReport>
where
    S: PageSource + ?Sized,
{
    let paths = &config.paths;
    let mut stem = tables::read_table(&paths.stem_occupations)?;
    let codes: Vec<String> = stem
        .column(CODE_COLUMN)
        .with_context(|| format!("STEM occupation file {}", paths.stem_occupations.display()))?
        .into_iter()
        .map(str::to_string)
        .collect();
    tracing::info!(codes = codes.len(), "Number of STEM occupation codes");

    let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    let report = riasec_acquire::scrape_job_titles(
        source,
        &config.base_url,
        &code_refs,
        &config.rate,
        config.cache_dir.as_deref(),
    )
    .await?;

    stem.set_column(JOB_TITLES_COLUMN, report.cells())?;
    log_column_counts(&stem);
    tables::write_table(&paths.stem_job_titles, &stem)?;

    tracing::info!(
        rows = stem.len(),
        found = report.found(),
        missing = ?report.missing_by_kind(),
        path = %paths.stem_job_titles.display(),
        "Wrote STEM occupations with job titles"
    );
    Ok(report)
}

/// Left-join the STEM+titles table onto the deduplicated occupations.
pub fn merge(paths: &PipelinePaths) -> Result<MergeStats> {
    let stem = tables::read_table(&paths.stem_job_titles)?;
    let all = tables::read_table(&paths.all_occupations)?;

    let result = left_join(&stem, &all, CODE_COLUMN)?;
    for w in &result.warnings {
        tracing::warn!("{w}");
    }
    if result.stats.dropped_columns.iter().any(|c| c == OCCUPATION_COLUMN) {
        tracing::debug!("Occupation names taken from the STEM list");
    }
    log_column_counts(&result.table);
    tables::write_table(&paths.merged, &result.table)?;

    tracing::info!(
        rows = result.table.len(),
        matched = result.stats.matched,
        unmatched = result.stats.unmatched,
        dropped = ?result.stats.dropped_columns,
        path = %paths.merged.display(),
        "Wrote merged occupations"
    );
    Ok(result.stats)
}

fn log_column_counts(table: &Table) {
    for (column, count) in table.non_empty_counts() {
        tracing::debug!(column, count, "Non-empty values");
    }
}
