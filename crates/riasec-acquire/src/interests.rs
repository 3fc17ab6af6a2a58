use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use riasec_model::{Combination, OCCUPATION_COLUMNS};

use crate::rate_limit::{get_with_backoff, BackoffPolicy};
use crate::source::PageSource;
use crate::urls;

/// Options for the bulk interests-table download.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Abort on a non-success status instead of appending the body as-is.
    pub strict: bool,
    pub backoff: BackoffPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub requests: usize,
    pub non_success: usize,
    pub data_lines: usize,
}

/// Sibling file the accumulator is built in before being moved into place.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

/// Body of a remote CSV without its first (header) line.
///
/// A non-empty result always ends with a newline so consecutive fragments
/// cannot run together.
pub fn strip_remote_header(body: &str) -> String {
    let mut fragment = match body.split_once('\n') {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    };
    if !fragment.is_empty() && !fragment.ends_with('\n') {
        fragment.push('\n');
    }
    fragment
}

/// Download the interests table for every combination into one CSV at `dest`.
///
/// The file starts with the synthetic header row, followed by each remote
/// table's data lines in combination order. Everything is written to
/// [`partial_path`] first and renamed over `dest` only after the last
/// combination succeeded, so an interrupted run leaves no `dest` behind.
pub async fn fetch_all_occupations<S>(
    source: &S,
    base_url: &str,
    combinations: &[Combination],
    dest: &Path,
    options: &FetchOptions,
) -> Result<FetchSummary>
where
    S: PageSource + ?Sized,
{
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let partial = partial_path(dest);
    let file = File::create(&partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", OCCUPATION_COLUMNS.join(","))?;

    let mut summary = FetchSummary::default();
    for (i, combination) in combinations.iter().enumerate() {
        let url = urls::interests_table_url(base_url, combination)?;
        tracing::info!(index = i, combination = %combination.label(), url = %url, "Fetching interests table");

        let page = get_with_backoff(source, &url, &options.backoff).await?;
        summary.requests += 1;

        if !page.is_success() {
            summary.non_success += 1;
            anyhow::ensure!(!options.strict, "HTTP {} for {url}", page.status);
            tracing::warn!(status = page.status, url = %url, "Non-success response; appending body as-is");
        }

        let fragment = strip_remote_header(&page.body);
        let lines = fragment.lines().filter(|l| !l.trim().is_empty()).count();
        summary.data_lines += lines;
        tracing::debug!(combination = %combination.label(), lines, "Appending rows");

        writer.write_all(fragment.as_bytes())?;
    }

    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|f| f.sync_all().map(|_| f))
        .with_context(|| format!("Failed to flush {}", partial.display()))?;
    fs::rename(&partial, dest).with_context(|| {
        format!("Failed to move {} to {}", partial.display(), dest.display())
    })?;

    tracing::info!(
        requests = summary.requests,
        non_success = summary.non_success,
        lines = summary.data_lines,
        path = %dest.display(),
        "Wrote all-occupations file"
    );
    Ok(summary)
}
