use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use riasec_model::{TitleMissing, TitleOutcome};
use scraper::{Html, Selector};

use crate::normalize;
use crate::output;
use crate::rate_limit::{get_with_backoff, RatePolicy};
use crate::source::PageSource;
use crate::urls;

/// The "Sample of reported job titles" paragraph on a detail page.
const JOB_TITLE_SELECTOR: &str = "#content > p:nth-child(5)";

/// Per-code outcomes of a title scrape, in input order.
#[derive(Debug, Clone, Default)]
pub struct TitleReport {
    pub outcomes: Vec<TitleOutcome>,
}

impl TitleReport {
    /// Column values for the `Job Titles` column.
    pub fn cells(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.cell().to_string()).collect()
    }

    pub fn found(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_found()).count()
    }

    /// Failure counts keyed by reason kind.
    pub fn missing_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            if let TitleOutcome::Missing(reason) = outcome {
                *counts.entry(reason.kind()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Extract the job-title line from an occupation detail page.
///
/// Takes the fifth child of `#content` (which must be a `<p>`), trims its
/// text and keeps the last line.
pub fn extract_job_title(html: &str) -> Result<String, TitleMissing> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(JOB_TITLE_SELECTOR).expect("valid selector");

    let element = document
        .select(&selector)
        .next()
        .ok_or(TitleMissing::ElementNotFound)?;

    let text: String = element.text().collect();
    let title = normalize::normalize_text(normalize::last_line(&text));
    if title.is_empty() {
        return Err(TitleMissing::EmptyText);
    }
    Ok(title)
}

/// Scrape job titles for each occupation code, one request at a time.
///
/// Never fails on a single page: request errors, error statuses and pages
/// without the title element become `TitleOutcome::Missing`, and the loop
/// moves on.
pub async fn scrape_job_titles<S>(
    source: &S,
    base_url: &str,
    codes: &[&str],
    policy: &RatePolicy,
    cache_dir: Option<&Path>,
) -> Result<TitleReport>
where
    S: PageSource + ?Sized,
{
    tracing::info!(codes = codes.len(), "Scraping job titles");
    let mut outcomes = Vec::with_capacity(codes.len());

    for (i, code) in codes.iter().enumerate() {
        if let Some(pause) = policy.pause_before(i) {
            tracing::debug!(index = i, pause_ms = pause.as_millis() as u64, "Pausing between batches");
            tokio::time::sleep(pause).await;
        }

        let url = urls::occupation_details_url(base_url, code)?;
        let outcome: TitleOutcome = scrape_one(source, &url, code, policy, cache_dir).await.into();

        match &outcome {
            TitleOutcome::Found(title) => {
                tracing::info!(code = %code, job_title = %title, "Job title")
            }
            TitleOutcome::Missing(reason) => {
                tracing::warn!(code = %code, url = %url, reason = %reason, "No job title")
            }
        }
        outcomes.push(outcome);
    }

    Ok(TitleReport { outcomes })
}

async fn scrape_one<S>(
    source: &S,
    url: &str,
    code: &str,
    policy: &RatePolicy,
    cache_dir: Option<&Path>,
) -> Result<String, TitleMissing>
where
    S: PageSource + ?Sized,
{
    let page = get_with_backoff(source, url, &policy.backoff)
        .await
        .map_err(|e| TitleMissing::Request(format!("{e:#}")))?;

    if let Some(dir) = cache_dir {
        if let Err(e) = output::cache_page(dir, code, &page.body) {
            tracing::warn!(code = %code, error = %e, "Could not cache page");
        }
    }

    if !page.is_success() {
        return Err(TitleMissing::HttpStatus(page.status));
    }
    extract_job_title(&page.body)
}
