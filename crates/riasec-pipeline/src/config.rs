use std::path::{Path, PathBuf};
use std::time::Duration;

use riasec_acquire::urls::BASE_URL;
use riasec_acquire::{BackoffPolicy, RatePolicy};
use riasec_model::InterestArea;

/// Locations of every file the pipeline reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Accumulated interests-table rows, deduplicated in place.
    pub all_occupations: PathBuf,
    /// Externally supplied STEM occupation list (input, at least a `Code` column).
    pub stem_occupations: PathBuf,
    pub stem_job_titles: PathBuf,
    pub merged: PathBuf,
    pub filtered_by_zone: PathBuf,
    /// Persisted [`riasec_model::PipelineState`].
    pub state: PathBuf,
}

impl PipelinePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            all_occupations: dir.join("all_occupations.csv"),
            stem_occupations: dir.join("stem_occupations.csv"),
            stem_job_titles: dir.join("stem_occupations_job_titles.csv"),
            merged: dir.join("merged_occupations.csv"),
            filtered_by_zone: dir.join("filtered_occupations_by_zone.csv"),
            state: dir.join("pipeline.state.json"),
        }
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Areas to combine, in query order.
    pub interest_areas: Vec<InterestArea>,
    pub base_url: String,
    pub paths: PipelinePaths,
    pub rate: RatePolicy,
    /// Also write the job-zone filtered table when set.
    pub min_zone: Option<u8>,
    /// Download the interests tables even if the accumulator exists.
    pub refetch: bool,
    /// Skip steps already recorded as complete whose output exists.
    pub resume: bool,
    /// Abort the bulk download on a non-success status.
    pub strict: bool,
    /// Keep raw detail pages here when set.
    pub cache_dir: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interest_areas: InterestArea::ALL.to_vec(),
            base_url: BASE_URL.to_string(),
            paths: PipelinePaths::default(),
            rate: RatePolicy::default(),
            min_zone: None,
            refetch: false,
            resume: false,
            strict: false,
            cache_dir: None,
            request_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl PipelineConfig {
    pub fn with_paths(mut self, paths: PipelinePaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_interest_areas(mut self, areas: Vec<InterestArea>) -> Self {
        self.interest_areas = areas;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_rate(mut self, rate: RatePolicy) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.rate.backoff = backoff;
        self
    }

    pub fn with_min_zone(mut self, min_zone: Option<u8>) -> Self {
        self.min_zone = min_zone;
        self
    }

    pub fn with_refetch(mut self, refetch: bool) -> Self {
        self.refetch = refetch;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.cache_dir = dir;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}
