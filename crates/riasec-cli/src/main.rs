use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use riasec_acquire::{BackoffPolicy, HttpSource, RatePolicy};
use riasec_model::{expected_count, interest_combinations, parse_interest_areas};
use riasec_pipeline::{PipelineConfig, PipelinePaths, Step};

mod logging;

#[derive(Parser)]
#[command(name = "riasec")]
#[command(about = "Harvest O*NET occupations by RIASEC interest and enrich a STEM list with job titles")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "debug", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Also append log lines to this file
    #[arg(long, global = true, default_value = "riasec.log")]
    log_file: PathBuf,

    /// Log to the console only
    #[arg(long, global = true)]
    no_log_file: bool,

    /// Directory holding every input and output CSV plus the state file
    #[arg(short = 'D', long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Options for the default `run` command
    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // HTML parsing and the HTTP stack are chatty below info
    fn filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn  => "warn",
            LogLevel::Info  => "info",
            LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info,reqwest=info,rustls=info",
            LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info,reqwest=info,rustls=info",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, deduplicate, scrape job titles and merge (the default)
    Run(PipelineArgs),

    /// Download every interests table into the all-occupations file
    Fetch(PipelineArgs),

    /// Drop repeated occupation codes from the all-occupations file
    Dedupe(PipelineArgs),

    /// Write the occupations at or above a job zone to their own file
    FilterZone(PipelineArgs),

    /// Scrape a sample job title for every STEM occupation
    Titles(PipelineArgs),

    /// Left-join the STEM titles table with the all-occupations file
    Merge(PipelineArgs),

    /// Print the interest-area combinations that would be queried
    Combinations(PipelineArgs),
}

#[derive(Args, Clone)]
struct PipelineArgs {
    /// Interest areas to combine, by name or letter (e.g. "R,I,A" or "Realistic,Social")
    #[arg(long, default_value = "R,I,A,S,E,C")]
    areas: String,

    /// Site root to query
    #[arg(long, default_value = riasec_acquire::urls::BASE_URL)]
    base_url: String,

    /// STEM occupation list (needs a Code column); defaults to <data-dir>/stem_occupations.csv
    #[arg(long)]
    stem_file: Option<PathBuf>,

    /// Also write the occupations with at least this job zone (1-5)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    min_zone: Option<u8>,

    /// Download the interests tables even if the all-occupations file exists
    #[arg(long)]
    refetch: bool,

    /// Skip steps already recorded as complete
    #[arg(long)]
    resume: bool,

    /// Abort the download when a table request returns a non-success status
    #[arg(long)]
    strict: bool,

    /// Pause before every N-th detail page request (0 disables)
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Length of the batch pause in seconds
    #[arg(long, default_value_t = 5.0)]
    batch_pause_secs: f64,

    /// Retries on 429/503 responses
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// First retry delay in milliseconds, doubled on each retry
    #[arg(long, default_value_t = 2000)]
    backoff_initial_ms: u64,

    /// Upper bound on a single retry delay in seconds
    #[arg(long, default_value_t = 60)]
    backoff_max_secs: u64,

    /// Per-request timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Keep every fetched detail page in this directory
    #[arg(long)]
    cache_html: Option<PathBuf>,
}

impl PipelineArgs {
    fn into_config(self, data_dir: &Path) -> Result<PipelineConfig> {
        let interest_areas = parse_interest_areas(&self.areas)?;
        anyhow::ensure!(!interest_areas.is_empty(), "No interest areas given");
        let batch_pause = Duration::try_from_secs_f64(self.batch_pause_secs).map_err(|_| {
            anyhow::anyhow!("Invalid batch pause: {} seconds", self.batch_pause_secs)
        })?;

        let mut paths = PipelinePaths::in_dir(data_dir);
        if let Some(stem) = self.stem_file {
            paths.stem_occupations = stem;
        }

        let rate = RatePolicy {
            batch_size: self.batch_size,
            batch_pause,
            backoff: BackoffPolicy {
                max_retries: self.max_retries,
                initial_delay: Duration::from_millis(self.backoff_initial_ms),
                max_delay: Duration::from_secs(self.backoff_max_secs),
            },
        };
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));

        Ok(PipelineConfig::default()
            .with_paths(paths)
            .with_interest_areas(interest_areas)
            .with_base_url(self.base_url)
            .with_rate(rate)
            .with_min_zone(self.min_zone)
            .with_refetch(self.refetch)
            .with_resume(self.resume)
            .with_strict(self.strict)
            .with_cache_dir(self.cache_html)
            .with_request_timeout(timeout))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&logging::LogSettings {
        filter: cli.log_level.filter().to_string(),
        utc: cli.utc,
        file: (!cli.no_log_file).then(|| cli.log_file.clone()),
    })?;

    let (step, args) = match cli.command {
        None => (None, cli.pipeline),
        Some(Commands::Run(args)) => (None, args),
        Some(Commands::Fetch(args)) => (Some(Step::Fetch), args),
        Some(Commands::Dedupe(args)) => (Some(Step::Dedupe), args),
        Some(Commands::FilterZone(args)) => (Some(Step::FilterZone), args),
        Some(Commands::Titles(args)) => (Some(Step::Titles), args),
        Some(Commands::Merge(args)) => (Some(Step::Merge), args),
        Some(Commands::Combinations(args)) => {
            let areas = parse_interest_areas(&args.areas)?;
            let combinations = interest_combinations(&areas);
            tracing::info!(
                areas = areas.len(),
                combinations = combinations.len(),
                expected = expected_count(areas.len()),
                "Number of combinations"
            );
            for combination in &combinations {
                println!("{}", combination.label());
            }
            return Ok(());
        }
    };

    let config = args.into_config(&cli.data_dir)?;
    tracing::info!(
        data_dir = %cli.data_dir.display(),
        base_url = %config.base_url,
        step = ?step,
        "Starting"
    );

    let source = HttpSource::new(config.request_timeout)?;
    let state = match step {
        None => riasec_pipeline::run(&source, &config).await?,
        Some(step) => riasec_pipeline::run_step(&source, &config, step).await?,
    };
    tracing::info!(stage = ?state.stage, updated_at = %state.updated_at, "Done");
    Ok(())
}
