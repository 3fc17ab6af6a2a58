use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc, FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

// 18-Oct-26 14:03:07
const TIME_FORMAT: &str = "%d-%b-%y %H:%M:%S";

/// How the process-wide log sink is built.
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    pub utc: bool,
    /// Append-mode log file next to the console output; `None` for console only.
    pub file: Option<PathBuf>,
}

/// Install the console + file subscriber. Call once, before any step runs.
pub fn init(settings: &LogSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let file = match &settings.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(file)
        }
        None => None,
    };

    let format = TIME_FORMAT.to_string();
    if settings.utc {
        install(env_filter, ChronoUtc::new(format.clone()), ChronoUtc::new(format), file)
    } else {
        install(env_filter, ChronoLocal::new(format.clone()), ChronoLocal::new(format), file)
    }
}

fn install<T>(env_filter: EnvFilter, console_timer: T, file_timer: T, file: Option<std::fs::File>) -> Result<()>
where
    T: FormatTime + Send + Sync + 'static,
{
    let console = fmt::layer()
        .with_target(false)
        .with_timer(console_timer)
        .with_writer(std::io::stderr);

    let file_layer = file.map(|f| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_timer(file_timer)
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Logging was already initialized")?;
    Ok(())
}
