use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt};

/// Logging for one run. Dropping it uninstalls the subscriber.
pub struct RunLog {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl RunLog {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Send events to stderr and to a fresh `etl_<timestamp>.log` under `log_dir`.
pub fn init(log_dir: &Path, verbose: bool) -> Result<RunLog> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let path = log_dir.join(log_file_name(Local::now()));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env()?,
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        );

    let guard = tracing::subscriber::set_default(subscriber);
    Ok(RunLog {
        path,
        _guard: guard,
    })
}

pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("etl_{}.log", now.format("%Y%m%d_%H%M%S"))
}
