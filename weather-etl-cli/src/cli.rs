use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use weather_etl_core::{
    Config, EtlError, OutputConfig, Pipeline, WeatherstackClient, config::parse_locations,
    persist,
};

use crate::{logger, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-etl",
    version,
    about = "Fetch current weather for a list of locations and save it as CSV and JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the extraction once for every configured location.
    Run(RunArgs),

    /// Store the Weatherstack API key and default locations in the config file.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Comma-separated locations, e.g. "Bogota,Lima". Overrides config and environment.
    #[arg(long)]
    pub locations: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// CSV output path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// JSON output path.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Directory for per-run log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Don't print the summary table.
    #[arg(long)]
    pub no_table: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Flags are the last configuration layer.
    pub fn apply(&self, config: &mut Config) {
        if let Some(list) = &self.locations {
            config.locations = parse_locations(list);
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        if let Some(path) = &self.csv {
            config.output.csv_path = path.clone();
        }
        if let Some(path) = &self.json {
            config.output.json_path = path.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.output.log_dir = dir.clone();
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Run(args) => run_etl(args).await,
            Command::Configure => configure().map(|()| ExitCode::SUCCESS),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn run_etl(args: RunArgs) -> anyhow::Result<ExitCode> {
    let loaded = Config::load().and_then(|mut config| {
        config.apply_process_env()?;
        Ok(config)
    });

    let succeeded = run_logged(&args, loaded).await?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Open the run log first so configuration errors land in it too.
/// Run errors are logged here and reported as `Ok(false)`.
async fn run_logged(args: &RunArgs, loaded: anyhow::Result<Config>) -> anyhow::Result<bool> {
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.output.log_dir.clone()))
        .unwrap_or_else(|| OutputConfig::default().log_dir);

    let log = logger::init(&log_dir, args.verbose)?;
    info!("{}", "=".repeat(70));
    info!("STARTING WEATHERSTACK ETL PIPELINE");
    info!("{}", "=".repeat(70));
    info!("Log file: {}", log.path().display());

    let result = match loaded {
        Ok(mut config) => {
            args.apply(&mut config);
            execute(&config, !args.no_table).await
        }
        Err(e) => Err(e.context("Configuration error")),
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) => {
            error!("{e:#}");
            Ok(false)
        }
    }
}

async fn execute(config: &Config, show_table: bool) -> anyhow::Result<()> {
    config
        .ensure_runnable()
        .map_err(EtlError::from)
        .context("Configuration error")?;

    info!("Configuration loaded:");
    info!("   - Base URL: {}", config.base_url);
    info!("   - Locations: {}", config.locations.join(", "));
    info!("   - Timeout: {}s", config.timeout_secs);

    let client = WeatherstackClient::from_config(config).context("Configuration error")?;
    let summary = Pipeline::new(&client).run(&config.locations).await;

    if let Err(e) = summary.ensure_records() {
        error!("No data obtained. Check:");
        error!("   1. Your API key is correct");
        error!("   2. You have an internet connection");
        error!("   3. Your plan allows more requests");
        return Err(e.into());
    }

    let report = persist(&summary.records, &config.output);
    if !report.is_complete() {
        warn!("{} of 2 output files could not be written", report.errors().count());
    }

    if show_table {
        print!("{}", output::render_table(&summary.records));
    }

    info!("ETL PIPELINE COMPLETED");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Weatherstack API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let current_locations = config.locations.join(",");
    let locations = Text::new("Locations (comma-separated):")
        .with_default(&current_locations)
        .prompt()
        .context("Failed to read locations")?;

    let base_url = Text::new("Base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.api_key = Some(api_key.trim().to_string());
    config.locations = parse_locations(&locations);
    config.base_url = base_url.trim().to_string();
    config.ensure_runnable()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "weather-etl",
            "run",
            "--locations",
            "Lima, Quito",
            "--timeout",
            "4",
            "--no-table",
        ]);

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.locations.as_deref(), Some("Lima, Quito"));
        assert_eq!(args.timeout, Some(4));
        assert!(args.no_table);
        assert!(!args.verbose);
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let args = RunArgs {
            locations: Some("Lima, ,Quito".into()),
            timeout: Some(3),
            csv: Some("out/a.csv".into()),
            ..RunArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.locations, vec!["Lima", "Quito"]);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.output.csv_path, PathBuf::from("out/a.csv"));
        assert_eq!(config.output.json_path, PathBuf::from("data/weather.json"));
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let mut config = Config::default();
        RunArgs::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    fn only_log_file(dir: &std::path::Path) -> String {
        let entries: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1, "expected one log file, got {entries:?}");
        std::fs::read_to_string(&entries[0]).unwrap()
    }

    #[tokio::test]
    async fn unreadable_config_is_logged_to_the_run_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let args = RunArgs {
            log_dir: Some(log_dir.clone()),
            no_table: true,
            ..RunArgs::default()
        };

        let loaded = Err(anyhow::anyhow!("Failed to parse config file: config.toml"));
        let succeeded = run_logged(&args, loaded).await.unwrap();

        assert!(!succeeded);
        let log = only_log_file(&log_dir);
        assert!(log.contains("Configuration error"));
        assert!(log.contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn missing_api_key_is_logged_once_and_reported_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let args = RunArgs {
            log_dir: Some(log_dir.clone()),
            no_table: true,
            ..RunArgs::default()
        };

        let succeeded = run_logged(&args, Ok(Config::default())).await.unwrap();

        assert!(!succeeded);
        let log = only_log_file(&log_dir);
        assert_eq!(log.matches("No API key configured").count(), 1);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.csv_path = dir.path().join("weather.csv");
        config.output.json_path = dir.path().join("weather.json");

        let err = execute(&config, false).await.unwrap_err();
        assert!(format!("{err:#}").contains("No API key configured"));
        assert!(!config.output.csv_path.exists());
    }

    #[tokio::test]
    async fn unreachable_provider_is_overall_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            api_key: Some("KEY".into()),
            base_url: "http://127.0.0.1:9".into(),
            locations: vec!["Bogota".into(), "Cali".into()],
            timeout_secs: 2,
            ..Config::default()
        };
        config.output.csv_path = dir.path().join("weather.csv");
        config.output.json_path = dir.path().join("weather.json");

        let err = execute(&config, false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::NoRecords { failed: 2, total: 2 })
        ));
        assert!(!config.output.csv_path.exists());
        assert!(!config.output.json_path.exists());
    }
}
