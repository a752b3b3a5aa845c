//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use plotsift_core::{DriverState, ProgressReporter, ScanOutcome, Scanner};
use plotsift_omdb::{OmdbClient, OmdbOptions};
use plotsift_shared::{
    AppConfig, Criteria, PlotsiftError, init_config, init_config_at, load_config,
    load_config_from, resolve_api_key,
};
use tokio::io::BufReader;
use tracing::info;

use crate::presenter;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// plotsift — filter IMDb titles and list their plots.
#[derive(Parser)]
#[command(
    name = "plotsift",
    version,
    about = "Filter the IMDb title.basics.tsv dump and list matching plots from OMDb.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.plotsift/plotsift.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scan a title.basics.tsv file and print matching titles with plots.
    Scan(ScanArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Filters for `scan`. The camelCase aliases keep old invocations working.
#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Path to the inflated title.basics.tsv file.
    #[arg(short, long, alias = "filePath")]
    pub file: PathBuf,

    /// Exact match on the titleType column (e.g. movie, short).
    #[arg(long, alias = "titleType")]
    pub title_type: Option<String>,

    /// Substring of the primaryTitle column.
    #[arg(long, alias = "primaryTitle")]
    pub primary_title: Option<String>,

    /// Substring of the originalTitle column.
    #[arg(long, alias = "originalTitle")]
    pub original_title: Option<String>,

    /// Substring of the genres column.
    #[arg(long)]
    pub genre: Option<String>,

    /// Exact match on startYear.
    #[arg(long, alias = "startYear", allow_negative_numbers = true)]
    pub start_year: Option<i32>,

    /// Exact match on endYear (`\N` counts as 0).
    #[arg(long, alias = "endYear", allow_negative_numbers = true)]
    pub end_year: Option<i32>,

    /// Exact match on runtimeMinutes.
    #[arg(long, alias = "runtimeMinutes", allow_negative_numbers = true)]
    pub runtime_minutes: Option<i32>,

    /// Regular expression the fetched plot must match.
    #[arg(long, alias = "plotFilter")]
    pub plot_filter: Option<String>,

    /// Maximum number of data lines to process (0 = no limit).
    #[arg(long, alias = "maxLines")]
    pub max_lines: Option<usize>,
}

impl ScanArgs {
    /// Build the scan criteria, treating legacy sentinels as unset.
    fn criteria(&self) -> Criteria {
        Criteria {
            title_type: self.title_type.clone(),
            primary_title: self.primary_title.clone(),
            original_title: self.original_title.clone(),
            genre: self.genre.clone(),
            start_year: self.start_year,
            end_year: self.end_year,
            runtime_minutes: self.runtime_minutes,
            plot_filter: self.plot_filter.clone(),
            max_lines: self.max_lines,
        }
        .normalized()
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "plotsift=info",
        1 => "plotsift=debug",
        _ => "plotsift=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Scan(args) => cmd_scan(&args, config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn cmd_scan(args: &ScanArgs, config_path: Option<&Path>) -> Result<()> {
    // Validate API key before touching the input
    let config = resolve_config(config_path)?;
    let api_key = resolve_api_key(&config)?;
    let client = OmdbClient::new(&OmdbOptions::from_config(&config.omdb, api_key))?;

    let criteria = args.criteria();
    info!(file = %args.file.display(), ?criteria, "scanning titles");

    let file = tokio::fs::File::open(&args.file)
        .await
        .map_err(|e| PlotsiftError::io(&args.file, e))?;

    let scanner = Scanner::new(criteria, Arc::new(client));
    let reporter = CliProgress::new();
    let outcome = scanner.run(BufReader::new(file), &reporter).await?;

    let listing = presenter::render(&outcome.records, &config.output);
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(listing.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| eyre!("failed to write listing: {e}"))?;

    if outcome.failed > 0 {
        info!(failed = outcome.failed, "some lines could not be processed");
    }

    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let written = match path {
        Some(path) => init_config_at(path)?,
        None => init_config()?,
    };
    println!("Config written to {}", written.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let rendered = toml::to_string_pretty(&config)?;
    print!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
    dispatched: AtomicUsize,
    matched: AtomicUsize,
}

impl CliProgress {
    /// Redraw the counters at most once per this many dispatched lines.
    const REFRESH_EVERY: usize = 1000;

    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            dispatched: AtomicUsize::new(0),
            matched: AtomicUsize::new(0),
        }
    }

    fn refresh(&self, phase: &str) {
        self.spinner.set_message(format!(
            "{phase} [{} lines, {} matched]",
            self.dispatched.load(Ordering::Relaxed),
            self.matched.load(Ordering::Relaxed),
        ));
    }
}

impl ProgressReporter for CliProgress {
    fn state(&self, state: DriverState) {
        match state {
            DriverState::NotStarted => self.spinner.set_message("Starting"),
            DriverState::Running => self.refresh("Scanning"),
            DriverState::Draining => self.refresh("Waiting for lookups"),
            DriverState::Done => self.refresh("Done"),
        }
    }

    fn line_dispatched(&self, dispatched: usize) {
        self.dispatched.store(dispatched, Ordering::Relaxed);
        if dispatched % Self::REFRESH_EVERY == 0 {
            self.refresh("Scanning");
        }
    }

    fn record_matched(&self, matched: usize) {
        self.matched.store(matched, Ordering::Relaxed);
        self.refresh("Matching");
    }

    fn done(&self, _outcome: &ScanOutcome) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn legacy_flag_names_are_accepted() {
        let cli = Cli::try_parse_from([
            "plotsift",
            "scan",
            "--filePath",
            "title.basics.tsv",
            "--titleType",
            "notset",
            "--primaryTitle",
            "Carmencita",
            "--startYear",
            "-1",
            "--maxLines",
            "0",
        ])
        .expect("parse legacy flags");

        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let criteria = args.criteria();
        assert_eq!(args.file, PathBuf::from("title.basics.tsv"));
        assert_eq!(criteria.title_type, None);
        assert_eq!(criteria.primary_title.as_deref(), Some("Carmencita"));
        assert_eq!(criteria.start_year, None);
        assert_eq!(criteria.max_lines, None);
    }

    #[test]
    fn scan_flags_build_criteria() {
        let cli = Cli::try_parse_from([
            "plotsift",
            "-v",
            "scan",
            "-f",
            "basics.tsv",
            "--title-type",
            "movie",
            "--genre",
            "Drama",
            "--runtime-minutes",
            "90",
            "--plot-filter",
            "(?i)murder",
            "--max-lines",
            "500",
        ])
        .expect("parse flags");

        assert_eq!(cli.verbose, 1);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.title_type.as_deref(), Some("movie"));
        assert_eq!(criteria.genre.as_deref(), Some("Drama"));
        assert_eq!(criteria.runtime_minutes, Some(90));
        assert_eq!(criteria.plot_filter.as_deref(), Some("(?i)murder"));
        assert_eq!(criteria.max_lines, Some(500));
        assert_eq!(criteria.start_year, None);
    }

    #[test]
    fn scan_requires_a_file() {
        assert!(Cli::try_parse_from(["plotsift", "scan"]).is_err());
    }
}
