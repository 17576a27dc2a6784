//! FinBoard CLI: render dashboard pages and export CSV downloads.
//!
//! Commands:
//! - `home`: overview of the available pages
//! - `stock`: price history for one equity, with a demo fallback when the
//!   live source is unavailable
//! - `tips`: restaurant-bill statistics from an uploaded CSV or demo data

mod json;
mod logging;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use finboard_core::data::{DataProvider, OfflineProvider, YahooProvider};
use finboard_core::domain::{Locale, Page, Period, SessionContext};
use finboard_core::{CycleOutcome, Dashboard, DashboardConfig, PresentationAdapter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::json::JsonPresenter;
use crate::render::TextPresenter;

#[derive(Parser)]
#[command(
    name = "finboard",
    version,
    about = "FinBoard CLI: equity prices and tips statistics with a synthetic fallback"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language for labels and notices (ru or en). Overrides the config.
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Offline mode: never contact the live provider.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the overview page.
    Home,
    /// Analyze an equity's price history.
    Stock {
        /// Equity identifier. Defaults to the configured ticker.
        #[arg(long)]
        ticker: Option<String>,

        /// History window: 1mo, 3mo, 6mo, 1y or 2y.
        #[arg(long, default_value = "1y")]
        period: Period,

        /// Write the CSV download to this file (or into this directory).
        #[arg(long)]
        export: Option<PathBuf>,

        /// Hide the volume chart.
        #[arg(long, default_value_t = false)]
        no_volume: bool,
    },
    /// Analyze restaurant bills and tips.
    Tips {
        /// CSV file with total_bill, tip, size, day and time columns.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Write the CSV download to this file (or into this directory).
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("finboard: logging disabled: {e}");
    }

    let config = load_config(cli.config.as_deref(), cli.locale)?;
    let provider = build_provider(&config, cli.offline)?;
    let locale = config.locale;
    let dashboard = Dashboard::new(config, provider);

    let mut session = SessionContext::new(dashboard.config().ticker.clone());
    let (export, show_volume) = match cli.command {
        Commands::Home => (None, true),
        Commands::Stock {
            ticker,
            period,
            export,
            no_volume,
        } => {
            if let Some(ticker) = ticker {
                session.ticker = ticker;
            }
            session = session.with_page(Page::Equity).with_period(period);
            (export, !no_volume)
        }
        Commands::Tips { file, export } => {
            session = session.with_page(Page::Tips);
            if let Some(path) = file {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read upload {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                session = session.with_upload(name, bytes);
            }
            (export, true)
        }
    };

    let today = chrono::Local::now().date_naive();
    debug!(page = ?session.page, ticker = %session.ticker, %today, "starting cycle");

    let stdout = std::io::stdout().lock();
    let outcome = match cli.format {
        Format::Text => {
            let mut presenter = TextPresenter::new(stdout, locale)
                .with_export(export)
                .with_volume(show_volume);
            run_cycle(&dashboard, &session, today, &mut presenter)
        }
        Format::Json => {
            let mut presenter = JsonPresenter::new(stdout, locale).with_export(export);
            run_cycle(&dashboard, &session, today, &mut presenter)
        }
    };

    if let CycleOutcome::Failed { .. } = outcome {
        std::process::exit(1);
    }
    Ok(())
}

fn run_cycle(
    dashboard: &Dashboard,
    session: &SessionContext,
    today: chrono::NaiveDate,
    presenter: &mut dyn PresentationAdapter,
) -> CycleOutcome {
    let outcome = dashboard.handle(session, today, presenter);
    info!(?outcome, "cycle finished");
    outcome
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(path: Option<&Path>, locale: Option<Locale>) -> Result<DashboardConfig> {
    let mut config = match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(locale) = locale {
        config.locale = locale;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_provider(config: &DashboardConfig, offline: bool) -> Result<Box<dyn DataProvider>> {
    if offline {
        info!("offline mode, live provider disabled");
        return Ok(Box::new(OfflineProvider));
    }
    let provider =
        YahooProvider::new(&config.provider).context("failed to set up the live data provider")?;
    Ok(Box::new(provider))
}
