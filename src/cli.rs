//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::asset::Asset;
use crate::domain::config_validation::Settings;
use crate::domain::dashboard::{build_dashboard, load_normalized, DashboardRequest};
use crate::domain::error::DashboardError;
use crate::domain::metrics::{
    format_currency, format_optional_currency, format_percent, format_ratio,
};
use crate::domain::transition::TransitionKind;
use crate::ports::report_port::ReportPort;
use crate::ports::series_port::SeriesPort;

#[derive(Parser, Debug)]
#[command(
    name = "stratdash",
    about = "Dashboard for BTC/ETH trading strategy outputs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the dashboard to a standalone HTML file
    Render {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
        /// Asset to display (BTC or ETH); defaults to the configured asset
        #[arg(long)]
        asset: Option<String>,
        /// Hide the drawdown overlay on the price chart
        #[arg(long)]
        no_drawdown: bool,
    },
    /// Print the performance metrics and transition counts for an asset
    Summary {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        asset: Option<String>,
    },
    /// Show row counts and date ranges of the strategy outputs
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a dashboard configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Render {
            config,
            output,
            asset,
            no_drawdown,
        } => run_render(&config, &output, asset.as_deref(), no_drawdown),
        Command::Summary { config, asset } => run_summary(&config, asset.as_deref()),
        Command::Info { config } => run_info(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Serve { config } => run_serve(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Load and validate the config file, reporting failures on stderr.
pub fn load_settings(path: &Path) -> Result<Settings, ExitCode> {
    let config = load_config(path)?;
    Settings::from_config(&config).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Resolve the control-panel state from CLI flags and configured defaults.
pub fn build_request(
    settings: &Settings,
    asset: Option<&str>,
    no_drawdown: bool,
) -> Result<DashboardRequest, DashboardError> {
    let asset = match asset {
        Some(code) => code.parse()?,
        None => settings.default_asset,
    };
    Ok(DashboardRequest {
        asset,
        show_drawdown: settings.show_drawdown && !no_drawdown,
    })
}

fn run_render(
    config_path: &Path,
    output_path: &Path,
    asset: Option<&str>,
    no_drawdown: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let request = match build_request(&settings, asset, no_drawdown) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Load, normalize, and derive
    let port = CsvAdapter::from_settings(&settings);
    for a in Asset::ALL {
        eprintln!("Reading {a} from {}", port.describe(a));
    }
    let dashboard = match build_dashboard(&port, request, settings.initial_capital) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "{}: {} points, {} transitions",
        dashboard.view.asset,
        dashboard.view.series.len(),
        dashboard.view.counts.total()
    );
    for line in &dashboard.comparison {
        if let Err(reason) = &line.outcome {
            eprintln!("warning: {} omitted from comparison: {reason}", line.asset);
        }
    }

    // Stage 3: Write report
    let output = output_path.display().to_string();
    eprintln!("Writing dashboard to {output}");
    if let Err(e) = HtmlReportAdapter::new().write(&dashboard, &output) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Done.");
    ExitCode::SUCCESS
}

fn run_summary(config_path: &Path, asset: Option<&str>) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let request = match build_request(&settings, asset, false) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let port = CsvAdapter::from_settings(&settings);
    let dashboard = match build_dashboard(&port, request, settings.initial_capital) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let view = &dashboard.view;
    println!("{} Strategy Performance", view.asset);
    if let Some((start, end)) = view.series.range() {
        println!("  Period:        {start} to {end} ({} points)", view.series.len());
    }
    println!("  Final Value:   {}", format_currency(view.summary.final_value));
    println!(
        "  Buy & Hold:    {}",
        format_optional_currency(view.summary.buy_hold_value)
    );
    println!("  Sharpe:        {}", format_ratio(view.summary.sharpe_ratio));
    println!("  Max Drawdown:  {}", format_percent(view.summary.max_drawdown));
    println!();
    println!("Transitions:");
    for kind in TransitionKind::ALL {
        println!("  {:<12} {}", kind.label(), view.counts.get(kind));
    }

    ExitCode::SUCCESS
}

fn run_info(config_path: &Path) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let port = CsvAdapter::from_settings(&settings);
    let mut first_error: Option<DashboardError> = None;

    for asset in Asset::ALL {
        match load_normalized(&port, asset) {
            Ok((series, stats)) => match series.range() {
                Some((start, end)) => println!(
                    "{asset}: {} rows, {start} to {end} ({} duplicates dropped, {} read)",
                    series.len(),
                    stats.duplicates_dropped,
                    stats.input_records
                ),
                None => println!("{asset}: no rows"),
            },
            Err(e) => {
                eprintln!("error: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => (&e).into(),
        None => ExitCode::SUCCESS,
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let port = CsvAdapter::from_settings(&settings);
    eprintln!("\nData:");
    for asset in Asset::ALL {
        eprintln!("  {asset}: {}", port.describe(asset));
    }
    eprintln!("\nDashboard:");
    eprintln!("  Initial capital: {}", format_currency(settings.initial_capital));
    eprintln!("  Default asset:   {}", settings.default_asset);
    eprintln!("  Show drawdown:   {}", settings.show_drawdown);
    eprintln!("\nWeb:");
    eprintln!("  Listen: {}", settings.listen);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_serve(config_path: &Path) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::sync::Arc;

        eprintln!("Loading config from {}", config_path.display());
        let settings = match load_settings(config_path) {
            Ok(s) => s,
            Err(code) => return code,
        };

        let addr = settings.listen;
        let state = AppState {
            series_port: Arc::new(CsvAdapter::from_settings(&settings)),
            settings,
        };
        let router = build_router(state);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(1);
            }
        };

        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            eprintln!("Starting web server on {addr}");
            tracing::info!(%addr, "listening");
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
