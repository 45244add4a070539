//! CLI entry point for the speed-test log dashboard.
//!
//! Loads the measurement log once from a file or URL, computes the outage and
//! throughput aggregates, and prints the summary, table or charts.

use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, TimeZone};
use clap::{Args, Parser, Subcommand, ValueEnum};
use speedlog_dashboard::{
    config::{UTC_OFFSET_ENV, parse_report_zone},
    fetch::{BasicClient, load_log},
    output::{write_csv, write_csv_records, write_json},
    parser::parse_records,
    presenters::{
        ChartKind, ChartPresenter, ChartSpec, DashboardView, Presenter, SortOrder,
        SummaryPresenter, TableOptions, TablePresenter, render_all, table::DEFAULT_PAGE_SIZE,
        table::sorted_rows,
    },
    record::MeasurementRecord,
    stats::DashboardStats,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Where the logger writes its results.
const DEFAULT_SOURCE: &str = "speed_test_results.json";

#[derive(Parser)]
#[command(name = "speedlog_dashboard")]
#[command(about = "A dashboard for speed-test connectivity logs", long_about = None)]
struct Cli {
    /// Report zone as a UTC offset such as "+02:00". Defaults to
    /// SPEEDLOG_UTC_OFFSET, then to the local zone.
    #[arg(long, global = true, value_name = "OFFSET")]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print log size, outage count, daily outage average and average speeds
    Summary {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_SOURCE)]
        source: String,

        /// Print the aggregates as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print one page of the measurement table
    Table {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_SOURCE)]
        source: String,

        #[command(flatten)]
        table: TableArgs,

        /// Also export every matching row, in table order, to this CSV file
        #[arg(long)]
        csv: Option<String>,

        /// Gzip compress the CSV export
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Draw availability and speed charts
    Chart {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_SOURCE)]
        source: String,

        /// Which chart to draw
        #[arg(short, long, value_enum, default_value_t = ChartArg::All)]
        kind: ChartArg,

        /// Maximum sparkline width in columns
        #[arg(short, long, default_value_t = 60)]
        width: usize,

        /// Directory to write one CSV per chart into
        #[arg(long)]
        csv_dir: Option<String>,

        /// Gzip compress the CSV exports
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Print the summary, the first table page and both charts
    Report {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_SOURCE)]
        source: String,

        #[command(flatten)]
        table: TableArgs,

        /// Maximum sparkline width in columns
        #[arg(short, long, default_value_t = 60)]
        width: usize,
    },
}

#[derive(Args)]
struct TableArgs {
    /// Rows per page: 5, 10, 15, 25, 50 or 100
    #[arg(short = 's', long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Only rows containing every word of this text
    #[arg(long)]
    search: Option<String>,

    /// Oldest rows first
    #[arg(long, default_value_t = false)]
    ascending: bool,
}

impl TableArgs {
    fn options(&self) -> Result<TableOptions> {
        let order = if self.ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        };

        Ok(TableOptions::new(self.page_size)?
            .with_page(self.page)?
            .with_order(order)
            .with_search(self.search.as_deref().unwrap_or_default()))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartArg {
    Availability,
    Speeds,
    All,
}

impl ChartArg {
    fn kinds(self) -> Vec<ChartKind> {
        match self {
            ChartArg::Availability => vec![ChartKind::Availability],
            ChartArg::Speeds => vec![ChartKind::Speeds],
            ChartArg::All => vec![ChartKind::Availability, ChartKind::Speeds],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/speedlog_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("speedlog_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match report_zone(cli.utc_offset)? {
        Some(offset) => run(cli.command, &offset).await,
        None => run(cli.command, &Local).await,
    }
}

/// Fixed offset from the flag or `SPEEDLOG_UTC_OFFSET`; `None` means the local zone.
fn report_zone(flag: Option<String>) -> Result<Option<FixedOffset>> {
    let env = std::env::var(UTC_OFFSET_ENV).ok();
    let offset = parse_report_zone(flag.as_deref(), env.as_deref())?;
    if let Some(offset) = offset {
        info!(offset = %offset, "Using fixed report zone");
    }
    Ok(offset)
}

async fn run<Tz: TimeZone>(command: Commands, tz: &Tz) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let out: &mut dyn Write = &mut stdout;

    match command {
        Commands::Summary { source, json } => {
            let (records, stats) = load(&source, tz).await?;
            if json {
                write_json(out, &stats)?;
            } else {
                let view = DashboardView::new(&records, &stats, tz);
                SummaryPresenter.render(&view, out)?;
            }
        }
        Commands::Table {
            source,
            table,
            csv,
            gzip,
        } => {
            let options = table.options()?;
            let (records, stats) = load(&source, tz).await?;
            let view = DashboardView::new(&records, &stats, tz);

            TablePresenter {
                options: options.clone(),
            }
            .render(&view, out)?;

            if let Some(path) = csv {
                let rows = sorted_rows(&view, options.order(), options.search());
                write_csv(&path, &rows, gzip)?;
            }
        }
        Commands::Chart {
            source,
            kind,
            width,
            csv_dir,
            gzip,
        } => {
            let (records, stats) = load(&source, tz).await?;
            let view = DashboardView::new(&records, &stats, tz);
            let kinds = kind.kinds();

            if let Some(dir) = csv_dir {
                std::fs::create_dir_all(&dir)?;
                for kind in &kinds {
                    let chart = ChartSpec::build(*kind, &view);
                    let path = format!("{}/{}", dir, chart.csv_file_name());
                    write_csv_records(&path, &chart.csv_records(), gzip)?;
                }
            }

            ChartPresenter { kinds, width }.render(&view, out)?;
        }
        Commands::Report {
            source,
            table,
            width,
        } => {
            let options = table.options()?;
            let (records, stats) = load(&source, tz).await?;
            let view = DashboardView::new(&records, &stats, tz);

            let table = TablePresenter { options };
            let charts = ChartPresenter {
                kinds: ChartArg::All.kinds(),
                width,
            };
            render_all(&[&SummaryPresenter, &table, &charts], &view, out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Loads, parses and aggregates the log. Nothing is rendered if this fails.
#[tracing::instrument(skip(tz))]
async fn load<Tz: TimeZone>(
    source: &str,
    tz: &Tz,
) -> Result<(Vec<MeasurementRecord>, DashboardStats)> {
    let client = BasicClient::new().context("failed to build HTTP client")?;

    let bytes = load_log(&client, source)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to load measurement log"))?;
    let records = parse_records(&bytes)
        .inspect_err(|e| error!(error = %e, "Failed to parse measurement log"))?;

    let stats = DashboardStats::from_records(&records, tz).with_source(source, bytes.len() as u64);

    info!(
        records = stats.total_records,
        outages = stats.outage_count,
        days = stats.distinct_days,
        "Measurement log aggregated"
    );
    Ok((records, stats))
}
