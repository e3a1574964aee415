//! CLI argument definitions for stocknav.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `compare` | Relative returns, closing price and volume for several companies |
//! | `realtime` | Candlestick or line chart for one company (needs `--search`) |
//! | `predict` | One-year forecast of the daily close |
//! | `about` | About StockNavigator |
//! | `companies` | List the companies in the symbol directory |
//! | `shell` | Interactive session keeping view state between commands |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as failures (exit 5) |
//! | `--source` | `yahoo` | Market data provider |
//! | `--symbols` | `data/companies.csv` | Company directory CSV |
//! | `--start` / `--end` | `2021-01-01` / today | Date range |
//!
//! # Examples
//!
//! ```bash
//! stocknav compare "Apple Inc." "Microsoft Corporation" --chart area --pretty
//! stocknav realtime "Tesla, Inc." --search --chart line
//! stocknav predict "Apple Inc." --start 2020-01-01 --format table
//! stocknav --source mock shell
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stocknav_core::views::comparison::ComparisonChart;
use stocknav_core::views::realtime::RealTimeChart;
use stocknav_core::{ProviderId, TradingDate};

#[derive(Debug, Parser)]
#[command(
    name = "stocknav",
    author,
    version,
    about = "Compare, chart and forecast stock prices from the terminal"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Market data provider.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Yahoo, env = "STOCKNAV_SOURCE")]
    pub source: SourceSelector,

    /// Two-column `Company Name,Symbol` CSV.
    #[arg(long, global = true, default_value = "data/companies.csv", env = "STOCKNAV_SYMBOLS")]
    pub symbols: PathBuf,

    /// Directory of `<SYMBOL>.csv` exports for `--source csv`.
    #[arg(long, global = true, env = "STOCKNAV_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// First date of the range (YYYY-MM-DD).
    #[arg(long, global = true, value_parser = parse_date)]
    pub start: Option<TradingDate>,

    /// Last date of the range (YYYY-MM-DD), inclusive.
    #[arg(long, global = true, value_parser = parse_date)]
    pub end: Option<TradingDate>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Retries for throttled or failed upstream requests.
    #[arg(long, global = true, default_value_t = 2)]
    pub retries: u32,

    /// Log filter, e.g. `debug` or `stocknav_core=trace` (overrides RUST_LOG).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Human-readable summary.
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance chart API.
    Yahoo,
    /// Local CSV exports (needs --data-dir).
    Csv,
    /// Deterministic offline data.
    Mock,
}

impl From<SourceSelector> for ProviderId {
    fn from(value: SourceSelector) -> Self {
        match value {
            SourceSelector::Yahoo => Self::Yahoo,
            SourceSelector::Csv => Self::Csv,
            SourceSelector::Mock => Self::Mock,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare the performance of several companies.
    Compare(CompareArgs),
    /// Chart one company's prices.
    Realtime(RealtimeArgs),
    /// Forecast one company's closing price a year ahead.
    Predict(PredictArgs),
    /// About StockNavigator.
    About,
    /// List the companies that can be selected.
    Companies,
    /// Interactive session.
    Shell,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Company names as listed by `stocknav companies`.
    pub companies: Vec<String>,

    #[arg(long, value_enum, default_value_t = CompareChartArg::Line)]
    pub chart: CompareChartArg,
}

#[derive(Debug, Args)]
pub struct RealtimeArgs {
    pub company: Option<String>,

    /// Press Search.
    #[arg(long, default_value_t = false)]
    pub search: bool,

    #[arg(long, value_enum, default_value_t = RealtimeChartArg::Candlestick)]
    pub chart: RealtimeChartArg,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    pub company: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareChartArg {
    Line,
    Area,
    Bar,
}

impl From<CompareChartArg> for ComparisonChart {
    fn from(value: CompareChartArg) -> Self {
        match value {
            CompareChartArg::Line => Self::Line,
            CompareChartArg::Area => Self::Area,
            CompareChartArg::Bar => Self::Bar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RealtimeChartArg {
    #[value(alias = "candle")]
    Candlestick,
    Line,
}

impl From<RealtimeChartArg> for RealTimeChart {
    fn from(value: RealtimeChartArg) -> Self {
        match value {
            RealtimeChartArg::Candlestick => Self::Candlestick,
            RealtimeChartArg::Line => Self::Line,
        }
    }
}

fn parse_date(value: &str) -> Result<TradingDate, String> {
    TradingDate::parse(value).map_err(|error| error.to_string())
}
