//! CLI argument definitions for ohlcview.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `load` | Load a directory of price CSV files into the store |
//! | `companies` | List stored companies and the date range |
//! | `chart` | Aggregated OHLC series for one company |
//! | `prices` | Newest stored daily rows |
//! | `verify` | Row counts per symbol and overall date bounds |
//! | `serve` | Run the HTTP chart API |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--db-path` | `$OHLCVIEW_HOME/data/ohlcview.duckdb` | DuckDB file to use |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! ohlcview load ./StocksData
//! ohlcview chart AAPL --start 2023-01-01 --end 2023-12-31 --aggregation weekly --pretty
//! ohlcview serve --bind 0.0.0.0:8000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Daily stock prices in, candlestick chart data out.
#[derive(Debug, Parser)]
#[command(name = "ohlcview", author, version, about = "Daily OHLC price store and chart API")]
pub struct Cli {
    /// DuckDB file to use instead of the default location.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load every *.csv file of a directory, replacing each ticker's history.
    Load(LoadArgs),
    /// List companies and the earliest/latest stored date.
    Companies,
    /// Aggregate one company's daily bars for a date range.
    Chart(ChartArgs),
    /// Show the newest stored daily rows.
    Prices(PricesArgs),
    /// Summarise what the store holds.
    Verify,
    /// Serve the HTTP chart API.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Directory holding one CSV file per ticker.
    #[arg(default_value = "StocksData")]
    pub dir: PathBuf,
}

/// Bar period for `chart`; `auto` picks one from the range length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AggregationChoice {
    Daily,
    Weekly,
    Monthly,
    Auto,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Company id or ticker.
    pub company: String,

    /// First date, YYYY-MM-DD (inclusive).
    #[arg(long)]
    pub start: String,

    /// Last date, YYYY-MM-DD (inclusive).
    #[arg(long)]
    pub end: String,

    #[arg(long, value_enum, default_value_t = AggregationChoice::Daily)]
    pub aggregation: AggregationChoice,

    /// Also write the series as CSV to this file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Restrict to one ticker.
    pub symbol: Option<String>,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub request_timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ohlcview",
            "--pretty",
            "chart",
            "AAPL",
            "--start",
            "2024-01-01",
            "--end",
            "2024-06-30",
            "--aggregation",
            "auto",
        ])
        .expect("parse");

        assert!(cli.pretty);
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };
        assert_eq!(args.company, "AAPL");
        assert_eq!(args.aggregation, AggregationChoice::Auto);
        assert!(args.csv.is_none());
    }

    #[test]
    fn load_defaults_to_stocks_data() {
        let cli = Cli::try_parse_from(["ohlcview", "load"]).expect("parse");
        let Command::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.dir, PathBuf::from("StocksData"));
    }

    #[test]
    fn unknown_aggregation_is_rejected() {
        let result = Cli::try_parse_from([
            "ohlcview", "chart", "AAPL", "--start", "2024-01-01", "--end", "2024-01-31",
            "--aggregation", "yearly",
        ]);
        assert!(result.is_err());
    }
}
