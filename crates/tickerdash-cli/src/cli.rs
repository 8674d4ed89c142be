//! CLI argument definitions for tickerdash.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshot` | Summary table: price, day change, 12-month change |
//! | `history` | Daily closes for tickers over a period or date range |
//! | `dashboard` | Summary table plus chart for a selection |
//! | `periods` | List chart periods and their day counts |
//!
//! # Global Options
//!
//! | Option | Default | Env | Description |
//! |--------|---------|-----|-------------|
//! | `--format` | `table` | `TICKERDASH_FORMAT` | Output format (table, json, ndjson) |
//! | `--pretty` | `false` | | Pretty-print JSON output |
//! | `--strict` | `false` | | Treat warnings as errors |
//! | `--mock` | `false` | `TICKERDASH_MOCK` | Use offline synthetic data |
//! | `--timeout-ms` | `10000` | `TICKERDASH_TIMEOUT_MS` | Per-request timeout |
//! | `--requests-per-second` | `4` | `TICKERDASH_REQUESTS_PER_SECOND` | Upstream pacing |
//! | `--cache-ttl-secs` | none | `TICKERDASH_CACHE_TTL_SECS` | Cache entry lifetime |
//! | `--no-cache` | `false` | | Always refetch |
//! | `--tickers` | built-in list | `TICKERDASH_TICKERS` | Default ticker list |
//!
//! # Examples
//!
//! ```bash
//! tickerdash snapshot
//! tickerdash history AAPL MSFT --period 1y --format json --pretty
//! tickerdash history PETR4.SA --from 2024-01-01 --to 2024-06-30
//! tickerdash dashboard --select PETR4.SA VALE3.SA --period "3 months" --watch 60
//! ```

use std::num::NonZeroU32;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickerdash_core::Period;

/// Terminal stock dashboard backed by Yahoo Finance.
#[derive(Debug, Parser)]
#[command(
    name = "tickerdash",
    author,
    version,
    about = "Terminal stock dashboard",
    long_about = "tickerdash fetches recent daily prices for a list of tickers, prints a \
summary of current price, day change and 12-month change, and charts closing prices \
for a selection over a chosen period.\n\
\n\
Use 'tickerdash <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - table: summary table and text chart (default)
    /// - json: single JSON envelope
    /// - ndjson: one compact envelope per line
    #[arg(long, global = true, value_enum, env = "TICKERDASH_FORMAT", default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic synthetic prices instead of calling Yahoo.
    #[arg(long, global = true, env = "TICKERDASH_MOCK", default_value_t = false)]
    pub mock: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, env = "TICKERDASH_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Maximum upstream requests per second.
    #[arg(long, global = true, env = "TICKERDASH_REQUESTS_PER_SECOND", default_value = "4")]
    pub requests_per_second: NonZeroU32,

    /// Lifetime of cached results in seconds; unset keeps them for the whole run.
    #[arg(long, global = true, env = "TICKERDASH_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Disable result caching.
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    /// Comma-separated ticker list used when a command is given none.
    #[arg(long, global = true, env = "TICKERDASH_TICKERS")]
    pub tickers: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary table and text chart for terminal display.
    Table,
    /// Single JSON envelope.
    Json,
    /// Newline-delimited JSON (one envelope per line).
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summary of current price, day change and 12-month change.
    ///
    /// # Examples
    ///
    ///   tickerdash snapshot
    ///   tickerdash snapshot AAPL MSFT --format json
    Snapshot(SnapshotArgs),

    /// Daily closing prices over a period or explicit date range.
    ///
    /// # Examples
    ///
    ///   tickerdash history PETR4.SA
    ///   tickerdash history AAPL MSFT --period 5y
    ///   tickerdash history AAPL --from 2024-01-01 --to 2024-03-31
    History(HistoryArgs),

    /// Summary table for all tickers plus a chart for the selection.
    ///
    /// # Examples
    ///
    ///   tickerdash dashboard
    ///   tickerdash dashboard --select AAPL MSFT --period "1 year"
    ///   tickerdash dashboard --watch 60
    Dashboard(DashboardArgs),

    /// List selectable chart periods.
    Periods,
}

/// Arguments for the `snapshot` command.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Tickers to summarize; defaults to the configured list.
    pub symbols: Vec<String>,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Tickers to load; defaults to the default selection.
    pub symbols: Vec<String>,

    /// Look-back period (e.g. "1 month", 3mo, 1y).
    #[arg(long, default_value_t = Period::default(), conflicts_with_all = ["from", "to"])]
    pub period: Period,

    /// Range start date (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Range end date (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

/// Arguments for the `dashboard` command.
#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Tickers to chart; defaults to the default selection.
    ///
    /// Passing `--select` with no values charts nothing.
    #[arg(long, num_args = 0..)]
    pub select: Option<Vec<String>>,

    /// Chart look-back period.
    #[arg(long, default_value_t = Period::default())]
    pub period: Period,

    /// Re-render every SECS seconds until interrupted.
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_period_labels_and_codes() {
        let cli = Cli::try_parse_from(["tickerdash", "history", "AAPL", "--period", "3 years"])
            .expect("parses");
        let Command::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.period, Period::ThreeYears);

        let cli = Cli::try_parse_from(["tickerdash", "dashboard", "--period", "6mo"]).expect("parses");
        let Command::Dashboard(args) = cli.command else {
            panic!("expected dashboard");
        };
        assert_eq!(args.period, Period::SixMonths);
    }

    #[test]
    fn from_requires_to() {
        let err = Cli::try_parse_from(["tickerdash", "history", "AAPL", "--from", "2024-01-01"])
            .expect_err("must fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
