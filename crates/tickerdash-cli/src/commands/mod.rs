mod dashboard;
mod history;
mod periods;
mod snapshot;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tickerdash_core::{
    default_tickers, CacheMode, CacheStore, Dashboard, DashboardView, FixtureSource, PriceSource,
    SnapshotReport, Symbol, YahooAdapter, DEFAULT_SELECTION,
};

use crate::cli::{Cli, Command};
use crate::envelope::{Envelope, EnvelopeError};
use crate::error::CliError;
use crate::metadata::Metadata;

pub use history::HistoryData;
pub use periods::PeriodInfo;

/// Command output carried in the envelope's `data` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Snapshot(SnapshotReport),
    History(HistoryData),
    Dashboard(Box<DashboardView>),
    Periods(Vec<PeriodInfo>),
}

pub struct CommandResult {
    pub data: Payload,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub cache_hit: bool,
}

impl CommandResult {
    pub fn ok(data: Payload) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            cache_hit: false,
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }
}

/// Everything a command needs, built once per process so the cache spans
/// `--watch` iterations.
pub struct Context {
    pub dashboard: Dashboard,
    pub mode: CacheMode,
    pub tickers: Vec<Symbol>,
    /// Mode for `--watch` ticks after the first. Without a TTL a cached page
    /// would never expire, so later ticks recompute and overwrite it.
    repeat_mode: CacheMode,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let source: Arc<dyn PriceSource> = if cli.mock {
            Arc::new(FixtureSource::synthetic())
        } else {
            Arc::new(
                YahooAdapter::default()
                    .with_timeout_ms(cli.timeout_ms)
                    .with_requests_per_second(cli.requests_per_second),
            )
        };

        let (cache, mode, repeat_mode) = match (cli.no_cache, cli.cache_ttl_secs) {
            (true, _) => (CacheStore::disabled(), CacheMode::Bypass, CacheMode::Bypass),
            (false, Some(secs)) => (
                CacheStore::with_ttl(Duration::from_secs(secs)),
                CacheMode::Use,
                CacheMode::Use,
            ),
            (false, None) => (CacheStore::process_lifetime(), CacheMode::Use, CacheMode::Refresh),
        };

        let tickers = match cli.tickers.as_deref() {
            Some(list) if !list.trim().is_empty() => Symbol::parse_list(list)?,
            _ => default_tickers(),
        };

        tracing::debug!(
            source = %source.id(),
            ?mode,
            tickers = tickers.len(),
            "command context ready"
        );

        Ok(Self {
            dashboard: Dashboard::new(source, cache),
            mode,
            tickers,
            repeat_mode,
        })
    }

    /// Switch to the cache mode used by every `--watch` tick after the first.
    pub fn advance_watch_tick(&mut self) {
        self.mode = self.repeat_mode;
    }

    /// Positional tickers, or the configured list when none were given.
    pub fn tickers_or_default(&self, raw: &[String]) -> Result<Vec<Symbol>, CliError> {
        if raw.is_empty() {
            return Ok(self.tickers.clone());
        }
        parse_symbols(raw)
    }
}

/// Tickers given on the command line, or the default chart selection.
pub fn selection_or_default(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    if raw.is_empty() {
        return Ok(vec![Symbol::parse(DEFAULT_SELECTION)?]);
    }
    parse_symbols(raw)
}

fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    raw.iter()
        .map(|value| Symbol::parse(value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CliError::from)
}

pub async fn run(cli: &Cli, context: &Context) -> Result<Envelope<Payload>, CliError> {
    let started = Instant::now();

    let command_result = match &cli.command {
        Command::Snapshot(args) => snapshot::run(args, context).await?,
        Command::History(args) => history::run(args, context).await?,
        Command::Dashboard(args) => dashboard::run(args, context).await?,
        Command::Periods => periods::run(),
    };

    let CommandResult {
        data,
        warnings,
        errors,
        cache_hit,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut metadata = Metadata::new(context.dashboard.source().id(), latency_ms, cache_hit);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    Ok(Envelope::with_errors(
        metadata.into_envelope_meta(),
        data,
        errors,
    ))
}
