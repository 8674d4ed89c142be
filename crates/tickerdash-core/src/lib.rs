//! # Tickerdash Core
//!
//! Data layer for the tickerdash stock dashboard.
//!
//! ## Overview
//!
//! - **Domain types** for tickers, daily closes, date ranges and chart periods
//! - **Price source trait** with a Yahoo Finance adapter and an offline fixture
//! - **Snapshot aggregation**: current price, day change and 12-month change
//! - **Range series loading**: long-format closes for charting
//! - **Explicit memo cache** keyed by operation and arguments
//!
//! Per-ticker failures never abort a batch. Each requested ticker gets a
//! [`TickerOutcome`] so callers can tell "no data" apart from "fetch failed".
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo and fixture price sources |
//! | [`cache`] | Argument-keyed memo cache |
//! | [`dashboard`] | Page flow with caching and user-facing messages |
//! | [`data_source`] | Price source trait and request/error types |
//! | [`domain`] | Domain models |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`outcome`] | Per-ticker result records |
//! | [`series`] | Range series loader |
//! | [`snapshot`] | Snapshot aggregator |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerdash_core::{CacheMode, CacheStore, Dashboard, DashboardRequest, Period, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dashboard = Dashboard::new(Arc::new(YahooAdapter::default()), CacheStore::default());
//!     let request = DashboardRequest::new(
//!         tickerdash_core::default_tickers(),
//!         vec![tickerdash_core::Symbol::parse("PETR4.SA").unwrap()],
//!         Period::OneYear,
//!         tickerdash_core::today_utc(),
//!     );
//!     let view = dashboard.render(&request, CacheMode::Use).await;
//!     for row in &view.snapshot.rows {
//!         println!("{} {:.2}", row.ticker, row.current_price);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Dashboard      │────▶│ CacheStore       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ snapshot/series │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PriceSource     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod cache;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod outcome;
pub mod series;
pub mod snapshot;
pub mod source;

pub use adapters::{FixtureSource, YahooAdapter};
pub use cache::{CacheKey, CacheMode, CacheStore};
pub use dashboard::{Cached, Dashboard, DashboardRequest, DashboardView, ViewError};
pub use data_source::{
    HealthState, HealthStatus, HistoryRequest, PriceSource, SourceError, SourceErrorKind,
    SourceFuture,
};
pub use domain::{
    default_tickers, format_date, parse_date, today_utc, DateRange, Period, PriceHistory,
    PricePoint, SeriesPoint, SnapshotRow, Symbol, DEFAULT_SELECTION, DEFAULT_TICKERS,
};
pub use error::ValidationError;
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use outcome::{TickerOutcome, TickerStatus};
pub use series::{load_series, SeriesReport};
pub use snapshot::{build_snapshot, percent_change, round2, snapshot_row, SnapshotReport, SNAPSHOT_WINDOW_DAYS};
pub use source::ProviderId;
