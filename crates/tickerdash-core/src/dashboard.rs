//! The dashboard flow: summary table for every ticker, then a chart series for
//! the selected subset over the selected period.
//!
//! [`Dashboard`] is the memoization boundary. [`build_snapshot`] and
//! [`load_series`] stay pure with respect to caching; results are stored in a
//! [`CacheStore`] keyed by the operation and its arguments.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::cache::{CacheKey, CacheMode, CacheStore};
use crate::data_source::PriceSource;
use crate::series::{load_series, SeriesReport};
use crate::snapshot::{build_snapshot, SnapshotReport};
use crate::{format_date, DateRange, Period, Symbol};

/// A condition that leaves a section of the page empty.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewError {
    #[error("no tickers selected")]
    NoSelection,
    #[error("no data available for the selected tickers in the chosen period")]
    NoSeriesData,
    #[error("{message}")]
    InvalidRange { message: String },
}

/// A value together with whether it came from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cached<T> {
    pub value: T,
    pub cache_hit: bool,
}

/// Inputs for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// Full list shown in the summary table.
    pub tickers: Vec<Symbol>,
    /// Subset plotted on the chart.
    pub selection: Vec<Symbol>,
    pub period: Period,
    pub today: Date,
}

impl DashboardRequest {
    pub fn new(tickers: Vec<Symbol>, selection: Vec<Symbol>, period: Period, today: Date) -> Self {
        Self {
            tickers,
            selection,
            period,
            today,
        }
    }
}

/// Everything a presentation layer needs to draw one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub period: Period,
    pub range: Option<DateRange>,
    pub snapshot: SnapshotReport,
    pub series: Option<SeriesReport>,
    /// Non-fatal per-ticker problems.
    pub warnings: Vec<String>,
    pub errors: Vec<ViewError>,
    /// True only when every section was served from the cache.
    pub cache_hit: bool,
}

impl DashboardView {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn PriceSource>,
    cache: CacheStore,
}

impl Dashboard {
    pub fn new(source: Arc<dyn PriceSource>, cache: CacheStore) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &dyn PriceSource {
        self.source.as_ref()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub async fn snapshot(
        &self,
        tickers: &[Symbol],
        today: Date,
        mode: CacheMode,
    ) -> Cached<SnapshotReport> {
        let key = CacheKey::new(
            "snapshot",
            format!("{}|{}", format_date(today), join_symbols(tickers)),
        );
        self.memoized(key, mode, || build_snapshot(self.source.as_ref(), tickers, today))
            .await
    }

    pub async fn series(
        &self,
        tickers: &[Symbol],
        range: DateRange,
        mode: CacheMode,
    ) -> Cached<SeriesReport> {
        let key = CacheKey::new("series", format!("{range}|{}", join_symbols(tickers)));
        self.memoized(key, mode, || load_series(self.source.as_ref(), tickers, range))
            .await
    }

    /// Run the full page flow. Never fails; problems land in `warnings` and `errors`.
    pub async fn render(&self, request: &DashboardRequest, mode: CacheMode) -> DashboardView {
        let snapshot = self.snapshot(&request.tickers, request.today, mode).await;
        let mut warnings = snapshot.value.warnings();
        let mut errors = Vec::new();
        let mut cache_hit = snapshot.cache_hit;

        if request.selection.is_empty() {
            errors.push(ViewError::NoSelection);
            return DashboardView {
                period: request.period,
                range: None,
                snapshot: snapshot.value,
                series: None,
                warnings,
                errors,
                cache_hit,
            };
        }

        let range = match request.period.range(request.today) {
            Ok(range) => range,
            Err(error) => {
                errors.push(ViewError::InvalidRange {
                    message: error.to_string(),
                });
                return DashboardView {
                    period: request.period,
                    range: None,
                    snapshot: snapshot.value,
                    series: None,
                    warnings,
                    errors,
                    cache_hit,
                };
            }
        };

        let series = self.series(&request.selection, range, mode).await;
        cache_hit &= series.cache_hit;
        warnings.extend(series.value.missing_warning());
        if series.value.is_empty() {
            errors.push(ViewError::NoSeriesData);
        }

        DashboardView {
            period: request.period,
            range: Some(range),
            snapshot: snapshot.value,
            series: Some(series.value),
            warnings,
            errors,
            cache_hit,
        }
    }

    async fn memoized<T, F, Fut>(&self, key: CacheKey, mode: CacheMode, compute: F) -> Cached<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        if mode == CacheMode::Use {
            if let Some(body) = self.cache.get(&key).await {
                match serde_json::from_str::<T>(&body) {
                    Ok(value) => {
                        tracing::debug!(%key, "cache hit");
                        return Cached {
                            value,
                            cache_hit: true,
                        };
                    }
                    Err(error) => tracing::warn!(%key, %error, "discarding unreadable cache entry"),
                }
            }
        }

        tracing::debug!(%key, ?mode, "cache miss");
        let value = compute().await;

        if mode != CacheMode::Bypass {
            match serde_json::to_string(&value) {
                Ok(body) => self.cache.put(key, body, None).await,
                Err(error) => tracing::warn!(%key, %error, "result not cached"),
            }
        }

        Cached {
            value,
            cache_hit: false,
        }
    }
}

fn join_symbols(tickers: &[Symbol]) -> String {
    tickers
        .iter()
        .map(Symbol::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
