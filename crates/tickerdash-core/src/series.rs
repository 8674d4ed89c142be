//! Long-format close series for the chart.
//!
//! Every requested ticker ends up either in [`SeriesReport::points`] or in
//! [`SeriesReport::missing`], never both and never neither.

use serde::{Deserialize, Serialize};

use crate::data_source::{HistoryRequest, PriceSource};
use crate::outcome::{distinct, TickerOutcome, TickerStatus};
use crate::{DateRange, SeriesPoint, Symbol};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    /// Concatenated in request order, each ticker ascending by date.
    pub points: Vec<SeriesPoint>,
    /// Tickers that failed or returned no rows.
    pub missing: Vec<Symbol>,
    pub outcomes: Vec<TickerOutcome>,
}

impl SeriesReport {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tickers present in `points`, in order of first appearance.
    pub fn tickers(&self) -> Vec<&Symbol> {
        let mut tickers: Vec<&Symbol> = Vec::new();
        for point in &self.points {
            if tickers.last() != Some(&&point.ticker) {
                tickers.push(&point.ticker);
            }
        }
        tickers
    }

    pub fn points_for<'a>(&'a self, ticker: &'a Symbol) -> impl Iterator<Item = &'a SeriesPoint> + 'a {
        self.points.iter().filter(move |point| &point.ticker == ticker)
    }

    /// Single warning listing every missing ticker.
    pub fn missing_warning(&self) -> Option<String> {
        if self.missing.is_empty() {
            return None;
        }
        let names = self
            .missing
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("could not fetch data for: {names}"))
    }
}

/// Fetch every ticker over `range` sequentially and concatenate the closes.
pub async fn load_series(
    source: &dyn PriceSource,
    tickers: &[Symbol],
    range: DateRange,
) -> SeriesReport {
    let tickers = distinct(tickers);
    let mut report = SeriesReport {
        points: Vec::new(),
        missing: Vec::new(),
        outcomes: Vec::with_capacity(tickers.len()),
    };

    for ticker in tickers {
        let status = match source
            .history(HistoryRequest::new(ticker.clone(), range))
            .await
        {
            Ok(history) if history.is_empty() => {
                tracing::debug!(%ticker, %range, "no series data");
                TickerStatus::NoData
            }
            Ok(history) => {
                let count = history.len();
                report
                    .points
                    .extend(history.into_points().into_iter().map(|point| SeriesPoint {
                        date: point.date,
                        close: point.close,
                        ticker: ticker.clone(),
                    }));
                TickerStatus::Loaded { points: count }
            }
            Err(error) => {
                tracing::warn!(%ticker, %range, %error, "series fetch failed");
                TickerStatus::failed(&error)
            }
        };

        if !status.is_loaded() {
            report.missing.push(ticker.clone());
        }
        report.outcomes.push(TickerOutcome::new(ticker.clone(), status));
    }

    report
}
