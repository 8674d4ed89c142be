//! Summary table: current price, day change and 12-month change per ticker.
//!
//! Each ticker is fetched over the trailing [`SNAPSHOT_WINDOW_DAYS`] and reduced
//! to three numbers:
//!
//! | Field | Formula |
//! |-------|---------|
//! | `current_price` | last close |
//! | `day_change_pct` | `(last - previous) / previous * 100` |
//! | `year_change_pct` | `(last - first) / first * 100` |
//!
//! All three are rounded to two decimals. A ticker that cannot produce a row
//! is skipped and its reason kept in [`SnapshotReport::outcomes`]; building a
//! snapshot never fails as a whole.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::data_source::{HistoryRequest, PriceSource, SourceError};
use crate::outcome::{distinct, TickerOutcome, TickerStatus};
use crate::{DateRange, PriceHistory, SnapshotRow, Symbol};

/// Look-back used for the 12-month change.
pub const SNAPSHOT_WINDOW_DAYS: i64 = 365;

/// Why a history could not be reduced to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSkip {
    NoData,
    InsufficientHistory { points: usize },
    InvalidBasePrice,
}

impl From<SnapshotSkip> for TickerStatus {
    fn from(skip: SnapshotSkip) -> Self {
        match skip {
            SnapshotSkip::NoData => Self::NoData,
            SnapshotSkip::InsufficientHistory { points } => Self::InsufficientHistory { points },
            SnapshotSkip::InvalidBasePrice => Self::InvalidBasePrice,
        }
    }
}

/// Rows plus one outcome per distinct requested ticker, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub rows: Vec<SnapshotRow>,
    pub outcomes: Vec<TickerOutcome>,
}

impl SnapshotReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Warnings for tickers that failed or could not be reduced.
    ///
    /// Tickers that simply returned no data are left out, matching the table's
    /// silent omission of unknown tickers.
    pub fn warnings(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !matches!(outcome.status, TickerStatus::Loaded { .. } | TickerStatus::NoData))
            .map(TickerOutcome::warning)
            .collect()
    }
}

/// Rounds to two decimals, sending exact halves to the even digit.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Percentage change from `base` to `current`; `None` when `base` is zero.
pub fn percent_change(current: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some((current - base) / base * 100.0)
}

/// Reduce one history to a summary row.
pub fn snapshot_row(history: &PriceHistory) -> Result<SnapshotRow, SnapshotSkip> {
    if history.is_empty() {
        return Err(SnapshotSkip::NoData);
    }

    let (Some(current), Some(previous), Some(year_ago)) = (
        history.last_close(),
        history.previous_close(),
        history.first_close(),
    ) else {
        return Err(SnapshotSkip::InsufficientHistory {
            points: history.len(),
        });
    };

    let day = percent_change(current, previous).ok_or(SnapshotSkip::InvalidBasePrice)?;
    let year = percent_change(current, year_ago).ok_or(SnapshotSkip::InvalidBasePrice)?;

    Ok(SnapshotRow {
        ticker: history.symbol.clone(),
        current_price: round2(current),
        day_change_pct: round2(day),
        year_change_pct: round2(year),
    })
}

/// Fetch and reduce every ticker sequentially.
pub async fn build_snapshot(
    source: &dyn PriceSource,
    tickers: &[Symbol],
    today: Date,
) -> SnapshotReport {
    let tickers = distinct(tickers);
    let mut report = SnapshotReport {
        rows: Vec::with_capacity(tickers.len()),
        outcomes: Vec::with_capacity(tickers.len()),
    };

    let window = match DateRange::trailing(today, SNAPSHOT_WINDOW_DAYS) {
        Ok(window) => window,
        Err(error) => {
            let error = SourceError::invalid_request(error.to_string());
            report.outcomes = tickers
                .into_iter()
                .map(|ticker| TickerOutcome::new(ticker.clone(), TickerStatus::failed(&error)))
                .collect();
            return report;
        }
    };

    for ticker in tickers {
        let status = match source
            .history(HistoryRequest::new(ticker.clone(), window))
            .await
        {
            Ok(history) => match snapshot_row(&history) {
                Ok(row) => {
                    let status = TickerStatus::Loaded {
                        points: history.len(),
                    };
                    report.rows.push(row);
                    status
                }
                Err(skip) => TickerStatus::from(skip),
            },
            Err(error) => TickerStatus::failed(&error),
        };

        match &status {
            TickerStatus::Loaded { points } => {
                tracing::debug!(%ticker, points, "snapshot row computed");
            }
            TickerStatus::NoData => tracing::debug!(%ticker, "no data, ticker omitted"),
            other => tracing::warn!(%ticker, reason = %other, "ticker omitted from snapshot"),
        }

        report.outcomes.push(TickerOutcome::new(ticker.clone(), status));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PricePoint;
    use time::macros::date;

    fn history(closes: &[f64]) -> PriceHistory {
        let start = date!(2023 - 06 - 15);
        let points = closes
            .iter()
            .zip(0_i64..)
            .map(|(close, offset)| {
                PricePoint::new(start + time::Duration::days(offset), *close).expect("finite")
            })
            .collect();
        PriceHistory::new(Symbol::parse("AAPL").expect("symbol"), points)
    }

    #[test]
    fn computes_rounded_changes() {
        let row = snapshot_row(&history(&[130.0, 140.0, 148.0, 150.0])).expect("row");
        assert_eq!(row.ticker.as_str(), "AAPL");
        assert_eq!(row.current_price, 150.0);
        assert_eq!(row.day_change_pct, 1.35);
        assert_eq!(row.year_change_pct, 15.38);
    }

    #[test]
    fn negative_changes_round_symmetrically() {
        let row = snapshot_row(&history(&[200.0, 150.0, 148.0])).expect("row");
        assert_eq!(row.day_change_pct, -1.33);
        assert_eq!(row.year_change_pct, -26.0);
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);

        let row = snapshot_row(&history(&[80.0, 100.0, 100.125])).expect("row");
        assert_eq!(row.current_price, 100.12);
    }

    #[test]
    fn single_point_is_insufficient() {
        let err = snapshot_row(&history(&[150.0])).expect_err("must skip");
        assert_eq!(err, SnapshotSkip::InsufficientHistory { points: 1 });
    }

    #[test]
    fn zero_base_is_rejected() {
        let err = snapshot_row(&history(&[0.0, 10.0, 12.0])).expect_err("must skip");
        assert_eq!(err, SnapshotSkip::InvalidBasePrice);
    }

    #[test]
    fn empty_history_is_no_data() {
        let err = snapshot_row(&history(&[])).expect_err("must skip");
        assert_eq!(err, SnapshotSkip::NoData);
    }

    #[test]
    fn percent_change_matches_formula() {
        let change = percent_change(150.0, 130.0).expect("non-zero base");
        assert!((change - 15.384_615).abs() < 1e-6);
        assert_eq!(percent_change(1.0, 0.0), None);
        assert_eq!(round2(2.675_1), 2.68);
    }
}
