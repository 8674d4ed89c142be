use serde::{Deserialize, Serialize};
use time::Date;

use super::date_range::iso_date;
use crate::{Symbol, ValidationError};

/// Tickers shown in the summary table when none are configured.
pub const DEFAULT_TICKERS: [&str; 10] = [
    "PETR4.SA", "VALE3.SA", "ITUB4.SA", "BBDC4.SA", "BBAS3.SA", "WEGE3.SA", "AAPL", "MSFT",
    "GOOGL", "AMZN",
];

/// Chart selection used when the user picks nothing explicitly.
pub const DEFAULT_SELECTION: &str = "PETR4.SA";

/// Parsed [`DEFAULT_TICKERS`].
pub fn default_tickers() -> Vec<Symbol> {
    DEFAULT_TICKERS
        .iter()
        .filter_map(|raw| Symbol::parse(raw).ok())
        .collect()
}

/// Single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: Date, close: f64) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        Ok(Self { date, close })
    }
}

/// Daily close history for one symbol, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(symbol: Symbol, mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps arrival order among equal dates, so the last
        // occurrence of a date wins after the reverse dedup below.
        points.sort_by_key(|point| point.date);
        points.reverse();
        points.dedup_by_key(|point| point.date);
        points.reverse();
        Self { symbol, points }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.points.first().map(|point| point.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|point| point.close)
    }

    /// Close of the session before the last one.
    pub fn previous_close(&self) -> Option<f64> {
        self.points
            .len()
            .checked_sub(2)
            .and_then(|index| self.points.get(index))
            .map(|point| point.close)
    }
}

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub ticker: Symbol,
    pub current_price: f64,
    pub day_change_pct: f64,
    pub year_change_pct: f64,
}

/// Long-format chart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub close: f64,
    pub ticker: Symbol,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn point(date: Date, close: f64) -> PricePoint {
        PricePoint::new(date, close).expect("finite close")
    }

    #[test]
    fn history_is_sorted_and_last_duplicate_wins() {
        let history = PriceHistory::new(
            Symbol::parse("AAPL").expect("symbol"),
            vec![
                point(date!(2024 - 01 - 03), 12.0),
                point(date!(2024 - 01 - 02), 10.0),
                point(date!(2024 - 01 - 03), 13.0),
            ],
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history.first_close(), Some(10.0));
        assert_eq!(history.last_close(), Some(13.0));
        assert_eq!(history.previous_close(), Some(10.0));
    }

    #[test]
    fn previous_close_requires_two_points() {
        let history = PriceHistory::new(
            Symbol::parse("AAPL").expect("symbol"),
            vec![point(date!(2024 - 01 - 02), 10.0)],
        );
        assert_eq!(history.previous_close(), None);
    }

    #[test]
    fn rejects_non_finite_close() {
        let err = PricePoint::new(date!(2024 - 01 - 02), f64::NAN).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { field: "close" }));
    }

    #[test]
    fn default_tickers_all_parse() {
        assert_eq!(default_tickers().len(), DEFAULT_TICKERS.len());
    }
}
