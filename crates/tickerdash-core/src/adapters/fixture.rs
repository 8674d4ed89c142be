use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use time::{Date, Duration, Weekday};

use crate::data_source::{HealthStatus, HistoryRequest, PriceSource, SourceError, SourceFuture};
use crate::{PriceHistory, PricePoint, ProviderId, Symbol};

#[derive(Debug, Clone)]
enum Scripted {
    History(Vec<PricePoint>),
    Failure(SourceError),
}

/// Deterministic in-memory source for offline runs and tests.
///
/// Scripted tickers answer with exactly what was configured (clipped to the
/// requested range). Other tickers get a synthetic weekday series seeded by
/// the ticker text, or an empty history when synthesis is disabled.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    scripted: HashMap<Symbol, Scripted>,
    synthesize: bool,
    calls: Arc<AtomicUsize>,
}

impl FixtureSource {
    /// Source that only knows scripted tickers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source that invents a plausible series for any unscripted ticker.
    pub fn synthetic() -> Self {
        Self {
            synthesize: true,
            ..Self::default()
        }
    }

    pub fn with_history(mut self, symbol: Symbol, points: Vec<PricePoint>) -> Self {
        self.scripted.insert(symbol, Scripted::History(points));
        self
    }

    /// Scripted ticker with closes on consecutive calendar days starting at `start`.
    pub fn with_closes(self, symbol: Symbol, start: Date, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .zip(0_i64..)
            .filter_map(|(close, offset)| {
                let date = start.checked_add(Duration::days(offset))?;
                PricePoint::new(date, *close).ok()
            })
            .collect();
        self.with_history(symbol, points)
    }

    pub fn with_empty(self, symbol: Symbol) -> Self {
        self.with_history(symbol, Vec::new())
    }

    pub fn with_failure(mut self, symbol: Symbol, error: SourceError) -> Self {
        self.scripted.insert(symbol, Scripted::Failure(error));
        self
    }

    /// Number of `history` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
        match self.scripted.get(&req.symbol) {
            Some(Scripted::Failure(error)) => Err(error.clone()),
            Some(Scripted::History(points)) => {
                let clipped = points
                    .iter()
                    .copied()
                    .filter(|point| req.range.contains(point.date))
                    .collect();
                Ok(PriceHistory::new(req.symbol.clone(), clipped))
            }
            None if self.synthesize => Ok(synthesize(req)),
            None => Ok(PriceHistory::empty(req.symbol.clone())),
        }
    }
}

impl PriceSource for FixtureSource {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> SourceFuture<'a, Result<PriceHistory, SourceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.respond(&req);
        Box::pin(async move { response })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}

fn synthesize(req: &HistoryRequest) -> PriceHistory {
    let seed = symbol_seed(&req.symbol);
    let base = 20.0 + (seed % 3_000) as f64 / 10.0;

    let mut points = Vec::new();
    let mut date = req.range.start();
    loop {
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let day = i64::from(date.to_julian_day());
            let wave = ((day + seed as i64 % 97) as f64 / 9.0).sin() * 0.06;
            let drift = ((day % 3_650) as f64 / 3_650.0) * 0.25;
            let close = (base * (1.0 + wave + drift) * 100.0).round() / 100.0;
            if let Ok(point) = PricePoint::new(date, close) {
                points.push(point);
            }
        }
        match date.next_day() {
            Some(next) if next <= req.range.end() => date = next,
            _ => break,
        }
    }

    PriceHistory::new(req.symbol.clone(), points)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DateRange;
    use time::macros::date;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn scripted_history_is_clipped_to_range() {
        let source =
            FixtureSource::new().with_closes(symbol("AAPL"), date!(2024 - 01 - 01), &[1.0, 2.0, 3.0]);
        let range = DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 05)).expect("range");

        let history = source
            .history(HistoryRequest::new(symbol("AAPL"), range))
            .await
            .expect("scripted");
        assert_eq!(history.len(), 2);
        assert_eq!(history.first_close(), Some(2.0));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn synthetic_series_is_deterministic_and_skips_weekends() {
        let source = FixtureSource::synthetic();
        // 2024-06-10 is a Monday; two full weeks.
        let range = DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 23)).expect("range");

        let first = source
            .history(HistoryRequest::new(symbol("PETR4.SA"), range))
            .await
            .expect("synthetic");
        let second = source
            .history(HistoryRequest::new(symbol("PETR4.SA"), range))
            .await
            .expect("synthetic");

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
        assert!(first.points().iter().all(|point| point.close > 0.0));
    }

    #[tokio::test]
    async fn unscripted_ticker_is_empty_without_synthesis() {
        let source = FixtureSource::new();
        let range = DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 14)).expect("range");
        let history = source
            .history(HistoryRequest::new(symbol("ZZZZ"), range))
            .await
            .expect("empty");
        assert!(history.is_empty());
    }
}
