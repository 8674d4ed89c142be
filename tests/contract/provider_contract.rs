//! Contract every `PriceSource` must honor, checked against each adapter.
//!
//! Yahoo runs against a scripted transport so no network is touched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::macros::date;
use tickerdash_core::{
    DateRange, FixtureSource, HealthState, HistoryRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, PriceSource, ProviderId, Symbol, YahooAdapter,
};

/// Serves a fixed chart for `AAPL` and a Yahoo-style 404 for anything else.
struct ScriptedYahoo;

// 2024-01-02..2024-01-05 sessions at 09:30 New York, plus a bar outside the
// requested range that the adapter must drop.
const AAPL_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"currency":"USD","symbol":"AAPL","gmtoffset":-18000},
    "timestamp":[1704205800,1704292200,1704378600,1704465000],
    "indicators":{
        "quote":[{"close":[185.64,184.25,181.91,181.18]}],
        "adjclose":[{"adjclose":[184.9,183.5,181.2,180.4]}]
    }}],"error":null}}"#;

const NOT_FOUND: &str =
    r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

impl HttpClient for ScriptedYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = if request.url.contains("/chart/AAPL?") {
            HttpResponse::ok_json(AAPL_CHART)
        } else {
            HttpResponse::new(404, NOT_FOUND)
        };
        Box::pin(async move { Ok(response) })
    }
}

struct ProviderCase {
    id: ProviderId,
    source: Arc<dyn PriceSource>,
}

fn range() -> DateRange {
    DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 04)).expect("valid range")
}

fn provider_cases() -> Vec<ProviderCase> {
    let aapl = Symbol::parse("AAPL").expect("valid symbol");
    vec![
        ProviderCase {
            id: ProviderId::Fixture,
            source: Arc::new(FixtureSource::new().with_closes(
                aapl,
                date!(2024 - 01 - 01),
                &[186.0, 184.9, 183.5, 181.2, 180.4],
            )),
        },
        ProviderCase {
            id: ProviderId::Yahoo,
            source: Arc::new(YahooAdapter::new(Arc::new(ScriptedYahoo))),
        },
    ]
}

#[tokio::test]
async fn history_is_ascending_within_range_and_tagged_with_symbol() {
    for case in provider_cases() {
        assert_eq!(case.source.id(), case.id);

        let request = HistoryRequest::new(Symbol::parse("aapl").expect("valid"), range());
        let history = case
            .source
            .history(request)
            .await
            .unwrap_or_else(|error| panic!("provider '{}' history failed: {error}", case.id));

        assert_eq!(history.symbol.as_str(), "AAPL", "provider '{}'", case.id);
        assert_eq!(history.len(), 3, "provider '{}': point count", case.id);
        assert!(
            history
                .points()
                .windows(2)
                .all(|pair| pair[0].date < pair[1].date),
            "provider '{}': dates must be strictly ascending",
            case.id
        );
        assert!(
            history.points().iter().all(|point| range().contains(point.date)),
            "provider '{}': points must stay inside the range",
            case.id
        );
        assert_eq!(history.first_close(), Some(184.9), "provider '{}'", case.id);
        assert_eq!(history.last_close(), Some(181.2), "provider '{}'", case.id);
    }
}

#[tokio::test]
async fn unknown_symbol_yields_empty_history_not_error() {
    for case in provider_cases() {
        let request = HistoryRequest::new(Symbol::parse("ZZZZ").expect("valid"), range());
        let history = case
            .source
            .history(request)
            .await
            .unwrap_or_else(|error| panic!("provider '{}' should not fail: {error}", case.id));

        assert!(history.is_empty(), "provider '{}'", case.id);
    }
}

#[tokio::test]
async fn successful_calls_leave_source_healthy() {
    for case in provider_cases() {
        let request = HistoryRequest::new(Symbol::parse("AAPL").expect("valid"), range());
        case.source.history(request).await.expect("history");

        let health = case.source.health().await;
        assert_eq!(health.state, HealthState::Healthy, "provider '{}'", case.id);
        assert!(health.rate_available, "provider '{}'", case.id);
    }
}
