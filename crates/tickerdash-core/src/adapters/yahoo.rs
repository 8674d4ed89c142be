use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::data_source::{
    HealthState, HealthStatus, HistoryRequest, PriceSource, SourceError, SourceFuture,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{DateRange, PriceHistory, PricePoint, ProviderId, Symbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_REQUESTS_PER_SECOND: u32 = 4;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const UNHEALTHY_AFTER_FAILURES: u32 = 3;

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Daily close history from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    timeout_ms: u64,
    limiter: Arc<DefaultDirectRateLimiter>,
    consecutive_failures: Arc<AtomicU32>,
    rate_limited: Arc<AtomicBool>,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new())).with_auth(env_auth())
    }
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::None,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            limiter: Arc::new(RateLimiter::direct(per_second(DEFAULT_REQUESTS_PER_SECOND))),
            consecutive_failures: Arc::new(AtomicU32::new(0)),
            rate_limited: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Pace outgoing calls. Pacing waits for budget; it never drops a call.
    pub fn with_requests_per_second(mut self, requests_per_second: NonZeroU32) -> Self {
        self.limiter = Arc::new(RateLimiter::direct(Quota::per_second(requests_per_second)));
        self
    }

    fn chart_url(&self, symbol: &Symbol, range: DateRange) -> Result<String, SourceError> {
        let period1 = day_start_unix(range.start());
        let period2 = range
            .end()
            .next_day()
            .map(day_start_unix)
            .ok_or_else(|| SourceError::invalid_request("date range ends at the last representable day"))?;

        Ok(format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            period1,
            period2
        ))
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.rate_limited.store(false, Ordering::Relaxed);
    }

    fn record_failure(&self, rate_limited: bool) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        if rate_limited {
            self.rate_limited.store(true, Ordering::Relaxed);
        }
    }

    async fn fetch_history(&self, req: &HistoryRequest) -> Result<PriceHistory, SourceError> {
        let url = self.chart_url(&req.symbol, req.range)?;

        self.limiter.until_ready().await;
        tracing::debug!(symbol = %req.symbol, range = %req.range, "requesting yahoo chart");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            self.record_failure(false);
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        match response.status {
            404 => {
                // Unknown and delisted tickers answer 404 with a "Not Found" chart error.
                self.record_success();
                tracing::debug!(symbol = %req.symbol, "yahoo has no chart for symbol");
                return Ok(PriceHistory::empty(req.symbol.clone()));
            }
            429 => {
                self.record_failure(true);
                return Err(SourceError::rate_limited("yahoo returned status 429"));
            }
            status if !response.is_success() => {
                self.record_failure(false);
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {status}"
                )));
            }
            _ => {}
        }

        let parsed: YahooChartResponse = serde_json::from_str(&response.body).map_err(|e| {
            self.record_failure(false);
            SourceError::upstream(format!("failed to parse yahoo chart: {e}"))
        })?;

        let history = normalize_chart(&req.symbol, req.range, parsed)?;
        self.record_success();
        Ok(history)
    }
}

impl PriceSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> SourceFuture<'a, Result<PriceHistory, SourceError>> {
        Box::pin(async move { self.fetch_history(&req).await })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move {
            let failures = self.consecutive_failures.load(Ordering::Relaxed);
            let state = match failures {
                0 => HealthState::Healthy,
                n if n < UNHEALTHY_AFTER_FAILURES => HealthState::Degraded,
                _ => HealthState::Unhealthy,
            };
            HealthStatus::new(state, !self.rate_limited.load(Ordering::Relaxed))
        })
    }
}

// ============================================================================
// Yahoo Chart API Response Structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    /// Exchange offset from UTC in seconds; bars are stamped at session open.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn normalize_chart(
    symbol: &Symbol,
    range: DateRange,
    response: YahooChartResponse,
) -> Result<PriceHistory, SourceError> {
    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Ok(PriceHistory::empty(symbol.clone()));
        }
        return Err(SourceError::upstream(format!(
            "yahoo chart error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(PriceHistory::empty(symbol.clone()));
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceHistory::empty(symbol.clone()));
    };

    let offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let indicators = result.indicators.unwrap_or_default();
    let closes = select_closes(indicators, timestamps.len())?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close.filter(|value| value.is_finite()) else {
            continue;
        };
        let date = OffsetDateTime::from_unix_timestamp(ts.saturating_add(offset))
            .map_err(|e| SourceError::upstream(format!("invalid chart timestamp {ts}: {e}")))?
            .date();
        if !range.contains(date) {
            continue;
        }
        let point = PricePoint::new(date, close)
            .map_err(|e| SourceError::upstream(e.to_string()))?;
        points.push(point);
    }

    Ok(PriceHistory::new(symbol.clone(), points))
}

/// Adjusted closes when present and aligned with the timestamps, raw closes otherwise.
///
/// Raw closes that do not line up with the timestamps are rejected rather
/// than paired with the wrong dates.
fn select_closes(
    indicators: YahooChartIndicators,
    expected: usize,
) -> Result<Vec<Option<f64>>, SourceError> {
    let YahooChartIndicators { quote, adjclose } = indicators;
    if let Some(adjusted) = adjclose.into_iter().next() {
        if adjusted.adjclose.len() == expected {
            return Ok(adjusted.adjclose);
        }
    }
    let closes = quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();
    if closes.len() != expected {
        return Err(SourceError::upstream(format!(
            "chart has {expected} timestamps but {} closes",
            closes.len()
        )));
    }
    Ok(closes)
}

fn day_start_unix(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn per_second(requests: u32) -> Quota {
    Quota::per_second(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN))
}

/// Cookie override for environments where Yahoo demands a consent cookie.
fn env_auth() -> HttpAuth {
    std::env::var("YAHOO_COOKIE")
        .ok()
        .filter(|cookie| !cookie.trim().is_empty())
        .map(HttpAuth::Cookie)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use time::macros::date;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn responding(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn request(symbol: &str) -> HistoryRequest {
        HistoryRequest::new(
            Symbol::parse(symbol).expect("valid symbol"),
            DateRange::new(date!(2024 - 01 - 02), date!(2024 - 01 - 04)).expect("valid range"),
        )
    }

    // 2024-01-02/03/04 14:30 UTC, i.e. 09:30 in New York (gmtoffset -18000).
    const CHART_BODY: &str = r#"{"chart":{"result":[{
        "meta":{"currency":"USD","symbol":"AAPL","gmtoffset":-18000},
        "timestamp":[1704205800,1704292200,1704378600],
        "indicators":{
            "quote":[{"close":[185.64,184.25,null]}],
            "adjclose":[{"adjclose":[184.9,183.5,null]}]
        }}],"error":null}}"#;

    #[tokio::test]
    async fn parses_adjusted_closes_and_skips_nulls() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))));
        let adapter = YahooAdapter::new(client.clone());

        let history = adapter.history(request("aapl")).await.expect("chart should parse");

        assert_eq!(history.len(), 2);
        assert_eq!(history.points()[0].date, date!(2024 - 01 - 02));
        assert_eq!(history.first_close(), Some(184.9));
        assert_eq!(history.last_close(), Some(183.5));

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("/v8/finance/chart/AAPL?"));
        assert!(requests[0].url.contains("period1=1704153600"));
        assert!(requests[0].url.contains("period2=1704412800"));
    }

    #[tokio::test]
    async fn falls_back_to_raw_close_without_adjusted_series() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},
            "timestamp":[1704205800],
            "indicators":{"quote":[{"close":[10.5]}]}}],"error":null}}"#;
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(body))));
        let adapter = YahooAdapter::new(client);

        let history = adapter.history(request("MSFT")).await.expect("chart should parse");
        assert_eq!(history.last_close(), Some(10.5));
    }

    #[tokio::test]
    async fn misaligned_close_series_is_an_upstream_error() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{"close":[10.5,10.7]}]}}],"error":null}}"#;
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(body))));
        let adapter = YahooAdapter::new(client);

        let error = adapter.history(request("MSFT")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Upstream);
    }

    #[tokio::test]
    async fn not_found_maps_to_empty_history() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::new(404, body))));
        let adapter = YahooAdapter::new(client);

        let history = adapter.history(request("ZZZZ")).await.expect("not found is not an error");
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_is_classified_and_reflected_in_health() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::new(
            429,
            "Too Many Requests",
        ))));
        let adapter = YahooAdapter::new(client);

        let error = adapter.history(request("AAPL")).await.expect_err("429 must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);

        let health = adapter.health().await;
        assert_eq!(health.state, HealthState::Degraded);
        assert!(!health.rate_available);
    }

    #[tokio::test]
    async fn repeated_transport_failures_mark_source_unhealthy() {
        let client = Arc::new(RecordingHttpClient::responding(Err(HttpError::new(
            "upstream timeout",
        ))));
        let adapter = YahooAdapter::new(client.clone());

        for _ in 0..3 {
            let error = adapter.history(request("AAPL")).await.expect_err("call should fail");
            assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        }

        // Each call reaches the transport exactly once: no internal retries.
        assert_eq!(client.recorded_requests().len(), 3);
        assert_eq!(adapter.health().await.state, HealthState::Unhealthy);
    }

    #[tokio::test]
    async fn malformed_body_is_an_upstream_error() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            "<html>consent</html>",
        ))));
        let adapter = YahooAdapter::new(client);

        let error = adapter.history(request("AAPL")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Upstream);
    }

    #[tokio::test]
    async fn cookie_auth_and_symbol_encoding_reach_the_transport() {
        let client = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::ok_json(
            r#"{"chart":{"result":[],"error":null}}"#,
        ))));
        let adapter = YahooAdapter::new(client.clone())
            .with_auth(HttpAuth::Cookie(String::from("B=secure-cookie")))
            .with_base_url("https://chart.example.test/");

        let history = adapter.history(request("^BVSP")).await.expect("empty result");
        assert!(history.is_empty());

        let requests = client.recorded_requests();
        assert!(requests[0]
            .url
            .starts_with("https://chart.example.test/v8/finance/chart/%5EBVSP?"));
        assert_eq!(
            requests[0].headers.get("cookie").map(String::as_str),
            Some("B=secure-cookie")
        );
    }
}
