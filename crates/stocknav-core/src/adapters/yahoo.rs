use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::data_source::{
    DataSource, HealthState, HealthStatus, HistoryRequest, SourceError, SourceFuture,
};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryPolicy;
use crate::{
    IncompleteRow, PriceBar, PriceSeries, ProviderId, Symbol, TradingDate, UtcDateTime,
    ValidationError,
};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Where [`YahooAdapter`] gets its bars from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YahooMode {
    /// Calls the chart endpoint through the configured [`HttpClient`].
    Live,
    /// Generates a deterministic weekday series per symbol without network access.
    Synthetic,
}

/// Daily history from the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooAdapter {
    mode: YahooMode,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    timeout_ms: u64,
    base_url: String,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::synthetic()
    }
}

impl YahooAdapter {
    pub fn synthetic() -> Self {
        Self {
            mode: YahooMode::Synthetic,
            http_client: Arc::new(ReqwestHttpClient::new()),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            retry: RetryPolicy::default(),
            timeout_ms: 10_000,
            base_url: CHART_BASE_URL.to_owned(),
        }
    }

    pub fn live() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            mode: YahooMode::Live,
            http_client,
            ..Self::synthetic()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub const fn mode(&self) -> YahooMode {
        self.mode
    }

    /// Chart URL for `req`; `period2` is exclusive upstream, so it points at
    /// the day after `end`.
    pub fn chart_url(&self, req: &HistoryRequest) -> String {
        let period1 = req.range.start().unix_midnight();
        let period2 = req
            .range
            .end()
            .next_day()
            .unwrap_or(req.range.end())
            .unix_midnight();
        format!(
            "{}/{}?period1={period1}&period2={period2}&interval=1d&events=history&includeAdjustedClose=true",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
        )
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        match self.mode {
            YahooMode::Live => ProviderId::Yahoo,
            YahooMode::Synthetic => ProviderId::Mock,
        }
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> SourceFuture<'a, Result<PriceSeries, SourceError>> {
        Box::pin(async move {
            match self.mode {
                YahooMode::Live => self.fetch_live_history(&req).await,
                YahooMode::Synthetic => synthetic_history(&req),
            }
        })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move {
            match self.circuit_breaker.state() {
                CircuitState::Closed => HealthStatus::healthy(),
                CircuitState::HalfOpen => HealthStatus::new(HealthState::Degraded, true),
                CircuitState::Open => HealthStatus::new(HealthState::Unhealthy, false),
            }
        })
    }
}

impl YahooAdapter {
    async fn fetch_live_history(&self, req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
        let url = self.chart_url(req);
        let mut attempt = 0;

        loop {
            if !self.circuit_breaker.allow_request() {
                return Err(SourceError::unavailable("yahoo circuit breaker is open"));
            }

            debug!(symbol = %req.symbol, attempt, "requesting yahoo chart");
            let request = HttpRequest::get(&url)
                .with_header("referer", "https://finance.yahoo.com/")
                .with_timeout_ms(self.timeout_ms);

            let retry_error = match self.http_client.execute(request).await {
                Err(error) => {
                    self.circuit_breaker.record_failure();
                    let source_error =
                        SourceError::unavailable(format!("yahoo transport error: {error}"));
                    if !self.retry.should_retry_error(&error) {
                        return Err(source_error);
                    }
                    source_error
                }
                Ok(response) if response.status == 404 => {
                    self.circuit_breaker.record_success();
                    debug!(symbol = %req.symbol, "yahoo has no chart for symbol");
                    return Ok(PriceSeries::empty(req.symbol.clone()));
                }
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    return parse_chart(&req.symbol, req, &response.body);
                }
                Ok(response) => {
                    self.circuit_breaker.record_failure();
                    let source_error = if response.status == 429 {
                        SourceError::rate_limited("yahoo returned status 429")
                    } else {
                        SourceError::unavailable(format!(
                            "yahoo returned status {}",
                            response.status
                        ))
                    };
                    if !self.retry.should_retry_status(response.status) {
                        return Err(source_error);
                    }
                    source_error
                }
            };

            if attempt >= self.retry.max_retries {
                return Err(retry_error);
            }
            let delay = self.retry.delay_for_attempt(attempt);
            warn!(symbol = %req.symbol, attempt, ?delay, error = %retry_error, "retrying yahoo chart");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn parse_chart(
    symbol: &Symbol,
    req: &HistoryRequest,
    body: &str,
) -> Result<PriceSeries, SourceError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        if error.code == "Not Found" || error.description.contains("No data found") {
            return Ok(PriceSeries::empty(symbol.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart error {}: {}",
            error.code, error.description
        )));
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next())
    else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|adj| adj.adjclose)
        .unwrap_or_default();

    // Keyed by date so a trailing intraday duplicate replaces the earlier row.
    let mut bars = BTreeMap::new();
    let mut incomplete = BTreeMap::new();
    for (i, &ts) in timestamps.iter().enumerate() {
        let at = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let date = UtcDateTime::from_unix_timestamp(ts.saturating_add(offset))
            .map_err(validation_to_error)?
            .trading_date();
        if !req.range.contains(date) {
            continue;
        }

        let close = at(&quote.close);
        let bar = match (at(&quote.open), at(&quote.high), at(&quote.low), close) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                let adj_close = at(&adjclose).unwrap_or(close);
                let volume = at(&quote.volume).unwrap_or(0.0).max(0.0) as u64;
                PriceBar::new(date, open, high, low, close, adj_close, volume).ok()
            }
            _ => None,
        };
        match bar {
            Some(bar) => {
                incomplete.remove(&date);
                bars.insert(date, bar);
            }
            None => {
                bars.remove(&date);
                incomplete.insert(date, IncompleteRow::new(date, close));
            }
        }
    }

    if !incomplete.is_empty() {
        debug!(symbol = %symbol, incomplete = incomplete.len(), "yahoo rows with missing fields");
    }

    PriceSeries::new(symbol.clone(), bars.into_values().collect())
        .and_then(|series| series.with_incomplete(incomplete.into_values().collect()))
        .map_err(validation_to_error)
}

fn synthetic_history(req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
    let seed = symbol_seed(&req.symbol);
    let base = 40.0 + (seed % 360) as f64;
    let phase = (seed % 628) as f64 / 100.0;
    let epoch = TradingDate::from_ymd(2000, 1, 3)
        .map_err(validation_to_error)?
        .julian_day();

    let bars = req
        .range
        .days()
        .filter(|date| !date.is_weekend())
        .map(|date| {
            let t = f64::from(date.julian_day() - epoch);
            let close = (base + 0.015 * t + 6.0 * (t / 9.0 + phase).sin() + 2.5 * (t / 31.0).sin())
                .max(1.0);
            let open = (close - 0.6 * (t / 3.0 + phase).sin()).max(0.5);
            let high = open.max(close) + 0.9;
            let low = (open.min(close) - 0.9).max(0.1);
            let volume = 900_000 + (seed % 997) * 1_000 + (t as i64).rem_euclid(17) as u64 * 15_000;
            PriceBar::new(date, open, high, low, close, close, volume)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(validation_to_error)?;

    PriceSeries::new(req.symbol.clone(), bars).map_err(validation_to_error)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitBreakerConfig;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpErrorKind, HttpResponse};
    use crate::DateRange;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned responses in order and records every request.
    struct ScriptedHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests.lock().expect("lock").push(request);
            let next = self
                .responses
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or_else(|| Err(HttpError::new(HttpErrorKind::Other, "script exhausted")));
            Box::pin(async move { next })
        }
    }

    fn request(symbol: &str, start: &str, end: &str) -> HistoryRequest {
        HistoryRequest::new(
            Symbol::parse(symbol).expect("symbol"),
            DateRange::new(
                TradingDate::parse(start).expect("start"),
                TradingDate::parse(end).expect("end"),
            )
            .expect("range"),
        )
    }

    // 2024-01-02 and 2024-01-03 14:30 UTC.
    const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"gmtoffset":-18000},
        "timestamp":[1704205800,1704292200,1704378600],
        "indicators":{"quote":[{"open":[187.15,184.22,null],"high":[188.44,185.88,183.0],
        "low":[183.89,183.43,181.0],"close":[185.64,184.25,182.0],
        "volume":[82488700,58414500,1000]}],
        "adjclose":[{"adjclose":[184.94,null,181.2]}]}}],"error":null}}"#;

    fn adapter(client: Arc<ScriptedHttpClient>) -> YahooAdapter {
        YahooAdapter::with_http_client(client)
            .with_retry(RetryPolicy::fixed(Duration::from_millis(1), 2))
    }

    #[tokio::test]
    async fn parses_chart_rows_and_keeps_incomplete_ones_apart() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(
            CHART_BODY,
        ))]));
        let series = adapter(client.clone())
            .history(request("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .expect("history");

        assert_eq!(series.len(), 2);
        let bars = series.bars();
        assert_eq!(bars[0].date.to_string(), "2024-01-02");
        assert_eq!(bars[0].adj_close, 184.94);
        assert_eq!(bars[1].adj_close, 184.25, "missing adjclose falls back to close");
        assert_eq!(bars[1].volume, 58_414_500);
        assert_eq!(series.incomplete().len(), 1, "null open keeps only the close");
        assert_eq!(series.incomplete()[0].date.to_string(), "2024-01-04");
        assert_eq!(series.incomplete()[0].close, Some(182.0));

        let url = &client.requests()[0].url;
        assert!(url.contains("/AAPL?period1=1704067200&period2=1706745600"));
        assert!(url.contains("interval=1d"));
        assert!(url.contains("includeAdjustedClose=true"));
    }

    #[tokio::test]
    async fn unknown_symbol_yields_empty_series() {
        let not_found = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(
            404, not_found,
        ))]));
        let series = adapter(client)
            .history(request("NOPE", "2024-01-01", "2024-01-31"))
            .await
            .expect("empty series, not an error");
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::with_status(503, "")),
            Ok(HttpResponse::ok_json(CHART_BODY)),
        ]));
        let series = adapter(client.clone())
            .history(request("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .expect("history after retry");
        assert_eq!(series.len(), 2);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(
            400, "",
        ))]));
        let err = adapter(client.clone())
            .history(request("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Unavailable);
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn circuit_breaker_short_circuits_after_failures() {
        let failures = (0..3)
            .map(|_| Err(HttpError::new(HttpErrorKind::Connect, "refused")))
            .collect();
        let client = Arc::new(ScriptedHttpClient::new(failures));
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(60),
        }));
        let adapter = adapter(client.clone()).with_circuit_breaker(breaker);

        let err = adapter
            .history(request("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .expect_err("must fail");
        assert!(err.retryable());

        let err = adapter
            .history(request("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .expect_err("must short circuit");
        assert!(err.message().contains("circuit breaker"));
        assert_eq!(client.requests().len(), 3);
        assert_eq!(adapter.health().await.state, HealthState::Unhealthy);
    }

    #[tokio::test]
    async fn synthetic_mode_is_deterministic_and_skips_weekends() {
        let adapter = YahooAdapter::synthetic();
        let req = request("MSFT", "2024-01-01", "2024-01-14");
        let first = adapter.history(req.clone()).await.expect("history");
        let second = adapter.history(req).await.expect("history");

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.dates().all(|date| !date.is_weekend()));
    }
}
