//! Contract every `DataSource` adapter must honor: rows inside the
//! requested range, strictly ascending dates, and an empty series (not an
//! error) for symbols the provider does not know.

#[path = "../support/mod.rs"]
mod support;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use stocknav_core::{
    CsvDirAdapter, DataSource, DateRange, HealthState, HistoryRequest, HttpClient, HttpError,
    HttpRequest, HttpResponse, ProviderId, YahooAdapter, YahooMode,
};
use support::{range, sym, StaticSource};

const AAPL_CSV: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,187.15,188.44,183.89,185.64,185.15,82488700
2024-01-03,184.22,185.88,183.43,184.25,183.77,58414500
2024-01-04,182.15,183.09,180.88,181.91,181.43,71983600
2024-01-05,181.99,182.76,180.17,181.18,180.70,62303300
";

async fn assert_history_contract(source: &dyn DataSource, symbol: &str, window: DateRange) {
    let series = source
        .history(HistoryRequest::new(sym(symbol), window))
        .await
        .expect("history");

    assert_eq!(series.symbol, sym(symbol));
    assert!(series.bars().iter().all(|bar| window.contains(bar.date)));
    assert!(series.bars().windows(2).all(|pair| pair[0].date < pair[1].date));
}

/// Answers every request with 404, the chart API's reply for unknown tickers.
struct NotFoundClient;

impl HttpClient for NotFoundClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async { Ok(HttpResponse::with_status(404, "{}")) })
    }
}

// =============================================================================
// Synthetic Yahoo
// =============================================================================

#[tokio::test]
async fn synthetic_yahoo_honors_the_history_contract() {
    let adapter = YahooAdapter::synthetic();

    assert_eq!(adapter.mode(), YahooMode::Synthetic);
    assert_eq!(adapter.id(), ProviderId::Mock);
    assert_history_contract(&adapter, "AAPL", range("2024-01-01", "2024-03-31")).await;
    assert_eq!(adapter.health().await.state, HealthState::Healthy);
}

#[tokio::test]
async fn live_yahoo_maps_not_found_to_an_empty_series() {
    let adapter = YahooAdapter::with_http_client(Arc::new(NotFoundClient));

    let series = adapter
        .history(HistoryRequest::new(sym("ZZZZ"), range("2024-01-01", "2024-01-31")))
        .await
        .expect("unknown ticker is not an error");

    assert_eq!(adapter.id(), ProviderId::Yahoo);
    assert!(series.is_empty());
}

// =============================================================================
// CSV directory
// =============================================================================

#[tokio::test]
async fn csv_directory_honors_the_history_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("AAPL.csv"), AAPL_CSV).expect("write fixture");
    let adapter = CsvDirAdapter::new(dir.path());

    assert_history_contract(&adapter, "AAPL", range("2024-01-03", "2024-01-04")).await;
    let series = adapter
        .history(HistoryRequest::new(sym("AAPL"), range("2024-01-03", "2024-01-04")))
        .await
        .expect("history");
    assert_eq!(series.len(), 2);
    assert_eq!(adapter.health().await.state, HealthState::Healthy);
}

#[tokio::test]
async fn csv_directory_returns_empty_series_for_missing_symbol() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = CsvDirAdapter::new(dir.path());

    let series = adapter
        .history(HistoryRequest::new(sym("MSFT"), range("2024-01-01", "2024-01-31")))
        .await
        .expect("missing file is not an error");

    assert!(series.is_empty());
}

#[tokio::test]
async fn csv_directory_is_unhealthy_when_directory_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = CsvDirAdapter::new(dir.path().join("absent"));

    assert_eq!(adapter.health().await.state, HealthState::Unhealthy);
}

// =============================================================================
// Test double
// =============================================================================

#[tokio::test]
async fn static_source_honors_the_history_contract() {
    let source = StaticSource::new().with_closes(
        "MSFT",
        &[("2024-01-05", 3.0), ("2024-01-02", 1.0), ("2024-02-01", 9.0)],
    );

    assert_history_contract(&source, "MSFT", range("2024-01-01", "2024-01-31")).await;
}
