//! In-memory data source and fixtures shared by the integration suites.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stocknav_core::data_source::{HealthStatus, HistoryRequest, SourceError, SourceFuture};
use stocknav_core::views::ViewContext;
use stocknav_core::{
    DataSource, DateRange, Fetcher, PriceBar, PriceSeries, ProviderId, Symbol, SymbolDirectory,
    TradingDate,
};

pub const COMPANIES_CSV: &str = "\
Company Name,Symbol
Apple Inc.,AAPL
Microsoft Corporation,MSFT
\"Tesla, Inc.\",TSLA
";

/// Serves fixed bars per symbol, filtered to the requested range.
#[derive(Default)]
pub struct StaticSource {
    bars: HashMap<Symbol, Vec<PriceBar>>,
    failing: HashSet<Symbol>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(sym(symbol), bars);
        self
    }

    pub fn with_closes(self, symbol: &str, closes: &[(&str, f64)]) -> Self {
        let bars = closes.iter().map(|(day, close)| bar(day, *close)).collect();
        self.with_bars(symbol, bars)
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(sym(symbol));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataSource for StaticSource {
    fn id(&self) -> ProviderId {
        ProviderId::Mock
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> SourceFuture<'a, Result<PriceSeries, SourceError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&req.symbol) {
                return Err(SourceError::unavailable("upstream down"));
            }
            let bars = self
                .bars
                .get(&req.symbol)
                .map(|bars| {
                    bars.iter()
                        .filter(|bar| req.range.contains(bar.date))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            PriceSeries::new(req.symbol, bars).map_err(|error| SourceError::internal(error.to_string()))
        })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async { HealthStatus::healthy() })
    }
}

pub fn sym(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid symbol")
}

pub fn date(value: &str) -> TradingDate {
    TradingDate::parse(value).expect("valid date")
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end)).expect("valid range")
}

pub fn bar(day: &str, close: f64) -> PriceBar {
    PriceBar::new(date(day), close, close * 1.01, close * 0.99, close, close, 1_000).expect("valid bar")
}

/// `count` consecutive weekday bars from `start` with closes from `close_at(i)`.
pub fn weekday_bars(start: &str, count: usize, close_at: impl Fn(usize) -> f64) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(count);
    let mut day = date(start);
    while bars.len() < count {
        if !day.is_weekend() {
            let close = close_at(bars.len());
            bars.push(
                PriceBar::new(day, close, close * 1.01, close * 0.99, close, close, 1_000)
                    .expect("valid bar"),
            );
        }
        day = day.next_day().expect("date in range");
    }
    bars
}

pub fn directory() -> SymbolDirectory {
    SymbolDirectory::from_reader(COMPANIES_CSV.as_bytes()).expect("valid directory")
}

pub fn context(source: StaticSource) -> ViewContext {
    ViewContext::new(Arc::new(directory()), Fetcher::new(Arc::new(source)))
}
