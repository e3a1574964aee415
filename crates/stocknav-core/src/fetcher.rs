use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::data_source::{DataSource, HistoryRequest};
use crate::{DateRange, PipelineError, PriceSeries, ProviderId, Symbol};

/// Per-symbol histories from one fetch, plus what went wrong along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchBatch {
    pub series: BTreeMap<Symbol, PriceSeries>,
    pub warnings: Vec<String>,
}

impl FetchBatch {
    pub fn get(&self, symbol: &Symbol) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    pub fn non_empty(&self) -> usize {
        self.series.values().filter(|series| !series.is_empty()).count()
    }
}

/// Fans a symbol set out over one [`DataSource`].
///
/// Requests run one after another; a symbol that fails is kept as an empty
/// series with a warning so the remaining symbols still render.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn DataSource>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// # Errors
    ///
    /// [`PipelineError::EmptySelection`] for no symbols, and
    /// [`PipelineError::FetchFailure`] when no symbol produced any rows.
    pub async fn fetch(
        &self,
        symbols: &[Symbol],
        range: &DateRange,
    ) -> Result<FetchBatch, PipelineError> {
        if symbols.is_empty() {
            return Err(PipelineError::EmptySelection);
        }

        let mut series = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut failures = Vec::new();

        for symbol in symbols {
            if series.contains_key(symbol) {
                continue;
            }
            let request = HistoryRequest::new(symbol.clone(), *range);
            match self.source.history(request).await {
                Ok(history) => {
                    debug!(
                        provider = %self.source.id(),
                        symbol = %symbol,
                        rows = history.len(),
                        "fetched history"
                    );
                    if history.is_empty() {
                        warnings.push(format!("No price data for {symbol} in the selected range."));
                    }
                    series.insert(symbol.clone(), history);
                }
                Err(error) => {
                    warn!(symbol = %symbol, code = error.code(), error = %error, "history fetch failed");
                    warnings.push(format!("Could not fetch {symbol}: {}", error.message()));
                    failures.push(format!("{symbol}: {}", error.message()));
                    series.insert(symbol.clone(), PriceSeries::empty(symbol.clone()));
                }
            }
        }

        let batch = FetchBatch { series, warnings };
        if batch.non_empty() == 0 {
            let reason = if failures.is_empty() {
                format!("no rows between {} and {}", range.start(), range.end())
            } else {
                failures.join("; ")
            };
            return Err(PipelineError::FetchFailure { reason });
        }
        Ok(batch)
    }

    /// Single-symbol fetch used by the Real-Time and Prediction views.
    pub async fn fetch_one(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<PriceSeries, PipelineError> {
        let mut batch = self.fetch(std::slice::from_ref(symbol), range).await?;
        batch
            .series
            .remove(symbol)
            .ok_or_else(|| PipelineError::FetchFailure {
                reason: format!("{symbol}: missing from batch"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{HealthStatus, SourceError, SourceFuture};
    use crate::{PriceBar, TradingDate};

    struct OneGoodSymbol;

    impl DataSource for OneGoodSymbol {
        fn id(&self) -> ProviderId {
            ProviderId::Mock
        }

        fn history<'a>(
            &'a self,
            req: HistoryRequest,
        ) -> SourceFuture<'a, Result<PriceSeries, SourceError>> {
            Box::pin(async move {
                match req.symbol.as_str() {
                    "GOOD" => {
                        let date = req.range.start();
                        let bar = PriceBar::new(date, 1.0, 1.0, 1.0, 1.0, 1.0, 1)
                            .map_err(|e| SourceError::internal(e.to_string()))?;
                        PriceSeries::new(req.symbol, vec![bar])
                            .map_err(|e| SourceError::internal(e.to_string()))
                    }
                    "DOWN" => Err(SourceError::unavailable("upstream down")),
                    _ => Ok(PriceSeries::empty(req.symbol)),
                }
            })
        }

        fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
            Box::pin(async { HealthStatus::healthy() })
        }
    }

    fn symbols(values: &[&str]) -> Vec<Symbol> {
        values
            .iter()
            .map(|value| Symbol::parse(value).expect("symbol"))
            .collect()
    }

    fn range() -> DateRange {
        let day = TradingDate::parse("2024-01-02").expect("date");
        DateRange::new(day, day).expect("range")
    }

    #[tokio::test]
    async fn failed_symbol_becomes_empty_series_with_warning() {
        let fetcher = Fetcher::new(Arc::new(OneGoodSymbol));
        let batch = fetcher
            .fetch(&symbols(&["GOOD", "DOWN", "GOOD"]), &range())
            .await
            .expect("one symbol succeeded");

        assert_eq!(batch.series.len(), 2);
        assert_eq!(batch.non_empty(), 1);
        assert_eq!(batch.warnings, vec!["Could not fetch DOWN: upstream down"]);
    }

    #[tokio::test]
    async fn all_failed_or_empty_is_fetch_failure() {
        let fetcher = Fetcher::new(Arc::new(OneGoodSymbol));
        let err = fetcher
            .fetch(&symbols(&["DOWN", "VOID"]), &range())
            .await
            .expect_err("nothing usable");
        assert!(matches!(err, PipelineError::FetchFailure { .. }));

        let err = fetcher.fetch(&[], &range()).await.expect_err("empty");
        assert_eq!(err, PipelineError::EmptySelection);
    }
}
