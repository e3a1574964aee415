use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{DataSource, HealthState, HealthStatus, HistoryRequest, SourceError, SourceFuture};
use crate::{IncompleteRow, PriceBar, PriceSeries, ProviderId, TradingDate};

/// Reads `<dir>/<SYMBOL>.csv` files in the Yahoo download layout:
/// `Date,Open,High,Low,Close,Adj Close,Volume`.
#[derive(Debug, Clone)]
pub struct CsvDirAdapter {
    dir: PathBuf,
}

impl CsvDirAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, req: &HistoryRequest) -> PathBuf {
        self.dir.join(format!("{}.csv", req.symbol))
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Adj Close", default)]
    adj_close: Option<String>,
    #[serde(rename = "Volume", default)]
    volume: Option<String>,
}

enum ParsedRow {
    Bar(PriceBar),
    Incomplete(IncompleteRow),
}

impl CsvRow {
    /// `None` only when the date itself is unusable.
    fn parse(&self) -> Option<ParsedRow> {
        let date = TradingDate::parse(&self.date).ok()?;
        Some(match self.bar(date) {
            Some(bar) => ParsedRow::Bar(bar),
            None => ParsedRow::Incomplete(IncompleteRow::new(date, number(&self.close))),
        })
    }

    fn bar(&self, date: TradingDate) -> Option<PriceBar> {
        let open = number(&self.open)?;
        let high = number(&self.high)?;
        let low = number(&self.low)?;
        let close = number(&self.close)?;
        let adj_close = match self.adj_close.as_deref() {
            Some(raw) if !raw.trim().is_empty() => number(raw)?,
            _ => close,
        };
        let volume = self
            .volume
            .as_deref()
            .and_then(number)
            .map_or(0, |v| v.max(0.0) as u64);
        PriceBar::new(date, open, high, low, close, adj_close, volume).ok()
    }
}

fn number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_rows(req: &HistoryRequest, content: &str) -> Result<PriceSeries, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut bars = Vec::new();
    let mut incomplete = Vec::new();
    let mut undated = 0_usize;
    for row in reader.deserialize::<CsvRow>() {
        let row = row.map_err(|e| {
            SourceError::internal(format!("malformed csv for {}: {e}", req.symbol))
        })?;
        match row.parse() {
            Some(ParsedRow::Bar(bar)) if req.range.contains(bar.date) => bars.push(bar),
            Some(ParsedRow::Incomplete(row)) if req.range.contains(row.date) => incomplete.push(row),
            Some(_) => {}
            None => undated += 1,
        }
    }

    if !incomplete.is_empty() || undated > 0 {
        debug!(
            symbol = %req.symbol,
            incomplete = incomplete.len(),
            undated,
            "csv rows with missing fields"
        );
    }

    PriceSeries::new(req.symbol.clone(), bars)
        .and_then(|series| series.with_incomplete(incomplete))
        .map_err(|e| SourceError::internal(format!("{}: {e}", req.symbol)))
}

impl DataSource for CsvDirAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Csv
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> SourceFuture<'a, Result<PriceSeries, SourceError>> {
        Box::pin(async move {
            let path = self.path_for(&req);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no csv for symbol");
                    return Ok(PriceSeries::empty(req.symbol));
                }
                Err(error) => {
                    return Err(SourceError::unavailable(format!(
                        "failed to read {}: {error}",
                        path.display()
                    )))
                }
            };
            parse_rows(&req, &content)
        })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move {
            if tokio::fs::metadata(&self.dir).await.is_ok_and(|meta| meta.is_dir()) {
                HealthStatus::healthy()
            } else {
                HealthStatus::new(HealthState::Unhealthy, false)
            }
        })
    }
}
