use serde::{Deserialize, Serialize};
use tracing::info;

use super::{note, SearchState, Session, TermNote, ViewContext, ViewOutcome};
use crate::chart::{ChartKind, ChartSpec, Trace};
use crate::{PipelineError, PriceBar, PriceField, Symbol};

pub const SEARCH_WARNING: &str = "Click Search to view the company's stock price.";
pub const SELECT_COMPANY_WARNING: &str = "Please select a company to view its stock price.";

pub const NOTES: [TermNote; 6] = [
    note(
        "Candlestick Chart",
        "A type of financial chart used to describe price movements of a security, derivative, or currency.",
    ),
    note(
        "Line Chart",
        "A type of chart which displays information as a series of data points called 'markers' connected by straight line segments.",
    ),
    note(
        "Open",
        "The price at which a stock first trades upon the opening of an exchange on a trading day.",
    ),
    note(
        "Close",
        "The final price at which a stock is traded on a given trading day.",
    ),
    note(
        "High",
        "The highest price at which a stock traded during a period.",
    ),
    note(
        "Low",
        "The lowest price at which a stock traded during a period.",
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealTimeChart {
    #[default]
    Candlestick,
    Line,
}

impl From<RealTimeChart> for ChartKind {
    fn from(value: RealTimeChart) -> Self {
        match value {
            RealTimeChart::Candlestick => Self::Candlestick,
            RealTimeChart::Line => Self::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealTimeReport {
    pub company: String,
    pub symbol: Symbol,
    pub bars: Vec<PriceBar>,
    pub chart: ChartSpec,
    pub notes: Vec<TermNote>,
}

/// Price chart for one company, gated on the session's search state.
///
/// `search` is the Search trigger: when set, the session moves to
/// [`SearchState::Searched`] and stays there for later calls.
pub async fn run(
    ctx: &ViewContext,
    session: &mut Session,
    company: Option<&str>,
    search: bool,
    chart: RealTimeChart,
) -> ViewOutcome<RealTimeReport> {
    if search {
        session.mark_searched();
    }
    if session.search_state() == SearchState::NotSearched {
        return ViewOutcome::warning(SEARCH_WARNING);
    }

    let Some(company) = company.map(str::trim).filter(|name| !name.is_empty()) else {
        return ViewOutcome::warning(SELECT_COMPANY_WARNING);
    };
    let symbol = match ctx.directory.resolve(company) {
        Ok(symbol) => symbol.clone(),
        Err(_) => {
            return PipelineError::UnresolvedSymbol {
                company: company.to_owned(),
            }
            .into()
        }
    };

    let series = match ctx.fetcher.fetch_one(&symbol, &session.range).await {
        Ok(series) => series,
        Err(error) => return error.into(),
    };

    let spec = match chart {
        RealTimeChart::Candlestick => {
            ChartSpec::new(format!("Candlestick Chart of {company}"), ChartKind::Candlestick, "Stock Price")
                .with_trace(Trace::ohlc("market data", &series))
        }
        RealTimeChart::Line => {
            let open = series.values(PriceField::Open);
            let close = series.values(PriceField::Close);
            ChartSpec::new(format!("Line Chart of {company}"), ChartKind::Line, "Stock Price")
                .with_trace(Trace::values("stock_open", series.dates().zip(open)))
                .with_trace(Trace::values("stock_close", series.dates().zip(close)))
        }
    };

    info!(company, symbol = %symbol, rows = series.len(), chart = %spec.kind, "rendered real-time view");

    ViewOutcome::Rendered(RealTimeReport {
        company: company.to_owned(),
        symbol,
        bars: series.bars().to_vec(),
        chart: spec,
        notes: NOTES.to_vec(),
    })
}
