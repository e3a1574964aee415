use serde::{Deserialize, Serialize};
use tracing::info;

use super::{note, TermNote, ViewContext, ViewOutcome, Session};
use crate::chart::{ChartKind, ChartSpec};
use crate::returns::{self, AlignedTable};
use crate::{PipelineError, RelativeReturnSeries, SymbolEntry};

pub const SELECT_ASSET_WARNING: &str = "Please select at least one asset to compare.";

pub const NOTES: [TermNote; 3] = [
    note(
        "Relative Return",
        "The return of an asset compared to a benchmark or another asset.",
    ),
    note(
        "Closing Price",
        "The price of a stock at the end of the trading day.",
    ),
    note(
        "Volume",
        "The total number of shares traded during the trading day.",
    ),
];

/// Chart styles offered by the Comparison view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonChart {
    #[default]
    Line,
    Area,
    Bar,
}

impl From<ComparisonChart> for ChartKind {
    fn from(value: ComparisonChart) -> Self {
        match value {
            ComparisonChart::Line => Self::Line,
            ComparisonChart::Area => Self::Area,
            ComparisonChart::Bar => Self::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub companies: Vec<SymbolEntry>,
    pub relative_returns: ChartSpec,
    pub closing_price: ChartSpec,
    pub volume: ChartSpec,
    pub raw_returns: AlignedTable,
    pub notes: Vec<TermNote>,
    pub warnings: Vec<String>,
}

/// Relative-return, closing-price and volume charts for every selected
/// company over `session.range`.
pub async fn run(
    ctx: &ViewContext,
    session: &Session,
    companies: &[String],
    chart: ComparisonChart,
) -> ViewOutcome<ComparisonReport> {
    if companies.iter().all(|name| name.trim().is_empty()) {
        return ViewOutcome::warning(SELECT_ASSET_WARNING);
    }

    let resolution = ctx.directory.resolve_all(
        companies
            .iter()
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty()),
    );
    let mut warnings = resolution
        .unresolved
        .iter()
        .map(|company| {
            PipelineError::UnresolvedSymbol {
                company: company.clone(),
            }
            .to_string()
        })
        .collect::<Vec<_>>();
    if resolution.resolved.is_empty() {
        return ViewOutcome::warning(warnings.join(" "));
    }

    let symbols = resolution.symbols();
    let batch = match ctx.fetcher.fetch(&symbols, &session.range).await {
        Ok(batch) => batch,
        Err(error) => return error.into(),
    };
    warnings.extend(batch.warnings.iter().cloned());

    let series = symbols
        .iter()
        .filter_map(|symbol| batch.get(symbol))
        .collect::<Vec<_>>();
    let relative = series
        .iter()
        .map(|s| returns::normalize(s))
        .collect::<Vec<RelativeReturnSeries>>();

    let kind = ChartKind::from(chart);
    let names = resolution
        .resolved
        .iter()
        .map(|entry| entry.company_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let raw_returns = returns::align_returns(&relative);

    info!(
        companies = resolution.resolved.len(),
        dates = raw_returns.dates.len(),
        chart = %kind,
        "rendered comparison"
    );

    ViewOutcome::Rendered(ComparisonReport {
        relative_returns: ChartSpec::from_table(
            format!("Relative Returns for {names}"),
            kind,
            "Relative Return",
            &raw_returns,
        ),
        closing_price: ChartSpec::from_table(
            format!("Closing Price of {names}"),
            kind,
            "Adjusted Close",
            &returns::adjusted_close_table(series.iter().copied()),
        ),
        volume: ChartSpec::from_table(
            format!("Volume of {names}"),
            kind,
            "Volume",
            &returns::volume_table(series.iter().copied()),
        ),
        raw_returns,
        companies: resolution.resolved,
        notes: NOTES.to_vec(),
        warnings,
    })
}
