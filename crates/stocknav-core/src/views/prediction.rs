use serde::Serialize;
use tracing::{info, warn};

use super::{note, Session, TermNote, ViewContext, ViewOutcome};
use crate::chart::{ChartKind, ChartSpec, Trace};
use crate::forecast::{
    FittedModel, Forecast, ForecastFrame, ForecastModel, ForecastPoint, FORECAST_HORIZON_DAYS,
};
use crate::{PipelineError, PriceBar, Symbol, TradingDate};

pub const SELECT_COMPANY_WARNING: &str = "Please select a company to predict its stock price.";

/// Rows of the forecast shown as a table.
pub const TAIL_ROWS: usize = 5;

pub const NOTES: [TermNote; 4] = [
    note(
        "Forecast Model",
        "An additive time-series model: a linear trend plus weekly and yearly seasonality, fitted to the daily closing price.",
    ),
    note("Date", "The specific day when the stock data was recorded."),
    note(
        "Close",
        "The final price at which a stock is traded on a given trading day.",
    ),
    note(
        "Forecast Components",
        "The individual contributing elements (trend, weekly, yearly) that make up the forecast.",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub company: String,
    pub symbol: Symbol,
    pub horizon_days: u32,
    pub bars: Vec<PriceBar>,
    pub forecast_tail: Vec<ForecastPoint>,
    pub forecast: ChartSpec,
    pub components: ChartSpec,
    pub dropped_rows: usize,
    pub notes: Vec<TermNote>,
    pub warnings: Vec<String>,
}

/// One-year forecast of the daily close for `company`.
pub async fn run(
    ctx: &ViewContext,
    session: &Session,
    company: Option<&str>,
) -> ViewOutcome<PredictionReport> {
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

    let framed = ForecastFrame::from_series(&series);
    let mut warnings = Vec::new();
    if framed.dropped > 0 {
        let error = PipelineError::MalformedSeries {
            symbol: symbol.clone(),
            dropped: framed.dropped,
        };
        warn!(symbol = %symbol, dropped = framed.dropped, "dropped rows before forecasting");
        warnings.push(error.to_string());
    }

    let forecast = match ctx
        .model
        .fit(&framed.frame)
        .and_then(|fitted| fitted.predict(FORECAST_HORIZON_DAYS))
    {
        Ok(forecast) => forecast,
        Err(error) => return PipelineError::from(error).into(),
    };

    info!(
        company,
        symbol = %symbol,
        model = ctx.model.name(),
        history = framed.frame.len(),
        horizon = FORECAST_HORIZON_DAYS,
        "rendered prediction"
    );

    ViewOutcome::Rendered(PredictionReport {
        forecast: forecast_chart(company, &framed.frame, &forecast),
        components: components_chart(company, &forecast),
        forecast_tail: forecast.tail(TAIL_ROWS).to_vec(),
        company: company.to_owned(),
        symbol,
        horizon_days: FORECAST_HORIZON_DAYS,
        bars: series.bars().to_vec(),
        dropped_rows: framed.dropped,
        notes: NOTES.to_vec(),
        warnings,
    })
}

fn forecast_chart(company: &str, frame: &ForecastFrame, forecast: &Forecast) -> ChartSpec {
    ChartSpec::new(format!("Forecast of {company}"), ChartKind::Line, "Close")
        .with_trace(Trace::values(
            "y",
            frame.rows().iter().map(|row| (row.ds, row.y)),
        ))
        .with_trace(Trace::values("yhat", along(forecast, |row| row.yhat)))
        .with_trace(Trace::values("yhat_lower", along(forecast, |row| row.yhat_lower)))
        .with_trace(Trace::values("yhat_upper", along(forecast, |row| row.yhat_upper)))
}

fn components_chart(company: &str, forecast: &Forecast) -> ChartSpec {
    ChartSpec::new(format!("Forecast components of {company}"), ChartKind::Line, "Contribution")
        .with_trace(Trace::values("trend", along(forecast, |row| row.trend)))
        .with_trace(Trace::values("weekly", along(forecast, |row| row.weekly)))
        .with_trace(Trace::values("yearly", along(forecast, |row| row.yearly)))
}

fn along(
    forecast: &Forecast,
    pick: fn(&ForecastPoint) -> f64,
) -> impl Iterator<Item = (TradingDate, f64)> + '_ {
    forecast.rows.iter().map(move |row| (row.ds, pick(row)))
}
