use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutReport {
    pub title: &'static str,
    pub paragraphs: Vec<&'static str>,
    pub version: &'static str,
}

pub fn run() -> AboutReport {
    AboutReport {
        title: "About StockNavigator",
        paragraphs: vec![
            "StockNavigator is a place to monitor stock performance, look up recent prices and \
             project future prices. Compare the relative returns of several companies, chart a \
             single company as candlesticks or lines, and forecast a year ahead with an additive \
             trend and seasonality model.",
            "Prices come from the Yahoo Finance chart API or from a directory of CSV exports. \
             Every view prints a JSON envelope, so the charts can be drawn by any plotting tool.",
            "Forecasts are statistical projections of past closing prices. They are not \
             investment advice.",
        ],
        version: env!("CARGO_PKG_VERSION"),
    }
}
