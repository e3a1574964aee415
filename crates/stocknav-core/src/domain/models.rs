use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate, ValidationError};

/// Company display name paired with its exchange ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub company_name: String,
    pub symbol: Symbol,
}

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PriceBar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("adj_close", adj_close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        })
    }

    /// Field accessor used when projecting a series onto one column.
    pub fn field(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close,
            PriceField::Volume => self.volume as f64,
        }
    }
}

/// Named column of a [`PriceBar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

/// A source row that could not become a [`PriceBar`]: a `null` or invalid
/// field. `close` is kept when it alone is usable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncompleteRow {
    pub date: TradingDate,
    pub close: Option<f64>,
}

impl IncompleteRow {
    pub fn new(date: TradingDate, close: Option<f64>) -> Self {
        let close = close.filter(|value| value.is_finite() && *value >= 0.0);
        Self { date, close }
    }
}

/// Daily price history for one symbol, dates strictly ascending.
///
/// Rows with missing fields are kept apart in `incomplete` so consumers that
/// need only one column can still use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    bars: Vec<PriceBar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    incomplete: Vec<IncompleteRow>,
}

impl PriceSeries {
    /// Sorts bars by date and rejects duplicate dates.
    pub fn new(symbol: Symbol, mut bars: Vec<PriceBar>) -> Result<Self, ValidationError> {
        bars.sort_by_key(|bar| bar.date);
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValidationError::DuplicateDate {
                date: pair[0].date.to_string(),
            });
        }
        Ok(Self {
            symbol,
            bars,
            incomplete: Vec::new(),
        })
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
            incomplete: Vec::new(),
        }
    }

    /// Attaches incomplete rows; a date may appear once across bars and rows.
    pub fn with_incomplete(mut self, mut rows: Vec<IncompleteRow>) -> Result<Self, ValidationError> {
        rows.sort_by_key(|row| row.date);
        let clash = rows
            .windows(2)
            .find(|pair| pair[0].date == pair[1].date)
            .map(|pair| pair[0].date)
            .or_else(|| {
                rows.iter()
                    .map(|row| row.date)
                    .find(|date| self.bars.binary_search_by_key(date, |bar| bar.date).is_ok())
            });
        if let Some(date) = clash {
            return Err(ValidationError::DuplicateDate {
                date: date.to_string(),
            });
        }
        self.incomplete = rows;
        Ok(self)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn incomplete(&self) -> &[IncompleteRow] {
        &self.incomplete
    }

    /// `(date, close)` for every row, complete or not, in date order.
    pub fn closes(&self) -> Vec<(TradingDate, Option<f64>)> {
        let mut closes = self
            .bars
            .iter()
            .map(|bar| (bar.date, Some(bar.close)))
            .chain(self.incomplete.iter().map(|row| (row.date, row.close)))
            .collect::<Vec<_>>();
        closes.sort_by_key(|(date, _)| *date);
        closes
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = TradingDate> + '_ {
        self.bars.iter().map(|bar| bar.date)
    }

    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.field(field)).collect()
    }

    pub fn first_date(&self) -> Option<TradingDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<TradingDate> {
        self.bars.last().map(|bar| bar.date)
    }
}

/// One point of a cumulative relative-return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: TradingDate,
    pub value: f64,
}

/// Cumulative change from the first observation; first value is exactly 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeReturnSeries {
    pub symbol: Symbol,
    pub points: Vec<ReturnPoint>,
}

impl RelativeReturnSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> PriceBar {
        let date = TradingDate::parse(date).expect("date");
        PriceBar::new(date, close, close, close, close, close, 100).expect("bar")
    }

    #[test]
    fn rejects_inverted_high_low() {
        let date = TradingDate::parse("2024-01-02").expect("date");
        let err = PriceBar::new(date, 10.0, 9.0, 11.0, 10.0, 10.0, 5).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarRange));
    }

    #[test]
    fn rejects_nan_close() {
        let date = TradingDate::parse("2024-01-02").expect("date");
        let err =
            PriceBar::new(date, 10.0, 11.0, 9.0, f64::NAN, 10.0, 5).expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NonFiniteValue { field: "close" }
        ));
    }

    #[test]
    fn series_sorts_by_date() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let series = PriceSeries::new(
            symbol,
            vec![bar("2024-01-03", 2.0), bar("2024-01-02", 1.0)],
        )
        .expect("series");
        assert_eq!(series.values(PriceField::Close), vec![1.0, 2.0]);
    }

    #[test]
    fn closes_merge_incomplete_rows_in_date_order() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let series = PriceSeries::new(
            symbol,
            vec![bar("2024-01-02", 1.0), bar("2024-01-05", 4.0)],
        )
        .expect("series")
        .with_incomplete(vec![
            IncompleteRow::new(TradingDate::parse("2024-01-04").expect("date"), None),
            IncompleteRow::new(TradingDate::parse("2024-01-03").expect("date"), Some(2.0)),
        ])
        .expect("incomplete");

        let closes = series.closes();
        assert_eq!(series.len(), 2);
        assert_eq!(
            closes.iter().map(|(_, close)| *close).collect::<Vec<_>>(),
            vec![Some(1.0), Some(2.0), None, Some(4.0)]
        );
    }

    #[test]
    fn incomplete_row_may_not_share_a_bar_date() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let err = PriceSeries::new(symbol, vec![bar("2024-01-02", 1.0)])
            .expect("series")
            .with_incomplete(vec![IncompleteRow::new(
                TradingDate::parse("2024-01-02").expect("date"),
                None,
            )])
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::DuplicateDate { .. }));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let symbol = Symbol::parse("AAPL").expect("symbol");
        let err = PriceSeries::new(
            symbol,
            vec![bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)],
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::DuplicateDate { .. }));
    }
}
