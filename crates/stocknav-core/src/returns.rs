//! Relative-return normalization and date alignment across symbols.
//!
//! Returns are computed per symbol on that symbol's own rows, then laid out
//! on the union of all dates. Missing observations stay `None`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{PriceField, PriceSeries, RelativeReturnSeries, ReturnPoint, Symbol, TradingDate};

/// Step-over-step fractional change; index 0 is `0.0`.
///
/// A zero or non-finite previous value contributes a `0.0` step instead of
/// an infinite or NaN one.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let step = match i.checked_sub(1).map(|prev| values[prev]) {
            Some(prev) if prev.is_finite() && prev != 0.0 && value.is_finite() => {
                value / prev - 1.0
            }
            _ => 0.0,
        };
        out.push(step);
    }
    out
}

/// Compounds step changes: `Π(1 + pct) - 1`, starting at exactly `0.0`.
pub fn cumulative(pct: &[f64]) -> Vec<f64> {
    let mut growth = 1.0;
    pct.iter()
        .enumerate()
        .map(|(i, step)| {
            if i == 0 {
                return 0.0;
            }
            growth *= 1.0 + step;
            growth - 1.0
        })
        .collect()
}

/// Relative return of the adjusted close.
pub fn normalize(series: &PriceSeries) -> RelativeReturnSeries {
    normalize_field(series, PriceField::AdjClose)
}

pub fn normalize_field(series: &PriceSeries, field: PriceField) -> RelativeReturnSeries {
    let values = series.values(field);
    let returns = cumulative(&pct_change(&values));
    RelativeReturnSeries {
        symbol: series.symbol.clone(),
        points: series
            .dates()
            .zip(returns)
            .map(|(date, value)| ReturnPoint { date, value })
            .collect(),
    }
}

/// One symbol's values on the table's shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedColumn {
    pub symbol: Symbol,
    pub values: Vec<Option<f64>>,
}

impl AlignedColumn {
    /// Present observations only, paired with their dates.
    pub fn observed<'a>(
        &'a self,
        dates: &'a [TradingDate],
    ) -> impl Iterator<Item = (TradingDate, f64)> + 'a {
        dates
            .iter()
            .zip(&self.values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
    }
}

/// Multi-symbol table keyed by the ascending union of dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    pub dates: Vec<TradingDate>,
    pub columns: Vec<AlignedColumn>,
}

impl AlignedTable {
    /// Builds the table from per-symbol `(date, value)` points. Column order
    /// follows input order; a symbol with no points gets an all-`None` column.
    pub fn from_points<I, P>(columns: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, P)>,
        P: IntoIterator<Item = (TradingDate, f64)>,
    {
        let keyed = columns
            .into_iter()
            .map(|(symbol, points)| (symbol, points.into_iter().collect::<BTreeMap<_, _>>()))
            .collect::<Vec<_>>();

        let dates = keyed
            .iter()
            .flat_map(|(_, points)| points.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let columns = keyed
            .into_iter()
            .map(|(symbol, points)| AlignedColumn {
                symbol,
                values: dates.iter().map(|date| points.get(date).copied()).collect(),
            })
            .collect();

        Self { dates, columns }
    }

    pub fn column(&self, symbol: &Symbol) -> Option<&AlignedColumn> {
        self.columns.iter().find(|column| &column.symbol == symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Aligns one raw price field across symbols.
pub fn align<'a>(series: impl IntoIterator<Item = &'a PriceSeries>, field: PriceField) -> AlignedTable {
    AlignedTable::from_points(series.into_iter().map(|s| {
        (
            s.symbol.clone(),
            s.bars()
                .iter()
                .map(|bar| (bar.date, bar.field(field)))
                .collect::<Vec<_>>(),
        )
    }))
}

/// Aligns already-normalized relative returns.
pub fn align_returns<'a>(
    returns: impl IntoIterator<Item = &'a RelativeReturnSeries>,
) -> AlignedTable {
    AlignedTable::from_points(returns.into_iter().map(|r| {
        (
            r.symbol.clone(),
            r.points
                .iter()
                .map(|p| (p.date, p.value))
                .collect::<Vec<_>>(),
        )
    }))
}

pub fn adjusted_close_table<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> AlignedTable {
    align(series, PriceField::AdjClose)
}

pub fn volume_table<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> AlignedTable {
    align(series, PriceField::Volume)
}
