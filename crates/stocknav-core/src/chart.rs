//! Serializable chart specifications.
//!
//! A [`ChartSpec`] describes what to draw, not how: the consumer of the JSON
//! output picks the plotting library.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::returns::AlignedTable;
use crate::{PriceSeries, TradingDate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Candlestick,
}

impl ChartKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Bar => "bar",
            Self::Candlestick => "candlestick",
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "bar" => Ok(Self::Bar),
            "candlestick" | "candle" => Ok(Self::Candlestick),
            other => Err(ValidationError::Config(format!("unknown chart kind '{other}'"))),
        }
    }
}

/// Y data of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceData {
    Values {
        y: Vec<f64>,
    },
    Ohlc {
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
}

/// One named series of a chart; `x` and every y vector have equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<TradingDate>,
    #[serde(flatten)]
    pub data: TraceData,
}

impl Trace {
    pub fn values(name: impl Into<String>, points: impl IntoIterator<Item = (TradingDate, f64)>) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self {
            name: name.into(),
            x,
            data: TraceData::Values { y },
        }
    }

    pub fn ohlc(name: impl Into<String>, series: &PriceSeries) -> Self {
        let bars = series.bars();
        Self {
            name: name.into(),
            x: series.dates().collect(),
            data: TraceData::Ohlc {
                open: bars.iter().map(|bar| bar.open).collect(),
                high: bars.iter().map(|bar| bar.high).collect(),
                low: bars.iter().map(|bar| bar.low).collect(),
                close: bars.iter().map(|bar| bar.close).collect(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub y_label: String,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, kind: ChartKind, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            y_label: y_label.into(),
            traces: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    /// One trace per column holding only that column's observed points, so
    /// a symbol without data becomes an empty trace rather than a missing one.
    pub fn from_table(
        title: impl Into<String>,
        kind: ChartKind,
        y_label: impl Into<String>,
        table: &AlignedTable,
    ) -> Self {
        let traces = table
            .columns
            .iter()
            .map(|column| Trace::values(column.symbol.as_str(), column.observed(&table.dates)))
            .collect();
        Self {
            traces,
            ..Self::new(title, kind, y_label)
        }
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|trace| trace.name == name)
    }
}
