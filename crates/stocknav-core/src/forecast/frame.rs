use serde::{Deserialize, Serialize};

use super::ForecastError;
use crate::{PriceSeries, TradingDate};

/// One `(ds, y)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: TradingDate,
    pub y: f64,
}

/// Model input: `ds` strictly ascending, every `y` finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastFrame {
    rows: Vec<ForecastRow>,
}

/// A frame plus how many source rows were unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct FramedSeries {
    pub frame: ForecastFrame,
    pub dropped: usize,
}

impl ForecastFrame {
    pub fn new(rows: Vec<ForecastRow>) -> Result<Self, ForecastError> {
        for (index, row) in rows.iter().enumerate() {
            if !row.y.is_finite() {
                return Err(ForecastError::NonFiniteValue { index });
            }
            if index > 0 && rows[index - 1].ds >= row.ds {
                return Err(ForecastError::UnorderedFrame { index });
            }
        }
        Ok(Self { rows })
    }

    /// Projects `{ds: date, y: close}` over complete and incomplete rows.
    pub fn from_series(series: &PriceSeries) -> FramedSeries {
        Self::from_points(series.closes())
    }

    /// Keeps present, finite values in ascending date order; anything else
    /// is counted in `dropped`.
    pub fn from_points(
        points: impl IntoIterator<Item = (TradingDate, Option<f64>)>,
    ) -> FramedSeries {
        let mut rows: Vec<ForecastRow> = Vec::new();
        let mut dropped = 0;
        for (ds, y) in points {
            let ordered = rows.last().map_or(true, |last| last.ds < ds);
            match y {
                Some(y) if y.is_finite() && ordered => rows.push(ForecastRow { ds, y }),
                _ => dropped += 1,
            }
        }
        FramedSeries {
            frame: Self { rows },
            dropped,
        }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_ds(&self) -> Option<TradingDate> {
        self.rows.first().map(|row| row.ds)
    }

    pub fn last_ds(&self) -> Option<TradingDate> {
        self.rows.last().map(|row| row.ds)
    }
}
