use serde::{Deserialize, Serialize};

use super::{ForecastError, ForecastFrame};
use crate::TradingDate;

/// One forecast row, in the same units as the frame's `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: TradingDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
    pub is_future: bool,
}

/// History rows followed by one row per future calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub rows: Vec<ForecastPoint>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn history(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.rows.iter().filter(|row| !row.is_future)
    }

    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.rows.iter().filter(|row| row.is_future)
    }

    /// Last `n` rows (fewer if the forecast is shorter).
    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

/// Unfitted forecasting model.
pub trait ForecastModel {
    type Fitted: FittedModel;

    fn name(&self) -> &str;

    fn fit(&self, frame: &ForecastFrame) -> Result<Self::Fitted, ForecastError>;
}

/// Model fitted to one frame.
pub trait FittedModel {
    /// Rows for every fitted `ds`, then `horizon_days` daily rows past the
    /// last one.
    fn predict(&self, horizon_days: u32) -> Result<Forecast, ForecastError>;
}
