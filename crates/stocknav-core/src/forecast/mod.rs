//! # Forecasting
//!
//! Frames a closing-price history as `(ds, y)` rows and projects it
//! [`FORECAST_HORIZON_DAYS`] calendar days forward.
//!
//! | Item | Role |
//! |------|------|
//! | [`ForecastFrame`] | Validated `(ds, y)` input, `ds` strictly ascending |
//! | [`ForecastModel`] | Unfitted model; `fit` consumes a frame |
//! | [`FittedModel`] | `predict(horizon_days)` over history plus future |
//! | [`AdditiveModel`] | Linear trend + weekly/yearly Fourier seasonality |
//!
//! ```rust,ignore
//! use stocknav_core::forecast::{AdditiveModel, FittedModel, ForecastFrame, ForecastModel, FORECAST_HORIZON_DAYS};
//!
//! let framed = ForecastFrame::from_series(&series);
//! let forecast = AdditiveModel::default()
//!     .fit(&framed.frame)?
//!     .predict(FORECAST_HORIZON_DAYS)?;
//! println!("{:?}", forecast.tail(5));
//! ```

mod additive;
mod frame;
mod model;

use thiserror::Error;

pub use additive::{AdditiveModel, FittedAdditive};
pub use frame::{FramedSeries, ForecastFrame, ForecastRow};
pub use model::{FittedModel, Forecast, ForecastModel, ForecastPoint};

/// Days projected past the last observation. Fixed, not user-configurable.
pub const FORECAST_HORIZON_DAYS: u32 = 365;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("forecast needs at least {required} rows, got {rows}")]
    InsufficientData { rows: usize, required: usize },

    #[error("frame row {index} is not after the previous row")]
    UnorderedFrame { index: usize },

    #[error("frame row {index} has a non-finite value")]
    NonFiniteValue { index: usize },

    #[error("least-squares fit failed: {0}")]
    Solve(String),

    #[error("interval width must be between 0 and 1, got {width}")]
    InvalidIntervalWidth { width: f64 },

    #[error("forecast horizon runs past the supported calendar")]
    DateOverflow,
}
