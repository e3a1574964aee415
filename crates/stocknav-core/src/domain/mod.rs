//! # Domain Models
//!
//! Canonical domain types for stocknav market data.
//!
//! ## Overview
//!
//! All models validate their invariants at construction time, so a value
//! that exists is a value the pipeline can use:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated exchange ticker |
//! | [`TradingDate`] | Calendar date of a daily observation |
//! | [`DateRange`] | Inclusive, validated `start <= end` window |
//! | [`PriceBar`] | One day of OHLCV + adjusted close |
//! | [`PriceSeries`] | Date-ascending bars for one symbol |
//! | [`IncompleteRow`] | Source row with a missing field, close kept if usable |
//! | [`RelativeReturnSeries`] | Cumulative return anchored at zero |
//! | [`SymbolEntry`] | Company name paired with its ticker |
//! | [`UtcDateTime`] | UTC timestamp for envelope metadata |
//!
//! ```rust,ignore
//! use stocknav_core::{PriceBar, TradingDate, ValidationError};
//!
//! let day = TradingDate::parse("2024-01-02")?;
//! let bar = PriceBar::new(day, 100.0, 105.0, 95.0, 102.0, 101.5, 1_000)?;
//!
//! // high < low is rejected
//! let invalid = PriceBar::new(day, 100.0, 95.0, 105.0, 102.0, 101.5, 1_000);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod date;
mod models;
mod symbol;
mod timestamp;

pub use date::{DateRange, TradingDate};
pub use models::{
    IncompleteRow, PriceBar, PriceField, PriceSeries, RelativeReturnSeries, ReturnPoint, SymbolEntry,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
