//! # Stocknav Core
//!
//! Symbol resolution, price-history transforms, forecasting and view
//! orchestration for the stocknav dashboard.
//!
//! ## Overview
//!
//! Every view runs the same linear pipeline:
//!
//! - **Symbol directory**: company name → ticker, loaded once from CSV
//! - **Fetcher**: per-symbol daily history from a [`DataSource`] adapter
//! - **Return normalizer**: cumulative relative returns anchored at zero
//! - **Forecast framer**: `(ds, y)` rows handed to a [`forecast::ForecastModel`]
//! - **Views**: Comparison, Real-Time, Prediction and About reports
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart API and CSV-directory adapters |
//! | [`chart`] | Serializable chart specifications |
//! | [`circuit_breaker`] | Upstream failure guard |
//! | [`config`] | Navigator configuration and wiring |
//! | [`data_source`] | Adapter trait and request types |
//! | [`directory`] | Company-name → ticker directory |
//! | [`domain`] | Validated domain models |
//! | [`envelope`] | Output envelope with metadata |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Multi-symbol history fetch |
//! | [`forecast`] | Forecast framing and the additive model |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`retry`] | Retry policy and backoff |
//! | [`returns`] | Relative returns and date alignment |
//! | [`source`] | Provider identifiers |
//! | [`views`] | View orchestration and session state |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stocknav_core::config::NavigatorConfig;
//! use stocknav_core::views::{comparison, Session, ViewOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = NavigatorConfig::default().load_context()?;
//!     let session = Session::default();
//!     let companies = vec![String::from("Apple Inc."), String::from("Microsoft Corporation")];
//!
//!     match comparison::run(&ctx, &session, &companies, Default::default()).await {
//!         ViewOutcome::Rendered(report) => println!("{} traces", report.relative_returns.traces.len()),
//!         ViewOutcome::Warning(message) => eprintln!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Adapters return [`SourceError`]; the pipeline speaks [`PipelineError`],
//! and views turn any of them into a single warning:
//!
//! ```rust
//! use stocknav_core::PipelineError;
//!
//! let error = PipelineError::EmptySelection;
//! assert_eq!(error.code(), "pipeline.empty_selection");
//! ```

pub mod adapters;
pub mod chart;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod directory;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod http_client;
pub mod retry;
pub mod returns;
pub mod source;
pub mod views;

// Adapter implementations
pub use adapters::{CsvDirAdapter, YahooAdapter, YahooMode};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::{NavigatorConfig, NavigatorConfigBuilder};

// Data source trait and types
pub use data_source::{
    DataSource, HealthState, HealthStatus, HistoryRequest, SourceError, SourceErrorKind,
    SourceFuture,
};

// Symbol directory
pub use directory::{DirectoryError, Resolution, SymbolDirectory};

// Domain models
pub use domain::{
    DateRange, IncompleteRow, PriceBar, PriceField, PriceSeries, RelativeReturnSeries, ReturnPoint, Symbol,
    SymbolEntry, TradingDate, UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{CoreError, PipelineError, ValidationError};

// Fetching
pub use fetcher::{FetchBatch, Fetcher};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient};

// Retry logic
pub use retry::{Backoff, RetryPolicy};

// Source identifiers
pub use source::ProviderId;
