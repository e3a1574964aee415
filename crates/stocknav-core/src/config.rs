//! Runtime configuration for the navigator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::adapters::{CsvDirAdapter, YahooAdapter};
use crate::data_source::DataSource;
use crate::directory::SymbolDirectory;
use crate::fetcher::Fetcher;
use crate::retry::RetryPolicy;
use crate::views::ViewContext;
use crate::{CoreError, DateRange, ProviderId, TradingDate, ValidationError};

const MAX_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 10;

/// Everything needed to build a [`ViewContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorConfig {
    /// Two-column `Company Name,Symbol` CSV.
    pub symbols_path: PathBuf,
    pub provider: ProviderId,
    /// Directory of `<SYMBOL>.csv` exports; required for the `csv` provider.
    pub data_dir: Option<PathBuf>,
    pub default_start: TradingDate,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            symbols_path: PathBuf::from("data/companies.csv"),
            provider: ProviderId::Yahoo,
            data_dir: None,
            default_start: DateRange::default_window().start(),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn builder() -> NavigatorConfigBuilder {
        NavigatorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbols_path.as_os_str().is_empty() {
            return Err(ValidationError::Config(
                "symbols path cannot be empty".to_owned(),
            ));
        }
        if self.provider == ProviderId::Csv && self.data_dir.is_none() {
            return Err(ValidationError::Config(
                "the csv provider needs a data directory".to_owned(),
            ));
        }
        if self.request_timeout.is_zero() || self.request_timeout > MAX_TIMEOUT {
            return Err(ValidationError::Config(format!(
                "request timeout must be between 1ms and {}s",
                MAX_TIMEOUT.as_secs()
            )));
        }
        if self.retry.max_retries > MAX_RETRIES {
            return Err(ValidationError::Config(format!(
                "at most {MAX_RETRIES} retries are allowed"
            )));
        }
        Ok(())
    }

    /// `default_start` through `end` (today when absent).
    pub fn range(
        &self,
        start: Option<TradingDate>,
        end: Option<TradingDate>,
    ) -> Result<DateRange, ValidationError> {
        let start = start.unwrap_or(self.default_start);
        let end = end.unwrap_or_else(|| TradingDate::today().max(start));
        DateRange::new(start, end)
    }

    pub fn build_source(&self) -> Arc<dyn DataSource> {
        match self.provider {
            ProviderId::Yahoo => Arc::new(
                YahooAdapter::live()
                    .with_retry(self.retry.clone())
                    .with_timeout_ms(self.request_timeout.as_millis() as u64),
            ),
            ProviderId::Mock => Arc::new(YahooAdapter::synthetic()),
            ProviderId::Csv => Arc::new(CsvDirAdapter::new(
                self.data_dir.clone().unwrap_or_default(),
            )),
        }
    }

    /// Loads the symbol directory and wires the configured source.
    pub fn load_context(&self) -> Result<ViewContext, CoreError> {
        self.validate()?;
        let directory = SymbolDirectory::from_path(&self.symbols_path)?;
        debug!(
            provider = %self.provider,
            companies = directory.len(),
            "navigator context ready"
        );
        Ok(ViewContext::new(
            Arc::new(directory),
            Fetcher::new(self.build_source()),
        ))
    }
}

#[derive(Debug, Default)]
pub struct NavigatorConfigBuilder {
    symbols_path: Option<PathBuf>,
    provider: Option<ProviderId>,
    data_dir: Option<PathBuf>,
    default_start: Option<TradingDate>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl NavigatorConfigBuilder {
    pub fn symbols_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.symbols_path = Some(path.into());
        self
    }

    pub fn provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn default_start(mut self, start: TradingDate) -> Self {
        self.default_start = Some(start);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<NavigatorConfig, ValidationError> {
        let defaults = NavigatorConfig::default();
        let config = NavigatorConfig {
            symbols_path: self.symbols_path.unwrap_or(defaults.symbols_path),
            provider: self.provider.unwrap_or(defaults.provider),
            data_dir: self.data_dir.or(defaults.data_dir),
            default_start: self.default_start.unwrap_or(defaults.default_start),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            retry: self.retry.unwrap_or(defaults.retry),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_provider_requires_data_dir() {
        let err = NavigatorConfig::builder()
            .provider(ProviderId::Csv)
            .build()
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::Config(_)));

        let config = NavigatorConfig::builder()
            .provider(ProviderId::Csv)
            .data_dir("prices")
            .build()
            .expect("valid");
        assert_eq!(config.build_source().id(), ProviderId::Csv);
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(NavigatorConfig::builder()
            .request_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn range_defaults_to_configured_start() {
        let config = NavigatorConfig::default();
        let end = TradingDate::parse("2021-06-30").expect("date");
        let range = config.range(None, Some(end)).expect("range");
        assert_eq!(range.start().to_string(), "2021-01-01");

        let err = config
            .range(Some(end), TradingDate::parse("2021-01-01").ok())
            .expect_err("inverted range");
        assert!(matches!(err, ValidationError::InvalidDateRange { .. }));
    }

    #[test]
    fn load_context_reads_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("companies.csv");
        std::fs::write(&path, "Company Name,Symbol\nApple Inc.,AAPL\n").expect("write");

        let ctx = NavigatorConfig::builder()
            .symbols_path(&path)
            .provider(ProviderId::Mock)
            .build()
            .expect("config")
            .load_context()
            .expect("context");
        assert_eq!(ctx.directory.len(), 1);
        assert_eq!(ctx.fetcher.provider(), ProviderId::Mock);
    }
}
