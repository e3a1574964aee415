mod about;
mod companies;
mod compare;
mod predict;
mod realtime;
pub mod shell;

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use stocknav_core::config::NavigatorConfig;
use stocknav_core::views::{Session, View, ViewContext, ViewOutcome};
use stocknav_core::{Envelope, EnvelopeError, ProviderId, RetryPolicy};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub view: Option<View>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            view: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    /// Renders a view outcome. A warning outcome becomes a `<view>.warning`
    /// error with null data; report-level warnings land in `meta.warnings`.
    pub fn from_outcome<T: Serialize>(
        view: View,
        outcome: ViewOutcome<T>,
        report_warnings: impl FnOnce(&T) -> Vec<String>,
        source: ProviderId,
    ) -> Result<Self, CliError> {
        let result = match outcome {
            ViewOutcome::Rendered(report) => {
                let warnings = report_warnings(&report);
                Self::ok(serde_json::to_value(&report)?, vec![source]).with_warnings(warnings)
            }
            ViewOutcome::Warning(message) => {
                let error = EnvelopeError::new(format!("{}.warning", view.as_str()), message.clone())?
                    .with_source(source);
                Self::ok(Value::Null, vec![source])
                    .with_warning(message)
                    .with_errors(vec![error])
            }
        };
        Ok(result.with_view(view))
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, started: Instant) -> Self {
        self.latency_ms = elapsed_ms(started.elapsed());
        self
    }

    pub fn into_envelope(self) -> Result<Envelope<Value>, CliError> {
        let Self {
            data,
            view,
            warnings,
            errors,
            latency_ms,
            source_chain,
        } = self;

        let mut metadata = Metadata::new(source_chain, latency_ms)?;
        metadata.view = view;
        for warning in warnings {
            metadata.push_warning(warning);
        }
        let meta = metadata.into_envelope_meta()?;

        Envelope::with_errors(meta, data, errors).map_err(CliError::from)
    }
}

pub fn navigator_config(cli: &Cli) -> Result<NavigatorConfig, CliError> {
    let mut builder = NavigatorConfig::builder()
        .symbols_path(&cli.symbols)
        .provider(cli.source.into())
        .request_timeout(Duration::from_millis(cli.timeout_ms))
        .retry(RetryPolicy {
            max_retries: cli.retries,
            ..RetryPolicy::default()
        });
    if let Some(dir) = &cli.data_dir {
        builder = builder.data_dir(dir);
    }
    builder.build().map_err(CliError::from)
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let config = navigator_config(cli)?;
    let ctx = config.load_context()?;
    let mut session = Session::new(config.range(cli.start, cli.end)?);

    let command_result = dispatch(&cli.command, &ctx, &mut session).await?;
    command_result.into_envelope()
}

async fn dispatch(
    command: &Command,
    ctx: &ViewContext,
    session: &mut Session,
) -> Result<CommandResult, CliError> {
    match command {
        Command::Compare(args) => compare::run(args, ctx, session).await,
        Command::Realtime(args) => realtime::run(args, ctx, session).await,
        Command::Predict(args) => predict::run(args, ctx, session).await,
        Command::About => about::run(ctx),
        Command::Companies => companies::run(ctx),
        Command::Shell => Err(CliError::Command(String::from(
            "the shell runs interactively and has no single result",
        ))),
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
