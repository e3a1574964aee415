use std::time::Instant;

use stocknav_core::views::{comparison, Session, View, ViewContext};

use super::CommandResult;
use crate::cli::CompareArgs;
use crate::error::CliError;

pub async fn run(
    args: &CompareArgs,
    ctx: &ViewContext,
    session: &Session,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let outcome = comparison::run(ctx, session, &args.companies, args.chart.into()).await;

    Ok(CommandResult::from_outcome(
        View::Comparison,
        outcome,
        |report| report.warnings.clone(),
        ctx.fetcher.provider(),
    )?
    .with_latency(started))
}
