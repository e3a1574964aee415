use std::time::Instant;

use stocknav_core::views::{prediction, Session, View, ViewContext};

use super::CommandResult;
use crate::cli::PredictArgs;
use crate::error::CliError;

pub async fn run(
    args: &PredictArgs,
    ctx: &ViewContext,
    session: &Session,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let outcome = prediction::run(ctx, session, args.company.as_deref()).await;

    Ok(CommandResult::from_outcome(
        View::Prediction,
        outcome,
        |report| report.warnings.clone(),
        ctx.fetcher.provider(),
    )?
    .with_latency(started))
}
