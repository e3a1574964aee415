use std::time::Instant;

use stocknav_core::views::{realtime, Session, View, ViewContext};

use super::CommandResult;
use crate::cli::RealtimeArgs;
use crate::error::CliError;

pub async fn run(
    args: &RealtimeArgs,
    ctx: &ViewContext,
    session: &mut Session,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let outcome = realtime::run(
        ctx,
        session,
        args.company.as_deref(),
        args.search,
        args.chart.into(),
    )
    .await;

    Ok(
        CommandResult::from_outcome(View::RealTime, outcome, |_| Vec::new(), ctx.fetcher.provider())?
            .with_latency(started),
    )
}
