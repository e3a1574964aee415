use stocknav_core::views::{about, View, ViewContext};

use super::CommandResult;
use crate::error::CliError;

pub fn run(ctx: &ViewContext) -> Result<CommandResult, CliError> {
    let data = serde_json::to_value(about::run())?;
    Ok(CommandResult::ok(data, vec![ctx.fetcher.provider()]).with_view(View::About))
}
