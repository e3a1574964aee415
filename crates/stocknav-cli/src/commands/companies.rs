use serde_json::json;
use stocknav_core::views::ViewContext;

use super::CommandResult;
use crate::error::CliError;

pub fn run(ctx: &ViewContext) -> Result<CommandResult, CliError> {
    let data = json!({
        "count": ctx.directory.len(),
        "companies": ctx.directory.entries(),
    });
    Ok(CommandResult::ok(data, vec![ctx.fetcher.provider()]))
}
