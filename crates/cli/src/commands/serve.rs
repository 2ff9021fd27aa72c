use std::time::Duration;

use super::CommandContext;
use crate::cli::ServeArgs;
use crate::config::check_deadline;
use crate::error::{CliError, Result};
use crate::server::{self, AppState};

pub async fn execute(args: &ServeArgs, ctx: &CommandContext) -> Result<()> {
	let deadline = Duration::from_millis(args.deadline_ms);
	check_deadline(&ctx.loaded.config, deadline)?;

	let state = AppState::new(ctx.orchestrator()?, deadline);
	let listener = server::bind(&args.host, args.port).await.map_err(CliError::Anyhow)?;
	server::serve(listener, state).await.map_err(CliError::Anyhow)
}
