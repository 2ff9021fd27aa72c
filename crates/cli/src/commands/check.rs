use imagegen::{CheckResponse, TaskTicket};
use tracing::info;

use super::CommandContext;
use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::output::{CheckData, CommandInputs, ResultBuilder, print_result};
use crate::ticket_store::{TicketStore, load_ticket_file};

pub async fn execute(args: &CheckArgs, ctx: &CommandContext) -> Result<()> {
	let (ticket, store) = resolve_ticket(args)?;
	let status = ctx.orchestrator()?.check_ticket(&ticket).await?;
	let terminal = status.is_terminal();
	info!(target = "imagegen", task_id = ticket.task_id(), state = %status.state(), "checked");

	// The session is spent once the task is over.
	let ticket_removed = match store {
		Some(store) if terminal && !args.keep => store.remove(ticket.task_id())?,
		_ => false,
	};

	let result = ResultBuilder::new("check")
		.inputs(CommandInputs {
			task_id: Some(ticket.task_id().to_string()),
			ticket: args.ticket.clone(),
			..Default::default()
		})
		.data(CheckData {
			task_id: ticket.task_id().to_string(),
			status: CheckResponse::from(status),
			terminal,
			ticket_removed,
		})
		.polls(1)
		.build();

	print_result(&result, ctx.format);
	Ok(())
}

/// Loads the ticket, returning the store it came from when it was stored.
///
/// Explicit `--ticket` files belong to the caller and are never deleted.
fn resolve_ticket(args: &CheckArgs) -> Result<(TaskTicket, Option<TicketStore>)> {
	if let Some(ref path) = args.ticket {
		return Ok((load_ticket_file(path)?, None));
	}

	let task_id = args
		.task_id
		.as_deref()
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.ok_or_else(|| CliError::InvalidInput("a task id or --ticket is required".into()))?;

	let store = TicketStore::open_default()?;
	let ticket = store.load(task_id)?;
	Ok((ticket, Some(store)))
}
