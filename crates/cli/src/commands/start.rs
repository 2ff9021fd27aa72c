use imagegen::GenerationRequest;
use tracing::{info, warn};

use super::CommandContext;
use crate::cli::{StartArgs, join_prompt};
use crate::error::Result;
use crate::output::{Artifact, ArtifactType, CommandInputs, DiagnosticLevel, ResultBuilder, StartData, print_result};
use crate::ticket_store::TicketStore;

pub async fn execute(args: &StartArgs, ctx: &CommandContext) -> Result<()> {
	let request = GenerationRequest::new(join_prompt(&args.prompt))?;
	let ticket = ctx.orchestrator()?.start(&request).await?;
	info!(target = "imagegen", task_id = ticket.task_id(), "started");

	let mut builder = ResultBuilder::new("start").inputs(CommandInputs {
		prompt: Some(request.prompt().to_string()),
		..Default::default()
	});

	// A submitted task stays reachable through the printed ticket even when
	// storing it fails.
	let mut saved_to = None;
	if !args.no_save {
		match TicketStore::open_default().and_then(|store| store.save(&ticket)) {
			Ok(path) => {
				let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
				builder = builder.artifact(Artifact {
					artifact_type: ArtifactType::Ticket,
					path: path.clone(),
					size_bytes,
				});
				saved_to = Some(path);
			}
			Err(err) => {
				warn!(target = "imagegen", task_id = ticket.task_id(), error = %err, "could not store ticket");
				builder = builder.diagnostic_with_source(DiagnosticLevel::Warning, format!("ticket not stored: {err}"), "tickets");
			}
		}
	}

	let result = builder
		.data(StartData {
			task_id: ticket.task_id().to_string(),
			session: ticket.session,
			saved_to,
		})
		.build();

	print_result(&result, ctx.format);
	Ok(())
}
