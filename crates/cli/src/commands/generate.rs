use imagegen::GenerationRequest;
use tracing::info;

use super::CommandContext;
use crate::cli::{GenerateArgs, join_prompt};
use crate::error::Result;
use crate::output::{CommandInputs, GenerateData, ResultBuilder, print_result};

pub async fn execute(args: &GenerateArgs, ctx: &CommandContext) -> Result<()> {
	let request = GenerationRequest::new(join_prompt(&args.prompt))?;
	let orchestrator = ctx.orchestrator()?;
	info!(
		target = "imagegen",
		max_attempts = orchestrator.max_attempts(),
		poll_delay_ms = orchestrator.poll_delay().as_millis() as u64,
		"generate"
	);

	let generation = orchestrator.generate(&request).await?;
	let polls = generation.attempts;

	let result = ResultBuilder::new("generate")
		.inputs(CommandInputs {
			prompt: Some(request.prompt().to_string()),
			..Default::default()
		})
		.data(GenerateData::from(generation))
		.polls(polls)
		.config(ctx.effective_config())
		.build();

	print_result(&result, ctx.format);
	Ok(())
}
