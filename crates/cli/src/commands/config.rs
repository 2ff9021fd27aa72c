use std::time::Duration;

use super::CommandContext;
use crate::cli::DEFAULT_DEADLINE_MS;
use crate::config::check_deadline;
use crate::error::Result;
use crate::output::{DiagnosticLevel, ResultBuilder, print_result};

pub fn execute(ctx: &CommandContext) -> Result<()> {
	let effective = ctx.effective_config();
	let mut builder = ResultBuilder::new("config");

	if effective.source.is_none() {
		builder = builder.diagnostic_with_source(DiagnosticLevel::Info, "no config file found; using defaults and flags", "config");
	}
	if let Err(err) = check_deadline(&ctx.loaded.config, Duration::from_millis(DEFAULT_DEADLINE_MS)) {
		builder = builder.diagnostic_with_source(DiagnosticLevel::Warning, format!("serve needs a longer --deadline-ms: {err}"), "config");
	}

	let result = builder.data(effective).build();
	print_result(&result, ctx.format);
	Ok(())
}
