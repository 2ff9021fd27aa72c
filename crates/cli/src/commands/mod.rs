mod check;
mod config;
mod generate;
mod serve;
mod start;

use imagegen::Orchestrator;

use crate::cli::{Cli, Commands};
use crate::config::LoadedConfig;
use crate::error::Result;
use crate::output::{EffectiveConfig, OutputFormat};

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct CommandContext {
	pub loaded: LoadedConfig,
	pub format: OutputFormat,
}

impl CommandContext {
	pub fn orchestrator(&self) -> Result<Orchestrator> {
		Ok(Orchestrator::new(&self.loaded.config)?)
	}

	pub fn effective_config(&self) -> EffectiveConfig {
		EffectiveConfig::new(&self.loaded.config, self.loaded.source.clone())
	}
}

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let loaded = LoadedConfig::resolve(cli.config.as_deref(), &cli.client)?;
	let ctx = CommandContext { loaded, format };

	match cli.command {
		Commands::Generate(args) => generate::execute(&args, &ctx).await,
		Commands::Start(args) => start::execute(&args, &ctx).await,
		Commands::Check(args) => check::execute(&args, &ctx).await,
		Commands::Serve(args) => serve::execute(&args, &ctx).await,
		Commands::Config => config::execute(&ctx),
	}
}
