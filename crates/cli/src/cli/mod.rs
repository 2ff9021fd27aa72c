
use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

pub const DEFAULT_DEADLINE_MS: u64 = 60_000;

/// Help colors in cargo's style: green bold headers, cyan literals.
fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.error(AnsiColor::Red.on_default().bold())
}

#[derive(Parser, Debug)]
#[command(name = "imagegen")]
#[command(about = "Generate images through a browser-only AI image service")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: toon (default), json, ndjson, or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "toon")]
	pub format: OutputFormat,

	/// JSON config file (default: $XDG_CONFIG_HOME/imagegen/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(flatten)]
	pub client: ClientArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Flags layered over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ClientArgs {
	/// Origin of the remote service
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,

	/// Delay before each status poll
	#[arg(long, global = true, value_name = "MS")]
	pub poll_delay_ms: Option<u64>,

	/// Status polls before giving up
	#[arg(long, global = true, value_name = "N")]
	pub max_attempts: Option<u32>,

	/// Per-request transport timeout
	#[arg(long, global = true, value_name = "MS")]
	pub request_timeout_ms: Option<u64>,

	/// Send only the headers the remote strictly requires
	#[arg(long, global = true)]
	pub minimal_headers: bool,

	/// Override the browser user agent
	#[arg(long, global = true, value_name = "UA")]
	pub user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Generate images and wait for the result.
	Generate(GenerateArgs),
	/// Submit a generation and print its ticket without waiting.
	Start(StartArgs),
	/// Poll a started task exactly once.
	Check(CheckArgs),
	/// Run the HTTP API.
	Serve(ServeArgs),
	/// Print the effective configuration.
	Config,
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Generate(_) => "generate",
			Commands::Start(_) => "start",
			Commands::Check(_) => "check",
			Commands::Serve(_) => "serve",
			Commands::Config => "config",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
	/// Text prompt; multiple words are joined with spaces
	#[arg(value_name = "PROMPT", required = true, num_args = 1..)]
	pub prompt: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StartArgs {
	/// Text prompt; multiple words are joined with spaces
	#[arg(value_name = "PROMPT", required = true, num_args = 1..)]
	pub prompt: Vec<String>,

	/// Print the ticket without storing it
	#[arg(long)]
	pub no_save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
	/// Task id of a ticket stored by `start`
	#[arg(value_name = "TASK_ID", required_unless_present = "ticket", conflicts_with = "ticket")]
	pub task_id: Option<String>,

	/// Read the ticket from a file instead of the ticket store
	#[arg(long, value_name = "FILE")]
	pub ticket: Option<PathBuf>,

	/// Keep the stored ticket even after a terminal status
	#[arg(long)]
	pub keep: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
	#[arg(long, default_value = "127.0.0.1")]
	pub host: String,

	#[arg(short, long, default_value_t = 3000)]
	pub port: u16,

	/// Deadline for each API call; must exceed the polling budget
	#[arg(long, value_name = "MS", default_value_t = DEFAULT_DEADLINE_MS)]
	pub deadline_ms: u64,
}

/// Joins prompt words the way a shell user expects.
pub fn join_prompt(words: &[String]) -> String {
	words.join(" ")
}
