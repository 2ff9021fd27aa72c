//! Structured output envelope for all CLI commands.
//!
//! Provides a consistent output format for machine consumption (scripts and
//! agents driving the split-phase commands).
//!
//! ## Output Contract
//!
//! Every command produces a result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "generate",
//!   "data": { "taskId": "t1", "images": ["https://..."], "attempts": 2 },
//!   "timings": { "durationMs": 4210 }
//! }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "generate",
//!   "error": {
//!     "code": "TIMED_OUT",
//!     "message": "task t1 still pending after 15 poll attempts",
//!     "details": { "taskId": "t1" }
//!   }
//! }
//! ```


use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use imagegen::{CheckResponse, ClientConfig, ErrorKind, Session};
use serde::{Deserialize, Serialize};

/// Current schema version for command output.
///
/// Increment this when making breaking changes to the output structure.
pub const SCHEMA_VERSION: u32 = 1;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// TOON output (default, token-efficient for LLMs)
	#[default]
	Toon,
	/// JSON output
	Json,
	/// Newline-delimited JSON
	Ndjson,
	/// Human-readable text
	Text,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"toon" => Ok(OutputFormat::Toon),
			"json" => Ok(OutputFormat::Json),
			"ndjson" => Ok(OutputFormat::Ndjson),
			"text" => Ok(OutputFormat::Text),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Toon => write!(f, "toon"),
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,

	pub ok: bool,

	/// Command name (e.g., "generate", "start", "check")
	pub command: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub inputs: Option<CommandInputs>,

	/// Only present on success
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Only present on failure
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,

	/// Files written (stored tickets)
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub artifacts: Vec<Artifact>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,

	/// Effective client configuration used for this command
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<EffectiveConfig>,
}

/// Inputs that were used for the command (for traceability)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandInputs {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub prompt: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub task_id: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub ticket: Option<PathBuf>,

	#[serde(flatten, skip_serializing_if = "Option::is_none")]
	pub extra: Option<serde_json::Value>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Bootstrap yielded no usable CSRF token
	AuthenticationFailed,
	/// Job creation failed or returned no task id
	SubmissionFailed,
	/// The remote reported the job as failed
	GenerationFailed,
	/// Every poll attempt came back pending
	TimedOut,
	/// Network or HTTP failure talking to the remote
	TransportFailure,
	/// The host's own deadline elapsed first
	DeadlineExceeded,
	InvalidInput,
	ConfigError,
	IoError,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
			ErrorCode::SubmissionFailed => "SUBMISSION_FAILED",
			ErrorCode::GenerationFailed => "GENERATION_FAILED",
			ErrorCode::TimedOut => "TIMED_OUT",
			ErrorCode::TransportFailure => "TRANSPORT_FAILURE",
			ErrorCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl From<ErrorKind> for ErrorCode {
	fn from(kind: ErrorKind) -> Self {
		match kind {
			ErrorKind::AuthenticationFailed => ErrorCode::AuthenticationFailed,
			ErrorKind::SubmissionFailed => ErrorCode::SubmissionFailed,
			ErrorKind::RemoteGenerationFailed => ErrorCode::GenerationFailed,
			ErrorKind::TimedOut => ErrorCode::TimedOut,
			ErrorKind::TransportFailure => ErrorCode::TransportFailure,
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	/// Total duration in milliseconds
	pub duration_ms: u64,

	/// Status polls issued (if applicable)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub polls: Option<u32>,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
			polls: None,
		}
	}
}

/// File produced by a command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	#[serde(rename = "type")]
	pub artifact_type: ArtifactType,

	pub path: PathBuf,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
	Ticket,
}

/// Diagnostic messages (warnings, info, etc.)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,

	pub message: String,

	/// Source of the diagnostic (e.g., "config", "tickets")
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

/// Effective client configuration, as resolved from file and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub base_url: String,
	pub poll_delay_ms: u64,
	pub max_poll_attempts: u32,
	pub request_timeout_ms: u64,
	pub browser_headers: bool,
	pub user_agent: String,

	/// Sleep time when every attempt is used
	pub polling_budget_ms: u64,

	/// Config file the values were loaded from, if any
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<PathBuf>,
}

impl EffectiveConfig {
	pub fn new(config: &ClientConfig, source: Option<PathBuf>) -> Self {
		Self {
			base_url: config.base_url.clone(),
			poll_delay_ms: config.poll_delay_ms,
			max_poll_attempts: config.max_poll_attempts,
			request_timeout_ms: config.request_timeout_ms,
			browser_headers: config.browser_headers,
			user_agent: config.user_agent().to_string(),
			polling_budget_ms: config.polling_budget().as_millis().min(u64::MAX as u128) as u64,
			source,
		}
	}
}

/// Builder for constructing command results
pub struct ResultBuilder<T: Serialize> {
	schema_version: Option<u32>,
	command: String,
	inputs: Option<CommandInputs>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Option<Instant>,
	timings: Option<Timings>,
	artifacts: Vec<Artifact>,
	diagnostics: Vec<Diagnostic>,
	config: Option<EffectiveConfig>,
}

impl<T: Serialize> ResultBuilder<T> {
	/// Create a new result builder for the given command.
	///
	/// The schema version is automatically set to [`SCHEMA_VERSION`].
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			schema_version: Some(SCHEMA_VERSION),
			command: command.into(),
			inputs: None,
			data: None,
			error: None,
			start_time: Some(Instant::now()),
			timings: None,
			artifacts: Vec::new(),
			diagnostics: Vec::new(),
			config: None,
		}
	}

	pub fn inputs(mut self, inputs: CommandInputs) -> Self {
		self.inputs = Some(inputs);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn artifact(mut self, artifact: Artifact) -> Self {
		self.artifacts.push(artifact);
		self
	}

	pub fn diagnostic_with_source(mut self, level: DiagnosticLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: Some(source.into()),
		});
		self
	}

	pub fn config(mut self, config: EffectiveConfig) -> Self {
		self.config = Some(config);
		self
	}

	/// Records the poll count alongside the measured duration.
	pub fn polls(mut self, polls: u32) -> Self {
		let elapsed = self.start_time.map(|start| start.elapsed()).unwrap_or_default();
		let mut timings = Timings::from(elapsed);
		timings.polls = Some(polls);
		self.timings = Some(timings);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		let timings = self.timings.or_else(|| self.start_time.map(|start| Timings::from(start.elapsed())));

		CommandResult {
			schema_version: self.schema_version,
			ok,
			command: self.command,
			inputs: self.inputs,
			data: self.data,
			error: self.error,
			timings,
			artifacts: self.artifacts,
			diagnostics: self.diagnostics,
			config: self.config,
		}
	}
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Toon => {
			if let Ok(json_value) = serde_json::to_value(result) {
				println!("{}", toon::encode(&json_value, None));
			}
		}
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			print_result_text(result);
		}
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref data) = result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				let _ = writeln!(stdout, "{json}");
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
		if let Some(ref details) = error.details {
			if let Ok(json) = serde_json::to_string_pretty(details) {
				let _ = writeln!(stdout, "Details: {json}");
			}
		}
	}

	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info",
			DiagnosticLevel::Warning => "warning",
			DiagnosticLevel::Error => "error",
		};
		if let Some(ref source) = diag.source {
			let _ = writeln!(stdout, "[{prefix}:{source}] {}", diag.message);
		} else {
			let _ = writeln!(stdout, "[{prefix}] {}", diag.message);
		}
	}

	for artifact in &result.artifacts {
		let _ = writeln!(stdout, "Saved {:?}: {}", artifact.artifact_type, artifact.path.display());
	}

	if let Some(ref timings) = result.timings {
		match timings.polls {
			Some(polls) => {
				let _ = writeln!(stdout, "Completed in {}ms ({polls} polls)", timings.duration_ms);
			}
			None => {
				let _ = writeln!(stdout, "Completed in {}ms", timings.duration_ms);
			}
		}
	}
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// Result data for generate command
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateData {
	pub task_id: String,
	pub images: Vec<String>,
	pub attempts: u32,
}

impl From<imagegen::Generation> for GenerateData {
	fn from(generation: imagegen::Generation) -> Self {
		Self {
			task_id: generation.task_id,
			images: generation.images,
			attempts: generation.attempts,
		}
	}
}

/// Result data for start command: the ticket a later `check` needs.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
	pub task_id: String,
	pub session: Session,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub saved_to: Option<PathBuf>,
}

/// Result data for check command
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckData {
	pub task_id: String,
	#[serde(flatten)]
	pub status: CheckResponse,
	/// Whether further checks are pointless
	pub terminal: bool,
	/// Whether the stored ticket was deleted
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub ticket_removed: bool,
}
