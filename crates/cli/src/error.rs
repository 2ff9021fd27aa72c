use std::path::PathBuf;

use imagegen::{ConfigError, Error as GenerationError, ValidationError};
use serde_json::json;
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Generation(#[from] GenerationError),

	/// The host deadline elapsed before the orchestrator reached an outcome.
	#[error("no outcome within the {ms}ms deadline")]
	DeadlineExceeded { ms: u64 },

	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("could not load config file {path}: {reason}")]
	ConfigFile { path: PathBuf, reason: String },

	#[error("no stored ticket for task {task_id}")]
	TicketNotFound { task_id: String, path: PathBuf },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Generation(err) => err.kind().into(),
			CliError::DeadlineExceeded { .. } => ErrorCode::DeadlineExceeded,
			CliError::Validation(_) | CliError::InvalidInput(_) | CliError::TicketNotFound { .. } => ErrorCode::InvalidInput,
			CliError::Config(_) | CliError::ConfigFile { .. } => ErrorCode::ConfigError,
			CliError::Io(_) => ErrorCode::IoError,
			CliError::Json(_) | CliError::Anyhow(_) => ErrorCode::InternalError,
		}
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let details = match self {
			CliError::Generation(err) => {
				let mut details = json!({ "retryable": err.kind().is_retryable() });
				if let Some(task_id) = err.task_id() {
					details["taskId"] = json!(task_id);
				}
				if let Some(status) = err.transport().and_then(|t| t.status()) {
					details["httpStatus"] = json!(status);
				}
				Some(details)
			}
			CliError::DeadlineExceeded { ms } => Some(json!({ "deadlineMs": ms })),
			CliError::ConfigFile { path, .. } => Some(json!({ "path": path })),
			CliError::TicketNotFound { task_id, path } => Some(json!({ "taskId": task_id, "path": path })),
			_ => None,
		};

		let message = match self {
			CliError::Json(err) => format!("JSON error: {err}"),
			other => other.to_string(),
		};

		CommandError {
			code: self.code(),
			message,
			details,
		}
	}
}
