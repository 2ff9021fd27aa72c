//! Task status as observed by a single poll.

use serde::{Deserialize, Serialize};

/// Remote-declared state of a job for one poll attempt.
///
/// The orchestrator folds a sequence of these into a single outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
	/// Still running, or the remote reported a state we do not recognize.
	Pending,
	/// Finished. `images` may be empty; that is unusual but not an error.
	Completed { images: Vec<String> },
	/// The remote explicitly gave up on the job.
	Failed { reason: String },
}

impl TaskStatus {
	/// Whether no further polling can change this status.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, TaskStatus::Pending)
	}

	/// Caller-facing state label for this status.
	pub fn state(&self) -> TaskState {
		match self {
			TaskStatus::Pending => TaskState::Processing,
			TaskStatus::Completed { .. } => TaskState::Completed,
			TaskStatus::Failed { .. } => TaskState::Failed,
		}
	}
}

/// Caller-facing state string returned by a split-phase check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
	Processing,
	Completed,
	Failed,
}

impl std::fmt::Display for TaskState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			TaskState::Processing => write!(f, "processing"),
			TaskState::Completed => write!(f, "completed"),
			TaskState::Failed => write!(f, "failed"),
		}
	}
}

/// Result body of a split-phase check: `{state, images, reason?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
	pub state: TaskState,
	#[serde(default)]
	pub images: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

impl From<TaskStatus> for CheckResponse {
	fn from(status: TaskStatus) -> Self {
		let state = status.state();
		match status {
			TaskStatus::Pending => Self {
				state,
				images: Vec::new(),
				reason: None,
			},
			TaskStatus::Completed { images } => Self { state, images, reason: None },
			TaskStatus::Failed { reason } => Self {
				state,
				images: Vec::new(),
				reason: Some(reason),
			},
		}
	}
}
