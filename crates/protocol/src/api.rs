//! Request and response bodies of the caller-facing HTTP surface.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate` and `POST /api/start`.
///
/// `prompt` is optional here so that a missing prompt surfaces as a
/// validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptBody {
	#[serde(default)]
	pub prompt: Option<String>,
}

/// Successful blocking generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
	pub success: bool,
	pub task_id: String,
	pub images: Vec<String>,
	/// Number of status polls it took.
	pub attempts: u32,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub success: bool,
	/// Stable machine-readable code, e.g. `TIMED_OUT`.
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			success: false,
			error: error.into(),
			message: message.into(),
		}
	}
}
