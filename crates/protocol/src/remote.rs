//! Request and response shapes of the remote image generator.
//!
//! The remote has no published API; these mirror what its own web front end
//! sends and receives. Responses are decoded loosely: every field is optional
//! and loosely typed, and normalization into [`TaskStatus`] happens here so the
//! rest of the system never sees raw state strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::TaskStatus;

/// Page whose response seeds the session cookies.
pub const BOOTSTRAP_PATH: &str = "/image/ai-image-generator";

/// Job creation resource.
pub const PREPARE_PATH: &str = "/image/prepare";

/// Path segments of the status resource; the task id is appended.
pub const PROGRESS_SEGMENTS: [&str; 2] = ["task", "progress"];

/// Cookie that carries the CSRF token.
pub const TOKEN_COOKIE: &str = "XSRF-TOKEN";

/// Header the CSRF token is echoed back in.
pub const TOKEN_HEADER: &str = "X-XSRF-TOKEN";

/// Tool selector sent with every job.
pub const PREPARE_MODE: &str = "ai_image_generator";

/// Wizard step sent with every job.
pub const PREPARE_STEP: u32 = 1;

/// Body of the job creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareRequest {
	pub prompt: String,
	pub mode: String,
	pub step: u32,
	/// Always `false`: progress is polled, never pushed over a websocket.
	pub is_ws: bool,
	/// Client-generated request id; unique per submission.
	pub ws_id: String,
}

impl PrepareRequest {
	/// Builds a request with the fixed mode/step parameters.
	pub fn new(prompt: impl Into<String>, ws_id: impl Into<String>) -> Self {
		Self {
			prompt: prompt.into(),
			mode: PREPARE_MODE.to_string(),
			step: PREPARE_STEP,
			is_ws: false,
			ws_id: ws_id.into(),
		}
	}
}

/// Response of the job creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrepareResponse {
	#[serde(default)]
	pub task_id: Option<Value>,
}

impl PrepareResponse {
	/// Job identifier, when present and usable.
	///
	/// Strings and numbers are accepted; blank strings, `null` and any other
	/// JSON type count as missing.
	pub fn task_id(&self) -> Option<String> {
		match self.task_id.as_ref()? {
			Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		}
	}
}

/// Response of the status resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressResponse {
	#[serde(default)]
	pub state: Option<Value>,
	#[serde(default)]
	pub images: Option<Value>,
	#[serde(default)]
	pub message: Option<Value>,
	#[serde(default)]
	pub error: Option<Value>,
}

impl ProgressResponse {
	/// Reads a status body of any JSON shape.
	///
	/// Bodies that are not objects (`null`, arrays, bare strings) carry no
	/// state and read as an empty response, which is pending.
	pub fn from_value(body: Value) -> Self {
		serde_json::from_value(body).unwrap_or_default()
	}

	/// Normalizes the declared state into a [`TaskStatus`].
	///
	/// `completed` and `failed` (case-insensitive) are the only terminal
	/// markers. Anything else, including a missing or non-string state, is
	/// [`TaskStatus::Pending`].
	pub fn into_status(self) -> TaskStatus {
		let state = self.state.as_ref().and_then(Value::as_str).map(|s| s.trim().to_ascii_lowercase());

		match state.as_deref() {
			Some("completed") => TaskStatus::Completed { images: self.image_urls() },
			Some("failed") => TaskStatus::Failed { reason: self.failure_reason() },
			_ => TaskStatus::Pending,
		}
	}

	fn image_urls(&self) -> Vec<String> {
		match &self.images {
			Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
			_ => Vec::new(),
		}
	}

	fn failure_reason(&self) -> String {
		[&self.message, &self.error]
			.into_iter()
			.flatten()
			.find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))
			.map(str::to_string)
			.unwrap_or_else(|| "remote reported generation failure".to_string())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn progress(value: Value) -> ProgressResponse {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn completed_state_yields_images_in_order() {
		let status = progress(json!({"state": "completed", "images": ["https://x/1.png", "https://x/2.png"]})).into_status();
		assert_eq!(
			status,
			TaskStatus::Completed {
				images: vec!["https://x/1.png".into(), "https://x/2.png".into()]
			}
		);
	}

	#[test]
	fn completed_without_images_is_still_completed() {
		let status = progress(json!({"state": "completed"})).into_status();
		assert_eq!(status, TaskStatus::Completed { images: vec![] });
	}

	#[test]
	fn non_string_image_entries_are_skipped() {
		let status = progress(json!({"state": "completed", "images": ["a", 3, null, "b"]})).into_status();
		assert_eq!(status, TaskStatus::Completed { images: vec!["a".into(), "b".into()] });
	}

	#[test]
	fn failed_state_prefers_message_then_error() {
		let status = progress(json!({"state": "failed", "message": "", "error": "queue full"})).into_status();
		assert_eq!(status, TaskStatus::Failed { reason: "queue full".into() });

		let status = progress(json!({"state": "FAILED"})).into_status();
		assert!(matches!(status, TaskStatus::Failed { .. }));
	}

	#[test]
	fn non_object_bodies_are_pending() {
		for body in [Value::Null, json!([]), json!("processing"), json!(3)] {
			assert_eq!(ProgressResponse::from_value(body).into_status(), TaskStatus::Pending);
		}

		let status = ProgressResponse::from_value(json!({"state": "completed", "images": ["a"]})).into_status();
		assert_eq!(status, TaskStatus::Completed { images: vec!["a".into()] });
	}

	#[test]
	fn unknown_or_missing_state_is_pending() {
		for body in [json!({"state": "processing"}), json!({"state": "queued"}), json!({}), json!({"state": 7}), json!({"state": null})] {
			assert_eq!(progress(body).into_status(), TaskStatus::Pending);
		}
	}

	#[test]
	fn task_id_accepts_strings_and_numbers_only() {
		let parse = |v: Value| serde_json::from_value::<PrepareResponse>(v).unwrap().task_id();
		assert_eq!(parse(json!({"task_id": "t1"})), Some("t1".into()));
		assert_eq!(parse(json!({"task_id": 42})), Some("42".into()));
		assert_eq!(parse(json!({"task_id": "  "})), None);
		assert_eq!(parse(json!({"task_id": null})), None);
		assert_eq!(parse(json!({"id": "t1"})), None);
	}

	#[test]
	fn prepare_request_carries_fixed_parameters() {
		let body = serde_json::to_value(PrepareRequest::new("a red fox", "abc")).unwrap();
		assert_eq!(body, json!({"prompt": "a red fox", "mode": "ai_image_generator", "step": 1, "is_ws": false, "ws_id": "abc"}));
	}
}
