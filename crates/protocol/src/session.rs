//! Session and task identity types.
//!
//! A [`Session`] is the authentication context scraped from the remote
//! bootstrap page. A [`TaskHandle`] names one remote job. The two travel
//! together as a [`TaskTicket`] because the remote ties a job to the session
//! that created it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ephemeral authentication context for the remote service.
///
/// Immutable once created. It expires implicitly when the remote invalidates
/// it; the only signal is a later request being rejected.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	/// `Cookie` header value: `name=value` pairs joined with `"; "`.
	pub cookie_header: String,
	/// Percent-decoded CSRF token, echoed back in the token header.
	pub csrf_token: String,
}

impl Session {
	/// Creates a session from an already-joined cookie header and decoded token.
	pub fn new(cookie_header: impl Into<String>, csrf_token: impl Into<String>) -> Self {
		Self {
			cookie_header: cookie_header.into(),
			csrf_token: csrf_token.into(),
		}
	}

	/// Number of cookies carried in the cookie header.
	pub fn cookie_count(&self) -> usize {
		self.cookie_header.split(';').filter(|pair| !pair.trim().is_empty()).count()
	}
}

// Credentials never reach logs through `{:?}`.
impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("cookies", &self.cookie_count())
			.field("csrf_token", &format_args!("<{} bytes>", self.csrf_token.len()))
			.finish()
	}
}

/// Opaque identifier of a remote generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
	pub task_id: String,
}

impl TaskHandle {
	pub fn new(task_id: impl Into<String>) -> Self {
		Self { task_id: task_id.into() }
	}

	pub fn as_str(&self) -> &str {
		&self.task_id
	}
}

impl fmt::Display for TaskHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.task_id)
	}
}

/// A submitted job together with the session that owns it.
///
/// Returned by split-phase start and handed back, unchanged, on every check.
/// Serializes as `{"taskId": ..., "session": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTicket {
	#[serde(flatten)]
	pub handle: TaskHandle,
	pub session: Session,
}

impl TaskTicket {
	pub fn new(handle: TaskHandle, session: Session) -> Self {
		Self { handle, session }
	}

	pub fn task_id(&self) -> &str {
		self.handle.as_str()
	}
}
