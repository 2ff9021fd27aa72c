//! Task poller: one status query per call.

use imagegen_protocol::{PROGRESS_SEGMENTS, ProgressResponse, Session, TaskHandle, TaskStatus};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::TransportError;
use crate::executor::RequestExecutor;

/// Reports the remote-declared state of a job.
///
/// Never decides to give up; that is the orchestrator's job.
#[derive(Debug, Clone)]
pub struct TaskPoller {
	executor: RequestExecutor,
}

impl TaskPoller {
	pub fn new(executor: RequestExecutor) -> Self {
		Self { executor }
	}

	/// Issues exactly one status request for `handle`.
	pub async fn poll_once(&self, handle: &TaskHandle, session: &Session) -> Result<TaskStatus, TransportError> {
		let url = self.executor.endpoint_segments(PROGRESS_SEGMENTS.into_iter().chain([handle.as_str()]));
		let body: Value = self.executor.post_json(url, session, &json!({})).await?;

		let status = ProgressResponse::from_value(body).into_status();
		debug!(task_id = %handle, state = %status.state(), "polled task");
		Ok(status)
	}
}
