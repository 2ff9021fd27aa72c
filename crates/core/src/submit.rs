//! Task submitter: create one remote generation job.

use imagegen_protocol::{PREPARE_PATH, PrepareRequest, PrepareResponse, Session, TaskHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::executor::RequestExecutor;
use crate::request::GenerationRequest;

#[derive(Debug, Clone)]
pub struct TaskSubmitter {
	executor: RequestExecutor,
}

impl TaskSubmitter {
	pub fn new(executor: RequestExecutor) -> Self {
		Self { executor }
	}

	/// Creates a job for `request` under `session`.
	///
	/// Each call sends a newly generated client request id.
	pub async fn submit(&self, request: &GenerationRequest, session: &Session) -> Result<TaskHandle, SubmitError> {
		let body = PrepareRequest::new(request.prompt(), Uuid::new_v4().to_string());
		let response: PrepareResponse = self.executor.post_json(self.executor.endpoint(PREPARE_PATH), session, &body).await?;

		let Some(task_id) = response.task_id() else {
			warn!("job creation response carried no task_id");
			return Err(SubmitError::MissingTaskId);
		};

		info!(task_id = %task_id, "task submitted");
		Ok(TaskHandle::new(task_id))
	}
}
