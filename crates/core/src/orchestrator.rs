//! The orchestrator state machine and its two operating modes.
//!
//! One invocation walks `Init -> SessionAcquired -> Submitted -> Polling` and
//! ends in exactly one of `Done`, `TimedOut` or `Errored`. Blocking mode
//! ([`Orchestrator::generate`]) drives the machine to a terminal state.
//! Split-phase mode stops after `Submitted` ([`Orchestrator::start`]) and lets
//! the caller issue single polls ([`Orchestrator::check`]).
//!
//! Nothing is shared between invocations. Dropping a returned future abandons
//! the remote job without notifying the remote service.

use std::fmt;
use std::ops::ControlFlow;
use std::time::Duration;

use imagegen_protocol::{Session, TaskHandle, TaskStatus, TaskTicket};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ConfigError, Error, Result};
use crate::executor::RequestExecutor;
use crate::headers::check_session;
use crate::poll::TaskPoller;
use crate::request::GenerationRequest;
use crate::session::SessionProvider;
use crate::submit::TaskSubmitter;

/// States of one orchestrator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Init,
	SessionAcquired,
	Submitted,
	Polling,
	Done,
	TimedOut,
	Errored,
}

impl Phase {
	pub fn is_terminal(self) -> bool {
		matches!(self, Phase::Done | Phase::TimedOut | Phase::Errored)
	}
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Phase::Init => "init",
			Phase::SessionAcquired => "session_acquired",
			Phase::Submitted => "submitted",
			Phase::Polling => "polling",
			Phase::Done => "done",
			Phase::TimedOut => "timed_out",
			Phase::Errored => "errored",
		};
		f.write_str(name)
	}
}

/// Successful outcome of a blocking invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
	pub task_id: String,
	/// Result URLs in remote order. May be empty.
	pub images: Vec<String>,
	/// Status polls it took to observe completion.
	pub attempts: u32,
}

/// Data carried by each state.
enum Flow<'r> {
	Init(&'r GenerationRequest),
	SessionAcquired(&'r GenerationRequest, Session),
	Submitted(TaskTicket),
	Polling { ticket: TaskTicket, attempts: u32 },
	Done(Generation),
	TimedOut { ticket: TaskTicket, attempts: u32 },
	Errored(Error),
}

impl Flow<'_> {
	fn phase(&self) -> Phase {
		match self {
			Flow::Init(_) => Phase::Init,
			Flow::SessionAcquired(..) => Phase::SessionAcquired,
			Flow::Submitted(_) => Phase::Submitted,
			Flow::Polling { .. } => Phase::Polling,
			Flow::Done(_) => Phase::Done,
			Flow::TimedOut { .. } => Phase::TimedOut,
			Flow::Errored(_) => Phase::Errored,
		}
	}
}

/// Composes session acquisition, submission and polling.
///
/// Cheap to clone; clones share one HTTP connection pool and can run
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct Orchestrator {
	provider: SessionProvider,
	submitter: TaskSubmitter,
	poller: TaskPoller,
	poll_delay: Duration,
	max_attempts: u32,
}

impl Orchestrator {
	/// Builds an orchestrator with its own request executor.
	pub fn new(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
		let executor = RequestExecutor::new(config)?;
		Self::with_executor(executor, config)
	}

	/// Builds an orchestrator around an existing executor.
	///
	/// Only the polling policy is read from `config`, but all of `config` is
	/// validated.
	pub fn with_executor(executor: RequestExecutor, config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			provider: SessionProvider::new(executor.clone()),
			submitter: TaskSubmitter::new(executor.clone()),
			poller: TaskPoller::new(executor),
			poll_delay: config.poll_delay(),
			max_attempts: config.max_poll_attempts,
		})
	}

	pub fn poll_delay(&self) -> Duration {
		self.poll_delay
	}

	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Blocking mode: runs one invocation to its terminal state.
	///
	/// # Errors
	///
	/// Returns the invocation's terminal [`Error`]. [`Error::TimedOut`] means
	/// every one of the configured attempts came back pending.
	pub async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
		self.drive(Flow::Init(request), Self::outcome).await
	}

	/// Split-phase start: acquires a session and submits the job.
	///
	/// The returned ticket is the only state; the caller stores it and hands
	/// it back to [`check`](Self::check).
	pub async fn start(&self, request: &GenerationRequest) -> Result<TaskTicket> {
		self.drive(Flow::Init(request), |flow| match flow {
			Flow::Submitted(ticket) => {
				info!(task_id = %ticket.handle, "task started");
				ControlFlow::Break(Ok(ticket))
			}
			Flow::Errored(err) => {
				warn!(kind = %err.kind(), error = %err, "task start failed");
				ControlFlow::Break(Err(err))
			}
			other => ControlFlow::Continue(other),
		})
		.await
	}

	/// Split-phase check: exactly one status request.
	///
	/// A remote `Failed` is a successful check whose status is
	/// [`TaskStatus::Failed`]; only transport problems are errors here.
	///
	/// A session that could never authenticate is rejected before any request
	/// is made.
	pub async fn check(&self, handle: &TaskHandle, session: &Session) -> Result<TaskStatus> {
		check_session(session).map_err(|err| {
			warn!(task_id = %handle, error = %err, "refusing to check with an unusable session");
			Error::AuthenticationFailed(err)
		})?;

		match self.poller.poll_once(handle, session).await {
			Ok(status) => {
				info!(task_id = %handle, state = %status.state(), "checked task");
				Ok(status)
			}
			Err(err) => {
				warn!(task_id = %handle, error = %err, "task check failed");
				Err(Error::from_poll(err))
			}
		}
	}

	pub async fn check_ticket(&self, ticket: &TaskTicket) -> Result<TaskStatus> {
		self.check(&ticket.handle, &ticket.session).await
	}

	/// Resumes a split-phase ticket in blocking mode with a fresh attempt
	/// budget.
	pub async fn wait(&self, ticket: TaskTicket) -> Result<Generation> {
		check_session(&ticket.session).map_err(Error::AuthenticationFailed)?;
		self.drive(Flow::Submitted(ticket), Self::outcome).await
	}

	/// Advances `flow` until `settle` breaks with a result.
	async fn drive<'r, T>(&self, mut flow: Flow<'r>, settle: impl Fn(Flow<'r>) -> ControlFlow<T, Flow<'r>>) -> T {
		loop {
			flow = match settle(flow) {
				ControlFlow::Break(result) => return result,
				ControlFlow::Continue(flow) => flow,
			};

			let from = flow.phase();
			flow = self.advance(flow).await;
			let to = flow.phase();
			if from != to {
				debug!(from = %from, to = %to, "phase transition");
			}
		}
	}

	async fn advance<'r>(&self, flow: Flow<'r>) -> Flow<'r> {
		match flow {
			Flow::Init(request) => match self.provider.acquire().await {
				Ok(session) => Flow::SessionAcquired(request, session),
				Err(err) => Flow::Errored(err.into()),
			},
			Flow::SessionAcquired(request, session) => match self.submitter.submit(request, &session).await {
				Ok(handle) => Flow::Submitted(TaskTicket::new(handle, session)),
				Err(err) => Flow::Errored(Error::SubmissionFailed(err)),
			},
			Flow::Submitted(ticket) => Flow::Polling { ticket, attempts: 0 },
			Flow::Polling { ticket, attempts } if attempts >= self.max_attempts => Flow::TimedOut { ticket, attempts },
			Flow::Polling { ticket, attempts } => {
				tokio::time::sleep(self.poll_delay).await;
				let attempts = attempts + 1;
				match self.poller.poll_once(&ticket.handle, &ticket.session).await {
					Ok(TaskStatus::Pending) => Flow::Polling { ticket, attempts },
					Ok(TaskStatus::Completed { images }) => Flow::Done(Generation {
						task_id: ticket.handle.task_id,
						images,
						attempts,
					}),
					Ok(TaskStatus::Failed { reason }) => Flow::Errored(Error::RemoteGenerationFailed {
						task_id: ticket.handle.task_id,
						reason,
					}),
					Err(err) => Flow::Errored(Error::from_poll(err)),
				}
			}
			terminal => terminal,
		}
	}

	/// Settles on the terminal states of a blocking invocation.
	fn outcome(flow: Flow<'_>) -> ControlFlow<Result<Generation>, Flow<'_>> {
		match flow {
			Flow::Done(generation) => {
				info!(
					task_id = %generation.task_id,
					images = generation.images.len(),
					attempts = generation.attempts,
					"generation completed"
				);
				ControlFlow::Break(Ok(generation))
			}
			Flow::TimedOut { ticket, attempts } => {
				warn!(task_id = %ticket.handle, attempts, "gave up waiting for task");
				ControlFlow::Break(Err(Error::TimedOut {
					task_id: ticket.handle.task_id,
					attempts,
				}))
			}
			Flow::Errored(err) => {
				warn!(kind = %err.kind(), error = %err, "generation failed");
				ControlFlow::Break(Err(err))
			}
			other => ControlFlow::Continue(other),
		}
	}
}
