//! Error types for the orchestrator and its components.
//!
//! Each component has its own narrow error. The orchestrator folds them into
//! [`Error`], whose [`ErrorKind`] is the outcome taxonomy callers branch on.

use thiserror::Error;

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Network or HTTP-level failure talking to the remote service.
#[derive(Debug, Error)]
pub enum TransportError {
	/// The request could not be sent or no response arrived in time.
	#[error("request to {url} failed: {source}")]
	Request {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	/// The remote answered with a non-success status.
	#[error("{url} returned HTTP {status}")]
	Status { url: String, status: u16 },

	/// The response body was not the JSON we expected.
	#[error("could not decode response from {url}: {source}")]
	Decode {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	/// Session material cannot be carried in an HTTP header.
	#[error("session value for {name} is not a valid header value")]
	InvalidHeader { name: &'static str },
}

impl TransportError {
	/// HTTP status of the failed response, if one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			TransportError::Status { status, .. } => Some(*status),
			TransportError::Request { source, .. } | TransportError::Decode { source, .. } => source.status().map(|s| s.as_u16()),
			TransportError::InvalidHeader { .. } => None,
		}
	}

	/// Whether the remote rejected the request's credentials.
	///
	/// 419 is the status the remote uses for a stale CSRF token. Any of these
	/// means the session has expired or the client is being blocked.
	pub fn is_auth_rejection(&self) -> bool {
		matches!(self.status(), Some(401 | 403 | 419))
	}

	/// Returns true if the per-request timeout elapsed.
	pub fn is_timeout(&self) -> bool {
		match self {
			TransportError::Request { source, .. } => source.is_timeout(),
			_ => false,
		}
	}
}

/// Failure to obtain a usable session from the bootstrap response.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("bootstrap response did not set a {cookie} cookie")]
	MissingToken { cookie: &'static str },

	#[error("{cookie} cookie is empty")]
	EmptyToken { cookie: &'static str },

	#[error("{cookie} cookie is not valid percent-encoded UTF-8")]
	UndecodableToken { cookie: &'static str },

	/// Session material that cannot be carried in its request header.
	#[error("session value for the {field} header contains characters a header cannot carry")]
	Unsendable { field: &'static str },

	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failure to create a remote job.
#[derive(Debug, Error)]
pub enum SubmitError {
	#[error("job creation response carried no task_id")]
	MissingTaskId,

	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid base URL {url:?}: {reason}")]
	InvalidBaseUrl { url: String, reason: String },

	#[error("max poll attempts must be at least 1")]
	ZeroAttempts,

	#[error("request timeout must be greater than zero")]
	ZeroTimeout,

	#[error("user agent is not a valid header value")]
	InvalidUserAgent,

	#[error("failed to build HTTP client: {0}")]
	Client(#[source] reqwest::Error),
}

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("prompt is required")]
	EmptyPrompt,
}

/// Terminal failure of one orchestrator invocation.
#[derive(Debug, Error)]
pub enum Error {
	/// No usable session: bootstrap yielded no token, or a caller-held
	/// session cannot authenticate a request.
	#[error("authentication failed: {0}")]
	AuthenticationFailed(#[source] SessionError),

	/// Job creation failed or returned no identifier.
	#[error("task submission failed: {0}")]
	SubmissionFailed(#[source] SubmitError),

	/// The remote explicitly reported that the job failed.
	#[error("generation failed for task {task_id}: {reason}")]
	RemoteGenerationFailed { task_id: String, reason: String },

	/// Every poll attempt came back pending.
	#[error("task {task_id} still pending after {attempts} poll attempts")]
	TimedOut { task_id: String, attempts: u32 },

	/// Network or HTTP failure outside submission.
	#[error("transport failure: {0}")]
	TransportFailure(#[source] TransportError),
}

impl From<SessionError> for Error {
	fn from(err: SessionError) -> Self {
		match err {
			SessionError::Transport(transport) => Error::TransportFailure(transport),
			other => Error::AuthenticationFailed(other),
		}
	}
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
			Error::SubmissionFailed(_) => ErrorKind::SubmissionFailed,
			Error::RemoteGenerationFailed { .. } => ErrorKind::RemoteGenerationFailed,
			Error::TimedOut { .. } => ErrorKind::TimedOut,
			Error::TransportFailure(_) => ErrorKind::TransportFailure,
		}
	}

	/// Task id the failure is attributed to, once one was assigned.
	pub fn task_id(&self) -> Option<&str> {
		match self {
			Error::RemoteGenerationFailed { task_id, .. } | Error::TimedOut { task_id, .. } => Some(task_id),
			_ => None,
		}
	}

	/// Classifies a failed status poll.
	///
	/// A session that cannot be put into headers never reached the remote,
	/// so it is an authentication problem rather than a transport one.
	pub(crate) fn from_poll(err: TransportError) -> Self {
		match err {
			TransportError::InvalidHeader { name } => Error::AuthenticationFailed(SessionError::Unsendable { field: name }),
			other => Error::TransportFailure(other),
		}
	}

	/// Transport error underneath this failure, if any.
	pub fn transport(&self) -> Option<&TransportError> {
		match self {
			Error::TransportFailure(err) => Some(err),
			Error::AuthenticationFailed(SessionError::Transport(err)) => Some(err),
			Error::SubmissionFailed(SubmitError::Transport(err)) => Some(err),
			_ => None,
		}
	}
}

/// Outcome taxonomy of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	AuthenticationFailed,
	SubmissionFailed,
	RemoteGenerationFailed,
	TimedOut,
	TransportFailure,
}

impl ErrorKind {
	/// Whether re-invoking later, with a fresh session, may succeed.
	///
	/// `RemoteGenerationFailed` means the prompt itself cannot be generated;
	/// the authentication and submission kinds point at an infrastructure
	/// problem that retrying will not fix.
	pub fn is_retryable(self) -> bool {
		matches!(self, ErrorKind::TimedOut | ErrorKind::TransportFailure)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ErrorKind::AuthenticationFailed => "AUTHENTICATION_FAILED",
			ErrorKind::SubmissionFailed => "SUBMISSION_FAILED",
			ErrorKind::RemoteGenerationFailed => "GENERATION_FAILED",
			ErrorKind::TimedOut => "TIMED_OUT",
			ErrorKind::TransportFailure => "TRANSPORT_FAILURE",
		}
	}
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn status(status: u16) -> TransportError {
		TransportError::Status {
			url: "https://remote/".into(),
			status,
		}
	}

	#[test]
	fn bootstrap_transport_failure_is_not_an_auth_failure() {
		let err: Error = SessionError::Transport(status(503)).into();
		assert_eq!(err.kind(), ErrorKind::TransportFailure);

		let err: Error = SessionError::MissingToken { cookie: "XSRF-TOKEN" }.into();
		assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
	}

	#[test]
	fn unsendable_session_is_not_retryable() {
		let err = Error::from_poll(TransportError::InvalidHeader { name: "X-XSRF-TOKEN" });
		assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
		assert!(!err.kind().is_retryable());

		let err = Error::from_poll(status(503));
		assert_eq!(err.kind(), ErrorKind::TransportFailure);
	}

	#[test]
	fn auth_rejection_statuses() {
		assert!(status(419).is_auth_rejection());
		assert!(status(403).is_auth_rejection());
		assert!(!status(500).is_auth_rejection());
		assert!(!TransportError::InvalidHeader { name: "Cookie" }.is_auth_rejection());
	}

	#[test]
	fn only_timeouts_and_transport_failures_are_retryable() {
		assert!(ErrorKind::TimedOut.is_retryable());
		assert!(ErrorKind::TransportFailure.is_retryable());
		assert!(!ErrorKind::RemoteGenerationFailed.is_retryable());
		assert!(!ErrorKind::AuthenticationFailed.is_retryable());
		assert!(!ErrorKind::SubmissionFailed.is_retryable());
	}

	#[test]
	fn submission_transport_error_stays_reachable() {
		let err = Error::SubmissionFailed(SubmitError::Transport(status(429)));
		assert_eq!(err.kind(), ErrorKind::SubmissionFailed);
		assert_eq!(err.transport().and_then(TransportError::status), Some(429));
	}
}
