//! Session provider: bootstrap an anonymous browser session.

use imagegen_protocol::{BOOTSTRAP_PATH, Session};
use reqwest::header::SET_COOKIE;
use tracing::{info, warn};

use crate::cookie::session_from_set_cookies;
use crate::error::SessionError;
use crate::executor::RequestExecutor;

/// Acquires a fresh [`Session`] from the remote entry-point page.
#[derive(Debug, Clone)]
pub struct SessionProvider {
	executor: RequestExecutor,
}

impl SessionProvider {
	pub fn new(executor: RequestExecutor) -> Self {
		Self { executor }
	}

	/// Loads the entry-point page once and extracts cookies and CSRF token.
	///
	/// No retry happens here; one bootstrap request per call.
	///
	/// # Errors
	///
	/// - [`SessionError::Transport`] if the page could not be loaded
	/// - [`SessionError::MissingToken`], [`SessionError::EmptyToken`] or
	///   [`SessionError::UndecodableToken`] if no usable token was set
	pub async fn acquire(&self) -> Result<Session, SessionError> {
		let response = self.executor.get_page(self.executor.endpoint(BOOTSTRAP_PATH)).await?;

		let set_cookies: Vec<&str> = response.headers().get_all(SET_COOKIE).iter().filter_map(|value| value.to_str().ok()).collect();

		match session_from_set_cookies(set_cookies) {
			Ok(session) => {
				info!(cookies = session.cookie_count(), "session acquired");
				Ok(session)
			}
			Err(err) => {
				warn!(error = %err, "bootstrap response carried no usable token");
				Err(err)
			}
		}
	}
}
