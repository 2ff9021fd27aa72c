//! Client configuration: remote location, polling policy, transport limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://tinywow.com";
pub const DEFAULT_POLL_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// User agent of a stock desktop Chrome.
pub const DEFAULT_USER_AGENT: &str =
	"Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Configuration shared by every component of one orchestrator.
///
/// Blocking and split-phase calls read the same values, so both modes poll
/// with the same delay and attempt limit.
///
/// Missing fields deserialize to their defaults, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
	/// Origin of the remote service.
	pub base_url: String,
	/// Sleep before each status poll.
	pub poll_delay_ms: u64,
	/// Polls allowed before giving up with a timeout.
	pub max_poll_attempts: u32,
	/// Per-request transport timeout.
	pub request_timeout_ms: u64,
	/// Send an ordinary browser's full header set. The remote may reject
	/// requests that carry only the minimum.
	pub browser_headers: bool,
	/// Overrides [`DEFAULT_USER_AGENT`].
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			poll_delay_ms: DEFAULT_POLL_DELAY_MS,
			max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
			request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
			browser_headers: true,
			user_agent: None,
		}
	}
}

impl ClientConfig {
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn with_poll_delay(mut self, delay: Duration) -> Self {
		self.poll_delay_ms = delay.as_millis() as u64;
		self
	}

	pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
		self.max_poll_attempts = attempts;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout_ms = timeout.as_millis() as u64;
		self
	}

	pub fn with_browser_headers(mut self, enabled: bool) -> Self {
		self.browser_headers = enabled;
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	pub fn poll_delay(&self) -> Duration {
		Duration::from_millis(self.poll_delay_ms)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}

	pub fn user_agent(&self) -> &str {
		self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
	}

	/// Time spent sleeping between polls when every attempt is used.
	pub fn polling_budget(&self) -> Duration {
		self.poll_delay().checked_mul(self.max_poll_attempts).unwrap_or(Duration::MAX)
	}

	/// Upper bound on one blocking invocation.
	///
	/// Every poll may sleep the delay and then wait out the request timeout;
	/// bootstrap and submission add one request timeout each.
	pub fn worst_case_duration(&self) -> Duration {
		let requests = self.max_poll_attempts.saturating_add(2);
		let transport = self.request_timeout().checked_mul(requests).unwrap_or(Duration::MAX);
		self.polling_budget().saturating_add(transport)
	}

	/// Parses and checks the base URL.
	pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
		let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
			url: self.base_url.clone(),
			reason: e.to_string(),
		})?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidBaseUrl {
				url: self.base_url.clone(),
				reason: format!("unsupported scheme {:?}", url.scheme()),
			});
		}

		Ok(url)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		self.parsed_base_url()?;
		if self.max_poll_attempts == 0 {
			return Err(ConfigError::ZeroAttempts);
		}
		if self.request_timeout_ms == 0 {
			return Err(ConfigError::ZeroTimeout);
		}
		Ok(())
	}
}
