//! Which headers go on which request.
//!
//! The remote only accepts writes that look like they came from its own page
//! in a real browser: the CSRF token header, the session cookies, and (unless
//! disabled) the rest of a browser's usual header set. Building the maps is
//! pure so the policy can be tested without a network.

use imagegen_protocol::{BOOTSTRAP_PATH, Session, TOKEN_COOKIE, TOKEN_HEADER};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ConfigError, SessionError, TransportError};
use crate::executor::endpoint_url;

const BOOTSTRAP_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const API_ACCEPT: &str = "application/json, text/plain, */*";
const API_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const BROWSER_LANGUAGE: &str = "en-US,en;q=0.9";

/// Header policy derived once from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
	browser_headers: bool,
	user_agent: HeaderValue,
	origin: HeaderValue,
	referer: HeaderValue,
}

impl HeaderPolicy {
	pub fn new(config: &ClientConfig, base_url: &Url) -> Result<Self, ConfigError> {
		let user_agent = HeaderValue::from_str(config.user_agent()).map_err(|_| ConfigError::InvalidUserAgent)?;

		let invalid_base = |reason: &str| ConfigError::InvalidBaseUrl {
			url: base_url.to_string(),
			reason: reason.to_string(),
		};
		let origin = HeaderValue::from_str(&base_url.origin().ascii_serialization()).map_err(|_| invalid_base("origin is not a valid header value"))?;
		let referer = HeaderValue::from_str(endpoint_url(base_url, BOOTSTRAP_PATH).as_str()).map_err(|_| invalid_base("referer is not a valid header value"))?;

		Ok(Self {
			browser_headers: config.browser_headers,
			user_agent,
			origin,
			referer,
		})
	}

	pub fn browser_headers(&self) -> bool {
		self.browser_headers
	}

	/// Headers for the read-only bootstrap page load.
	pub fn bootstrap_headers(&self) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(USER_AGENT, self.user_agent.clone());
		if self.browser_headers {
			headers.insert(ACCEPT, HeaderValue::from_static(BOOTSTRAP_ACCEPT));
			headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_LANGUAGE));
		} else {
			headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
		}
		headers
	}

	/// Headers for an authenticated JSON call made on behalf of `session`.
	pub fn api_headers(&self, session: &Session) -> Result<HeaderMap, TransportError> {
		let token = HeaderValue::from_str(&session.csrf_token).map_err(|_| TransportError::InvalidHeader { name: TOKEN_HEADER })?;
		let cookie = HeaderValue::from_str(&session.cookie_header).map_err(|_| TransportError::InvalidHeader { name: "Cookie" })?;

		let mut headers = HeaderMap::new();
		headers.insert(USER_AGENT, self.user_agent.clone());
		headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(API_CONTENT_TYPE));
		headers.insert(HeaderName::from_static("x-xsrf-token"), token);
		headers.insert(COOKIE, cookie);

		if self.browser_headers {
			headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_LANGUAGE));
			headers.insert(ORIGIN, self.origin.clone());
			headers.insert(REFERER, self.referer.clone());
			headers.insert(HeaderName::from_static("x-requested-with"), HeaderValue::from_static("XMLHttpRequest"));
		}

		Ok(headers)
	}
}

/// Checks that `session` can authenticate a request at all.
///
/// The token must be non-blank and both values must be valid header values.
/// Sessions handed back by callers go through this before any request is
/// made on their behalf.
pub fn check_session(session: &Session) -> Result<(), SessionError> {
	if session.csrf_token.trim().is_empty() {
		return Err(SessionError::EmptyToken { cookie: TOKEN_COOKIE });
	}
	if HeaderValue::from_str(&session.csrf_token).is_err() {
		return Err(SessionError::Unsendable { field: TOKEN_HEADER });
	}
	if HeaderValue::from_str(&session.cookie_header).is_err() {
		return Err(SessionError::Unsendable { field: "Cookie" });
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn policy(browser_headers: bool) -> HeaderPolicy {
		let config = ClientConfig::default().with_browser_headers(browser_headers);
		let base = config.parsed_base_url().unwrap();
		HeaderPolicy::new(&config, &base).unwrap()
	}

	fn session() -> Session {
		Session::new("XSRF-TOKEN=abc%3D%3D; tinywow_session=s", "abc==")
	}

	#[test]
	fn api_headers_carry_token_and_cookies() {
		let headers = policy(false).api_headers(&session()).unwrap();
		assert_eq!(headers["x-xsrf-token"], "abc==");
		assert_eq!(headers[COOKIE], "XSRF-TOKEN=abc%3D%3D; tinywow_session=s");
		assert_eq!(headers[CONTENT_TYPE], API_CONTENT_TYPE);
	}

	#[test]
	fn minimal_policy_omits_browser_context() {
		let headers = policy(false).api_headers(&session()).unwrap();
		assert!(headers.get(ORIGIN).is_none());
		assert!(headers.get(REFERER).is_none());
		assert!(headers.get(ACCEPT_LANGUAGE).is_none());
	}

	#[test]
	fn browser_policy_presents_as_the_remote_page() {
		let headers = policy(true).api_headers(&session()).unwrap();
		assert_eq!(headers[ORIGIN], "https://tinywow.com");
		assert_eq!(headers[REFERER], "https://tinywow.com/image/ai-image-generator");
		assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
		assert!(headers[USER_AGENT].to_str().unwrap().contains("Chrome/"));
	}

	#[test]
	fn bootstrap_asks_for_html() {
		let full = policy(true).bootstrap_headers();
		assert!(full[ACCEPT].to_str().unwrap().starts_with("text/html"));
		assert!(full.get(ACCEPT_LANGUAGE).is_some());
		assert!(full.get(COOKIE).is_none());

		let minimal = policy(false).bootstrap_headers();
		assert_eq!(minimal[ACCEPT], "text/html");
	}

	#[test]
	fn unsendable_session_values_are_rejected() {
		let bad = Session::new("a=1", "line\nbreak");
		assert!(matches!(
			policy(true).api_headers(&bad),
			Err(TransportError::InvalidHeader { name: TOKEN_HEADER })
		));
	}

	#[test]
	fn check_session_rejects_unusable_material() {
		assert!(check_session(&session()).is_ok());
		assert!(matches!(
			check_session(&Session::new("a=1", "  ")),
			Err(SessionError::EmptyToken { .. })
		));
		assert!(matches!(
			check_session(&Session::new("a=1", "bad\ntoken")),
			Err(SessionError::Unsendable { field: TOKEN_HEADER })
		));
		assert!(matches!(
			check_session(&Session::new("a=1\r\nx", "tok")),
			Err(SessionError::Unsendable { field: "Cookie" })
		));
	}

	#[test]
	fn invalid_user_agent_is_a_config_error() {
		let config = ClientConfig::default().with_user_agent("bad\nagent");
		let base = config.parsed_base_url().unwrap();
		assert!(matches!(HeaderPolicy::new(&config, &base), Err(ConfigError::InvalidUserAgent)));
	}
}
