//! The one configured HTTP client every component sends through.

use std::time::Duration;

use imagegen_protocol::Session;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::headers::HeaderPolicy;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Appends `path` to the base URL's path, keeping any prefix the base has.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Url {
	endpoint_url_segments(base, path.split('/').filter(|s| !s.is_empty()))
}

/// Like [`endpoint_url`], with each segment percent-encoded on its own.
pub(crate) fn endpoint_url_segments<'a, I>(base: &Url, segments: I) -> Url
where
	I: IntoIterator<Item = &'a str>,
{
	let mut url = base.clone();
	url.set_query(None);
	url.set_fragment(None);
	if let Ok(mut path) = url.path_segments_mut() {
		path.pop_if_empty().extend(segments);
	}
	url
}

/// Shared request executor: one `reqwest::Client`, one base URL, one
/// [`HeaderPolicy`].
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RequestExecutor {
	client: Client,
	base_url: Url,
	headers: HeaderPolicy,
	request_timeout: Duration,
}

impl std::fmt::Debug for RequestExecutor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RequestExecutor")
			.field("base_url", &self.base_url.as_str())
			.field("request_timeout_ms", &self.request_timeout.as_millis())
			.field("browser_headers", &self.headers.browser_headers())
			.finish()
	}
}

impl RequestExecutor {
	/// Validates `config` and builds the underlying client.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		let base_url = config.parsed_base_url()?;
		let headers = HeaderPolicy::new(config, &base_url)?;

		let client = Client::builder()
			.timeout(config.request_timeout())
			.connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout()))
			.build()
			.map_err(ConfigError::Client)?;

		debug!(
			base_url = %base_url,
			timeout_ms = config.request_timeout_ms,
			browser_headers = config.browser_headers,
			"created request executor"
		);

		Ok(Self {
			client,
			base_url,
			headers,
			request_timeout: config.request_timeout(),
		})
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn header_policy(&self) -> &HeaderPolicy {
		&self.headers
	}

	pub(crate) fn endpoint(&self, path: &str) -> Url {
		endpoint_url(&self.base_url, path)
	}

	pub(crate) fn endpoint_segments<'a, I>(&self, segments: I) -> Url
	where
		I: IntoIterator<Item = &'a str>,
	{
		endpoint_url_segments(&self.base_url, segments)
	}

	/// Loads a page anonymously and returns the successful response unread.
	pub(crate) async fn get_page(&self, url: Url) -> Result<Response, TransportError> {
		debug!(url = %url, "GET");
		let response = self
			.client
			.get(url.clone())
			.headers(self.headers.bootstrap_headers())
			.send()
			.await
			.map_err(|source| TransportError::Request {
				url: url.to_string(),
				source,
			})?;

		ensure_success(&url, response)
	}

	/// POSTs `body` as JSON on behalf of `session` and decodes the JSON reply.
	pub(crate) async fn post_json<B, R>(&self, url: Url, session: &Session, body: &B) -> Result<R, TransportError>
	where
		B: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		debug!(url = %url, "POST");
		let response = self
			.client
			.post(url.clone())
			.headers(self.headers.api_headers(session)?)
			.json(body)
			.send()
			.await
			.map_err(|source| TransportError::Request {
				url: url.to_string(),
				source,
			})?;

		let response = ensure_success(&url, response)?;
		response.json::<R>().await.map_err(|source| TransportError::Decode {
			url: url.to_string(),
			source,
		})
	}
}

fn ensure_success(url: &Url, response: Response) -> Result<Response, TransportError> {
	let status = response.status();
	if status.is_success() {
		Ok(response)
	} else {
		Err(TransportError::Status {
			url: url.to_string(),
			status: status.as_u16(),
		})
	}
}
