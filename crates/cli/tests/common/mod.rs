// Test harness: a scripted remote generator plus the real API server in
// front of it, both on loopback ports.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use imagegen::{ClientConfig, Orchestrator};
use imagegen_cli::server::{self, AppState};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct Remote {
	pub token_cookie: Option<&'static str>,
	pub progress: Vec<Value>,
	pub progress_status: u16,
	pub progress_delay: Duration,
}

impl Default for Remote {
	fn default() -> Self {
		Self {
			token_cookie: Some("XSRF-TOKEN=abc%3D%3D; Path=/"),
			progress: vec![json!({"state": "completed", "images": ["https://x/1.png"]})],
			progress_status: 200,
			progress_delay: Duration::ZERO,
		}
	}
}

struct RemoteState {
	script: Remote,
	polls: AtomicUsize,
}

/// Mock remote and API server, torn down on drop.
pub struct Harness {
	pub api: String,
	remote_state: Arc<RemoteState>,
	tasks: Vec<JoinHandle<()>>,
}

impl Harness {
	pub async fn start(script: Remote, deadline: Duration) -> Self {
		Self::start_with(script, deadline, |config| config).await
	}

	pub async fn start_with(script: Remote, deadline: Duration, tune: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
		let remote_state = Arc::new(RemoteState {
			script,
			polls: AtomicUsize::new(0),
		});
		let remote_app = Router::new()
			.route("/image/ai-image-generator", get(bootstrap))
			.route("/image/prepare", post(prepare))
			.route("/task/progress/{id}", post(progress))
			.with_state(remote_state.clone());

		let remote_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let remote_addr = remote_listener.local_addr().unwrap();
		let remote = tokio::spawn(async move {
			axum::serve(remote_listener, remote_app).await.unwrap();
		});

		let config = tune(
			ClientConfig::default()
				.with_base_url(format!("http://{remote_addr}"))
				.with_poll_delay(Duration::from_millis(5))
				.with_max_poll_attempts(5)
				.with_request_timeout(Duration::from_secs(5)),
		);
		let state = AppState::new(Orchestrator::new(&config).unwrap(), deadline);

		let api_listener = server::bind("127.0.0.1", 0).await.unwrap();
		let api_addr = api_listener.local_addr().unwrap();
		let api = tokio::spawn(async move {
			server::serve(api_listener, state).await.unwrap();
		});

		Self {
			api: format!("http://{api_addr}"),
			remote_state,
			tasks: vec![remote, api],
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{path}", self.api)
	}

	pub fn polls(&self) -> usize {
		self.remote_state.polls.load(Ordering::SeqCst)
	}
}

impl Drop for Harness {
	fn drop(&mut self) {
		for task in &self.tasks {
			task.abort();
		}
	}
}

async fn bootstrap(State(state): State<Arc<RemoteState>>) -> Response {
	let mut response = "<html></html>".into_response();
	if let Some(cookie) = state.script.token_cookie {
		response.headers_mut().append(SET_COOKIE, HeaderValue::from_static(cookie));
	}
	response
		.headers_mut()
		.append(SET_COOKIE, HeaderValue::from_static("laravel_session=s1; Path=/; HttpOnly"));
	response
}

async fn prepare(Json(_body): Json<Value>) -> Json<Value> {
	Json(json!({"task_id": "t1"}))
}

async fn progress(State(state): State<Arc<RemoteState>>) -> Response {
	let n = state.polls.fetch_add(1, Ordering::SeqCst);
	if !state.script.progress_delay.is_zero() {
		tokio::time::sleep(state.script.progress_delay).await;
	}

	let body = state
		.script
		.progress
		.get(n)
		.or(state.script.progress.last())
		.cloned()
		.unwrap_or_else(|| json!({}));
	let status = StatusCode::from_u16(state.script.progress_status).unwrap();
	(status, Json(body)).into_response()
}
