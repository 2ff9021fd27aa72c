// Scripted stand-in for the remote image generator.
//
// Serves the three remote resources on a random local port, answers from a
// fixed script and records every request it sees.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use imagegen::ClientConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TOKEN_COOKIE: &str = "XSRF-TOKEN=abc%3D%3D; Path=/; Secure";
pub const SESSION_COOKIE: &str = "laravel_session=s1; Path=/; HttpOnly";

#[derive(Debug, Clone)]
pub struct Script {
	pub set_cookies: Vec<String>,
	pub bootstrap_status: u16,
	pub prepare_status: u16,
	pub prepare_body: Value,
	/// Answered in order; the last entry repeats once the list runs out.
	pub progress: Vec<Value>,
	pub progress_status: u16,
	pub progress_delay: Duration,
}

impl Default for Script {
	fn default() -> Self {
		Self {
			set_cookies: vec![TOKEN_COOKIE.to_string(), SESSION_COOKIE.to_string()],
			bootstrap_status: 200,
			prepare_status: 200,
			prepare_body: json!({"task_id": "t1"}),
			progress: vec![json!({"state": "completed", "images": ["https://x/1.png"]})],
			progress_status: 200,
			progress_delay: Duration::ZERO,
		}
	}
}

impl Script {
	pub fn cookies(mut self, cookies: &[&str]) -> Self {
		self.set_cookies = cookies.iter().map(|c| c.to_string()).collect();
		self
	}

	pub fn progress(mut self, progress: Vec<Value>) -> Self {
		self.progress = progress;
		self
	}

	pub fn prepare(mut self, status: u16, body: Value) -> Self {
		self.prepare_status = status;
		self.prepare_body = body;
		self
	}
}

/// One recorded request: headers and, for JSON posts, the body.
#[derive(Debug, Clone)]
pub struct Seen {
	pub path: String,
	pub headers: HeaderMap,
	pub body: Value,
}

impl Seen {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

#[derive(Default)]
struct Counters {
	bootstrap: AtomicUsize,
	prepare: AtomicUsize,
	progress: AtomicUsize,
}

struct MockState {
	script: Script,
	counters: Counters,
	prepares: Mutex<Vec<Seen>>,
	polls: Mutex<Vec<Seen>>,
}

pub struct MockRemote {
	addr: SocketAddr,
	state: Arc<MockState>,
	handle: JoinHandle<()>,
}

impl MockRemote {
	pub async fn start(script: Script) -> Self {
		let state = Arc::new(MockState {
			script,
			counters: Counters::default(),
			prepares: Mutex::new(Vec::new()),
			polls: Mutex::new(Vec::new()),
		});

		let app = Router::new()
			.route("/image/ai-image-generator", get(bootstrap))
			.route("/image/prepare", post(prepare))
			.route("/task/progress/{id}", post(progress))
			.with_state(state.clone());

		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock remote");
		let addr = listener.local_addr().expect("mock remote address");
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.expect("mock remote stopped");
		});

		Self { addr, state, handle }
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	/// Client config aimed at this mock with a short poll delay.
	pub fn config(&self) -> ClientConfig {
		ClientConfig::default()
			.with_base_url(self.url())
			.with_poll_delay(Duration::from_millis(5))
			.with_request_timeout(Duration::from_secs(5))
	}

	pub fn bootstrap_hits(&self) -> usize {
		self.state.counters.bootstrap.load(Ordering::SeqCst)
	}

	pub fn prepare_hits(&self) -> usize {
		self.state.counters.prepare.load(Ordering::SeqCst)
	}

	pub fn progress_hits(&self) -> usize {
		self.state.counters.progress.load(Ordering::SeqCst)
	}

	pub fn prepares(&self) -> Vec<Seen> {
		self.state.prepares.lock().unwrap().clone()
	}

	pub fn polls(&self) -> Vec<Seen> {
		self.state.polls.lock().unwrap().clone()
	}
}

impl Drop for MockRemote {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

fn status(code: u16) -> StatusCode {
	StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn bootstrap(State(state): State<Arc<MockState>>) -> Response {
	state.counters.bootstrap.fetch_add(1, Ordering::SeqCst);

	let mut response = (status(state.script.bootstrap_status), "<html><body>generator</body></html>").into_response();
	for cookie in &state.script.set_cookies {
		response.headers_mut().append(SET_COOKIE, HeaderValue::from_str(cookie).unwrap());
	}
	response
}

async fn prepare(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
	state.counters.prepare.fetch_add(1, Ordering::SeqCst);
	state.prepares.lock().unwrap().push(Seen {
		path: "/image/prepare".into(),
		headers,
		body,
	});

	(status(state.script.prepare_status), Json(state.script.prepare_body.clone())).into_response()
}

async fn progress(State(state): State<Arc<MockState>>, Path(id): Path<String>, headers: HeaderMap) -> Response {
	let n = state.counters.progress.fetch_add(1, Ordering::SeqCst);
	state.polls.lock().unwrap().push(Seen {
		path: id,
		headers,
		body: Value::Null,
	});

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
	(status(state.script.progress_status), Json(body)).into_response()
}
