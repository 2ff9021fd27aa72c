//! HTTP API over the orchestrator.
//!
//! Every handler runs its orchestrator call under the host deadline. When the
//! deadline elapses the call's future is dropped, which abandons the remote
//! task without telling the remote service.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use imagegen::protocol::{ErrorResponse, GenerateResponse, PromptBody};
use imagegen::{CheckResponse, GenerationRequest, Orchestrator, TaskTicket, check_session};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::CliError;
use crate::output::ErrorCode;

pub const BANNER: &str = "Backend AI Image Generator Active!";

#[derive(Debug, Clone)]
pub struct AppState {
	orchestrator: Orchestrator,
	deadline: Duration,
}

impl AppState {
	pub fn new(orchestrator: Orchestrator, deadline: Duration) -> Self {
		Self { orchestrator, deadline }
	}

	/// Runs `call` under the host deadline.
	async fn bounded<T, F>(&self, call: F) -> Result<T, ApiError>
	where
		F: Future<Output = imagegen::Result<T>>,
	{
		match tokio::time::timeout(self.deadline, call).await {
			Ok(result) => result.map_err(|err| ApiError(err.into())),
			Err(_) => {
				let ms = self.deadline.as_millis() as u64;
				warn!(deadline_ms = ms, "deadline exceeded; abandoning task");
				Err(ApiError(CliError::DeadlineExceeded { ms }))
			}
		}
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(|| async { BANNER }))
		.route("/api/generate", post(generate))
		.route("/api/start", post(start))
		.route("/api/check", post(check))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

/// Serves the API on an already bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
	let addr = listener.local_addr().context("listener has no local address")?;
	info!(%addr, deadline_ms = state.deadline.as_millis() as u64, "serving image generation API");

	axum::serve(listener, router(state)).await.context("HTTP server error")
}

pub async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
	let addr: SocketAddr = format!("{host}:{port}")
		.parse()
		.with_context(|| format!("Invalid host/port combination: {host}:{port}"))?;

	TcpListener::bind(addr).await.with_context(|| format!("Failed to bind API server to {addr}"))
}

/// Error response in the shared `{success: false, error, message}` shape.
#[derive(Debug)]
pub struct ApiError(pub CliError);

impl ApiError {
	fn invalid(message: impl Into<String>) -> Self {
		Self(CliError::InvalidInput(message.into()))
	}
}

pub fn status_for(code: ErrorCode) -> StatusCode {
	match code {
		ErrorCode::AuthenticationFailed | ErrorCode::SubmissionFailed => StatusCode::BAD_GATEWAY,
		ErrorCode::GenerationFailed => StatusCode::UNPROCESSABLE_ENTITY,
		ErrorCode::TimedOut | ErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
		ErrorCode::TransportFailure => StatusCode::SERVICE_UNAVAILABLE,
		ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
		ErrorCode::ConfigError | ErrorCode::IoError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let error = self.0.to_command_error();
		let body = ErrorResponse::new(error.code.as_str(), error.message);
		(status_for(error.code), Json(body)).into_response()
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::invalid(rejection.body_text())
	}
}

fn prompt_from(body: Result<Json<PromptBody>, JsonRejection>) -> Result<GenerationRequest, ApiError> {
	let Json(body) = body?;
	let prompt = body.prompt.ok_or_else(|| ApiError::invalid("Prompt is required"))?;
	GenerationRequest::new(prompt).map_err(|err| ApiError(err.into()))
}

async fn generate(State(state): State<AppState>, body: Result<Json<PromptBody>, JsonRejection>) -> Result<Json<GenerateResponse>, ApiError> {
	let request = prompt_from(body)?;
	let generation = state.bounded(state.orchestrator.generate(&request)).await?;

	Ok(Json(GenerateResponse {
		success: true,
		task_id: generation.task_id,
		images: generation.images,
		attempts: generation.attempts,
	}))
}

async fn start(State(state): State<AppState>, body: Result<Json<PromptBody>, JsonRejection>) -> Result<Json<TaskTicket>, ApiError> {
	let request = prompt_from(body)?;
	let ticket = state.bounded(state.orchestrator.start(&request)).await?;
	Ok(Json(ticket))
}

async fn check(State(state): State<AppState>, body: Result<Json<TaskTicket>, JsonRejection>) -> Result<Json<CheckResponse>, ApiError> {
	let Json(ticket) = body?;
	if ticket.task_id().trim().is_empty() {
		return Err(ApiError::invalid("taskId is required"));
	}
	check_session(&ticket.session).map_err(|err| ApiError::invalid(err.to_string()))?;

	let status = state.bounded(state.orchestrator.check_ticket(&ticket)).await?;
	Ok(Json(CheckResponse::from(status)))
}
