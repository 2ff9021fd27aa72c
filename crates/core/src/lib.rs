//! imagegen: drive a remote AI image generator that has no public API.
//!
//! The remote only serves browsers, so every invocation first bootstraps an
//! anonymous session (cookies plus a CSRF token), then creates a job and polls
//! it until the remote reports a result.
//!
//! # Examples
//!
//! ## Blocking
//!
//! ```ignore
//! use imagegen::{ClientConfig, GenerationRequest, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(&ClientConfig::default())?;
//!     let generation = orchestrator.generate(&GenerationRequest::new("a red fox")?).await?;
//!     for url in generation.images {
//!         println!("{url}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Split-phase
//!
//! ```ignore
//! let ticket = orchestrator.start(&GenerationRequest::new("a red fox")?).await?;
//! // store `ticket` anywhere; it is plain serde data
//! loop {
//!     match orchestrator.check_ticket(&ticket).await? {
//!         TaskStatus::Pending => tokio::time::sleep(orchestrator.poll_delay()).await,
//!         done => break done,
//!     }
//! }
//! ```

pub mod config;
pub mod cookie;
pub mod error;
pub mod executor;
pub mod headers;
pub mod orchestrator;
pub mod poll;
pub mod request;
pub mod session;
pub mod submit;

pub use config::ClientConfig;
pub use error::{ConfigError, Error, ErrorKind, Result, SessionError, SubmitError, TransportError, ValidationError};
pub use executor::RequestExecutor;
pub use headers::{HeaderPolicy, check_session};
pub use orchestrator::{Generation, Orchestrator, Phase};
pub use poll::TaskPoller;
pub use request::GenerationRequest;
pub use session::SessionProvider;
pub use submit::TaskSubmitter;

// Re-export the wire types so callers need only one dependency.
pub use imagegen_protocol as protocol;
pub use imagegen_protocol::{CheckResponse, Session, TaskHandle, TaskState, TaskStatus, TaskTicket};
