//! Wire types for the image generation protocol.
//!
//! This crate contains the serde-serializable types exchanged with the remote
//! image generator and with callers of the orchestrator. These types represent
//! the "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization and small conversions
//! - **Lenient at the remote edge**: The remote service has no published
//!   contract, so its responses are decoded loosely and normalized here
//! - **Stable at the caller edge**: [`TaskTicket`], [`CheckResponse`] and
//!   friends are what split-phase callers persist and parse
//!
//! Higher-level orchestration is built on top of these types in `imagegen`.

pub mod api;
pub mod remote;
pub mod session;
pub mod task;

pub use api::*;
pub use remote::*;
pub use session::*;
pub use task::*;
