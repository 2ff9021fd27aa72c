//! Command line and HTTP front end for the `imagegen` orchestrator.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod server;
pub mod ticket_store;
