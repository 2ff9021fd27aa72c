//! On-disk store for split-phase tickets.
//!
//! `start` writes one JSON file per task; `check` reads it back and removes
//! it once the task reaches a terminal state. Tickets carry live session
//! cookies, so files are owner-only on unix.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use imagegen::TaskTicket;
use tracing::debug;

use crate::error::{CliError, Result};

#[derive(Debug, Clone)]
pub struct TicketStore {
	dir: PathBuf,
}

impl TicketStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// `$XDG_CACHE_HOME/imagegen/tickets` (or the platform equivalent).
	pub fn default_dir() -> Option<PathBuf> {
		dirs::cache_dir().map(|dir| dir.join("imagegen").join("tickets"))
	}

	pub fn open_default() -> Result<Self> {
		Self::default_dir()
			.map(Self::new)
			.ok_or_else(|| CliError::InvalidInput("no cache directory available for tickets; pass --ticket".into()))
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// File a ticket for `task_id` is stored under.
	///
	/// Task ids are remote-assigned, so they are percent-encoded before they
	/// reach the filesystem. The encoding is injective: distinct ids never
	/// share a file, and no id can name a path separator.
	pub fn path_for(&self, task_id: &str) -> PathBuf {
		self.dir.join(format!("{}.json", urlencoding::encode(task_id)))
	}

	pub fn save(&self, ticket: &TaskTicket) -> Result<PathBuf> {
		let path = self.path_for(ticket.task_id());
		save_json(&path, ticket)?;
		debug!(task_id = ticket.task_id(), path = %path.display(), "stored ticket");
		Ok(path)
	}

	pub fn load(&self, task_id: &str) -> Result<TaskTicket> {
		let path = self.path_for(task_id);
		match fs::read_to_string(&path) {
			Ok(content) => Ok(serde_json::from_str(&content)?),
			Err(err) if err.kind() == ErrorKind::NotFound => Err(CliError::TicketNotFound {
				task_id: task_id.to_string(),
				path,
			}),
			Err(err) => Err(err.into()),
		}
	}

	/// Deletes the stored ticket. Returns whether one existed.
	pub fn remove(&self, task_id: &str) -> Result<bool> {
		let path = self.path_for(task_id);
		match fs::remove_file(&path) {
			Ok(()) => {
				debug!(task_id, path = %path.display(), "removed ticket");
				Ok(true)
			}
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
			Err(err) => Err(err.into()),
		}
	}
}

/// Reads a ticket from an arbitrary file, e.g. one saved from `start` output.
pub fn load_ticket_file(path: &Path) -> Result<TaskTicket> {
	let content = fs::read_to_string(path)?;
	Ok(serde_json::from_str(&content)?)
}

fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, serde_json::to_string_pretty(data)?)?;
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
	}
	Ok(())
}
