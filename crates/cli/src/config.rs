//! Client configuration resolution: defaults, then config file, then flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use imagegen::ClientConfig;
use tracing::debug;

use crate::cli::ClientArgs;
use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "imagegen";
const CONFIG_FILE: &str = "config.json";

/// `$XDG_CONFIG_HOME/imagegen/config.json` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// A resolved configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	pub config: ClientConfig,
	pub source: Option<PathBuf>,
}

impl LoadedConfig {
	/// Loads `explicit` if given, else the default file if it exists, then
	/// applies `args` on top and validates the result.
	///
	/// An explicit file that does not exist is an error; a missing default
	/// file is not.
	pub fn resolve(explicit: Option<&Path>, args: &ClientArgs) -> Result<Self> {
		let (mut config, source) = match explicit {
			Some(path) => (read_config(path)?, Some(path.to_path_buf())),
			None => match default_config_path().filter(|path| path.is_file()) {
				Some(path) => (read_config(&path)?, Some(path)),
				None => (ClientConfig::default(), None),
			},
		};

		apply_overrides(&mut config, args);
		config.validate()?;

		debug!(source = ?source, base_url = %config.base_url, "resolved client config");
		Ok(Self { config, source })
	}
}

fn read_config(path: &Path) -> Result<ClientConfig> {
	let content = fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
		path: path.to_path_buf(),
		reason: e.to_string(),
	})?;
	serde_json::from_str(&content).map_err(|e| CliError::ConfigFile {
		path: path.to_path_buf(),
		reason: e.to_string(),
	})
}

pub fn apply_overrides(config: &mut ClientConfig, args: &ClientArgs) {
	if let Some(ref base_url) = args.base_url {
		config.base_url = base_url.clone();
	}
	if let Some(ms) = args.poll_delay_ms {
		config.poll_delay_ms = ms;
	}
	if let Some(attempts) = args.max_attempts {
		config.max_poll_attempts = attempts;
	}
	if let Some(ms) = args.request_timeout_ms {
		config.request_timeout_ms = ms;
	}
	if args.minimal_headers {
		config.browser_headers = false;
	}
	if let Some(ref user_agent) = args.user_agent {
		config.user_agent = Some(user_agent.clone());
	}
}

/// Rejects a host deadline that would cut polling short.
///
/// The orchestrator's own polling budget must end first, so that callers see
/// `TIMED_OUT` instead of an abandoned request.
pub fn check_deadline(config: &ClientConfig, deadline: Duration) -> Result<()> {
	let budget = config.polling_budget();
	if budget >= deadline {
		return Err(CliError::InvalidInput(format!(
			"deadline of {}ms must exceed the polling budget of {}ms ({} attempts x {}ms)",
			deadline.as_millis(),
			budget.as_millis(),
			config.max_poll_attempts,
			config.poll_delay_ms
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn flags_override_file_values() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.json");
		fs::write(&path, r#"{"baseUrl": "http://127.0.0.1:9000", "maxPollAttempts": 20, "pollDelayMs": 500}"#).unwrap();

		let args = ClientArgs {
			max_attempts: Some(3),
			minimal_headers: true,
			..Default::default()
		};
		let loaded = LoadedConfig::resolve(Some(&path), &args).unwrap();

		assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
		assert_eq!(loaded.config.base_url, "http://127.0.0.1:9000");
		assert_eq!(loaded.config.poll_delay_ms, 500);
		assert_eq!(loaded.config.max_poll_attempts, 3);
		assert!(!loaded.config.browser_headers);
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let tmp = TempDir::new().unwrap();
		let err = LoadedConfig::resolve(Some(&tmp.path().join("nope.json")), &ClientArgs::default()).unwrap_err();
		assert!(matches!(err, CliError::ConfigFile { .. }));
	}

	#[test]
	fn malformed_file_is_an_error() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.json");
		fs::write(&path, "{ not json").unwrap();

		let err = LoadedConfig::resolve(Some(&path), &ClientArgs::default()).unwrap_err();
		assert!(matches!(err, CliError::ConfigFile { .. }));
	}

	#[test]
	fn invalid_overrides_fail_validation() {
		let args = ClientArgs {
			max_attempts: Some(0),
			..Default::default()
		};
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.json");
		fs::write(&path, "{}").unwrap();

		let err = LoadedConfig::resolve(Some(&path), &args).unwrap_err();
		assert!(matches!(err, CliError::Config(imagegen::ConfigError::ZeroAttempts)));
	}

	#[test]
	fn deadline_must_exceed_polling_budget() {
		let config = ClientConfig::default();
		assert!(check_deadline(&config, Duration::from_secs(60)).is_ok());
		assert!(check_deadline(&config, Duration::from_secs(30)).is_err());
		assert!(check_deadline(&config, Duration::from_secs(10)).is_err());
	}
}
