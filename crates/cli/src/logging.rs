use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Default filter for a `-v` count. `RUST_LOG` overrides it.
pub fn default_filter(verbosity: u8) -> &'static str {
	// 0 = outcomes only (warnings from the orchestrator, errors elsewhere)
	// 1 (-v) = info: session acquired, task submitted, request traces
	// 2+ (-vv) = debug: phase transitions and every poll
	match verbosity {
		0 => "error,imagegen=warn",
		1 => "info,imagegen=info,imagegen_cli=info,tower_http=info",
		_ => "debug,hyper_util=info,rustls=info",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_verbosity_parses_as_a_filter() {
		for verbosity in 0..4 {
			EnvFilter::try_new(default_filter(verbosity)).unwrap();
		}
	}
}
