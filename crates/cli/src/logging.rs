//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable that turns on debug logging like `--debug`.
pub const DEBUG_ENV: &str = "DOCGRAB_DEBUG";

/// Installs the stderr subscriber. `RUST_LOG` wins over the computed level.
pub fn init_logging(debug: bool) {
	let env_debug = std::env::var_os(DEBUG_ENV).is_some_and(|value| !value.is_empty());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug || env_debug)));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.try_init();
}

fn default_directive(debug: bool) -> &'static str {
	if debug { "debug" } else { "info" }
}
