//! Logger initialization.
//!
//! The crate itself only talks to the `log` facade. This is a convenience for
//! binaries and tests that want to see it.

use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "glpass=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	pub env_filter: Option<String>,
	pub write_style: env_logger::WriteStyle,
	pub is_test: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			env_filter: None,
			write_style: env_logger::WriteStyle::Auto,
			is_test: false,
		}
	}
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
	INIT.call_once(|| {
		let mut builder = env_logger::Builder::new();

		if let Some(filter) = config.env_filter {
			builder.parse_filters(&filter);
		} else if let Ok(filter) = std::env::var("RUST_LOG") {
			builder.parse_filters(&filter);
		} else {
			builder.filter_level(log::LevelFilter::Warn);
		}

		builder.write_style(config.write_style);
		builder.is_test(config.is_test);

		// Another logger may already be installed by the host application.
		if builder.try_init().is_ok() {
			log::debug!("logging initialized");
		}
	});
}
