use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::StorefrontConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Safe to call more than once, later calls keep the first subscriber.
pub fn init_logging(config: &StorefrontConfig) -> Result<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.log_level)?,
	};

	if tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer())
		.try_init()
		.is_err()
	{
		debug!("Global tracing subscriber already installed");
	}

	Ok(())
}
