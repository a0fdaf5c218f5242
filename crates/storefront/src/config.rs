//! Storefront client configuration

use sf_cart::DEFAULT_STORAGE_KEY;
use sf_cart_api::RequestConfig;

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "storefront.json";

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	let dir = ProjectDirs::from("shop", "Handmade", "storefront")
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.data_local_dir()
		.to_path_buf();

	// Create directory if it doesn't exist
	fs::create_dir_all(&dir)?;

	Ok(dir)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
	/// Config schema version
	pub version: u32,

	/// Base url of the storefront backend, cart endpoints hang off it
	pub api_url: String,

	/// Where the local cart and this file live
	pub data_dir: PathBuf,

	/// Name of the persisted cart entry
	#[serde(default = "default_storage_key")]
	pub storage_key: String,

	/// Logging level, overridden by `RUST_LOG`
	#[serde(default = "default_log_level")]
	pub log_level: String,

	/// Session CSRF token sent along with cart mutations
	#[serde(default)]
	pub csrf_token: Option<String>,
}

fn default_storage_key() -> String {
	DEFAULT_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

impl StorefrontConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		Self::load_from(&default_data_dir()?)
	}

	/// Load configuration from a specific data directory, writing defaults if there is none
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let config: Self = serde_json::from_str(&json)?;

			if config.version > Self::target_version() {
				bail!(
					"config at {:?} is for a newer version (v{} > v{})",
					config_path,
					config.version,
					Self::target_version()
				);
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			api_url: "http://localhost:8000".to_string(),
			data_dir,
			storage_key: default_storage_key(),
			log_level: default_log_level(),
			csrf_token: None,
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let json = serde_json::to_string_pretty(self)?;
		fs::write(self.data_dir.join(CONFIG_FILE), json)?;

		Ok(())
	}

	#[must_use]
	pub fn request_config(&self) -> RequestConfig {
		let config = RequestConfig::new(&self.api_url);

		match &self.csrf_token {
			Some(token) => config.with_csrf_token(token),
			None => config,
		}
	}

	const fn target_version() -> u32 {
		1
	}
}
