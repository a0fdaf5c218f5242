//! HTTP client for the storefront's session cart endpoints.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use sf_cart::{Cart, CartTransport, ItemId, ProductId, SyncPayload, TransportError};

use reqwest::header::{HeaderValue, ACCEPT};
use tracing::{debug, instrument};

pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone)]
pub struct RequestConfig {
	pub client: reqwest::Client,
	pub api_url: String,
	pub csrf_token: Option<String>,
}

impl RequestConfig {
	pub fn new(api_url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			api_url: api_url.into().trim_end_matches('/').to_string(),
			csrf_token: None,
		}
	}

	#[must_use]
	pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
		self.csrf_token = Some(token.into());
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.api_url)
	}
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("request failed: {0}")]
	Request(#[source] reqwest::Error),
	#[error("server answered with status {0}")]
	Status(reqwest::StatusCode),
	#[error("failed to decode response: {0}")]
	Decode(#[source] reqwest::Error),
	#[error("invalid api url: {0}")]
	InvalidUrl(String),
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		match e.status() {
			Some(status) => Self::Status(status),
			None if e.is_decode() => Self::Decode(e),
			None => Self::Request(e),
		}
	}
}

impl From<Error> for TransportError {
	fn from(e: Error) -> Self {
		match e {
			Error::Status(status) => Self::Status {
				status: status.as_u16(),
			},
			Error::Decode(e) => Self::Decode(e.to_string()),
			Error::Request(e) => Self::Request(e.to_string()),
			Error::InvalidUrl(url) => Self::Request(format!("invalid api url: {url}")),
		}
	}
}

trait WithSession {
	fn with_session(self, config: &RequestConfig) -> Self;
}

impl WithSession for reqwest::RequestBuilder {
	fn with_session(self, config: &RequestConfig) -> Self {
		let req = self.header(ACCEPT, HeaderValue::from_static("application/json"));

		match &config.csrf_token {
			Some(token) => req.header(CSRF_HEADER, token),
			None => req,
		}
	}
}

pub mod cart {
	use super::{Cart, Error, ItemId, ProductId, RequestConfig, SyncPayload, WithSession};

	pub use get::exec as get;
	pub mod get {
		use super::{Cart, Error, RequestConfig, WithSession};

		pub async fn exec(config: &RequestConfig) -> Result<Cart, Error> {
			config
				.client
				.get(config.url("/cart"))
				.with_session(config)
				.send()
				.await?
				.error_for_status()?
				.json()
				.await
				.map_err(Error::Decode)
		}
	}

	pub use sync::exec as sync;
	pub mod sync {
		use super::{Error, RequestConfig, SyncPayload, WithSession};

		pub async fn exec(config: &RequestConfig, payload: &SyncPayload) -> Result<(), Error> {
			config
				.client
				.post(config.url("/cart/sync"))
				.with_session(config)
				.json(payload)
				.send()
				.await?
				.error_for_status()?;

			Ok(())
		}
	}

	pub use add::exec as add;
	pub mod add {
		use super::{Error, ProductId, RequestConfig, WithSession};

		use serde_json::json;

		pub async fn exec(config: &RequestConfig, product_id: ProductId) -> Result<(), Error> {
			config
				.client
				.post(config.url("/cart/add"))
				.with_session(config)
				.json(&json!({ "product_id": product_id }))
				.send()
				.await?
				.error_for_status()?;

			Ok(())
		}
	}

	pub use remove::exec as remove;
	pub mod remove {
		use super::{Error, ItemId, RequestConfig, WithSession};

		pub async fn exec(config: &RequestConfig, item_id: &ItemId) -> Result<(), Error> {
			let mut url = reqwest::Url::parse(&config.url("/cart"))
				.map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.api_url)))?;

			// Pushed as a segment so sizes like "XL/XXL" get percent encoded
			url.path_segments_mut()
				.map_err(|()| Error::InvalidUrl(config.api_url.clone()))?
				.push(item_id.as_str());

			config
				.client
				.delete(url)
				.with_session(config)
				.send()
				.await?
				.error_for_status()?;

			Ok(())
		}
	}
}

/// [`CartTransport`] talking to the storefront backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	config: RequestConfig,
}

impl HttpTransport {
	#[must_use]
	pub const fn new(config: RequestConfig) -> Self {
		Self { config }
	}
}

#[async_trait::async_trait]
impl CartTransport for HttpTransport {
	#[instrument(skip_all, fields(items = payload.item_count))]
	async fn sync(&self, payload: &SyncPayload) -> Result<(), TransportError> {
		cart::sync(&self.config, payload).await?;
		debug!("Session cart synced");
		Ok(())
	}

	#[instrument(skip(self))]
	async fn add(&self, product_id: ProductId) -> Result<(), TransportError> {
		cart::add(&self.config, product_id).await?;
		Ok(())
	}

	#[instrument(skip(self))]
	async fn remove(&self, item_id: &ItemId) -> Result<(), TransportError> {
		cart::remove(&self.config, item_id).await?;
		Ok(())
	}

	#[instrument(skip(self))]
	async fn fetch_cart(&self) -> Result<Cart, TransportError> {
		Ok(cart::get(&self.config).await?)
	}
}
