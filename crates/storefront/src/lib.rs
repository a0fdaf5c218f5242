//! Page lifecycle glue for the storefront cart.
//!
//! The page host hands us the props of every rendered page; we keep the local cart in
//! line with the session cart they carry and expose the cart operations to the views.

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

use sf_cart::{
	Cart, CartActions, CartSynchronizer, CartTransport, FileRepository, Host, LocalCartStore,
	Notice, Outbox, Route, SnapshotWatcher,
};
use sf_cart_api::HttpTransport;

use std::{path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

mod config;
mod logging;

pub use config::{default_data_dir, StorefrontConfig, CONFIG_FILE};
pub use logging::init_logging;

/// The slice of server rendered page data we care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageProps {
	#[serde(default)]
	pub cart: Option<Cart>,
}

impl PageProps {
	/// A page without a cart means an empty session cart.
	#[must_use]
	pub fn server_cart(&self) -> Cart {
		self.cart.clone().unwrap_or_default()
	}
}

/// [`Host`] for headless use: notices and navigations only end up in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl Host for LoggingHost {
	fn notify(&self, notice: Notice) {
		warn!(%notice, "Cart notice");
	}

	fn visit(&self, route: Route) {
		info!(?route, "Navigating");
	}
}

pub struct Storefront<H> {
	config: StorefrontConfig,
	store: Arc<LocalCartStore<FileRepository>>,
	outbox: Outbox,
	synchronizer: Arc<CartSynchronizer<FileRepository>>,
	watcher: SnapshotWatcher<FileRepository>,
	actions: CartActions<FileRepository, H>,
}

impl<H: Host> Storefront<H> {
	/// Loads the config found in `data_dir`, installs logging and talks to the configured backend.
	pub fn bootstrap(data_dir: impl AsRef<Path>, host: H) -> anyhow::Result<Self> {
		let config = StorefrontConfig::load_from(data_dir.as_ref())?;
		init_logging(&config)?;

		Ok(Self::new(config, host))
	}

	/// Must be called from within a tokio runtime, as it spawns the request worker.
	pub fn new(config: StorefrontConfig, host: H) -> Self {
		let transport = Arc::new(HttpTransport::new(config.request_config()));
		Self::with_transport(config, transport, host)
	}

	pub fn with_transport(
		config: StorefrontConfig,
		transport: Arc<dyn CartTransport>,
		host: H,
	) -> Self {
		let store = Arc::new(LocalCartStore::new(FileRepository::new(
			&config.data_dir,
			&config.storage_key,
		)));
		let outbox = Outbox::new(transport);
		let synchronizer = Arc::new(CartSynchronizer::new(Arc::clone(&store), outbox.clone()));

		Self {
			watcher: SnapshotWatcher::new(Arc::clone(&synchronizer)),
			actions: CartActions::new(
				Arc::clone(&store),
				Arc::clone(&synchronizer),
				outbox.clone(),
				host,
			),
			config,
			store,
			outbox,
			synchronizer,
		}
	}

	pub const fn config(&self) -> &StorefrontConfig {
		&self.config
	}

	/// First page of the application: restore a returning shopper's cart into a fresh
	/// session, then reconcile as for any other page.
	#[instrument(skip_all)]
	pub fn start(&self, props: &PageProps) {
		let server_cart = props.server_cart();

		self.synchronizer.reconcile_on_start(&server_cart);
		self.watcher.observe(&server_cart);
	}

	/// Every subsequent page. Returns whether the cart snapshot changed.
	pub fn on_page(&self, props: &PageProps) -> bool {
		self.watcher.observe(&props.server_cart())
	}

	#[must_use]
	pub fn cart(&self) -> Cart {
		self.store.get_cart()
	}

	pub const fn actions(&self) -> &CartActions<FileRepository, H> {
		&self.actions
	}

	/// Lets queued cart requests go out before returning.
	pub async fn shutdown(&self) {
		self.outbox.shutdown().await;
	}
}
