use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc, Mutex, PoisonError,
};

use tracing::{debug, error, info, instrument};

use super::{merge, Cart, CartRepository, CartRequest, LocalCartStore, Outbox, SyncPayload};

/// Reconciles the local cart against the snapshots the server hands us on each page.
pub struct CartSynchronizer<R> {
	store: Arc<LocalCartStore<R>>,
	outbox: Outbox,
	started: AtomicBool,
}

impl<R: CartRepository> CartSynchronizer<R> {
	pub fn new(store: Arc<LocalCartStore<R>>, outbox: Outbox) -> Self {
		Self {
			store,
			outbox,
			started: AtomicBool::new(false),
		}
	}

	/// Applies a server snapshot. Converges after the first call for a given snapshot.
	#[instrument(skip_all, fields(server_items = server_cart.items.len()))]
	pub fn sync_with_server(&self, server_cart: &Cart) {
		let local = self.store.get_cart();

		match merge(&local, server_cart).into_parts() {
			(_, Some(push)) => {
				info!(
					local_items = push.items.len(),
					"Server cart is empty, pushing local cart"
				);
				self.push(&push);
			}
			(resolved, None) => {
				debug!(changed = resolved != local, "Adopting server cart");
				self.store.save_cart(&resolved);
			}
		}
	}

	/// One time reconciliation against the snapshot delivered with the first page.
	///
	/// Only pushes, the local cart is never overwritten from here. Later calls are no-ops.
	#[instrument(skip_all)]
	pub fn reconcile_on_start(&self, initial_server_cart: &Cart) {
		if self.started.swap(true, Ordering::AcqRel) {
			debug!("Start reconciliation already ran");
			return;
		}

		let local = self.store.get_cart();

		if !local.is_empty() && initial_server_cart.is_empty() {
			info!(
				local_items = local.items.len(),
				"Restoring local cart into a fresh session"
			);
			self.push(&local);
		}
	}

	fn push(&self, cart: &Cart) {
		match SyncPayload::from_cart(cart) {
			Ok(payload) => self.outbox.fire(CartRequest::Sync(payload)),
			Err(e) => error!(?e, "Failed to encode cart for sync"),
		}
	}
}

/// Feeds the synchronizer only when the delivered snapshot actually changed.
pub struct SnapshotWatcher<R> {
	synchronizer: Arc<CartSynchronizer<R>>,
	last_seen: Mutex<Option<Cart>>,
}

impl<R: CartRepository> SnapshotWatcher<R> {
	pub const fn new(synchronizer: Arc<CartSynchronizer<R>>) -> Self {
		Self {
			synchronizer,
			last_seen: Mutex::new(None),
		}
	}

	/// Returns whether a reconciliation ran.
	pub fn observe(&self, snapshot: &Cart) -> bool {
		{
			let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);

			if last_seen.as_ref() == Some(snapshot) {
				return false;
			}

			*last_seen = Some(snapshot.clone());
		}

		self.synchronizer.sync_with_server(snapshot);

		true
	}
}
