use std::{fmt, sync::Arc};

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::{
	Cart, CartRepository, CartRequest, CartSynchronizer, ItemId, LocalCartStore, Outbox, Product,
	ProductId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
	Shop,
	Cart,
}

/// User facing messages raised by cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
	AlreadyInCart { product_id: ProductId, name: String },
}

impl fmt::Display for Notice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AlreadyInCart { name, .. } => {
				write!(f, "{name} is already in your cart")
			}
		}
	}
}

/// Whatever renders pages: shows notices and navigates.
pub trait Host: Send + Sync {
	fn notify(&self, notice: Notice);

	fn visit(&self, route: Route);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
	/// Added locally and acknowledged by the server.
	Confirmed,
	/// Added locally, the server request failed. The local line stays.
	Unconfirmed,
	/// Rejected, the cart already holds this product in some size.
	AlreadyInCart,
}

/// Optimistic cart mutations: local store first, server afterwards.
pub struct CartActions<R, H> {
	store: Arc<LocalCartStore<R>>,
	synchronizer: Arc<CartSynchronizer<R>>,
	outbox: Outbox,
	host: H,
}

impl<R: CartRepository, H: Host> CartActions<R, H> {
	pub fn new(
		store: Arc<LocalCartStore<R>>,
		synchronizer: Arc<CartSynchronizer<R>>,
		outbox: Outbox,
		host: H,
	) -> Self {
		Self {
			store,
			synchronizer,
			outbox,
			host,
		}
	}

	pub const fn host(&self) -> &H {
		&self.host
	}

	/// Adds one unit of `product` in `size`.
	///
	/// A cart holds at most one line per product, whatever the size: a second size of
	/// the same product is rejected with a notice and the shopper is sent back to the shop.
	#[instrument(skip(self, product), fields(product_id = %product.id))]
	pub async fn add_to_cart(&self, product: &Product, size: &str) -> AddOutcome {
		let item = product.to_item(size);

		if self.store.get_cart().contains_product(product.id) {
			info!("Product already in cart, rejecting");
			self.host.notify(Notice::AlreadyInCart {
				product_id: product.id,
				name: product.name.clone(),
			});
			self.host.visit(Route::Shop);
			return AddOutcome::AlreadyInCart;
		}

		self.store.add_item(item);

		let confirmation = self.outbox.submit(CartRequest::Add {
			product_id: product.id,
		});

		if let Err(e) = confirmation.await {
			warn!(?e, "Server did not confirm add, keeping local item");
			return AddOutcome::Unconfirmed;
		}

		match self.outbox.transport().fetch_cart().await {
			Ok(snapshot) => self.synchronizer.sync_with_server(&snapshot),
			Err(e) => error!(?e, "Failed to refresh cart after add"),
		}

		self.host.visit(Route::Shop);

		AddOutcome::Confirmed
	}

	/// Removes locally, then tells the server. A failed server delete is only logged.
	#[instrument(skip(self))]
	pub fn remove_from_cart(&self, item_id: &ItemId) -> Cart {
		let cart = self.store.remove_item(item_id);

		self.outbox.fire(CartRequest::Remove {
			item_id: item_id.clone(),
		});

		cart
	}

	pub fn update_quantity(&self, item_id: &ItemId, quantity: u32) -> Cart {
		self.store.update_item_quantity(item_id, quantity)
	}

	/// Called once the payment provider reports a successful checkout.
	#[instrument(skip(self))]
	pub fn complete_checkout(&self) {
		info!("Checkout completed, clearing local cart");
		self.store.clear_cart();
	}
}
