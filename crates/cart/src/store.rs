use tracing::{debug, instrument, warn};

use super::{error::report_error, Cart, CartItem, CartRepository, ItemId};

/// Best-effort local cart cache.
///
/// Every mutation is a full read-modify-write against the repository, there is no
/// in-memory copy shared between calls. Storage failures are logged and swallowed:
/// a failed load reads as an empty cart, a failed write leaves the caller with the
/// cart it computed.
#[derive(Debug)]
pub struct LocalCartStore<R> {
	repository: R,
}

impl<R: CartRepository> LocalCartStore<R> {
	pub const fn new(repository: R) -> Self {
		Self { repository }
	}

	pub const fn repository(&self) -> &R {
		&self.repository
	}

	pub fn get_cart(&self) -> Cart {
		match self.repository.load() {
			Ok(maybe_cart) => maybe_cart.unwrap_or_default(),
			Err(e) => {
				warn!(?e, "Failed to load persisted cart, starting from an empty one");
				Cart::default()
			}
		}
	}

	pub fn save_cart(&self, cart: &Cart) {
		report_error(&self.repository.save(cart));
	}

	/// Drops the persisted entry, this is what happens once checkout completes.
	pub fn clear_cart(&self) {
		report_error(&self.repository.clear());
	}

	#[instrument(skip(self, item), fields(item_id = %item.id, quantity = item.quantity))]
	pub fn add_item(&self, item: CartItem) -> Cart {
		let mut cart = self.get_cart();

		match cart.items.get_mut(&item.id) {
			Some(existing) => {
				existing.quantity = existing.quantity.saturating_add(item.quantity);
			}
			None => {
				cart.items.insert(item.id.clone(), item);
			}
		}

		self.commit(cart)
	}

	#[instrument(skip(self))]
	pub fn remove_item(&self, item_id: &ItemId) -> Cart {
		let mut cart = self.get_cart();

		if cart.items.remove(item_id).is_none() {
			debug!("Item not in cart, nothing to remove");
		}

		self.commit(cart)
	}

	/// Overwrites the quantity as given, without any bounds checking.
	#[instrument(skip(self))]
	pub fn update_item_quantity(&self, item_id: &ItemId, quantity: u32) -> Cart {
		let mut cart = self.get_cart();

		let Some(item) = cart.items.get_mut(item_id) else {
			debug!("Item not in cart, quantity left untouched");
			return cart;
		};

		item.quantity = quantity;

		self.commit(cart)
	}

	fn commit(&self, mut cart: Cart) -> Cart {
		cart.recompute();
		self.save_cart(&cart);
		cart
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::{MemoryRepository, ProductId};

	fn item(id: &str, product_id: u64, price: f64) -> CartItem {
		CartItem {
			id: ItemId::from(id),
			product_id: ProductId(product_id),
			name: format!("product {product_id}"),
			price,
			quantity: 1,
			size: String::new(),
			category: String::new(),
			image: crate::Image::default(),
		}
	}

	#[test]
	fn update_missing_item_does_not_write() {
		let store = LocalCartStore::new(MemoryRepository::new());

		let cart = store.update_item_quantity(&ItemId::from("1-S"), 4);

		assert_eq!(cart, Cart::default());
		assert!(store.repository().raw().is_none());
	}

	#[test]
	fn update_overwrites_quantity() {
		let store = LocalCartStore::new(MemoryRepository::new());
		store.add_item(item("1-S", 1, 3.0));
		store.add_item(item("2-S", 2, 1.5));

		let cart = store.update_item_quantity(&ItemId::from("1-S"), 4);

		assert_eq!(cart.item_count, 5);
		assert!((cart.total - 13.5).abs() < f64::EPSILON);
		assert_eq!(store.get_cart(), cart);
	}

	#[test]
	fn clearing_is_absence() {
		let store = LocalCartStore::new(MemoryRepository::new());
		store.add_item(item("1-S", 1, 3.0));

		store.clear_cart();

		assert!(store.repository().raw().is_none());
		assert_eq!(store.get_cart(), Cart::default());
	}
}
