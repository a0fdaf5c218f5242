use std::{collections::HashMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for ProductId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

/// Composite line item key, `"{product_id}-{size}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
	#[must_use]
	pub fn new(product_id: ProductId, size: &str) -> Self {
		Self(format!("{product_id}-{size}"))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ItemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ItemId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for ItemId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
	pub src: String,
	pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
	pub id: ItemId,
	pub product_id: ProductId,
	pub name: String,
	pub price: f64,
	pub quantity: u32,
	#[serde(default)]
	pub size: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub image: Image,
}

impl CartItem {
	#[must_use]
	pub fn subtotal(&self) -> f64 {
		self.price * f64::from(self.quantity)
	}
}

/// What the shop listing hands to the add-to-cart flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
	pub id: ProductId,
	pub name: String,
	pub price: f64,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub image: Image,
}

impl Product {
	/// Builds a single unit line item for this product in the given size.
	#[must_use]
	pub fn to_item(&self, size: &str) -> CartItem {
		CartItem {
			id: ItemId::new(self.id, size),
			product_id: self.id,
			name: self.name.clone(),
			price: self.price,
			quantity: 1,
			size: size.to_string(),
			category: self.category.clone(),
			image: self.image.clone(),
		}
	}
}

/// A cart snapshot, either the locally persisted one or the one delivered by the server.
///
/// `total` and `item_count` are derived from `items`. Local mutations go through
/// [`Cart::recompute`], which folds over every item instead of patching the previous values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
	#[serde(default, deserialize_with = "items_map")]
	pub items: HashMap<ItemId, CartItem>,
	#[serde(default)]
	pub total: f64,
	#[serde(default)]
	pub item_count: u32,
}

impl Cart {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	#[must_use]
	pub fn contains_product(&self, product_id: ProductId) -> bool {
		self.items
			.values()
			.any(|item| item.product_id == product_id)
	}

	pub fn recompute(&mut self) {
		self.total = self.items.values().map(CartItem::subtotal).sum();
		// Saturates instead of wrapping, quantities are not bounded
		self.item_count = self
			.items
			.values()
			.fold(0, |count: u32, item| count.saturating_add(item.quantity));
	}

	#[cfg(test)]
	pub(crate) fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
		let mut cart = Self {
			items: items
				.into_iter()
				.map(|item| (item.id.clone(), item))
				.collect(),
			..Default::default()
		};
		cart.recompute();
		cart
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsRepr {
	Map(HashMap<ItemId, CartItem>),
	List(Vec<CartItem>),
	Null(()),
}

// Backends that keep the cart in a PHP-style session encode an empty map as `[]`,
// and some send the items as a plain list.
fn items_map<'de, D>(deserializer: D) -> Result<HashMap<ItemId, CartItem>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match ItemsRepr::deserialize(deserializer)? {
		ItemsRepr::Map(map) => map,
		ItemsRepr::List(list) => list
			.into_iter()
			.map(|item| (item.id.clone(), item))
			.collect(),
		ItemsRepr::Null(()) => HashMap::new(),
	})
}
