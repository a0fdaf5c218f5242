#![allow(dead_code)]

use sf_cart::{
	Cart, CartItem, CartRepository, CartTransport, Host, Image, ItemId, MemoryRepository, Notice,
	Product, ProductId, Route, SyncPayload, TransportError,
};

use std::sync::{
	atomic::{AtomicBool, Ordering},
	Mutex,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
	Sync(SyncPayload),
	Add(ProductId),
	Remove(ItemId),
	Fetch,
}

/// Answers right away and remembers everything it was asked.
#[derive(Default)]
pub struct RecordingTransport {
	pub sent: Mutex<Vec<Sent>>,
	pub server_cart: Mutex<Cart>,
	pub failing: AtomicBool,
}

impl RecordingTransport {
	pub fn failing() -> Self {
		let transport = Self::default();
		transport.failing.store(true, Ordering::Relaxed);
		transport
	}

	pub fn with_server_cart(cart: Cart) -> Self {
		Self {
			server_cart: Mutex::new(cart),
			..Default::default()
		}
	}

	pub fn sent(&self) -> Vec<Sent> {
		self.sent.lock().unwrap().clone()
	}

	fn record(&self, sent: Sent) -> Result<(), TransportError> {
		self.sent.lock().unwrap().push(sent);

		if self.failing.load(Ordering::Relaxed) {
			Err(TransportError::Request("connection refused".to_string()))
		} else {
			Ok(())
		}
	}
}

#[async_trait::async_trait]
impl CartTransport for RecordingTransport {
	async fn sync(&self, payload: &SyncPayload) -> Result<(), TransportError> {
		self.record(Sent::Sync(payload.clone()))
	}

	async fn add(&self, product_id: ProductId) -> Result<(), TransportError> {
		self.record(Sent::Add(product_id))
	}

	async fn remove(&self, item_id: &ItemId) -> Result<(), TransportError> {
		self.record(Sent::Remove(item_id.clone()))
	}

	async fn fetch_cart(&self) -> Result<Cart, TransportError> {
		self.record(Sent::Fetch)?;
		Ok(self.server_cart.lock().unwrap().clone())
	}
}

#[derive(Default)]
pub struct RecordingHost {
	pub notices: Mutex<Vec<Notice>>,
	pub visits: Mutex<Vec<Route>>,
}

impl Host for RecordingHost {
	fn notify(&self, notice: Notice) {
		self.notices.lock().unwrap().push(notice);
	}

	fn visit(&self, route: Route) {
		self.visits.lock().unwrap().push(route);
	}
}

pub fn product(id: u64, price: f64) -> Product {
	Product {
		id: ProductId(id),
		name: format!("Hand thrown bowl #{id}"),
		price,
		category: "ceramics".to_string(),
		image: Image {
			src: format!("/storage/products/{id}.jpg"),
			alt: format!("Bowl {id}"),
		},
	}
}

pub fn item(id: &str, product_id: u64, price: f64, quantity: u32) -> CartItem {
	CartItem {
		quantity,
		..product(product_id, price).to_item(id.split_once('-').map_or("", |(_, size)| size))
	}
}

pub fn cart_of(items: impl IntoIterator<Item = CartItem>) -> Cart {
	let mut cart = Cart {
		items: items
			.into_iter()
			.map(|item| (item.id.clone(), item))
			.collect(),
		..Default::default()
	};
	cart.recompute();
	cart
}

pub fn seeded(cart: &Cart) -> MemoryRepository {
	let repository = MemoryRepository::new();
	repository.save(cart).unwrap();
	repository
}

pub fn assert_aggregates(cart: &Cart) {
	let total: f64 = cart.items.values().map(|i| i.price * f64::from(i.quantity)).sum();
	let count = cart
		.items
		.values()
		.fold(0_u32, |count, i| count.saturating_add(i.quantity));

	assert!((cart.total - total).abs() < 1e-9, "{} != {total}", cart.total);
	assert_eq!(cart.item_count, count);
}
