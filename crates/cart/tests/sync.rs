mod common;

use sf_cart::{
	Cart, CartSynchronizer, LocalCartStore, MemoryRepository, Outbox, SnapshotWatcher, SyncPayload,
};

use std::{collections::HashMap, sync::Arc};

use common::{cart_of, item, seeded, RecordingTransport, Sent};
use tracing_test::traced_test;

struct Harness {
	store: Arc<LocalCartStore<MemoryRepository>>,
	transport: Arc<RecordingTransport>,
	outbox: Outbox,
	synchronizer: Arc<CartSynchronizer<MemoryRepository>>,
}

impl Harness {
	fn new(local: Option<&Cart>) -> Self {
		let repository = local.map_or_else(MemoryRepository::new, seeded);
		let store = Arc::new(LocalCartStore::new(repository));
		let transport = Arc::new(RecordingTransport::default());
		let outbox = Outbox::new(transport.clone());
		let synchronizer = Arc::new(CartSynchronizer::new(Arc::clone(&store), outbox.clone()));

		Self {
			store,
			transport,
			outbox,
			synchronizer,
		}
	}

	async fn sent(&self) -> Vec<Sent> {
		self.outbox.shutdown().await;
		self.transport.sent()
	}
}

#[tokio::test]
#[traced_test]
async fn server_with_items_wins() {
	let local = cart_of([item("1-S", 1, 4.0, 1)]);
	let server = cart_of([item("2-M", 2, 7.5, 2)]);
	let harness = Harness::new(Some(&local));

	harness.synchronizer.sync_with_server(&server);

	assert_eq!(harness.store.get_cart(), server);
	assert!(harness.sent().await.is_empty());
}

#[tokio::test]
#[traced_test]
async fn server_aggregates_are_taken_verbatim() {
	let mut server = cart_of([item("2-M", 2, 7.5, 2)]);
	server.total = 13.0; // a server side discount
	let harness = Harness::new(None);

	harness.synchronizer.sync_with_server(&server);

	assert_eq!(harness.store.get_cart(), server);
}

#[tokio::test]
#[traced_test]
async fn local_wins_over_empty_server_and_is_pushed() {
	let local = cart_of([item("1-S", 1, 4.0, 1)]);
	let harness = Harness::new(Some(&local));

	harness.synchronizer.sync_with_server(&Cart::default());

	assert_eq!(harness.store.get_cart(), local);

	let sent = harness.sent().await;
	assert_eq!(sent.len(), 1);

	let Sent::Sync(SyncPayload {
		items,
		total,
		item_count,
	}) = &sent[0]
	else {
		panic!("expected a sync request, got {sent:?}");
	};

	let pushed: HashMap<String, serde_json::Value> = serde_json::from_str(items).unwrap();
	assert_eq!(pushed.len(), 1);
	assert_eq!(pushed["1-S"]["quantity"], 1);
	assert!((total - 4.0).abs() < f64::EPSILON);
	assert_eq!(*item_count, 1);
	assert!(logs_contain("Server cart is empty, pushing local cart"));
}

#[tokio::test]
async fn both_empty_leaves_an_empty_cart() {
	let harness = Harness::new(None);

	harness.synchronizer.sync_with_server(&Cart::default());

	assert_eq!(harness.store.get_cart(), Cart::default());
	assert!(harness.sent().await.is_empty());
}

#[tokio::test]
async fn repeated_snapshots_converge() {
	let local = cart_of([item("1-S", 1, 4.0, 1)]);
	let server = cart_of([item("2-M", 2, 7.5, 2)]);
	let harness = Harness::new(Some(&local));

	harness.synchronizer.sync_with_server(&server);
	let first = harness.store.get_cart();

	for _ in 0..3 {
		harness.synchronizer.sync_with_server(&server);
		assert_eq!(harness.store.get_cart(), first);
	}

	assert!(harness.sent().await.is_empty());
}

#[tokio::test]
async fn start_reconciliation_pushes_once() {
	let local = cart_of([item("3-L", 3, 9.0, 2)]);
	let harness = Harness::new(Some(&local));

	harness.synchronizer.reconcile_on_start(&Cart::default());
	harness.synchronizer.reconcile_on_start(&Cart::default());

	assert_eq!(harness.store.get_cart(), local);

	let sent = harness.sent().await;
	assert_eq!(sent.len(), 1);
	assert!(matches!(&sent[0], Sent::Sync(payload) if payload.item_count == 2));
}

#[tokio::test]
async fn start_reconciliation_never_overwrites_local() {
	let local = cart_of([item("3-L", 3, 9.0, 2)]);
	let server = cart_of([item("4-S", 4, 1.0, 1)]);
	let harness = Harness::new(Some(&local));

	harness.synchronizer.reconcile_on_start(&server);

	assert_eq!(harness.store.get_cart(), local);
	assert!(harness.sent().await.is_empty());
}

#[tokio::test]
async fn start_and_reactive_sync_tolerate_each_other() {
	let local = cart_of([item("3-L", 3, 9.0, 2)]);
	let harness = Harness::new(Some(&local));

	// First page: both call sites see the same empty session
	harness.synchronizer.reconcile_on_start(&Cart::default());
	harness.synchronizer.sync_with_server(&Cart::default());

	assert_eq!(harness.store.get_cart(), local);

	let pushed = harness
		.sent()
		.await
		.into_iter()
		.map(|sent| match sent {
			Sent::Sync(payload) => {
				serde_json::from_str::<HashMap<String, serde_json::Value>>(&payload.items).unwrap()
			}
			other => panic!("unexpected request {other:?}"),
		})
		.collect::<Vec<_>>();

	assert_eq!(pushed.len(), 2);
	assert_eq!(pushed[0], pushed[1]);
}

#[tokio::test]
async fn watcher_only_reacts_to_changes() {
	let local = cart_of([item("1-S", 1, 4.0, 1)]);
	let harness = Harness::new(Some(&local));
	let watcher = SnapshotWatcher::new(Arc::clone(&harness.synchronizer));

	let server = cart_of([item("2-M", 2, 7.5, 2)]);

	assert!(watcher.observe(&Cart::default()));
	assert!(!watcher.observe(&Cart::default()));
	assert!(watcher.observe(&server));
	assert!(!watcher.observe(&server));

	assert_eq!(harness.store.get_cart(), server);
	assert_eq!(harness.sent().await.len(), 1);
}
