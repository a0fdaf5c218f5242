use std::{fmt, future::Future, sync::Arc};

use async_channel as chan;
use serde::{Deserialize, Serialize};
use tokio::{
	spawn,
	sync::{oneshot, Mutex},
	task::JoinHandle,
};
use tracing::{debug, error, trace, warn, Instrument};

use super::{Cart, ItemId, ProductId, TransportError};

/// Body of the sync request, the items map travels as a JSON encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
	pub items: String,
	pub total: f64,
	pub item_count: u32,
}

impl SyncPayload {
	pub fn from_cart(cart: &Cart) -> Result<Self, serde_json::Error> {
		Ok(Self {
			items: serde_json::to_string(&cart.items)?,
			total: cart.total,
			item_count: cart.item_count,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartRequest {
	Sync(SyncPayload),
	Add { product_id: ProductId },
	Remove { item_id: ItemId },
}

impl fmt::Display for CartRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sync(payload) => write!(f, "sync <items={}>", payload.item_count),
			Self::Add { product_id } => write!(f, "add <product_id={product_id}>"),
			Self::Remove { item_id } => write!(f, "remove <item_id='{item_id}'>"),
		}
	}
}

/// The backend endpoints the cart talks to.
#[async_trait::async_trait]
pub trait CartTransport: Send + Sync + 'static {
	async fn sync(&self, payload: &SyncPayload) -> Result<(), TransportError>;

	async fn add(&self, product_id: ProductId) -> Result<(), TransportError>;

	async fn remove(&self, item_id: &ItemId) -> Result<(), TransportError>;

	/// Fetches the authoritative session cart.
	async fn fetch_cart(&self) -> Result<Cart, TransportError>;
}

struct Job {
	request: CartRequest,
	reply: Option<oneshot::Sender<Result<(), TransportError>>>,
}

/// One-shot request queue in front of a [`CartTransport`].
///
/// A single worker task sends queued requests in submission order. Requests are never
/// retried nor cancelled, failures end up in the logs.
#[derive(Clone)]
pub struct Outbox {
	tx: chan::Sender<Job>,
	transport: Arc<dyn CartTransport>,
	worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl fmt::Debug for Outbox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Outbox")
			.field("queued", &self.tx.len())
			.finish_non_exhaustive()
	}
}

impl Outbox {
	/// Spawns the worker, so this must be called from within a tokio runtime.
	pub fn new(transport: Arc<dyn CartTransport>) -> Self {
		let (tx, rx) = chan::unbounded();

		let worker = spawn(run(Arc::clone(&transport), rx).in_current_span());

		Self {
			tx,
			transport,
			worker: Arc::new(Mutex::new(Some(worker))),
		}
	}

	#[must_use]
	pub fn transport(&self) -> &Arc<dyn CartTransport> {
		&self.transport
	}

	/// Queues a request and forgets about it.
	pub fn fire(&self, request: CartRequest) {
		if let Err(e) = self.enqueue(Job {
			request,
			reply: None,
		}) {
			warn!(?e, "Dropping cart request");
		}
	}

	/// Queues a request, the returned future resolves with the server's answer.
	pub fn submit(
		&self,
		request: CartRequest,
	) -> impl Future<Output = Result<(), TransportError>> + Send + 'static {
		let (reply_tx, reply_rx) = oneshot::channel();

		let queued = self.enqueue(Job {
			request,
			reply: Some(reply_tx),
		});

		async move {
			queued?;
			reply_rx.await.unwrap_or(Err(TransportError::Dropped))
		}
	}

	/// Stops accepting requests and waits for the ones already queued to go out.
	pub async fn shutdown(&self) {
		self.tx.close();

		if let Some(handle) = self.worker.lock().await.take() {
			if let Err(e) = handle.await {
				error!(?e, "Cart outbox worker failed");
			}
		}
	}

	fn enqueue(&self, job: Job) -> Result<(), TransportError> {
		trace!(request = %job.request, "Queueing cart request");

		self.tx
			.try_send(job)
			.map_err(|_| TransportError::QueueClosed)
	}
}

async fn run(transport: Arc<dyn CartTransport>, rx: chan::Receiver<Job>) {
	while let Ok(Job { request, reply }) = rx.recv().await {
		let res = dispatch(transport.as_ref(), &request).await;

		match &res {
			Ok(()) => debug!(%request, "Cart request done"),
			Err(e) => error!(%request, ?e, "Cart request failed"),
		}

		if let Some(reply) = reply {
			if reply.send(res).is_err() {
				trace!(%request, "Nobody waiting on cart request answer");
			}
		}
	}

	debug!("Cart outbox closed");
}

async fn dispatch(
	transport: &dyn CartTransport,
	request: &CartRequest,
) -> Result<(), TransportError> {
	match request {
		CartRequest::Sync(payload) => transport.sync(payload).await,
		CartRequest::Add { product_id } => transport.add(*product_id).await,
		CartRequest::Remove { item_id } => transport.remove(item_id).await,
	}
}
