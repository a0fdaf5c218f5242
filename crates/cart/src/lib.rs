//! Client side cart core of the storefront.
//!
//! The cart lives in two replicas: one persisted locally through a [`CartRepository`]
//! and one held by the server session. [`CartSynchronizer`] reconciles them every time a
//! page delivers a fresh server snapshot, [`CartActions`] applies optimistic mutations
//! and [`Outbox`] carries the best-effort requests to the backend.

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

mod actions;
mod error;
mod merge;
mod model;
mod outbox;
mod repository;
mod store;
mod synchronizer;

pub use actions::{AddOutcome, CartActions, Host, Notice, Route};
pub use error::{report_error, StorageError, TransportError};
pub use merge::{merge, Resolution};
pub use model::{Cart, CartItem, Image, ItemId, Product, ProductId};
pub use outbox::{CartRequest, CartTransport, Outbox, SyncPayload};
pub use repository::{CartRepository, FileRepository, MemoryRepository, DEFAULT_STORAGE_KEY};
pub use store::LocalCartStore;
pub use synchronizer::{CartSynchronizer, SnapshotWatcher};
