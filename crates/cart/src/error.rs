use std::{fmt::Display, io, path::Path};

use thiserror::Error;
use tracing::error;

/// Report an error with tracing
pub fn report_error(res: &Result<(), impl Display>) {
	if let Err(e) = res {
		error!("{e:#}");
	}
}

#[derive(Error, Debug)]
pub enum StorageError {
	#[error("failed to access cart storage at '{}': {source}", .path.display())]
	Io {
		path: Box<Path>,
		#[source]
		source: io::Error,
	},
	#[error("persisted cart is unreadable: {0}")]
	Corrupted(#[source] serde_json::Error),
	#[error("failed to serialize cart: {0}")]
	Serialization(#[source] serde_json::Error),
}

impl StorageError {
	pub fn from_std_io_err(path: impl AsRef<Path>, source: io::Error) -> Self {
		Self::Io {
			path: path.as_ref().into(),
			source,
		}
	}
}

#[derive(Error, Debug)]
pub enum TransportError {
	#[error("cart request failed: {0}")]
	Request(String),
	#[error("server rejected cart request with status {status}")]
	Status { status: u16 },
	#[error("failed to decode server cart: {0}")]
	Decode(String),
	#[error("failed to encode cart items: {0}")]
	Encode(#[from] serde_json::Error),
	#[error("cart request queue is closed")]
	QueueClosed,
	#[error("cart request worker stopped before answering")]
	Dropped,
}
