use std::{
	fs, io,
	path::{Path, PathBuf},
	sync::{Mutex, PoisonError},
};

use tracing::{debug, trace};

use super::{Cart, StorageError};

pub const DEFAULT_STORAGE_KEY: &str = "cart";

/// Persistence for a single cart value under one storage key.
///
/// Implementations are synchronous, so a single call is atomic with respect to other
/// synchronous code. Nothing more is promised: two read-modify-write cycles racing each
/// other resolve as last writer wins.
pub trait CartRepository: Send + Sync {
	/// `Ok(None)` when nothing is stored under the key.
	fn load(&self) -> Result<Option<Cart>, StorageError>;

	fn save(&self, cart: &Cart) -> Result<(), StorageError>;

	/// Removes the entry entirely, which is not the same as saving an empty cart.
	fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the serialized entry in memory, the same way a browser's storage holds a string.
#[derive(Debug, Default)]
pub struct MemoryRepository {
	entry: Mutex<Option<String>>,
}

impl MemoryRepository {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts from an arbitrary raw entry, corrupted or not.
	#[must_use]
	pub fn with_raw(raw: impl Into<String>) -> Self {
		Self {
			entry: Mutex::new(Some(raw.into())),
		}
	}

	#[must_use]
	pub fn raw(&self) -> Option<String> {
		self.entry
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

impl CartRepository for MemoryRepository {
	fn load(&self) -> Result<Option<Cart>, StorageError> {
		self.raw()
			.map(|raw| serde_json::from_str(&raw).map_err(StorageError::Corrupted))
			.transpose()
	}

	fn save(&self, cart: &Cart) -> Result<(), StorageError> {
		let raw = serde_json::to_string(cart).map_err(StorageError::Serialization)?;

		*self
			.entry
			.lock()
			.unwrap_or_else(PoisonError::into_inner) = Some(raw);

		Ok(())
	}

	fn clear(&self) -> Result<(), StorageError> {
		self.entry
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take();

		Ok(())
	}
}

/// One JSON file per storage key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
	path: PathBuf,
}

impl FileRepository {
	pub fn new(data_dir: impl AsRef<Path>, storage_key: &str) -> Self {
		Self {
			path: data_dir.as_ref().join(format!("{storage_key}.json")),
		}
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl CartRepository for FileRepository {
	fn load(&self) -> Result<Option<Cart>, StorageError> {
		match fs::read(&self.path) {
			Ok(bytes) => serde_json::from_slice(&bytes)
				.map(Some)
				.map_err(StorageError::Corrupted),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				trace!(path = %self.path.display(), "No persisted cart");
				Ok(None)
			}
			Err(e) => Err(StorageError::from_std_io_err(&self.path, e)),
		}
	}

	fn save(&self, cart: &Cart) -> Result<(), StorageError> {
		let bytes = serde_json::to_vec(cart).map_err(StorageError::Serialization)?;

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(|e| StorageError::from_std_io_err(parent, e))?;
		}

		fs::write(&self.path, bytes).map_err(|e| StorageError::from_std_io_err(&self.path, e))?;

		debug!(path = %self.path.display(), items = cart.items.len(), "Persisted cart");

		Ok(())
	}

	fn clear(&self) -> Result<(), StorageError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::from_std_io_err(&self.path, e)),
		}
	}
}
