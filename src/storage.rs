//! Best-effort key/value persistence for viewer preferences.
//!
//! The stores only ever see the [`StorageBackend`] trait: the browser build
//! uses `window.localStorage`, tests use [`MemoryBackend`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Failure reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("storage is unavailable")]
	Unavailable,
	#[error("storage access failed: {0}")]
	Access(String),
	#[error("corrupt persisted state: {0}")]
	Corrupt(#[from] serde_json::Error),
}

/// String key/value storage.
pub trait StorageBackend {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl fmt::Debug for dyn StorageBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("StorageBackend")
	}
}

/// Read and decode a JSON value stored under `key`.
pub fn load_json<T: DeserializeOwned>(
	backend: &dyn StorageBackend,
	key: &str,
) -> Result<Option<T>, StorageError> {
	match backend.get_item(key)? {
		Some(text) => Ok(Some(serde_json::from_str(&text)?)),
		None => Ok(None),
	}
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T: Serialize>(
	backend: &dyn StorageBackend,
	key: &str,
	value: &T,
) -> Result<(), StorageError> {
	let text = serde_json::to_string(value)?;
	backend.set_item(key, &text)
}

/// Render a thrown JS value as a readable message.
pub(crate) fn js_message(value: &JsValue) -> String {
	if let Some(text) = value.as_string() {
		return text;
	}
	match value.dyn_ref::<js_sys::Error>() {
		Some(err) => String::from(err.message()),
		None => format!("{:?}", value),
	}
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageBackend;

impl LocalStorageBackend {
	fn storage(&self) -> Result<web_sys::Storage, StorageError> {
		let window = web_sys::window().ok_or(StorageError::Unavailable)?;
		window
			.local_storage()
			.map_err(|e| StorageError::Access(js_message(&e)))?
			.ok_or(StorageError::Unavailable)
	}
}

impl StorageBackend for LocalStorageBackend {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.storage()?
			.get_item(key)
			.map_err(|e| StorageError::Access(js_message(&e)))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.storage()?
			.set_item(key, value)
			.map_err(|e| StorageError::Access(js_message(&e)))
	}
}

/// In-memory storage. Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
	items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Raw stored value, for inspection.
	pub fn raw(&self, key: &str) -> Option<String> {
		self.items.borrow().get(key).cloned()
	}
}

impl StorageBackend for MemoryBackend {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.items
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}
}
