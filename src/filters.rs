//! Per-type node visibility with persistence and change notification.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::warn;

use crate::config::FilterConfig;
use crate::graph::{Graph, type_key};
use crate::observer::{Listeners, Subscription};
use crate::storage::{self, StorageBackend};

/// Full type → visible mapping handed to listeners.
pub type FilterSnapshot = BTreeMap<String, bool>;

/// Which node types are shown.
///
/// Rebuilt from every loaded graph via [`init_from_graph`](Self::init_from_graph);
/// types unknown to the store report the configured default.
#[derive(Debug)]
pub struct VisibilityFilterStore {
	state: FilterSnapshot,
	config: FilterConfig,
	backend: Rc<dyn StorageBackend>,
	listeners: Listeners<FilterSnapshot>,
}

impl VisibilityFilterStore {
	pub fn new(config: FilterConfig, backend: Rc<dyn StorageBackend>) -> Self {
		Self {
			state: FilterSnapshot::new(),
			config,
			backend,
			listeners: Listeners::default(),
		}
	}

	/// Reset the map to the type set of `graph`, restoring persisted values.
	///
	/// Types no longer present are dropped. Listeners are not notified.
	pub fn init_from_graph(&mut self, graph: &Graph) {
		let persisted = if self.config.persist_state {
			self.load_persisted()
		} else {
			None
		};
		let default = self.config.default_visible;

		self.state = graph
			.type_keys()
			.into_iter()
			.map(|ty| {
				let visible = persisted
					.as_ref()
					.and_then(|p| p.get(ty).copied())
					.unwrap_or(default);
				(ty.to_string(), visible)
			})
			.collect();
	}

	pub fn is_visible(&self, node_type: &str) -> bool {
		self.state
			.get(type_key(node_type))
			.copied()
			.unwrap_or(self.config.default_visible)
	}

	pub fn set_visible(&mut self, node_type: &str, visible: bool) {
		self.state.insert(type_key(node_type).to_string(), visible);
		self.changed();
	}

	pub fn toggle(&mut self, node_type: &str) {
		let visible = self.is_visible(node_type);
		self.set_visible(node_type, !visible);
	}

	/// Apply `visible` to every known type.
	pub fn set_all_visible(&mut self, visible: bool) {
		for value in self.state.values_mut() {
			*value = visible;
		}
		self.changed();
	}

	/// Copy of the full mapping.
	pub fn snapshot(&self) -> FilterSnapshot {
		self.state.clone()
	}

	/// Known type keys in sorted order.
	pub fn types(&self) -> impl Iterator<Item = &str> {
		self.state.keys().map(String::as_str)
	}

	pub fn subscribe(&mut self, listener: impl FnMut(&FilterSnapshot) + 'static) -> Subscription {
		self.listeners.subscribe(listener)
	}

	pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
		self.listeners.unsubscribe(subscription)
	}

	fn changed(&mut self) {
		if self.config.persist_state {
			self.persist();
		}
		let snapshot = self.snapshot();
		self.listeners.notify(&snapshot);
	}

	fn load_persisted(&self) -> Option<FilterSnapshot> {
		match storage::load_json(self.backend.as_ref(), &self.config.storage_key) {
			Ok(state) => state,
			Err(e) => {
				warn!("graph-lens: failed to load persisted filter state: {}", e);
				None
			}
		}
	}

	fn persist(&self) {
		let key = &self.config.storage_key;
		if let Err(e) = storage::save_json(self.backend.as_ref(), key, &self.state) {
			warn!("graph-lens: failed to persist filter state: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Node;
	use crate::storage::{MemoryBackend, StorageError};
	use std::cell::RefCell;

	struct BrokenBackend;

	impl StorageBackend for BrokenBackend {
		fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
			Err(StorageError::Unavailable)
		}

		fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
			Err(StorageError::Access("quota exceeded".into()))
		}
	}

	fn graph() -> Graph {
		Graph {
			nodes: vec![
				Node::new("1", "1", "service"),
				Node::new("2", "2", "identity"),
				Node::new("3", "3", "resource"),
				Node::new("4", "4", ""),
			],
			links: vec![],
		}
	}

	fn store(backend: &MemoryBackend) -> VisibilityFilterStore {
		VisibilityFilterStore::new(FilterConfig::default(), Rc::new(backend.clone()))
	}

	#[test]
	fn test_fresh_store_uses_default_for_every_type() {
		let mut filters = store(&MemoryBackend::new());
		filters.init_from_graph(&graph());

		for ty in ["service", "identity", "resource", "default", ""] {
			assert!(filters.is_visible(ty), "{ty}");
		}
		assert_eq!(filters.types().count(), 4);
	}

	#[test]
	fn test_set_visible_notifies_once_with_full_snapshot() {
		let mut filters = store(&MemoryBackend::new());
		filters.init_from_graph(&graph());
		let received = Rc::new(RefCell::new(Vec::new()));
		let sink = received.clone();
		filters.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.clone()));

		filters.set_visible("service", false);

		assert!(!filters.is_visible("service"));
		let received = received.borrow();
		assert_eq!(received.len(), 1);
		assert_eq!(received[0].get("service"), Some(&false));
		assert_eq!(received[0].len(), 4);
	}

	#[test]
	fn test_toggle_and_set_all() {
		let mut filters = store(&MemoryBackend::new());
		filters.init_from_graph(&graph());

		filters.toggle("identity");
		assert!(!filters.is_visible("identity"));
		filters.toggle("identity");
		assert!(filters.is_visible("identity"));

		filters.set_all_visible(false);
		assert!(filters.snapshot().values().all(|v| !v));
		filters.set_all_visible(true);
		assert!(filters.snapshot().values().all(|v| *v));
	}

	#[test]
	fn test_persisted_state_round_trip() {
		let backend = MemoryBackend::new();
		let mut first = store(&backend);
		first.init_from_graph(&graph());
		first.set_visible("service", false);
		first.set_visible("default", false);

		let mut second = store(&backend);
		second.init_from_graph(&graph());
		assert_eq!(second.snapshot(), first.snapshot());
	}

	#[test]
	fn test_persisted_state_only_covers_current_types() {
		let backend = MemoryBackend::new();
		backend
			.set_item("graphFilterState", r#"{"service":false,"gone":false}"#)
			.unwrap();
		let mut filters = store(&backend);
		filters.init_from_graph(&graph());

		assert!(!filters.is_visible("service"));
		assert!(filters.is_visible("identity"));
		assert!(!filters.snapshot().contains_key("gone"));
	}

	#[test]
	fn test_unsubscribed_listener_is_silent() {
		let mut filters = store(&MemoryBackend::new());
		filters.init_from_graph(&graph());
		let count = Rc::new(RefCell::new(0));
		let counter = count.clone();
		let sub = filters.subscribe(move |_| *counter.borrow_mut() += 1);
		assert!(filters.unsubscribe(sub));

		filters.set_visible("service", false);
		assert_eq!(*count.borrow(), 0);
	}

	#[test]
	fn test_storage_failures_never_escape() {
		let mut filters =
			VisibilityFilterStore::new(FilterConfig::default(), Rc::new(BrokenBackend));
		filters.init_from_graph(&graph());
		filters.set_visible("service", false);
		assert!(!filters.is_visible("service"));
	}

	#[test]
	fn test_corrupt_persisted_state_falls_back_to_default() {
		let backend = MemoryBackend::new();
		backend.set_item("graphFilterState", "[oops").unwrap();
		let mut filters = store(&backend);
		filters.init_from_graph(&graph());
		assert!(filters.is_visible("service"));
	}

	#[test]
	fn test_persistence_disabled_ignores_storage() {
		let backend = MemoryBackend::new();
		backend.set_item("graphFilterState", r#"{"service":false}"#).unwrap();
		let config = FilterConfig {
			persist_state: false,
			..FilterConfig::default()
		};
		let mut filters = VisibilityFilterStore::new(config, Rc::new(backend.clone()));
		filters.init_from_graph(&graph());
		assert!(filters.is_visible("service"));

		filters.set_visible("identity", false);
		assert_eq!(backend.raw("graphFilterState").as_deref(), Some(r#"{"service":false}"#));
	}

	#[test]
	fn test_unknown_type_uses_configured_default() {
		let config = FilterConfig {
			default_visible: false,
			..FilterConfig::default()
		};
		let filters = VisibilityFilterStore::new(config, Rc::new(MemoryBackend::new()));
		assert!(!filters.is_visible("anything"));
	}
}
