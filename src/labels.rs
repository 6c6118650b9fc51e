//! Node and link label visibility, persisted across sessions.

use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::observer::{Listeners, Subscription};
use crate::storage::{self, StorageBackend};

/// Whether node and link labels are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelState {
	pub node_labels_visible: bool,
	pub link_labels_visible: bool,
}

/// Stored record; either field may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedLabels {
	node_labels_visible: Option<bool>,
	link_labels_visible: Option<bool>,
}

#[derive(Debug)]
pub struct LabelVisibilityStore {
	state: LabelState,
	config: LabelConfig,
	backend: Rc<dyn StorageBackend>,
	listeners: Listeners<LabelState>,
}

impl LabelVisibilityStore {
	/// Create the store, restoring persisted state when enabled.
	pub fn new(config: LabelConfig, backend: Rc<dyn StorageBackend>) -> Self {
		let mut state = LabelState {
			node_labels_visible: config.default_node_labels_visible,
			link_labels_visible: config.default_link_labels_visible,
		};
		if config.persist_state {
			match storage::load_json::<PersistedLabels>(backend.as_ref(), &config.storage_key) {
				Ok(Some(saved)) => {
					if let Some(visible) = saved.node_labels_visible {
						state.node_labels_visible = visible;
					}
					if let Some(visible) = saved.link_labels_visible {
						state.link_labels_visible = visible;
					}
				}
				Ok(None) => {}
				Err(e) => warn!("graph-lens: failed to load persisted label state: {}", e),
			}
		}
		Self {
			state,
			config,
			backend,
			listeners: Listeners::default(),
		}
	}

	pub fn state(&self) -> LabelState {
		self.state
	}

	pub fn set_node_labels_visible(&mut self, visible: bool) {
		self.state.node_labels_visible = visible;
		self.changed();
	}

	pub fn set_link_labels_visible(&mut self, visible: bool) {
		self.state.link_labels_visible = visible;
		self.changed();
	}

	pub fn subscribe(&mut self, listener: impl FnMut(&LabelState) + 'static) -> Subscription {
		self.listeners.subscribe(listener)
	}

	pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
		self.listeners.unsubscribe(subscription)
	}

	fn changed(&mut self) {
		if self.config.persist_state {
			let key = &self.config.storage_key;
			if let Err(e) = storage::save_json(self.backend.as_ref(), key, &self.state) {
				warn!("graph-lens: failed to persist label state: {}", e);
			}
		}
		let state = self.state;
		self.listeners.notify(&state);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::MemoryBackend;
	use std::cell::RefCell;

	fn store(backend: &MemoryBackend) -> LabelVisibilityStore {
		LabelVisibilityStore::new(LabelConfig::default(), Rc::new(backend.clone()))
	}

	#[test]
	fn test_defaults_without_persisted_state() {
		let labels = store(&MemoryBackend::new());
		assert_eq!(
			labels.state(),
			LabelState {
				node_labels_visible: true,
				link_labels_visible: false,
			}
		);
	}

	#[test]
	fn test_setters_persist_and_notify() {
		let backend = MemoryBackend::new();
		let mut labels = store(&backend);
		let received = Rc::new(RefCell::new(Vec::new()));
		let sink = received.clone();
		labels.subscribe(move |state| sink.borrow_mut().push(*state));

		labels.set_link_labels_visible(true);
		labels.set_node_labels_visible(false);

		let received = received.borrow();
		assert_eq!(received.len(), 2);
		assert!(received[0].link_labels_visible);
		assert!(!received[1].node_labels_visible);
		assert_eq!(
			backend.raw("graphLabelState").as_deref(),
			Some(r#"{"nodeLabelsVisible":false,"linkLabelsVisible":true}"#)
		);
	}

	#[test]
	fn test_reload_restores_saved_state() {
		let backend = MemoryBackend::new();
		let mut first = store(&backend);
		first.set_node_labels_visible(false);
		first.set_link_labels_visible(true);

		let second = store(&backend);
		assert_eq!(second.state(), first.state());
	}

	#[test]
	fn test_partial_record_falls_back_per_field() {
		let backend = MemoryBackend::new();
		backend
			.set_item("graphLabelState", r#"{"linkLabelsVisible":true}"#)
			.unwrap();
		let labels = store(&backend);
		assert!(labels.state().node_labels_visible);
		assert!(labels.state().link_labels_visible);
	}

	#[test]
	fn test_corrupt_record_uses_defaults() {
		let backend = MemoryBackend::new();
		backend.set_item("graphLabelState", "nope").unwrap();
		let labels = store(&backend);
		assert!(labels.state().node_labels_visible);
		assert!(!labels.state().link_labels_visible);
	}
}
