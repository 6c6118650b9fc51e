//! Leptos components: the force-graph canvas and the side panels.
//!
//! Components share one [`ViewerSession`] through [`SharedSession`] and
//! observe it through [`ViewerSignals`], which hold plain copies of what the
//! panels display. Only event handlers and the animation loop touch the
//! session itself.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;

use crate::filters::FilterSnapshot;
use crate::focus::FocusMode;
use crate::labels::LabelState;
use crate::session::{GraphStats, ItemDetails, LegendEntry, ViewerSession};

pub mod force_graph;
pub mod panels;

/// Copyable handle to the session owned by the component tree.
#[derive(Clone, Copy)]
pub struct SharedSession(StoredValue<Rc<RefCell<ViewerSession>>, LocalStorage>);

impl SharedSession {
	pub fn new(session: ViewerSession) -> Self {
		Self(StoredValue::new_local(Rc::new(RefCell::new(session))))
	}

	fn handle(&self) -> Option<Rc<RefCell<ViewerSession>>> {
		self.0.try_with_value(Rc::clone)
	}

	/// Run `f` against the session. `None` if the session is disposed or
	/// already borrowed further up the stack.
	pub fn read<R>(&self, f: impl FnOnce(&ViewerSession) -> R) -> Option<R> {
		let handle = self.handle()?;
		let session = handle.try_borrow().ok()?;
		Some(f(&session))
	}

	pub fn update<R>(&self, f: impl FnOnce(&mut ViewerSession) -> R) -> Option<R> {
		let handle = self.handle()?;
		let Ok(mut session) = handle.try_borrow_mut() else {
			warn!("graph-lens: session busy, dropping update");
			return None;
		};
		Some(f(&mut session))
	}
}

/// Reactive view of the session for the panels.
#[derive(Clone, Copy)]
pub struct ViewerSignals {
	/// Bumped every time a new graph is installed.
	pub revision: RwSignal<u64>,
	pub mode: RwSignal<FocusMode>,
	pub details: RwSignal<Option<ItemDetails>>,
	pub legend: RwSignal<Vec<LegendEntry>>,
	pub filters: RwSignal<FilterSnapshot>,
	pub labels: RwSignal<LabelState>,
	pub stats: RwSignal<GraphStats>,
	pub loading: RwSignal<bool>,
	pub error: RwSignal<Option<String>>,
}

impl ViewerSignals {
	pub fn new(session: &ViewerSession) -> Self {
		Self {
			revision: RwSignal::new(0),
			mode: RwSignal::new(session.mode()),
			details: RwSignal::new(session.details()),
			legend: RwSignal::new(session.legend()),
			filters: RwSignal::new(session.filters().snapshot()),
			labels: RwSignal::new(session.labels().state()),
			stats: RwSignal::new(session.stats()),
			loading: RwSignal::new(false),
			error: RwSignal::new(None),
		}
	}

	/// Copy the session's current state into the signals.
	pub fn publish(&self, session: &ViewerSession) {
		self.mode.set(session.mode());
		self.details.set(session.details());
		self.legend.set(session.legend());
		self.filters.set(session.filters().snapshot());
		self.labels.set(session.labels().state());
		self.stats.set(session.stats());
	}

	/// Publish after a new graph was installed; the canvas rebuilds on this.
	pub fn installed(&self, session: &ViewerSession) {
		self.publish(session);
		self.revision.update(|r| *r += 1);
	}
}
