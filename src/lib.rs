//! graph-lens: interactive force-directed viewer for typed property graphs.
//!
//! Loads a graph document (embedded in the page or fetched over HTTP), lays
//! it out with a force simulation, and lets the user filter node types,
//! toggle labels, and inspect a node in Focus or Context mode.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, error, info};

pub mod colors;
pub mod components;
pub mod config;
pub mod data;
pub mod filters;
pub mod focus;
pub mod graph;
pub mod labels;
pub mod observer;
pub mod session;
pub mod storage;
pub mod style;

pub use components::force_graph::{ForceGraphCanvas, Theme};
pub use components::{SharedSession, ViewerSignals};
pub use data::{DataSource, FetchError, GraphDataService, ValidationError};
pub use focus::{FocusContextEngine, FocusMode, LinkDirection};
pub use graph::{Graph, Link, Node, NodeRef};
pub use session::ViewerSession;
pub use style::{RenderAdapter, StyleSheet};

use components::panels::{
	ErrorBanner, InfoPanel, LabelToggles, LegendPanel, ModeIndicator, StatsPanel,
};
use config::{CONFIG_ELEMENT_ID, ViewerConfig};
use storage::LocalStorageBackend;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("graph-lens: logging initialized");
}

/// Load `source` in the background and install the result into the session.
/// On failure the current graph stays and the error is shown.
fn load_graph(
	session: SharedSession,
	signals: ViewerSignals,
	service: GraphDataService,
	source: DataSource,
) {
	signals.loading.set(true);
	spawn_local(async move {
		match service.load(&source).await {
			Ok(graph) => {
				session.update(|s| {
					s.load_graph(graph);
					signals.installed(s);
				});
				signals.error.set(None);
			}
			Err(e) => {
				error!("graph-lens: failed to load graph: {}", e);
				signals.error.set(Some(e.to_string()));
			}
		}
		signals.loading.set(false);
	});
}

/// Main application component.
///
/// Reads the viewer config from the page, builds the session, and loads the
/// graph from the embedded document or the configured endpoint.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = ViewerConfig::from_document(CONFIG_ELEMENT_ID);
	let source = DataSource::detect(&config.api);
	let service = GraphDataService::new(config.api.clone());

	let mut session = ViewerSession::new(config, Rc::new(LocalStorageBackend));
	let signals = ViewerSignals::new(&session);
	session
		.filters_mut()
		.subscribe(move |snapshot| signals.filters.set(snapshot.clone()));
	session.labels_mut().subscribe(move |state| signals.labels.set(*state));
	let session = SharedSession::new(session);

	let loader = StoredValue::new((service, source));
	let reload = move || {
		loader.with_value(|(service, source)| {
			load_graph(session, signals, service.clone(), source.clone())
		});
	};
	reload();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Lens" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas session=session signals=signals fullscreen=true />
			<div class="graph-overlay">
				<ErrorBanner signals=signals />
				<div class="viewer-panel toolbar">
					<h1>"Graph Lens"</h1>
					<button on:click=move |_| reload() prop:disabled=move || signals.loading.get()>
						{move || if signals.loading.get() { "Loading…" } else { "Reload" }}
					</button>
				</div>
				<StatsPanel signals=signals />
				<ModeIndicator signals=signals />
				<LegendPanel session=session signals=signals />
				<LabelToggles session=session signals=signals />
				<InfoPanel signals=signals />
			</div>
		</div>
	}
}
