//! The viewer's application object.
//!
//! [`ViewerSession`] owns the loaded graph, the focus engine, both visibility
//! stores, the color assigner and the current selection. UI code turns raw
//! input into the session's operations; the canvas pulls a fresh
//! [`StyleSheet`] from it whenever something marked it dirty.

use std::cell::Cell;
use std::rc::Rc;

use log::info;
use serde_json::Value;

use crate::colors::ColorAssigner;
use crate::components::force_graph::theme::Theme;
use crate::config::ViewerConfig;
use crate::filters::VisibilityFilterStore;
use crate::focus::{FocusContextEngine, FocusMode};
use crate::graph::{Graph, GraphIndex, Link, Node};
use crate::labels::LabelVisibilityStore;
use crate::storage::StorageBackend;
use crate::style::{RenderAdapter, StyleInputs, StyleSheet, build_style_sheet};

/// What the info panel is showing, by index into the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(usize),
	Link(usize),
}

/// Modifier keys held during a click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClickModifiers {
	/// Ctrl, or Cmd on macOS.
	pub primary: bool,
	/// Alt / Option.
	pub secondary: bool,
}

impl ClickModifiers {
	/// Mode a node click requests. Primary wins when both are held.
	pub fn requested_mode(self) -> FocusMode {
		if self.primary {
			FocusMode::Focus
		} else if self.secondary {
			FocusMode::Context
		} else {
			FocusMode::None
		}
	}
}

/// A relationship of the selected node, seen from that node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSummary {
	pub label: String,
	/// Display name of the node on the other end.
	pub other: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetails {
	pub id: String,
	pub name: String,
	pub node_type: String,
	pub description: String,
	pub insights: Vec<String>,
	/// Extra attributes rendered as text, in document order.
	pub attributes: Vec<(String, String)>,
	pub outgoing: Vec<EdgeSummary>,
	pub incoming: Vec<EdgeSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkDetails {
	pub source: String,
	pub target: String,
	pub label: String,
	pub attributes: Vec<(String, String)>,
}

/// Info panel content for the current selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemDetails {
	Node(NodeDetails),
	Link(LinkDetails),
}

/// One legend row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
	pub node_type: String,
	/// CSS color of the type's swatch.
	pub color: String,
	pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
	pub nodes: usize,
	pub links: usize,
	pub types: usize,
}

#[derive(Debug)]
pub struct ViewerSession {
	config: ViewerConfig,
	theme: Theme,
	graph: Graph,
	focus: FocusContextEngine,
	filters: VisibilityFilterStore,
	labels: LabelVisibilityStore,
	colors: ColorAssigner,
	selection: Selection,
	dirty: Rc<Cell<bool>>,
}

impl ViewerSession {
	/// Build an empty session. Store changes mark the session dirty.
	pub fn new(config: ViewerConfig, backend: Rc<dyn StorageBackend>) -> Self {
		let theme = config
			.theme
			.as_deref()
			.and_then(Theme::named)
			.unwrap_or_default();
		let dirty = Rc::new(Cell::new(true));

		let mut filters = VisibilityFilterStore::new(config.filter.clone(), backend.clone());
		let flag = dirty.clone();
		filters.subscribe(move |_| flag.set(true));

		let mut labels = LabelVisibilityStore::new(config.labels.clone(), backend);
		let flag = dirty.clone();
		labels.subscribe(move |_| flag.set(true));

		Self {
			colors: ColorAssigner::new(theme.palette.clone()),
			config,
			theme,
			graph: Graph::default(),
			focus: FocusContextEngine::new(),
			filters,
			labels,
			selection: Selection::None,
			dirty,
		}
	}

	/// Install a newly loaded graph.
	///
	/// Exits any mode, rebuilds the type filter and clears the selection.
	/// Label state and already assigned type colors are kept.
	pub fn load_graph(&mut self, graph: Graph) {
		self.focus.exit();
		self.filters.init_from_graph(&graph);
		self.colors.assign_graph(&graph);
		self.selection = Selection::None;
		info!(
			"graph-lens: installed graph with {} nodes, {} links",
			graph.nodes.len(),
			graph.links.len()
		);
		self.graph = graph;
		self.mark_dirty();
	}

	/// Handle a click on `graph.nodes[index]`.
	pub fn handle_node_click(&mut self, index: usize, modifiers: ClickModifiers) {
		let Some(node) = self.graph.nodes.get(index) else {
			return;
		};
		match modifiers.requested_mode() {
			FocusMode::None => self.focus.exit(),
			mode => {
				info!("graph-lens: {} on {}", mode.label(), node.id);
				self.focus.enter_mode(node, &self.graph, mode);
			}
		}
		self.selection = Selection::Node(index);
		self.mark_dirty();
	}

	/// Handle a click on `graph.links[index]`.
	pub fn handle_link_click(&mut self, index: usize) {
		if index >= self.graph.links.len() {
			return;
		}
		self.focus.exit();
		self.selection = Selection::Link(index);
		self.mark_dirty();
	}

	/// Escape, background click, or click outside the canvas.
	pub fn exit_mode(&mut self) {
		if self.focus.mode().is_active() {
			self.focus.exit();
			self.mark_dirty();
		}
	}

	pub fn mark_dirty(&self) {
		self.dirty.set(true);
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	/// Shared flag raised by every state change.
	pub fn dirty_flag(&self) -> Rc<Cell<bool>> {
		self.dirty.clone()
	}

	/// Derive styles for every node and link of the current graph.
	pub fn style_sheet(&self) -> StyleSheet {
		build_style_sheet(
			&self.graph,
			&StyleInputs {
				focus: &self.focus,
				filters: &self.filters,
				labels: self.labels.state(),
				theme: &self.theme,
				colors: &self.colors,
				particle_count: self.config.flow.particle_count,
			},
		)
	}

	/// Push a fresh style sheet to `adapter` if anything changed since the
	/// last refresh. Returns whether a refresh happened.
	pub fn refresh_if_dirty(&self, adapter: &mut dyn RenderAdapter) -> bool {
		if !self.dirty.replace(false) {
			return false;
		}
		adapter.refresh(self.style_sheet());
		true
	}

	pub fn details(&self) -> Option<ItemDetails> {
		match self.selection {
			Selection::None => None,
			Selection::Node(index) => {
				let node = self.graph.nodes.get(index)?;
				Some(ItemDetails::Node(self.node_details(node)))
			}
			Selection::Link(index) => {
				let link = self.graph.links.get(index)?;
				Some(ItemDetails::Link(self.link_details(link)))
			}
		}
	}

	fn node_details(&self, node: &Node) -> NodeDetails {
		let index = GraphIndex::new(&self.graph);
		let mut outgoing = Vec::new();
		let mut incoming = Vec::new();
		for link in &self.graph.links {
			let Some((source, target)) = index.endpoints(link) else {
				continue;
			};
			if source.id == node.id {
				outgoing.push(EdgeSummary {
					label: link.label.clone(),
					other: target.display_name().to_string(),
				});
			} else if target.id == node.id {
				incoming.push(EdgeSummary {
					label: link.label.clone(),
					other: source.display_name().to_string(),
				});
			}
		}
		NodeDetails {
			id: node.id.clone(),
			name: node.display_name().to_string(),
			node_type: node.type_key().to_string(),
			description: node.description.clone(),
			insights: node.insights.clone(),
			attributes: attribute_rows(&node.attributes),
			outgoing,
			incoming,
		}
	}

	fn link_details(&self, link: &Link) -> LinkDetails {
		let index = GraphIndex::new(&self.graph);
		let name = |id: &str| {
			index
				.get(id)
				.map_or_else(|| id.to_string(), |n| n.display_name().to_string())
		};
		LinkDetails {
			source: name(link.source.id()),
			target: name(link.target.id()),
			label: link.label.clone(),
			attributes: attribute_rows(&link.attributes),
		}
	}

	/// Legend rows for the types of the current graph, in first-seen order.
	pub fn legend(&self) -> Vec<LegendEntry> {
		self.graph
			.type_keys()
			.into_iter()
			.map(|ty| LegendEntry {
				node_type: ty.to_string(),
				color: self
					.colors
					.get(ty)
					.unwrap_or_else(|| self.theme.palette.get(0))
					.to_css(),
				visible: self.filters.is_visible(ty),
			})
			.collect()
	}

	pub fn stats(&self) -> GraphStats {
		GraphStats {
			nodes: self.graph.nodes.len(),
			links: self.graph.links.len(),
			types: self.graph.type_keys().len(),
		}
	}

	pub fn config(&self) -> &ViewerConfig {
		&self.config
	}

	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn focus(&self) -> &FocusContextEngine {
		&self.focus
	}

	pub fn mode(&self) -> FocusMode {
		self.focus.mode()
	}

	pub fn selection(&self) -> Selection {
		self.selection
	}

	pub fn filters(&self) -> &VisibilityFilterStore {
		&self.filters
	}

	pub fn filters_mut(&mut self) -> &mut VisibilityFilterStore {
		&mut self.filters
	}

	pub fn labels(&self) -> &LabelVisibilityStore {
		&self.labels
	}

	pub fn labels_mut(&mut self) -> &mut LabelVisibilityStore {
		&mut self.labels
	}

	pub fn colors(&self) -> &ColorAssigner {
		&self.colors
	}
}

fn attribute_rows(attributes: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
	attributes
		.iter()
		.map(|(key, value)| {
			let text = match value {
				Value::String(s) => s.clone(),
				other => other.to_string(),
			};
			(key.clone(), text)
		})
		.collect()
}
