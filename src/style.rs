//! Per-element style derivation.
//!
//! Turns the focus engine, the type filter and the label toggles into a
//! [`StyleSheet`]: one [`NodeStyle`] per node and one [`LinkStyle`] per link,
//! indexed like `graph.nodes` and `graph.links`. The sheet is rebuilt in full
//! whenever any input changes and handed to a [`RenderAdapter`].

use crate::colors::ColorAssigner;
use crate::components::force_graph::theme::{Color, Theme};
use crate::filters::VisibilityFilterStore;
use crate::focus::{FocusContextEngine, FocusMode, LinkDirection};
use crate::graph::{Graph, GraphIndex, Link, Node};
use crate::labels::LabelState;

/// Derived appearance of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: Color,
	pub visible: bool,
	pub label_visible: bool,
}

/// Derived appearance of one link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkStyle {
	pub color: Color,
	pub visible: bool,
	pub label_visible: bool,
	/// Flow particles drawn along the link; zero when not highlighted.
	pub particles: u32,
	pub direction: Option<LinkDirection>,
}

/// Styles for every element of a graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSheet {
	pub nodes: Vec<NodeStyle>,
	pub links: Vec<LinkStyle>,
}

/// Receives a fresh [`StyleSheet`] whenever derived state changes.
pub trait RenderAdapter {
	fn refresh(&mut self, sheet: StyleSheet);
}

/// Everything style derivation reads.
pub struct StyleInputs<'a> {
	pub focus: &'a FocusContextEngine,
	pub filters: &'a VisibilityFilterStore,
	pub labels: LabelState,
	pub theme: &'a Theme,
	pub colors: &'a ColorAssigner,
	/// Particles per highlighted link.
	pub particle_count: u32,
}

pub fn node_color(node: &Node, inputs: &StyleInputs<'_>) -> Color {
	let focus = inputs.focus;
	let palette = &inputs.theme.focus;
	match focus.mode() {
		FocusMode::None => inputs
			.colors
			.get(node.type_key())
			.unwrap_or_else(|| inputs.theme.palette.get(0)),
		mode => {
			if focus.is_focused(node) {
				palette.focused
			} else if focus.is_neighbor(node) {
				palette.neighbor
			} else if mode == FocusMode::Context && focus.is_two_hop_neighbor(node) {
				palette.context
			} else {
				palette.dimmed
			}
		}
	}
}

pub fn node_visible(node: &Node, inputs: &StyleInputs<'_>) -> bool {
	let focus = inputs.focus;
	match focus.mode() {
		FocusMode::Context => {
			focus.is_focused(node) || focus.is_neighbor(node) || focus.is_two_hop_neighbor(node)
		}
		_ => inputs.filters.is_visible(&node.node_type),
	}
}

/// Context mode shows only connected links; otherwise both endpoint types
/// must pass the filter. Links with an unknown endpoint are hidden.
pub fn link_visible(link: &Link, index: &GraphIndex<'_>, inputs: &StyleInputs<'_>) -> bool {
	match inputs.focus.mode() {
		FocusMode::Context => inputs.focus.classify_link(link).connected,
		_ => index.endpoints(link).is_some_and(|(source, target)| {
			let filters = inputs.filters;
			filters.is_visible(&source.node_type) && filters.is_visible(&target.node_type)
		}),
	}
}

pub fn link_color(link: &Link, inputs: &StyleInputs<'_>) -> Color {
	let palette = &inputs.theme.focus;
	match inputs.focus.classify_link(link).direction {
		Some(LinkDirection::Outgoing) => palette.outgoing,
		Some(LinkDirection::Incoming) => palette.incoming,
		None => inputs.theme.edge.arrow_color,
	}
}

pub fn link_particles(link: &Link, inputs: &StyleInputs<'_>) -> u32 {
	if inputs.focus.classify_link(link).connected {
		inputs.particle_count.max(1)
	} else {
		0
	}
}

/// Derive the full style sheet for `graph`.
pub fn build_style_sheet(graph: &Graph, inputs: &StyleInputs<'_>) -> StyleSheet {
	let index = GraphIndex::new(graph);

	let nodes = graph
		.nodes
		.iter()
		.map(|node| {
			let visible = node_visible(node, inputs);
			NodeStyle {
				color: node_color(node, inputs),
				visible,
				label_visible: visible && inputs.labels.node_labels_visible,
			}
		})
		.collect();

	let links = graph
		.links
		.iter()
		.map(|link| {
			let visible = link_visible(link, &index, inputs);
			LinkStyle {
				color: link_color(link, inputs),
				visible,
				label_visible: visible && inputs.labels.link_labels_visible,
				particles: link_particles(link, inputs),
				direction: inputs.focus.classify_link(link).direction,
			}
		})
		.collect();

	StyleSheet { nodes, links }
}
