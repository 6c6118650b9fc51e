//! Stable per-type node colors.

use std::collections::{BTreeMap, HashMap};

use crate::components::force_graph::theme::{Color, NodePalette};
use crate::graph::{Graph, type_key};

/// Hands out palette colors to node types in first-seen order.
///
/// A type keeps its color until [`reset`](Self::reset); once the palette is
/// exhausted, assignment wraps around to the first color.
#[derive(Clone, Debug)]
pub struct ColorAssigner {
	palette: NodePalette,
	assigned: HashMap<String, Color>,
}

impl ColorAssigner {
	pub fn new(palette: NodePalette) -> Self {
		Self {
			palette,
			assigned: HashMap::new(),
		}
	}

	/// Color for `node_type`, assigning the next palette entry if unseen.
	pub fn color_for(&mut self, node_type: &str) -> Color {
		let key = type_key(node_type);
		if let Some(color) = self.assigned.get(key) {
			return *color;
		}
		let color = self.palette.get(self.assigned.len());
		self.assigned.insert(key.to_string(), color);
		color
	}

	/// Assign colors to every type of `graph` in node order.
	pub fn assign_graph(&mut self, graph: &Graph) {
		for ty in graph.type_keys() {
			self.color_for(ty);
		}
	}

	/// Previously assigned color, without assigning.
	pub fn get(&self, node_type: &str) -> Option<Color> {
		self.assigned.get(type_key(node_type)).copied()
	}

	/// All current assignments.
	pub fn mappings(&self) -> BTreeMap<String, Color> {
		self.assigned
			.iter()
			.map(|(ty, color)| (ty.clone(), *color))
			.collect()
	}

	pub fn reset(&mut self) {
		self.assigned.clear();
	}
}
