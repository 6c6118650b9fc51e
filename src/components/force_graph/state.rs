//! Simulation state and interaction tracking for the canvas.
//!
//! Wraps the `force_graph` physics simulation with per-node metadata, the
//! pan/zoom transform, drag and press tracking, and the latest
//! [`StyleSheet`] pushed by the session.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use crate::graph::{Graph, GraphIndex};
use crate::style::{LinkStyle, NodeStyle, RenderAdapter, StyleSheet};

/// Pointer travel, in screen pixels, beyond which a press is a drag or pan.
pub const CLICK_SLOP_PX: f64 = 4.0;

/// Per-node data carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Position in `graph.nodes`.
	pub index: usize,
	/// Radius multiplier from connectivity.
	pub size: f64,
}

/// A simulated edge, by position in `graph.nodes` / `graph.links`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeInfo {
	pub source: usize,
	pub target: usize,
	pub link: usize,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor, clamped to 0.1..10.0.
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Distinguishes a click from a drag.
#[derive(Clone, Debug, Default)]
pub struct PressState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub moved: bool,
}

impl PressState {
	pub fn begin(&mut self, x: f64, y: f64) {
		*self = Self {
			active: true,
			start_x: x,
			start_y: y,
			moved: false,
		};
	}

	pub fn track(&mut self, x: f64, y: f64) {
		if self.active && !self.moved {
			let (dx, dy) = (x - self.start_x, y - self.start_y);
			self.moved = (dx * dx + dy * dy).sqrt() > CLICK_SLOP_PX;
		}
	}

	/// Finish the press; true when it counts as a click.
	pub fn end(&mut self) -> bool {
		let click = self.active && !self.moved;
		self.active = false;
		click
	}
}

/// What a click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(usize),
	Link(usize),
	Background,
}

/// Canvas-side graph state, rebuilt whenever a new graph is installed.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub node_names: Vec<String>,
	pub link_labels: Vec<String>,
	pub styles: StyleSheet,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub press: PressState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl ForceGraphState {
	pub fn new(data: &Graph, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let index = GraphIndex::new(data);

		let mut edges = Vec::new();
		for (link_index, link) in data.links.iter().enumerate() {
			let (Some(source), Some(target)) =
				(index.position(link.source.id()), index.position(link.target.id()))
			else {
				continue;
			};
			edges.push(EdgeInfo {
				source,
				target,
				link: link_index,
			});
		}

		let mut edge_counts: HashMap<usize, usize> = HashMap::new();
		for edge in &edges {
			*edge_counts.entry(edge.source).or_insert(0) += 1;
			*edge_counts.entry(edge.target).or_insert(0) += 1;
		}
		let max_edges = edge_counts.values().copied().max().unwrap_or(1).max(1);

		let count = data.nodes.len().max(1) as f64;
		let sim_nodes: Vec<DefaultNodeIdx> = (0..data.nodes.len())
			.map(|i| {
				let angle = (i as f64) * 2.0 * PI / count;
				let edges_here = edge_counts.get(&i).copied().unwrap_or(0) as f64;
				let edge_factor = (edges_here / max_edges as f64).sqrt();
				graph.add_node(NodeData {
					x: (100.0 * angle.cos()) as f32,
					y: (100.0 * angle.sin()) as f32,
					mass: 10.0,
					is_anchor: false,
					user_data: NodeInfo {
						index: i,
						size: 0.8 + 0.7 * edge_factor,
					},
				})
			})
			.collect();

		for edge in &edges {
			if edge.source != edge.target {
				graph.add_edge(sim_nodes[edge.source], sim_nodes[edge.target], EdgeData::default());
			}
		}

		Self {
			graph,
			edges,
			node_names: data.nodes.iter().map(|n| n.display_name().to_string()).collect(),
			link_labels: data.links.iter().map(|l| l.label.clone()).collect(),
			styles: StyleSheet::default(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			press: PressState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Style of `graph.nodes[index]`; visible until the first refresh arrives.
	pub fn node_style(&self, index: usize) -> Option<&NodeStyle> {
		self.styles.nodes.get(index)
	}

	pub fn link_style(&self, index: usize) -> Option<&LinkStyle> {
		self.styles.links.get(index)
	}

	fn node_shown(&self, index: usize) -> bool {
		self.node_style(index).is_none_or(|s| s.visible)
	}

	fn link_shown(&self, index: usize) -> bool {
		self.link_style(index).is_none_or(|s| s.visible)
	}

	/// World positions indexed like `graph.nodes`.
	pub fn positions(&self) -> Vec<(f64, f64)> {
		let mut positions = vec![(0.0, 0.0); self.node_names.len()];
		self.graph.visit_nodes(|node| {
			if let Some(slot) = positions.get_mut(node.data.user_data.index) {
				*slot = (node.x() as f64, node.y() as f64);
			}
		});
		positions
	}

	/// Topmost visible node under the screen point.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		config: &ScaleConfig,
	) -> Option<(DefaultNodeIdx, usize)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			if !self.node_shown(info.index) {
				return;
			}
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < scale.hit_radius * info.size {
				found = Some((node.index(), info.index));
			}
		});
		found
	}

	/// Closest visible link within the hit distance of the screen point.
	pub fn link_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let positions = self.positions();
		self.edges
			.iter()
			.filter(|e| self.link_shown(e.link))
			.map(|e| (e.link, segment_distance((gx, gy), positions[e.source], positions[e.target])))
			.filter(|&(_, d)| d < scale.link_hit_distance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(link, _)| link)
	}

	/// Resolve a click at the screen point. Nodes take precedence over links.
	pub fn hit_test(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Hit {
		if let Some((_, index)) = self.node_at_position(sx, sy, config) {
			Hit::Node(index)
		} else if let Some(link) = self.link_at_position(sx, sy, config) {
			Hit::Link(link)
		} else {
			Hit::Background
		}
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl RenderAdapter for ForceGraphState {
	fn refresh(&mut self, sheet: StyleSheet) {
		self.styles = sheet;
	}
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len_sq = abx * abx + aby * aby;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::theme::Color;
	use crate::graph::{Link, Node};

	fn two_nodes() -> Graph {
		Graph {
			nodes: vec![Node::new("a", "A", "t"), Node::new("b", "B", "t")],
			links: vec![Link::new("a", "b", "ab"), Link::new("a", "ghost", "dangling")],
		}
	}

	fn hidden_first_node(state: &mut ForceGraphState) {
		let shown = NodeStyle {
			color: Color::rgb(0, 0, 0),
			visible: true,
			label_visible: true,
		};
		state.refresh(StyleSheet {
			nodes: vec![NodeStyle { visible: false, ..shown }, shown],
			links: vec![],
		});
	}

	#[test]
	fn test_unresolved_links_are_not_simulated() {
		let state = ForceGraphState::new(&two_nodes(), 800.0, 600.0);
		assert_eq!(
			state.edges,
			[EdgeInfo {
				source: 0,
				target: 1,
				link: 0
			}]
		);
		assert_eq!(state.link_labels.len(), 2);
	}

	#[test]
	fn test_hit_testing() {
		let mut state = ForceGraphState::new(&two_nodes(), 800.0, 600.0);
		let config = ScaleConfig::default();
		// Node 0 starts at (100, 0), node 1 at (-100, 0); the view is centered.
		assert_eq!(state.hit_test(500.0, 300.0, &config), Hit::Node(0));
		assert_eq!(state.hit_test(300.0, 300.0, &config), Hit::Node(1));
		assert_eq!(state.hit_test(400.0, 302.0, &config), Hit::Link(0));
		assert_eq!(state.hit_test(400.0, 340.0, &config), Hit::Background);

		hidden_first_node(&mut state);
		assert_eq!(state.node_at_position(500.0, 300.0, &config), None);
		assert!(state.node_at_position(300.0, 300.0, &config).is_some());
	}

	#[test]
	fn test_press_distinguishes_click_from_drag() {
		let mut press = PressState::default();
		press.begin(10.0, 10.0);
		press.track(12.0, 11.0);
		assert!(press.end());

		press.begin(10.0, 10.0);
		press.track(30.0, 10.0);
		press.track(10.0, 10.0);
		assert!(!press.end());
		assert!(!press.end());
	}

	#[test]
	fn test_segment_distance() {
		assert_eq!(segment_distance((0.0, 3.0), (-5.0, 0.0), (5.0, 0.0)), 3.0);
		assert_eq!(segment_distance((8.0, 0.0), (-5.0, 0.0), (5.0, 0.0)), 3.0);
		assert_eq!(segment_distance((1.0, 1.0), (0.0, 0.0), (0.0, 0.0)), 2f64.sqrt());
	}
}
