//! Focus and context inspection around a clicked node.
//!
//! [`FocusContextEngine`] owns the inspection mode and every set derived from
//! the focused node: one-hop neighbors, two-hop neighbors (Context mode only)
//! and the connected links split by direction. Each mode entry recomputes the
//! whole state from the graph it is handed, so nothing carries over between
//! focus operations or across graph reloads.

use std::collections::HashSet;

use log::warn;

use crate::graph::{Graph, GraphIndex, Link, Node};

/// Inspection mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusMode {
	/// No inspection active; styling follows node types and filters.
	#[default]
	None,
	/// Focused node and its direct neighbors.
	Focus,
	/// Focus plus two-hop neighbors; everything else is hidden.
	Context,
}

impl FocusMode {
	pub fn is_active(self) -> bool {
		self != FocusMode::None
	}

	/// Short label for the mode indicator.
	pub fn label(self) -> &'static str {
		match self {
			FocusMode::None => "Explore",
			FocusMode::Focus => "Focus",
			FocusMode::Context => "Context",
		}
	}
}

/// Direction of a connected link relative to the focused node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkDirection {
	/// The focused node is the link source.
	Outgoing,
	/// The focused node is the link target.
	Incoming,
}

/// Result of [`FocusContextEngine::classify_link`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkClass {
	pub connected: bool,
	pub direction: Option<LinkDirection>,
}

impl LinkClass {
	pub const DISCONNECTED: LinkClass = LinkClass {
		connected: false,
		direction: None,
	};

	fn connected(direction: LinkDirection) -> Self {
		Self {
			connected: true,
			direction: Some(direction),
		}
	}
}

/// Insertion-ordered node set keyed by id. The first node seen for an id is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSet {
	nodes: Vec<Node>,
	ids: HashSet<String>,
}

impl NodeSet {
	/// Insert `node` unless its id is already present. Returns whether it was added.
	pub fn insert(&mut self, node: &Node) -> bool {
		if !self.ids.insert(node.id.clone()) {
			return false;
		}
		self.nodes.push(node.clone());
		true
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Mode state machine and derived neighborhood of the focused node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocusContextEngine {
	mode: FocusMode,
	focused: Option<Node>,
	neighbors: NodeSet,
	two_hop: NodeSet,
	connected_links: Vec<Link>,
	outgoing_links: Vec<Link>,
	incoming_links: Vec<Link>,
}

impl FocusContextEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Focus `node` in `mode`, recomputing all derived state against `graph`.
	///
	/// Any previous focus is discarded. `node` should belong to `graph`;
	/// passing [`FocusMode::None`] is equivalent to [`exit`](Self::exit).
	pub fn enter_mode(&mut self, node: &Node, graph: &Graph, mode: FocusMode) {
		if !mode.is_active() {
			self.exit();
			return;
		}

		let index = GraphIndex::new(graph);
		let resolved = resolve_links(graph, &index);

		let mut next = Self {
			mode,
			focused: Some(node.clone()),
			..Self::default()
		};
		next.collect_one_hop(&node.id, &resolved);
		if mode == FocusMode::Context {
			next.collect_two_hop(&node.id, &resolved);
		}
		*self = next;
	}

	/// Leave any inspection mode. Safe to call when nothing is focused.
	pub fn exit(&mut self) {
		*self = Self::default();
	}

	fn collect_one_hop(&mut self, focused_id: &str, resolved: &[(&Link, &Node, &Node)]) {
		for &(link, source, target) in resolved {
			if source.id == focused_id {
				self.outgoing_links.push(link.clone());
				self.connected_links.push(link.clone());
				if target.id != focused_id {
					self.neighbors.insert(target);
				}
			} else if target.id == focused_id {
				self.incoming_links.push(link.clone());
				self.connected_links.push(link.clone());
				self.neighbors.insert(source);
			}
		}
	}

	fn collect_two_hop(&mut self, focused_id: &str, resolved: &[(&Link, &Node, &Node)]) {
		for &(_, source, target) in resolved {
			for (near, far) in [(source, target), (target, source)] {
				if self.neighbors.contains(&near.id)
					&& far.id != focused_id
					&& !self.neighbors.contains(&far.id)
				{
					self.two_hop.insert(far);
				}
			}
		}
	}

	pub fn mode(&self) -> FocusMode {
		self.mode
	}

	pub fn focused_node(&self) -> Option<&Node> {
		self.focused.as_ref()
	}

	pub fn is_focused(&self, node: &Node) -> bool {
		self.focused.as_ref().is_some_and(|f| f.id == node.id)
	}

	pub fn is_neighbor(&self, node: &Node) -> bool {
		self.neighbors.contains(&node.id)
	}

	/// Always false outside Context mode.
	pub fn is_two_hop_neighbor(&self, node: &Node) -> bool {
		self.two_hop.contains(&node.id)
	}

	/// Whether `link` is one of the connected links, and from which side.
	///
	/// Only links whose endpoints both resolved on entry count. Outgoing links
	/// are checked first, so a self-loop reads as outgoing.
	pub fn classify_link(&self, link: &Link) -> LinkClass {
		if self.outgoing_links.contains(link) {
			LinkClass::connected(LinkDirection::Outgoing)
		} else if self.incoming_links.contains(link) {
			LinkClass::connected(LinkDirection::Incoming)
		} else {
			LinkClass::DISCONNECTED
		}
	}

	pub fn neighbors(&self) -> &NodeSet {
		&self.neighbors
	}

	pub fn two_hop_neighbors(&self) -> &NodeSet {
		&self.two_hop
	}

	pub fn connected_links(&self) -> &[Link] {
		&self.connected_links
	}

	pub fn outgoing_links(&self) -> &[Link] {
		&self.outgoing_links
	}

	pub fn incoming_links(&self) -> &[Link] {
		&self.incoming_links
	}
}

/// Resolve every link's endpoints, dropping links that reference unknown nodes.
fn resolve_links<'g>(
	graph: &'g Graph,
	index: &GraphIndex<'g>,
) -> Vec<(&'g Link, &'g Node, &'g Node)> {
	graph
		.links
		.iter()
		.filter_map(|link| match index.endpoints(link) {
			Some((source, target)) => Some((link, source, target)),
			None => {
				warn!(
					"graph-lens: skipping link {} -> {} ({:?}): endpoint not found",
					link.source.id(),
					link.target.id(),
					link.label
				);
				None
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ids(set: &NodeSet) -> Vec<&str> {
		let mut ids: Vec<&str> = set.iter().map(|n| n.id.as_str()).collect();
		ids.sort();
		ids
	}

	fn link_pairs(links: &[Link]) -> Vec<(&str, &str)> {
		links.iter().map(|l| (l.source.id(), l.target.id())).collect()
	}

	/// A, B, C, D with A->B, B->C, A->D.
	fn abcd() -> Graph {
		Graph {
			nodes: ["A", "B", "C", "D"]
				.iter()
				.map(|id| Node::new(*id, *id, "t"))
				.collect(),
			links: vec![
				Link::new("A", "B", "ab"),
				Link::new("B", "C", "bc"),
				Link::new("A", "D", "ad"),
			],
		}
	}

	#[test]
	fn test_focus_mode_scenario() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);

		assert_eq!(engine.mode(), FocusMode::Focus);
		assert_eq!(ids(engine.neighbors()), vec!["B", "D"]);
		assert_eq!(link_pairs(engine.outgoing_links()), vec![("A", "B"), ("A", "D")]);
		assert!(engine.incoming_links().is_empty());
		assert!(engine.two_hop_neighbors().is_empty());
		assert_eq!(engine.classify_link(&graph.links[1]), LinkClass::DISCONNECTED);
	}

	#[test]
	fn test_context_mode_scenario() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Context);

		assert_eq!(ids(engine.neighbors()), vec!["B", "D"]);
		assert_eq!(ids(engine.two_hop_neighbors()), vec!["C"]);
		assert!(engine.is_two_hop_neighbor(&graph.nodes[2]));
		assert_eq!(engine.classify_link(&graph.links[1]), LinkClass::DISCONNECTED);
	}

	#[test]
	fn test_only_focused_node_is_focused() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[1], &graph, FocusMode::Focus);

		for node in &graph.nodes {
			assert_eq!(engine.is_focused(node), node.id == "B");
		}
	}

	#[test]
	fn test_outgoing_and_incoming_classification() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[1], &graph, FocusMode::Focus);

		let class = engine.classify_link(&graph.links[1]);
		assert_eq!(class.direction, Some(LinkDirection::Outgoing));
		assert!(engine.is_neighbor(&graph.nodes[2]));

		let class = engine.classify_link(&graph.links[0]);
		assert!(class.connected);
		assert_eq!(class.direction, Some(LinkDirection::Incoming));
		assert_eq!(link_pairs(engine.incoming_links()), vec![("A", "B")]);
		assert_eq!(engine.connected_links().len(), 2);
	}

	#[test]
	fn test_exit_clears_everything() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Context);
		engine.exit();

		assert_eq!(engine.mode(), FocusMode::None);
		assert!(engine.focused_node().is_none());
		for node in &graph.nodes {
			assert!(!engine.is_focused(node));
			assert!(!engine.is_neighbor(node));
			assert!(!engine.is_two_hop_neighbor(node));
		}
		for link in &graph.links {
			assert!(!engine.classify_link(link).connected);
		}

		engine.exit();
		assert_eq!(engine, FocusContextEngine::default());
	}

	#[test]
	fn test_reentry_is_idempotent() {
		let graph = abcd();
		let mut once = FocusContextEngine::new();
		once.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);

		let mut twice = FocusContextEngine::new();
		twice.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);
		twice.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);

		assert_eq!(once, twice);
	}

	#[test]
	fn test_switching_node_and_mode_replaces_state() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Context);
		engine.enter_mode(&graph.nodes[2], &graph, FocusMode::Focus);

		assert_eq!(engine.mode(), FocusMode::Focus);
		assert_eq!(ids(engine.neighbors()), vec!["B"]);
		assert!(engine.two_hop_neighbors().is_empty());
		assert_eq!(link_pairs(engine.incoming_links()), vec![("B", "C")]);
	}

	#[test]
	fn test_two_hop_disjoint_on_cycles_and_parallel_edges() {
		let mut graph = abcd();
		graph.nodes.push(Node::new("E", "E", "t"));
		graph.links.extend([
			Link::new("C", "A", "ca"),
			Link::new("B", "D", "bd"),
			Link::new("B", "C", "bc-again"),
			Link::new("D", "E", "de"),
			Link::new("E", "D", "ed"),
			Link::new("A", "A", "self"),
		]);

		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Context);

		assert_eq!(ids(engine.neighbors()), vec!["B", "C", "D"]);
		assert_eq!(ids(engine.two_hop_neighbors()), vec!["E"]);
		for node in engine.two_hop_neighbors().iter() {
			assert!(!engine.is_neighbor(node));
			assert!(!engine.is_focused(node));
		}
		assert!(!engine.is_neighbor(&graph.nodes[0]));
	}

	#[test]
	fn test_self_loop_is_outgoing_without_self_neighbor() {
		let graph = Graph {
			nodes: vec![Node::new("A", "A", "t")],
			links: vec![Link::new("A", "A", "self")],
		};
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);

		assert_eq!(engine.classify_link(&graph.links[0]).direction, Some(LinkDirection::Outgoing));
		assert_eq!(engine.outgoing_links().len(), 1);
		assert!(engine.neighbors().is_empty());
	}

	#[test]
	fn test_malformed_link_is_skipped() {
		let mut graph = abcd();
		graph.links.insert(0, Link::new("A", "ghost", "dangling"));

		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Context);

		assert_eq!(ids(engine.neighbors()), vec!["B", "D"]);
		assert_eq!(link_pairs(engine.outgoing_links()), vec![("A", "B"), ("A", "D")]);
		assert_eq!(engine.connected_links().len(), 2);
		assert_eq!(ids(engine.two_hop_neighbors()), vec!["C"]);
		assert_eq!(engine.classify_link(&graph.links[0]), LinkClass::DISCONNECTED);
		assert!(engine.classify_link(&graph.links[1]).connected);
	}

	#[test]
	fn test_resolved_node_refs_are_traversed() {
		let graph = abcd();
		let mut resolved = graph.clone();
		resolved.links = vec![Link::new(graph.nodes[0].clone(), graph.nodes[1].clone(), "ab")];

		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&resolved.nodes[1], &resolved, FocusMode::Focus);

		assert_eq!(ids(engine.neighbors()), vec!["A"]);
		assert_eq!(
			engine.classify_link(&resolved.links[0]).direction,
			Some(LinkDirection::Incoming)
		);
	}

	#[test]
	fn test_neighbor_keeps_first_seen_node() {
		let mut graph = abcd();
		graph.nodes[1].name = "Bee".into();
		// A later node with a duplicate id and an embedded copy with a stale name.
		graph.nodes.push(Node::new("B", "shadow", "t"));
		graph.links.push(Link::new(Node::new("B", "stale", "t"), "A", "ba"));

		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);

		let names: Vec<&str> = engine.neighbors().iter().map(|n| n.name.as_str()).collect();
		assert_eq!(names, vec!["Bee", "D"]);
		assert_eq!(engine.connected_links().len(), 3);
		assert_eq!(engine.incoming_links().len(), 1);
	}

	#[test]
	fn test_enter_none_mode_exits() {
		let graph = abcd();
		let mut engine = FocusContextEngine::new();
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::Focus);
		engine.enter_mode(&graph.nodes[0], &graph, FocusMode::None);
		assert_eq!(engine, FocusContextEngine::default());
	}
}
