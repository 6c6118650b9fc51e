//! Property graph data model.
//!
//! Nodes carry a `type`, display fields and an open attribute map; links are
//! directed and reference their endpoints either by id or by an embedded node
//! object. Layout positions never live here; the renderer owns them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type key used for nodes whose `type` is absent or empty.
pub const DEFAULT_TYPE: &str = "default";

/// Normalize a raw node type into the key used by filters and colors.
pub fn type_key(raw: &str) -> &str {
	if raw.is_empty() { DEFAULT_TYPE } else { raw }
}

/// A node in the property graph.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Node {
	/// Unique identifier. Links reference nodes by this id.
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(rename = "type", default)]
	pub node_type: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub insights: Vec<String>,
	/// Every other member of the node object.
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

impl Node {
	/// Minimal node with the given id, name and type.
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		node_type: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			node_type: node_type.into(),
			description: String::new(),
			insights: Vec::new(),
			attributes: Map::new(),
		}
	}

	/// The filter/color key for this node's type.
	pub fn type_key(&self) -> &str {
		type_key(&self.node_type)
	}

	/// Name for display, falling back to the id.
	pub fn display_name(&self) -> &str {
		if self.name.is_empty() { &self.id } else { &self.name }
	}
}

/// Reference to a link endpoint: a raw id or an already-resolved node.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NodeRef {
	Id(String),
	Node(Box<Node>),
}

impl NodeRef {
	/// The referenced node id, whichever form the reference takes.
	pub fn id(&self) -> &str {
		match self {
			NodeRef::Id(id) => id,
			NodeRef::Node(node) => &node.id,
		}
	}
}

impl From<&str> for NodeRef {
	fn from(id: &str) -> Self {
		NodeRef::Id(id.to_string())
	}
}

impl From<Node> for NodeRef {
	fn from(node: Node) -> Self {
		NodeRef::Node(Box::new(node))
	}
}

/// A directed, labeled edge.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Link {
	pub source: NodeRef,
	pub target: NodeRef,
	#[serde(default)]
	pub label: String,
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

impl Link {
	/// Link between two node ids.
	pub fn new(
		source: impl Into<NodeRef>,
		target: impl Into<NodeRef>,
		label: impl Into<String>,
	) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			label: label.into(),
			attributes: Map::new(),
		}
	}
}

/// Complete graph document: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Graph {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub links: Vec<Link>,
}

impl Graph {
	/// Distinct type keys in first-seen node order.
	pub fn type_keys(&self) -> Vec<&str> {
		let mut seen = Vec::new();
		for node in &self.nodes {
			let key = node.type_key();
			if !seen.contains(&key) {
				seen.push(key);
			}
		}
		seen
	}
}

/// Id lookup over a graph's nodes, built once per traversal.
///
/// On duplicate ids the first node wins.
#[derive(Debug)]
pub struct GraphIndex<'g> {
	nodes: &'g [Node],
	by_id: HashMap<&'g str, usize>,
}

impl<'g> GraphIndex<'g> {
	pub fn new(graph: &'g Graph) -> Self {
		let mut by_id = HashMap::with_capacity(graph.nodes.len());
		for (i, node) in graph.nodes.iter().enumerate() {
			by_id.entry(node.id.as_str()).or_insert(i);
		}
		Self {
			nodes: &graph.nodes,
			by_id,
		}
	}

	/// Position of the node with `id` in `graph.nodes`.
	pub fn position(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	pub fn get(&self, id: &str) -> Option<&'g Node> {
		self.position(id).map(|i| &self.nodes[i])
	}

	/// Resolve an endpoint reference against the index.
	pub fn resolve(&self, node_ref: &NodeRef) -> Option<&'g Node> {
		self.get(node_ref.id())
	}

	/// Resolve both endpoints of a link, or `None` if either is unknown.
	pub fn endpoints(&self, link: &Link) -> Option<(&'g Node, &'g Node)> {
		Some((self.resolve(&link.source)?, self.resolve(&link.target)?))
	}
}
