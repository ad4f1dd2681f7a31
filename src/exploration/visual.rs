//! The visual graph: what a renderer should currently draw.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{Node, NodeId, RelationshipId, VisualKey};

use super::group::Group;

/// Kind tag of a visual node, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Explored,
    Unexplored,
    Group,
}

/// A drawable node.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualNode<N> {
    /// The node's neighborhood has been fetched and is fully shown.
    Explored {
        node: N,
        /// Pinned at its current position by the renderer.
        fixed: bool,
    },
    /// Known through a relationship of an explored node, not yet fetched.
    Unexplored {
        id: NodeId,
        /// The node value, when the data source returned it.
        node: Option<N>,
        fixed: bool,
    },
    /// Synthetic stand-in for a fan-out of unexplored neighbors.
    Group(Group),
}

impl<N> VisualNode<N> {
    pub fn kind(&self) -> NodeKind {
        match self {
            VisualNode::Explored { .. } => NodeKind::Explored,
            VisualNode::Unexplored { .. } => NodeKind::Unexplored,
            VisualNode::Group(_) => NodeKind::Group,
        }
    }

    pub fn is_explored(&self) -> bool {
        matches!(self, VisualNode::Explored { .. })
    }

    pub fn is_unexplored(&self) -> bool {
        matches!(self, VisualNode::Unexplored { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self, VisualNode::Group(_))
    }

    /// Whether the renderer pinned this node. Groups are never pinned.
    pub fn is_fixed(&self) -> bool {
        match self {
            VisualNode::Explored { fixed, .. } | VisualNode::Unexplored { fixed, .. } => *fixed,
            VisualNode::Group(_) => false,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            VisualNode::Group(group) => Some(group),
            _ => None,
        }
    }

    pub(crate) fn set_fixed(&mut self, value: bool) {
        match self {
            VisualNode::Explored { fixed, .. } | VisualNode::Unexplored { fixed, .. } => {
                *fixed = value
            }
            VisualNode::Group(_) => {}
        }
    }
}

impl<N: Node> VisualNode<N> {
    /// Text a renderer draws next to the node.
    pub fn label(&self) -> String {
        match self {
            VisualNode::Explored { node, .. } => node.label(),
            VisualNode::Unexplored { id, node, .. } => node
                .as_ref()
                .map(Node::label)
                .unwrap_or_else(|| id.to_string()),
            VisualNode::Group(group) => {
                format!("{} x {}", group.node_count, group.relationship_type)
            }
        }
    }
}

/// A drawable edge between two visual keys.
///
/// One visual edge bundles every relationship between the same ordered
/// pair of keys. The aggregate edge of a group bundles none; its
/// relationships live in the group's members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualEdge {
    /// Whether the edge has a direction (always true for relationships).
    pub directed: bool,
    /// Type label of the first relationship wired into this edge.
    pub relationship_type: Option<String>,
    /// Underlying relationships drawn as this edge.
    pub relationships: BTreeSet<RelationshipId>,
}

/// Visual nodes plus adjacency in both directions.
#[derive(Debug, Clone)]
pub struct VisualGraph<N> {
    nodes: BTreeMap<VisualKey, VisualNode<N>>,
    edges: BTreeMap<VisualKey, BTreeMap<VisualKey, VisualEdge>>,
    // target -> sources, mirrors `edges`
    reverse: BTreeMap<VisualKey, BTreeSet<VisualKey>>,
}

impl<N> Default for VisualGraph<N> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }
}

impl<N> VisualGraph<N> {
    /// All visual nodes, ordered by key.
    pub fn nodes(&self) -> &BTreeMap<VisualKey, VisualNode<N>> {
        &self.nodes
    }

    /// Adjacency: source key → target key → edge.
    pub fn edges(&self) -> &BTreeMap<VisualKey, BTreeMap<VisualKey, VisualEdge>> {
        &self.edges
    }

    pub fn node(&self, key: &VisualKey) -> Option<&VisualNode<N>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &VisualKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn edge(&self, from: &VisualKey, to: &VisualKey) -> Option<&VisualEdge> {
        self.edges.get(from).and_then(|targets| targets.get(to))
    }

    /// Iterate over every edge as `(from, to, edge)`.
    pub fn iter_edges(&self) -> impl Iterator<Item = (&VisualKey, &VisualKey, &VisualEdge)> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |(to, edge)| (from, to, edge)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Keys connected to `key` by an edge in either direction.
    pub fn neighbors(&self, key: &VisualKey) -> BTreeSet<&VisualKey> {
        let outgoing = self.edges.get(key).into_iter().flat_map(BTreeMap::keys);
        let incoming = self.reverse.get(key).into_iter().flatten();
        outgoing.chain(incoming).collect()
    }

    pub(crate) fn node_mut(&mut self, key: &VisualKey) -> Option<&mut VisualNode<N>> {
        self.nodes.get_mut(key)
    }

    pub(crate) fn insert_node(&mut self, key: VisualKey, node: VisualNode<N>) {
        self.nodes.insert(key, node);
    }

    pub(crate) fn remove_node(&mut self, key: &VisualKey) -> Option<VisualNode<N>> {
        self.nodes.remove(key)
    }

    /// Get or create the edge `from → to`.
    pub(crate) fn edge_entry(
        &mut self,
        from: VisualKey,
        to: VisualKey,
        relationship_type: &str,
    ) -> &mut VisualEdge {
        self.reverse
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        self.edges
            .entry(from)
            .or_default()
            .entry(to)
            .or_insert_with(|| VisualEdge {
                directed: true,
                relationship_type: Some(relationship_type.to_string()),
                relationships: BTreeSet::new(),
            })
    }

    /// Remove every edge touching `key`, returning them as `(from, to, edge)`.
    pub(crate) fn remove_incident_edges(
        &mut self,
        key: &VisualKey,
    ) -> Vec<(VisualKey, VisualKey, VisualEdge)> {
        let mut removed = Vec::new();

        if let Some(targets) = self.edges.remove(key) {
            for (to, edge) in targets {
                if let Some(sources) = self.reverse.get_mut(&to) {
                    sources.remove(key);
                    if sources.is_empty() {
                        self.reverse.remove(&to);
                    }
                }
                removed.push((key.clone(), to, edge));
            }
        }

        if let Some(sources) = self.reverse.remove(key) {
            for from in sources {
                let Some(targets) = self.edges.get_mut(&from) else {
                    continue;
                };
                if let Some(edge) = targets.remove(key) {
                    removed.push((from.clone(), key.clone(), edge));
                }
                if targets.is_empty() {
                    self.edges.remove(&from);
                }
            }
        }

        removed
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.reverse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeId;

    fn key(id: &str) -> VisualKey {
        VisualKey::Node(NodeId::new(id))
    }

    fn unexplored(id: &str) -> VisualNode<()> {
        VisualNode::Unexplored {
            id: NodeId::new(id),
            node: None,
            fixed: false,
        }
    }

    #[test]
    fn test_edge_entry_reuses_edge() {
        let mut graph: VisualGraph<()> = VisualGraph::default();
        graph
            .edge_entry(key("a"), key("b"), "KNOWS")
            .relationships
            .insert(RelationshipId::new("r1"));
        graph
            .edge_entry(key("a"), key("b"), "LIKES")
            .relationships
            .insert(RelationshipId::new("r2"));

        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge(&key("a"), &key("b")).unwrap();
        assert_eq!(edge.relationships.len(), 2);
        assert_eq!(edge.relationship_type.as_deref(), Some("KNOWS"));
        assert!(edge.directed);
    }

    #[test]
    fn test_neighbors_in_both_directions() {
        let mut graph: VisualGraph<()> = VisualGraph::default();
        graph.edge_entry(key("a"), key("b"), "KNOWS");
        graph.edge_entry(key("c"), key("a"), "KNOWS");

        let neighbors = graph.neighbors(&key("a"));
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&key("b")));
        assert!(neighbors.contains(&key("c")));
        assert_eq!(graph.neighbors(&key("b")).len(), 1);
    }

    #[test]
    fn test_remove_incident_edges() {
        let mut graph: VisualGraph<()> = VisualGraph::default();
        graph.insert_node(key("a"), unexplored("a"));
        graph.edge_entry(key("a"), key("b"), "KNOWS");
        graph.edge_entry(key("c"), key("a"), "KNOWS");
        graph.edge_entry(key("b"), key("c"), "KNOWS");

        let removed = graph.remove_incident_edges(&key("a"));

        assert_eq!(removed.len(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge(&key("b"), &key("c")).is_some());
        assert!(graph.neighbors(&key("a")).is_empty());
        assert_eq!(graph.neighbors(&key("b")).len(), 1);
    }

    #[test]
    fn test_labels() {
        use crate::models::GraphNode;

        let explored = VisualNode::Explored {
            node: GraphNode::new("a").with_property("name", "Alice"),
            fixed: false,
        };
        assert_eq!(explored.label(), "Alice");
        assert_eq!(explored.kind(), NodeKind::Explored);

        let unexplored: VisualNode<GraphNode> = VisualNode::Unexplored {
            id: NodeId::new("b"),
            node: None,
            fixed: false,
        };
        assert_eq!(unexplored.label(), "b");
        assert_eq!(unexplored.kind(), NodeKind::Unexplored);
    }

    #[test]
    fn test_fixed_flag() {
        let mut node = unexplored("a");
        assert!(!node.is_fixed());
        node.set_fixed(true);
        assert!(node.is_fixed());
        assert!(node.is_unexplored());
    }
}
