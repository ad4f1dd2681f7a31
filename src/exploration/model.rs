//! The graph exploration model.
//!
//! Keeps three stores in step:
//!
//! - the *known graph*: every node and relationship seen so far,
//! - the *groups*: fan-outs of unexplored neighbors collapsed into one
//!   synthetic node each,
//! - the *visual graph*: what should currently be drawn.
//!
//! Every operation runs to completion synchronously. Fetching a node's
//! neighborhood happens before [`GraphExplorationModel::add_node`] is called.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::DEFAULT_GROUPING_THRESHOLD;
use crate::models::{
    Direction, GraphNode, GraphRelationship, GroupId, Node, NodeId, Relationship, RelationshipId,
    VisualKey,
};

use super::group::Group;
use super::visual::{VisualEdge, VisualGraph, VisualNode};

/// A node in the known-graph store.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownNode<N> {
    /// The node value as first returned by the data source.
    pub node: N,
    /// Groups this node is folded into → relationships bundled for it.
    pub groups: BTreeMap<GroupId, Vec<RelationshipId>>,
}

impl<N> KnownNode<N> {
    fn new(node: N) -> Self {
        Self {
            node,
            groups: BTreeMap::new(),
        }
    }
}

/// Where a known relationship is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Bundled into the visual edge `from → to`.
    Edge { from: VisualKey, to: VisualKey },
    /// Bundled into `member`'s membership of `group`.
    Group { group: GroupId, member: NodeId },
}

/// Counters exposed for inspection and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    /// Groups created since construction or the last `clear`.
    pub groups_created: u64,
    /// Relationships left out of a group because their far node was unknown.
    pub skipped_group_members: u64,
}

/// Relationships of one explored node staged by (direction, type).
struct Bucket<R> {
    direction: Direction,
    relationship_type: String,
    relationships: Vec<R>,
}

/// Incrementally explored view of a graph.
#[derive(Debug, Clone)]
pub struct GraphExplorationModel<N = GraphNode, R = GraphRelationship> {
    grouping_threshold: usize,
    next_group: u64,
    pub(super) known_nodes: BTreeMap<NodeId, KnownNode<N>>,
    pub(super) known_relationships: BTreeMap<RelationshipId, R>,
    pub(super) placements: HashMap<RelationshipId, Placement>,
    pub(super) visual: VisualGraph<N>,
    pub(super) stats: ModelStats,
}

impl<N, R> Default for GraphExplorationModel<N, R>
where
    N: Node + Clone,
    R: Relationship + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_GROUPING_THRESHOLD)
    }
}

impl<N, R> GraphExplorationModel<N, R>
where
    N: Node + Clone,
    R: Relationship + Clone,
{
    /// Creates an empty model.
    ///
    /// A (direction, type) bucket with at least `grouping_threshold`
    /// relationships to not-yet-visible nodes collapses into a group.
    pub fn new(grouping_threshold: usize) -> Self {
        Self {
            grouping_threshold,
            next_group: 0,
            known_nodes: BTreeMap::new(),
            known_relationships: BTreeMap::new(),
            placements: HashMap::new(),
            visual: VisualGraph::default(),
            stats: ModelStats::default(),
        }
    }

    pub fn grouping_threshold(&self) -> usize {
        self.grouping_threshold
    }

    /// Read-only view of what should currently be drawn.
    pub fn visual_graph(&self) -> &VisualGraph<N> {
        &self.visual
    }

    pub fn visual_node(&self, key: &VisualKey) -> Option<&VisualNode<N>> {
        self.visual.node(key)
    }

    pub fn visual_edge(&self, from: &VisualKey, to: &VisualKey) -> Option<&VisualEdge> {
        self.visual.edge(from, to)
    }

    pub fn known_node(&self, id: &NodeId) -> Option<&KnownNode<N>> {
        self.known_nodes.get(id)
    }

    pub fn known_nodes(&self) -> &BTreeMap<NodeId, KnownNode<N>> {
        &self.known_nodes
    }

    pub fn known_relationship(&self, id: &RelationshipId) -> Option<&R> {
        self.known_relationships.get(id)
    }

    pub fn known_relationships(&self) -> &BTreeMap<RelationshipId, R> {
        &self.known_relationships
    }

    /// Where relationship `id` is displayed, if it is displayed at all.
    pub fn placement(&self, id: &RelationshipId) -> Option<&Placement> {
        self.placements.get(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.visual
            .node(&VisualKey::Group(id))
            .and_then(VisualNode::as_group)
    }

    /// All live groups, ordered by id.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.visual.nodes().values().filter_map(VisualNode::as_group)
    }

    pub fn is_explored(&self, id: &NodeId) -> bool {
        self.visual
            .node(&VisualKey::Node(id.clone()))
            .is_some_and(VisualNode::is_explored)
    }

    pub fn explored_count(&self) -> usize {
        self.visual
            .nodes()
            .values()
            .filter(|node| node.is_explored())
            .count()
    }

    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    /// Reset every store and the group counter.
    pub fn clear(&mut self) {
        self.next_group = 0;
        self.known_nodes.clear();
        self.known_relationships.clear();
        self.placements.clear();
        self.visual.clear();
        self.stats = ModelStats::default();
    }

    /// Record the exploration of `node`.
    ///
    /// `relationships` are all relationships incident to `node`;
    /// `related_nodes` are the nodes at their far ends, as far as the data
    /// source returned them.
    pub fn add_node(&mut self, node: N, relationships: Vec<R>, related_nodes: Vec<N>) {
        let node_id = node.id().clone();
        tracing::debug!(
            node = %node_id,
            relationships = relationships.len(),
            related_nodes = related_nodes.len(),
            "Exploring node"
        );

        // A node can't be explored and grouped at the same time.
        let mut ungrouped = Vec::with_capacity(related_nodes.len() + 1);
        ungrouped.push(node_id.clone());
        ungrouped.extend(related_nodes.iter().map(|related| related.id().clone()));
        self.ungroup(&ungrouped);

        self.known_nodes
            .entry(node_id.clone())
            .or_insert_with(|| KnownNode::new(node.clone()));
        for related in related_nodes {
            let related_id = related.id().clone();
            // Far ends first drawn before the node was known get their payload now.
            if let Some(VisualNode::Unexplored { node: payload, .. }) =
                self.visual.node_mut(&VisualKey::Node(related_id.clone()))
            {
                if payload.is_none() {
                    *payload = Some(related.clone());
                }
            }
            self.known_nodes
                .entry(related_id)
                .or_insert_with(|| KnownNode::new(related));
        }

        let key = VisualKey::Node(node_id.clone());
        let fixed = self.visual.node(&key).is_some_and(VisualNode::is_fixed);
        self.visual
            .insert_node(key, VisualNode::Explored { node, fixed });

        let mut buckets: Vec<Bucket<R>> = Vec::new();
        let mut staged = BTreeSet::new();
        for rel in relationships {
            if self.placements.contains_key(rel.id()) || !staged.insert(rel.id().clone()) {
                continue;
            }
            self.known_relationships
                .entry(rel.id().clone())
                .or_insert_with(|| rel.clone());

            if self.is_visible(rel.other_node(&node_id)) {
                self.add_unexplored_node(&node_id, &rel);
                continue;
            }

            let direction = if rel.is_start_node(&node_id) {
                Direction::Outgoing
            } else {
                Direction::Incoming
            };
            match buckets.iter_mut().find(|bucket| {
                bucket.direction == direction && bucket.relationship_type == rel.relationship_type()
            }) {
                Some(bucket) => bucket.relationships.push(rel),
                None => buckets.push(Bucket {
                    direction,
                    relationship_type: rel.relationship_type().to_string(),
                    relationships: vec![rel],
                }),
            }
        }

        // Outgoing buckets first, each direction in first-seen type order.
        buckets.sort_by_key(|bucket| bucket.direction);
        for bucket in buckets {
            if bucket.relationships.len() >= self.grouping_threshold {
                self.fold_into_group(&node_id, &bucket.relationships, bucket.direction);
            } else {
                for rel in &bucket.relationships {
                    self.add_unexplored_node(&node_id, rel);
                }
            }
        }
    }

    /// Take each node out of every group it is folded into.
    ///
    /// Bundled relationships reappear as individual unexplored links from
    /// the group's base. Nodes without memberships are left alone.
    pub fn ungroup(&mut self, nodes: &[NodeId]) {
        for id in nodes {
            let memberships = match self.known_nodes.get_mut(id) {
                Some(known) if !known.groups.is_empty() => std::mem::take(&mut known.groups),
                _ => continue,
            };
            for group in memberships.into_keys() {
                self.unfold_from_group(id, group, true);
            }
        }
    }

    /// Turn an explored node back into an unexplored one.
    ///
    /// Unexplored neighbors that were only visible through this node are
    /// removed, groups based at it are dissolved, and the node itself is
    /// removed when no explored neighbor remains. The last explored node
    /// is never unexplored.
    pub fn unexplore(&mut self, id: &NodeId) {
        if self.is_last_explored_node(id) {
            tracing::debug!(node = %id, "Keeping last explored node");
            return;
        }

        let key = VisualKey::Node(id.clone());
        let Some(visual) = self.visual.node_mut(&key) else {
            return;
        };
        let replacement = match visual {
            VisualNode::Explored { node, .. } => Some(VisualNode::Unexplored {
                id: id.clone(),
                node: Some(node.clone()),
                fixed: false,
            }),
            _ => None,
        };
        match replacement {
            Some(unexplored) => *visual = unexplored,
            None => visual.set_fixed(false),
        }
        tracing::debug!(node = %id, "Unexploring node");

        for related in self.unexplored_nodes_related_to(id) {
            if self.has_explored_relationships(&related, Some(id)) {
                continue;
            }
            if self.is_grouped_under_explored(&related) {
                // Still shown through its group; only the standalone copy goes.
                self.remove_visual_node(&related);
            } else {
                self.remove_node(&related);
            }
        }

        self.dissolve_groups_based_at(id);

        if !self.has_explored_relationships(id, None) {
            self.remove_node(id);
        }
    }

    /// Delete a node from the visual graph and the known nodes, together
    /// with every visual edge touching it.
    pub fn remove_node(&mut self, id: &NodeId) {
        self.dissolve_groups_based_at(id);

        if let Some(known) = self.known_nodes.remove(id) {
            for group in known.groups.into_keys() {
                self.unfold_from_group(id, group, false);
            }
        }

        self.remove_visual_node(id);
        tracing::debug!(node = %id, "Removed node");
    }

    /// Drop the node's own visual and its edges, un-placing the
    /// relationships they carried. Group memberships are untouched.
    fn remove_visual_node(&mut self, id: &NodeId) {
        let key = VisualKey::Node(id.clone());
        self.visual.remove_node(&key);
        for (_, _, edge) in self.visual.remove_incident_edges(&key) {
            for rel_id in edge.relationships {
                self.placements.remove(&rel_id);
            }
        }
    }

    /// Folded into a group whose base is explored.
    fn is_grouped_under_explored(&self, id: &NodeId) -> bool {
        self.known_nodes.get(id).is_some_and(|known| {
            known.groups.keys().any(|&group| {
                self.group(group)
                    .is_some_and(|group| self.is_explored(&group.base))
            })
        })
    }

    /// Pin a node at its current position. Returns false for groups and
    /// keys that are not drawn.
    pub fn pin(&mut self, key: &VisualKey) -> bool {
        self.set_fixed(key, true)
    }

    /// Release a pinned node. Returns false for groups and keys that are
    /// not drawn.
    pub fn unpin(&mut self, key: &VisualKey) -> bool {
        self.set_fixed(key, false)
    }

    fn set_fixed(&mut self, key: &VisualKey, fixed: bool) -> bool {
        match self.visual.node_mut(key) {
            Some(node) if !node.is_group() => {
                node.set_fixed(fixed);
                true
            }
            _ => false,
        }
    }

    /// True if no node other than `id` is explored.
    pub fn is_last_explored_node(&self, id: &NodeId) -> bool {
        !self
            .visual
            .nodes()
            .iter()
            .any(|(key, node)| node.is_explored() && key.as_node() != Some(id))
    }

    /// True if a visual edge connects `id` to an explored node other than
    /// `exclude`.
    pub fn has_explored_relationships(&self, id: &NodeId, exclude: Option<&NodeId>) -> bool {
        self.visual
            .neighbors(&VisualKey::Node(id.clone()))
            .into_iter()
            .filter(|neighbor| exclude.is_none() || neighbor.as_node() != exclude)
            .any(|neighbor| self.visual.node(neighbor).is_some_and(VisualNode::is_explored))
    }

    /// Unexplored nodes directly connected to `id`.
    pub fn unexplored_nodes_related_to(&self, id: &NodeId) -> Vec<NodeId> {
        self.visual
            .neighbors(&VisualKey::Node(id.clone()))
            .into_iter()
            .filter(|neighbor| {
                self.visual
                    .node(neighbor)
                    .is_some_and(VisualNode::is_unexplored)
            })
            .filter_map(VisualKey::as_node)
            .filter(|neighbor| *neighbor != id)
            .cloned()
            .collect()
    }

    /// Drawn as a node of its own, or folded into some group.
    fn is_visible(&self, id: &NodeId) -> bool {
        self.visual.contains(&VisualKey::Node(id.clone()))
            || self
                .known_nodes
                .get(id)
                .is_some_and(|known| !known.groups.is_empty())
    }

    /// Show the far end of `relationship` (seen from `base`) as an
    /// unexplored node unless it is already drawn, and wire the edge.
    pub(super) fn add_unexplored_node(&mut self, base: &NodeId, relationship: &R) {
        let other = relationship.other_node(base);
        let key = VisualKey::Node(other.clone());
        if !self.visual.contains(&key) {
            let node = self.known_nodes.get(other).map(|known| known.node.clone());
            self.visual.insert_node(
                key,
                VisualNode::Unexplored {
                    id: other.clone(),
                    node,
                    fixed: false,
                },
            );
        }
        self.wire_relationship(relationship);
    }

    /// Bundle `relationship` into the edge between its true start and end.
    fn wire_relationship(&mut self, relationship: &R) {
        let from = VisualKey::Node(relationship.start_node().clone());
        let to = VisualKey::Node(relationship.end_node().clone());
        let rel_id = relationship.id().clone();

        self.known_relationships
            .entry(rel_id.clone())
            .or_insert_with(|| relationship.clone());
        self.visual
            .edge_entry(from.clone(), to.clone(), relationship.relationship_type())
            .relationships
            .insert(rel_id.clone());
        self.placements.insert(rel_id, Placement::Edge { from, to });
    }

    pub(super) fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId::new(self.next_group);
        self.next_group += 1;
        id
    }
}
