//! Force-directed layout of the visual graph.

use bevy::math::Vec3;
use std::collections::HashMap;

use crate::exploration::{NodeKind, VisualGraph};
use crate::models::{Node, VisualKey};

/// Physics constants for force-directed layout.
const REPULSION_STRENGTH: f32 = 200.0; // Base repulsion (no degree scaling)
const DAMPING: f32 = 0.6; // Velocity friction per step
const MIN_DISTANCE: f32 = 0.5;
const MIN_MASS: f32 = 1.0; // Minimum mass per node
const MASS_PER_CONNECTION: f32 = 1.5; // Additional mass per connection
const MAX_VELOCITY: f32 = 200.0;

// Spring parameters (stiffness, rest_length) by the kinds an edge joins.
// Equilibrium: stiffness * ln(d/rest) = REPULSION / d²
const SPRING_EXPLORED: (f32, f32) = (20.0, 7.0); // Between explored nodes
const SPRING_UNEXPLORED: (f32, f32) = (15.0, 6.0); // Explored to unexplored
const SPRING_GROUP: (f32, f32) = (30.0, 5.0); // Base to group, kept tight

/// A node in the layout with position and velocity.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    /// Visual key of the node or group.
    pub key: VisualKey,
    /// Display label.
    pub label: String,
    /// Explored, unexplored or group.
    pub kind: NodeKind,
    /// Current position in 3D space.
    pub position: Vec3,
    /// Current velocity.
    pub velocity: Vec3,
    /// Mass (affects size and inertia).
    pub mass: f32,
    /// Pinned nodes never move.
    pub fixed: bool,
}

/// An edge in the layout.
#[derive(Debug, Clone)]
pub struct LayoutEdge {
    /// Source node index.
    pub from_idx: usize,
    /// Target node index.
    pub to_idx: usize,
    /// Edge label (relationship type).
    pub label: String,
    /// Number of relationships drawn as this edge.
    pub bundled: usize,
    /// Log-spring stiffness for this edge.
    pub stiffness: f32,
    /// Rest length where spring force is zero.
    pub rest_length: f32,
}

/// Graph layout with nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct GraphLayout {
    /// Nodes with positions.
    pub nodes: Vec<LayoutNode>,
    /// Edges connecting nodes.
    pub edges: Vec<LayoutEdge>,
    index: HashMap<VisualKey, usize>,
}

impl GraphLayout {
    /// Create a layout from the current visual graph.
    pub fn from_visual_graph<N: Node>(graph: &VisualGraph<N>) -> Self {
        let total = graph.node_count();
        let mut nodes = Vec::with_capacity(total);
        let mut index = HashMap::with_capacity(total);

        for (i, (key, visual)) in graph.nodes().iter().enumerate() {
            index.insert(key.clone(), nodes.len());
            nodes.push(LayoutNode {
                key: key.clone(),
                label: visual.label(),
                kind: visual.kind(),
                position: initial_position(i, total),
                velocity: Vec3::ZERO,
                mass: MIN_MASS,
                fixed: visual.is_fixed(),
            });
        }

        let mut edges = Vec::new();
        for (from, to, edge) in graph.iter_edges() {
            let (Some(&from_idx), Some(&to_idx)) = (index.get(from), index.get(to)) else {
                continue;
            };
            let (stiffness, rest_length) = spring_params(nodes[from_idx].kind, nodes[to_idx].kind);
            let bundled = group_size(graph, from, to).unwrap_or(edge.relationships.len());
            edges.push(LayoutEdge {
                from_idx,
                to_idx,
                label: edge.relationship_type.clone().unwrap_or_default(),
                bundled,
                stiffness,
                rest_length,
            });
        }

        distribute_mass(&mut nodes, &edges);

        Self {
            nodes,
            edges,
            index,
        }
    }

    /// Position of a node or group, if laid out.
    pub fn position(&self, key: &VisualKey) -> Option<Vec3> {
        self.index.get(key).map(|&idx| self.nodes[idx].position)
    }

    /// Every node's key with its current position.
    pub fn positions(&self) -> impl Iterator<Item = (&VisualKey, Vec3)> {
        self.nodes.iter().map(|node| (&node.key, node.position))
    }

    /// Run one step of the force-directed layout algorithm.
    ///
    /// - Repulsion: inverse-square between all pairs
    /// - Attraction: logarithmic springs with per-edge stiffness and rest length
    /// - Centering: pure translation of free nodes, skipped when anything is pinned
    /// - Pinned nodes keep their position and velocity stays zero
    pub fn update_physics(&mut self, dt: f32) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }

        let masses: Vec<f32> = self.nodes.iter().map(|n| n.mass).collect();

        // --- Repulsion: F_r = K / d² ---
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.nodes[i].position - self.nodes[j].position;
                let dist = delta.length().max(MIN_DISTANCE);
                let force = REPULSION_STRENGTH / (dist * dist);
                let dir = delta.normalize_or_zero();

                self.nodes[i].velocity += dir * force * dt / masses[i];
                self.nodes[j].velocity -= dir * force * dt / masses[j];
            }
        }

        // --- Attraction: F_a = stiffness * ln(d / rest_length) ---
        for edge in &self.edges {
            if edge.from_idx == edge.to_idx {
                continue;
            }
            let delta = self.nodes[edge.to_idx].position - self.nodes[edge.from_idx].position;
            let dist = delta.length().max(MIN_DISTANCE);
            let force = edge.stiffness * (dist / edge.rest_length).ln();
            let dir = delta.normalize_or_zero();

            self.nodes[edge.from_idx].velocity += dir * force * dt / masses[edge.from_idx];
            self.nodes[edge.to_idx].velocity -= dir * force * dt / masses[edge.to_idx];
        }

        // --- Centering: only when nothing is pinned, or pins would drift ---
        if self.nodes.iter().all(|node| !node.fixed) {
            let centroid: Vec3 = self.nodes.iter().map(|n| n.position).sum::<Vec3>() / n as f32;
            for node in &mut self.nodes {
                node.position -= centroid;
            }
        }

        // --- Damping and integration ---
        for node in &mut self.nodes {
            if node.fixed {
                node.velocity = Vec3::ZERO;
                continue;
            }
            node.velocity *= DAMPING;
            let speed = node.velocity.length();
            if speed > MAX_VELOCITY {
                node.velocity = node.velocity.normalize() * MAX_VELOCITY;
            } else if speed < 0.001 {
                node.velocity = Vec3::ZERO;
            }
            node.position += node.velocity * dt;
        }
    }

    /// Run the layout for a number of iterations to stabilize.
    pub fn stabilize(&mut self, iterations: usize) {
        let dt = 0.016; // ~60fps timestep
        for _ in 0..iterations {
            self.update_physics(dt);
        }
    }

    /// Returns (center, radius) of a sphere enclosing all nodes.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        if self.nodes.is_empty() {
            return (Vec3::ZERO, 1.0);
        }

        let center: Vec3 =
            self.nodes.iter().map(|n| n.position).sum::<Vec3>() / self.nodes.len() as f32;
        let max_dist = self
            .nodes
            .iter()
            .map(|n| (n.position - center).length())
            .fold(0.0_f32, |a, b| a.max(b));

        (center, max_dist + 2.0)
    }
}

/// Members folded into the group at either end of `from → to`.
fn group_size<N>(graph: &VisualGraph<N>, from: &VisualKey, to: &VisualKey) -> Option<usize> {
    [from, to]
        .into_iter()
        .find_map(|key| graph.node(key).and_then(|node| node.as_group()))
        .map(|group| group.node_count)
}

/// Distribute mass among nodes based on connection count (arity).
fn distribute_mass(nodes: &mut [LayoutNode], edges: &[LayoutEdge]) {
    let mut connection_counts = vec![0usize; nodes.len()];
    for edge in edges {
        connection_counts[edge.from_idx] += 1;
        connection_counts[edge.to_idx] += 1;
    }

    for (node, count) in nodes.iter_mut().zip(connection_counts) {
        node.mass = MIN_MASS + count as f32 * MASS_PER_CONNECTION;
    }
}

/// Spring parameters for an edge joining nodes of the given kinds.
fn spring_params(from: NodeKind, to: NodeKind) -> (f32, f32) {
    match (from, to) {
        (NodeKind::Group, _) | (_, NodeKind::Group) => SPRING_GROUP,
        (NodeKind::Explored, NodeKind::Explored) => SPRING_EXPLORED,
        _ => SPRING_UNEXPLORED,
    }
}

/// Initial position on a Fibonacci sphere, for even spacing.
fn initial_position(i: usize, total_nodes: usize) -> Vec3 {
    let golden_ratio = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let idx = i as f32 + 0.5;
    let n = total_nodes.max(1) as f32;

    let theta = 2.0 * std::f32::consts::PI * idx / golden_ratio;
    let phi = (1.0 - 2.0 * idx / n).acos();

    // Larger graphs need more space
    let base_radius = 3.0 + (n / 10.0).sqrt() * 2.0;
    let radius = base_radius + (i as f32 * 1.618).sin() * 2.0;

    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exploration::GraphExplorationModel;
    use crate::models::{GraphNode, GraphRelationship, NodeId};

    fn explored_model() -> GraphExplorationModel {
        let mut model = GraphExplorationModel::new(3);
        let mut rels = vec![GraphRelationship::new("a-b", "KNOWS", "a", "b")];
        let mut related = vec![GraphNode::new("b")];
        for i in 1..=3 {
            let far = format!("m{i}");
            rels.push(GraphRelationship::new(format!("a-{far}"), "LIKES", "a", far.as_str()));
            related.push(GraphNode::new(far));
        }
        model.add_node(GraphNode::new("a"), rels, related);
        model
    }

    fn key(id: &str) -> VisualKey {
        VisualKey::Node(NodeId::new(id))
    }

    #[test]
    fn test_from_visual_graph() {
        let model = explored_model();
        let layout = GraphLayout::from_visual_graph(model.visual_graph());

        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.edges.len(), 2);

        let group_edge = layout
            .edges
            .iter()
            .find(|e| layout.nodes[e.to_idx].kind == NodeKind::Group)
            .unwrap();
        assert_eq!(group_edge.label, "LIKES");
        assert_eq!(group_edge.bundled, 3);
        assert_eq!((group_edge.stiffness, group_edge.rest_length), SPRING_GROUP);

        let group_node = &layout.nodes[group_edge.to_idx];
        assert_eq!(group_node.label, "3 x LIKES");
        // a has two connections
        let a = &layout.nodes[group_edge.from_idx];
        assert_eq!(a.mass, MIN_MASS + 2.0 * MASS_PER_CONNECTION);
    }

    #[test]
    fn test_stabilize_keeps_positions_finite() {
        let model = explored_model();
        let mut layout = GraphLayout::from_visual_graph(model.visual_graph());

        layout.stabilize(200);

        for node in &layout.nodes {
            assert!(node.position.is_finite());
        }
        let (_, radius) = layout.bounding_sphere();
        assert!(radius > 2.0);
        assert_eq!(layout.positions().count(), 3);
    }

    #[test]
    fn test_pinned_nodes_do_not_move() {
        let mut model = explored_model();
        model.pin(&key("b"));
        let mut layout = GraphLayout::from_visual_graph(model.visual_graph());
        let before = layout.position(&key("b")).unwrap();

        layout.stabilize(50);

        assert_eq!(layout.position(&key("b")).unwrap(), before);
        assert_ne!(layout.position(&key("a")).unwrap(), before);
    }

    #[test]
    fn test_empty_layout() {
        let model = GraphExplorationModel::<GraphNode, GraphRelationship>::new(5);
        let mut layout = GraphLayout::from_visual_graph(model.visual_graph());
        layout.stabilize(10);
        assert_eq!(layout.bounding_sphere(), (Vec3::ZERO, 1.0));
        assert!(layout.position(&key("a")).is_none());
    }
}
