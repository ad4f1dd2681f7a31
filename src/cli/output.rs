//! Serializable snapshot of the exploration model.

use serde::Serialize;

use crate::exploration::{GraphExplorationModel, ModelStats, NodeKind};
use crate::models::{Direction, GroupId, Node, NodeId, Relationship, RelationshipId, VisualKey};
use crate::visualization::GraphLayout;

/// What a renderer would draw after the replayed steps.
#[derive(Debug, Clone, Serialize)]
pub struct VisualGraphSummary {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<EdgeSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSummary>,
    pub stats: ModelStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub key: VisualKey,
    pub kind: NodeKind,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
    /// Laid-out position, when `--layout` was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeSummary {
    pub from: VisualKey,
    pub to: VisualKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    pub directed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub base: NodeId,
    pub direction: Direction,
    pub relationship_type: String,
    pub size: usize,
    pub members: Vec<NodeId>,
}

impl VisualGraphSummary {
    /// Snapshot the model, attaching positions from `layout` if given.
    pub fn from_model<N, R>(
        model: &GraphExplorationModel<N, R>,
        layout: Option<&GraphLayout>,
    ) -> Self
    where
        N: Node + Clone,
        R: Relationship + Clone,
    {
        let graph = model.visual_graph();

        let nodes = graph
            .nodes()
            .iter()
            .map(|(key, node)| NodeSummary {
                key: key.clone(),
                kind: node.kind(),
                label: node.label(),
                fixed: node.is_fixed(),
                position: layout
                    .and_then(|l| l.position(key))
                    .map(|p| p.to_array()),
            })
            .collect();

        let edges = graph
            .iter_edges()
            .map(|(from, to, edge)| EdgeSummary {
                from: from.clone(),
                to: to.clone(),
                relationship_type: edge.relationship_type.clone(),
                directed: edge.directed,
                relationships: edge.relationships.iter().cloned().collect(),
            })
            .collect();

        let groups = model
            .groups()
            .map(|group| GroupSummary {
                id: group.id,
                base: group.base.clone(),
                direction: group.direction,
                relationship_type: group.relationship_type.clone(),
                size: group.node_count,
                members: group.members.keys().cloned().collect(),
            })
            .collect();

        Self {
            nodes,
            edges,
            groups,
            stats: model.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraphNode, GraphRelationship};

    fn model() -> GraphExplorationModel {
        let mut model = GraphExplorationModel::new(2);
        let rels = vec![
            GraphRelationship::new("r1", "KNOWS", "a", "b"),
            GraphRelationship::new("r2", "KNOWS", "a", "c"),
            GraphRelationship::new("r3", "OWNS", "a", "d"),
        ];
        let related = vec![
            GraphNode::new("b"),
            GraphNode::new("c"),
            GraphNode::new("d").with_property("name", "Dora"),
        ];
        model.add_node(GraphNode::new("a"), rels, related);
        model
    }

    #[test]
    fn test_summary_from_model() {
        let summary = VisualGraphSummary::from_model(&model(), None);

        // a, d and the KNOWS group
        assert_eq!(summary.nodes.len(), 3);
        assert_eq!(summary.edges.len(), 2);
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].size, 2);
        assert_eq!(
            summary.groups[0].members,
            vec![NodeId::new("b"), NodeId::new("c")]
        );
        assert!(summary.nodes.iter().any(|n| n.label == "Dora"));
        assert!(summary.nodes.iter().all(|n| n.position.is_none()));
    }

    #[test]
    fn test_summary_with_layout() {
        let model = model();
        let mut layout = GraphLayout::from_visual_graph(model.visual_graph());
        layout.stabilize(10);

        let summary = VisualGraphSummary::from_model(&model, Some(&layout));

        assert!(summary.nodes.iter().all(|n| n.position.is_some()));
    }

    #[test]
    fn test_summary_serialization() {
        let summary = VisualGraphSummary::from_model(&model(), None);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["groups"][0]["id"], "group-0");
        assert_eq!(json["groups"][0]["direction"], "outgoing");
        assert!(json["nodes"][0].get("position").is_none());
        assert!(json["stats"].is_object());
    }
}
