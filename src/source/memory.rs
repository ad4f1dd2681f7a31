//! In-memory data source backed by a [`Dataset`].

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Dataset, GraphNode, GraphRelationship, NodeId};

use super::traits::{GraphDataSource, Neighborhood};

/// Serves neighborhoods out of a fully loaded dataset.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    nodes: HashMap<NodeId, GraphNode>,
    relationships: Vec<GraphRelationship>,
    // node -> indices into `relationships`
    incident: HashMap<NodeId, Vec<usize>>,
}

impl InMemorySource {
    /// Index a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DanglingRelationship`] if a relationship points
    /// at a node the dataset does not contain.
    pub fn new(dataset: Dataset) -> Result<Self, AppError> {
        let nodes: HashMap<NodeId, GraphNode> = dataset
            .nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();

        let mut incident: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for (idx, rel) in dataset.relationships.iter().enumerate() {
            for endpoint in [&rel.start, &rel.end] {
                if !nodes.contains_key(endpoint) {
                    return Err(AppError::DanglingRelationship {
                        relationship: rel.id.to_string(),
                        node: endpoint.to_string(),
                    });
                }
            }
            incident.entry(rel.start.clone()).or_default().push(idx);
            if rel.end != rel.start {
                incident.entry(rel.end.clone()).or_default().push(idx);
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            relationships = dataset.relationships.len(),
            "Indexed dataset"
        );

        Ok(Self {
            nodes,
            relationships: dataset.relationships,
            incident,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}

#[async_trait]
impl GraphDataSource for InMemorySource {
    async fn neighborhood(&self, id: &NodeId) -> Result<Neighborhood, AppError> {
        let node = self
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NodeNotFound(id.to_string()))?;

        let relationships: Vec<GraphRelationship> = self
            .incident
            .get(id)
            .into_iter()
            .flatten()
            .map(|&idx| self.relationships[idx].clone())
            .collect();

        let far_ends: BTreeSet<&NodeId> = relationships
            .iter()
            .map(|rel| if &rel.start == id { &rel.end } else { &rel.start })
            .filter(|far| *far != id)
            .collect();
        let related_nodes = far_ends
            .into_iter()
            .filter_map(|far| self.nodes.get(far).cloned())
            .collect();

        Ok(Neighborhood {
            node,
            relationships,
            related_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset {
            nodes: vec![GraphNode::new("a"), GraphNode::new("b"), GraphNode::new("c")],
            relationships: vec![
                GraphRelationship::new("r1", "KNOWS", "a", "b"),
                GraphRelationship::new("r2", "KNOWS", "c", "a"),
                GraphRelationship::new("r3", "KNOWS", "b", "c"),
                GraphRelationship::new("r4", "SELF", "a", "a"),
            ],
        }
    }

    #[tokio::test]
    async fn test_neighborhood() {
        let source = InMemorySource::new(dataset()).unwrap();

        let hood = source.neighborhood(&NodeId::new("a")).await.unwrap();

        assert_eq!(hood.node.id, NodeId::new("a"));
        let rel_ids: Vec<&str> = hood.relationships.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(rel_ids, vec!["r1", "r2", "r4"]);
        let related: Vec<&str> = hood.related_nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(related, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_unknown_node() {
        let source = InMemorySource::new(dataset()).unwrap();

        let err = source.neighborhood(&NodeId::new("zz")).await.unwrap_err();

        assert!(matches!(err, AppError::NodeNotFound(id) if id == "zz"));
    }

    #[test]
    fn test_dangling_relationship_rejected() {
        let mut data = dataset();
        data.relationships
            .push(GraphRelationship::new("r9", "KNOWS", "a", "ghost"));

        let err = InMemorySource::new(data).unwrap_err();

        assert!(matches!(
            err,
            AppError::DanglingRelationship { ref relationship, ref node }
                if relationship == "r9" && node == "ghost"
        ));
    }

    #[test]
    fn test_counts() {
        let source = InMemorySource::new(dataset()).unwrap();
        assert_eq!(source.node_count(), 3);
        assert_eq!(source.relationship_count(), 4);
    }
}
