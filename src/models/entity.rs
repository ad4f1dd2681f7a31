//! Node and relationship values supplied by a graph data source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{NodeId, RelationshipId};

/// A node as seen by the exploration model.
///
/// Only identity matters to the model; everything else is payload carried
/// through to the renderer.
pub trait Node {
    /// Stable identity of this node.
    fn id(&self) -> &NodeId;

    /// Text shown next to the node when drawn.
    fn label(&self) -> String {
        self.id().to_string()
    }
}

/// A relationship as seen by the exploration model.
pub trait Relationship {
    /// Stable identity of this relationship.
    fn id(&self) -> &RelationshipId;

    /// Identity of the start node.
    fn start_node(&self) -> &NodeId;

    /// Identity of the end node.
    fn end_node(&self) -> &NodeId;

    /// Relationship type label (e.g. `KNOWS`).
    fn relationship_type(&self) -> &str;

    /// Whether `id` is this relationship's start node.
    fn is_start_node(&self, id: &NodeId) -> bool {
        self.start_node() == id
    }

    /// The endpoint that is not `known`.
    ///
    /// For a self-loop both endpoints are `known`, so `known` is returned.
    fn other_node(&self, known: &NodeId) -> &NodeId {
        if self.start_node() == known {
            self.end_node()
        } else {
            self.start_node()
        }
    }
}

/// A node loaded from a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node identity.
    pub id: NodeId,
    /// Node labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Arbitrary properties.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl GraphNode {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            properties: Map::new(),
        }
    }

    /// Adds a property, builder style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Node for GraphNode {
    fn id(&self) -> &NodeId {
        &self.id
    }

    /// Uses the `name` or `title` property when present.
    fn label(&self) -> String {
        ["name", "title"]
            .iter()
            .find_map(|key| self.properties.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A relationship loaded from a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    /// Relationship identity.
    pub id: RelationshipId,
    /// Relationship type (KNOWS, LIKES, ...).
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Start node identity.
    pub start: NodeId,
    /// End node identity.
    pub end: NodeId,
    /// Arbitrary properties.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl GraphRelationship {
    pub fn new(
        id: impl Into<RelationshipId>,
        rel_type: impl Into<String>,
        start: impl Into<NodeId>,
        end: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start: start.into(),
            end: end.into(),
            properties: Map::new(),
        }
    }
}

impl Relationship for GraphRelationship {
    fn id(&self) -> &RelationshipId {
        &self.id
    }

    fn start_node(&self) -> &NodeId {
        &self.start
    }

    fn end_node(&self) -> &NodeId {
        &self.end
    }

    fn relationship_type(&self) -> &str {
        &self.rel_type
    }
}
