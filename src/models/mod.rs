//! Domain models for the explored graph.

mod dataset;
mod entity;
mod identity;

pub use dataset::Dataset;
pub use entity::{GraphNode, GraphRelationship, Node, Relationship};
pub use identity::{Direction, GroupId, NodeId, RelationshipId, VisualKey};
