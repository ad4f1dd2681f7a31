//! Stable identities for nodes, relationships, groups and visual keys.
//!
//! All maps in the exploration model are keyed by these identities. Two
//! node values with the same [`NodeId`] are the same node, regardless of
//! any other field.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Identity of a node (its source-of-truth URL or ID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(String);

impl RelationshipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationshipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RelationshipId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of a synthetic group node.
///
/// Allocated from a per-model monotonic counter and displayed as
/// `group-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    pub(crate) fn new(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key of an entry in the visual graph: either a real node or a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisualKey {
    Node(NodeId),
    Group(GroupId),
}

impl VisualKey {
    /// The node identity, if this key refers to a real node.
    pub fn as_node(&self) -> Option<&NodeId> {
        match self {
            VisualKey::Node(id) => Some(id),
            VisualKey::Group(_) => None,
        }
    }

    /// The group identity, if this key refers to a group.
    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            VisualKey::Node(_) => None,
            VisualKey::Group(id) => Some(*id),
        }
    }
}

impl fmt::Display for VisualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualKey::Node(id) => id.fmt(f),
            VisualKey::Group(id) => id.fmt(f),
        }
    }
}

impl Serialize for VisualKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<NodeId> for VisualKey {
    fn from(id: NodeId) -> Self {
        VisualKey::Node(id)
    }
}

impl From<GroupId> for VisualKey {
    fn from(id: GroupId) -> Self {
        VisualKey::Group(id)
    }
}

/// Direction of a relationship relative to the node being explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The explored node is the relationship's start node.
    Outgoing,
    /// The explored node is the relationship's end node.
    Incoming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_id_display() {
        assert_eq!(GroupId::new(0).to_string(), "group-0");
        assert_eq!(GroupId::new(12).to_string(), "group-12");
    }

    #[test]
    fn test_visual_key_serializes_as_string() {
        let node = VisualKey::from(NodeId::new("http://localhost:7474/db/data/node/1"));
        let group = VisualKey::from(GroupId::new(3));

        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            "\"http://localhost:7474/db/data/node/1\""
        );
        assert_eq!(serde_json::to_string(&group).unwrap(), "\"group-3\"");
    }

    #[test]
    fn test_visual_key_accessors() {
        let key = VisualKey::Node(NodeId::new("a"));
        assert_eq!(key.as_node(), Some(&NodeId::new("a")));
        assert_eq!(key.as_group(), None);

        let key = VisualKey::Group(GroupId::new(1));
        assert_eq!(key.as_node(), None);
        assert_eq!(key.as_group(), Some(GroupId::new(1)));
    }
}
