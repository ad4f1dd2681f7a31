//! Group bookkeeping: folding fan-outs into groups and unfolding members.

use std::collections::BTreeMap;

use crate::models::{Direction, GroupId, Node, NodeId, Relationship, RelationshipId, VisualKey};

use super::model::{GraphExplorationModel, Placement};
use super::visual::VisualNode;

/// A synthetic node standing in for many unexplored neighbors of one base
/// node that share a direction and relationship type.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group identity (`group-<n>`).
    pub id: GroupId,
    /// The explored node whose fan-out produced this group.
    pub base: NodeId,
    /// Direction of the bundled relationships relative to `base`.
    pub direction: Direction,
    /// Shared relationship type.
    pub relationship_type: String,
    /// Member node → relationships connecting it to `base`.
    pub members: BTreeMap<NodeId, Vec<RelationshipId>>,
    /// Live member count. The group is deleted when it reaches zero.
    pub node_count: usize,
}

impl Group {
    pub fn key(&self) -> VisualKey {
        VisualKey::Group(self.id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.members.contains_key(id)
    }

    /// Total number of relationships bundled into this group.
    pub fn relationship_count(&self) -> usize {
        self.members.values().map(Vec::len).sum()
    }

    /// The aggregate edge between base and group, as `(from, to)`.
    pub fn edge_endpoints(&self) -> (VisualKey, VisualKey) {
        let base = VisualKey::Node(self.base.clone());
        match self.direction {
            Direction::Outgoing => (base, self.key()),
            Direction::Incoming => (self.key(), base),
        }
    }
}

impl<N, R> GraphExplorationModel<N, R>
where
    N: Node + Clone,
    R: Relationship + Clone,
{
    /// Collapse `relationships` of `base` into a new group.
    ///
    /// Expects relationships that share `direction` and type relative to
    /// `base`. Far ends missing from the known nodes are skipped and
    /// counted. Returns `None` when no member remains, in which case no
    /// group is created.
    pub(super) fn fold_into_group(
        &mut self,
        base: &NodeId,
        relationships: &[R],
        direction: Direction,
    ) -> Option<GroupId> {
        let relationship_type = relationships.first()?.relationship_type().to_string();
        let id = self.allocate_group_id();

        let mut members: BTreeMap<NodeId, Vec<RelationshipId>> = BTreeMap::new();
        for rel in relationships {
            let member = rel.other_node(base);
            let rel_id = rel.id().clone();
            let Some(known) = self.known_nodes.get_mut(member) else {
                self.stats.skipped_group_members += 1;
                tracing::debug!(
                    group = %id,
                    relationship = %rel_id,
                    node = %member,
                    "Skipping group member missing from known nodes"
                );
                continue;
            };

            known.groups.entry(id).or_default().push(rel_id.clone());
            members.entry(member.clone()).or_default().push(rel_id.clone());
            self.placements.insert(
                rel_id,
                Placement::Group {
                    group: id,
                    member: member.clone(),
                },
            );
        }

        if members.is_empty() {
            return None;
        }

        let group = Group {
            id,
            base: base.clone(),
            direction,
            relationship_type,
            node_count: members.len(),
            members,
        };

        let (from, to) = group.edge_endpoints();
        self.visual
            .edge_entry(from, to, &group.relationship_type);
        tracing::debug!(
            group = %id,
            base = %base,
            members = group.node_count,
            relationship_type = %group.relationship_type,
            "Created group"
        );
        self.visual.insert_node(group.key(), VisualNode::Group(group));
        self.stats.groups_created += 1;

        Some(id)
    }

    /// Remove `member` from group `id`.
    ///
    /// The caller drops the membership from the member's known-node entry.
    /// Afterwards the group's count is one lower, and the group is gone if
    /// the count reached zero. With `resurface`, the member's bundled
    /// relationships come back as individual unexplored links from the base.
    pub(super) fn unfold_from_group(&mut self, member: &NodeId, id: GroupId, resurface: bool) {
        let Some(VisualNode::Group(group)) = self.visual.node_mut(&VisualKey::Group(id)) else {
            return;
        };
        let Some(relationships) = group.members.remove(member) else {
            return;
        };
        group.node_count -= 1;
        debug_assert_eq!(group.node_count, group.members.len());

        let base = group.base.clone();
        let remaining = group.node_count;

        for rel_id in &relationships {
            self.placements.remove(rel_id);
        }
        if resurface {
            for rel_id in &relationships {
                if let Some(rel) = self.known_relationships.get(rel_id).cloned() {
                    self.add_unexplored_node(&base, &rel);
                }
            }
        }

        tracing::debug!(group = %id, node = %member, remaining, "Removed group member");
        if remaining == 0 {
            self.dissolve_group(id);
        }
    }

    /// Delete group `id`, its aggregate edge and every member's membership.
    ///
    /// Members stay known and their relationships stay recorded; only the
    /// display bookkeeping is dropped.
    pub(super) fn dissolve_group(&mut self, id: GroupId) {
        let key = VisualKey::Group(id);
        let Some(VisualNode::Group(group)) = self.visual.remove_node(&key) else {
            return;
        };

        for (member, relationships) in group.members {
            if let Some(known) = self.known_nodes.get_mut(&member) {
                known.groups.remove(&id);
            }
            for rel_id in relationships {
                self.placements.remove(&rel_id);
            }
        }
        self.visual.remove_incident_edges(&key);

        tracing::debug!(group = %id, base = %group.base, "Dissolved group");
    }

    /// Dissolve every group whose base is `base`.
    pub(super) fn dissolve_groups_based_at(&mut self, base: &NodeId) {
        let ids: Vec<GroupId> = self
            .groups()
            .filter(|group| &group.base == base)
            .map(|group| group.id)
            .collect();
        for id in ids {
            self.dissolve_group(id);
        }
    }
}
