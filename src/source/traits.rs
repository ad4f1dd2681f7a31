//! Data source abstraction.
//!
//! - [`GraphDataSource`] - Fetches a node's 1-hop neighborhood
//! - [`Neighborhood`] - What a fetch returns

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{GraphNode, GraphRelationship, NodeId};

/// A node together with everything directly attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    /// The fetched node.
    pub node: GraphNode,
    /// Every relationship incident to `node`.
    pub relationships: Vec<GraphRelationship>,
    /// Nodes at the far ends of `relationships`.
    pub related_nodes: Vec<GraphNode>,
}

/// Supplies nodes and relationships to the exploration model.
///
/// Implementations typically wrap a REST client of a graph database
/// server. Network errors, retries and timeouts are handled here; the
/// model is only called once a fetch has completed.
#[async_trait]
pub trait GraphDataSource: Send + Sync {
    /// Fetches the 1-hop neighborhood of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NodeNotFound`] if the source has no such node.
    async fn neighborhood(&self, id: &NodeId) -> Result<Neighborhood, AppError>;
}
