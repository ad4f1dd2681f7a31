//! Graph dataset file format.
//!
//! A dataset is a JSON document listing nodes and relationships:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "a", "properties": { "name": "Alice" } }],
//!   "relationships": [{ "id": "r1", "type": "KNOWS", "start": "a", "end": "b" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{GraphNode, GraphRelationship};
use crate::error::AppError;

/// A complete graph, as loaded by the in-memory data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// All nodes.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// All relationships.
    #[serde(default)]
    pub relationships: Vec<GraphRelationship>,
}

impl Dataset {
    /// Parses a dataset from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads and parses a dataset file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
