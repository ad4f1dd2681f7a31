//! Graph data sources.
//!
//! The exploration model never fetches anything itself. A
//! [`GraphDataSource`] resolves a node's neighborhood first, then the
//! result is handed to the model in one synchronous call.
//!
//! # Available Sources
//!
//! | Source | Module | Backing |
//! |--------|--------|---------|
//! | [`InMemorySource`] | `memory` | A [`Dataset`](crate::models::Dataset) loaded from JSON |
//!
//! # Usage
//!
//! ```ignore
//! use graph_explorer::source::{GraphDataSource, InMemorySource};
//!
//! let source = InMemorySource::new(Dataset::load(path)?)?;
//! let hood = source.neighborhood(&NodeId::new("a")).await?;
//! model.add_node(hood.node, hood.relationships, hood.related_nodes);
//! ```

mod memory;
mod traits;

pub use memory::InMemorySource;
pub use traits::{GraphDataSource, Neighborhood};
