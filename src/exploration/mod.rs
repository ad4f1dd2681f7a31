//! Incremental graph exploration.
//!
//! ## Module Structure
//!
//! - `model` - The exploration model and its public operations
//! - `group` - Folding fan-outs into groups and unfolding members
//! - `visual` - The visual graph handed to renderers

mod group;
mod model;
mod visual;

pub use group::Group;
pub use model::{GraphExplorationModel, KnownNode, ModelStats, Placement};
pub use visual::{NodeKind, VisualEdge, VisualGraph, VisualNode};
