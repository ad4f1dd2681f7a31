//! Graph layout for renderers.
//!
//! Turns the current visual graph into 3D positions with a force-directed
//! simulation. Pinned nodes hold their position while the rest relax
//! around them.

mod layout;

pub use layout::{GraphLayout, LayoutEdge, LayoutNode};
