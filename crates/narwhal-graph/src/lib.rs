#![forbid(unsafe_code)]

//! Layered graph model used by `narwhal`.
//!
//! The graph is an arena: nodes, ports, edges and layers live in flat vectors and refer to each
//! other through small `Copy` handles ([`NodeId`], [`PortId`], [`EdgeId`], [`LayerId`]). Phases
//! keep their per-node bookkeeping in [`NodeMap`]/[`EdgeMap`] scratch arrays instead of fields on
//! the node, so nothing leaks from one phase into the next.

pub mod error;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod scratch;

pub use error::{Error, Result};
pub use geometry::{Margins, Point, Size};
pub use graph::{Edge, LGraph, Layer, Node, NodeKind, Port, PortSide};
pub use ids::{EdgeId, LayerId, NodeId, PortId};
pub use scratch::{EdgeMap, NodeMap, PortMap};
